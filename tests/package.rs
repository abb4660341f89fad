use std::{
    collections::BTreeSet,
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};
use tpack::{package, plan, ExcludeSet, PackError, PackOptions};
use zip::ZipArchive;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn member_names(archive: &Path) -> BTreeSet<String> {
    let archive = ZipArchive::new(File::open(archive).unwrap()).unwrap();
    archive.file_names().map(String::from).collect()
}

fn member_contents(archive: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(archive).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            file.read_to_end(&mut data).unwrap();
            (file.name().to_string(), data)
        })
        .collect()
}

fn output_listing(output: &Path) -> BTreeSet<String> {
    fs::read_dir(output)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

/// `templates/` with `py-minimal/` and `fastapi-minimal/`.
fn handbook_templates(root: &Path) -> PathBuf {
    let source = root.join("templates");
    write_file(&source.join("py-minimal/pyproject.toml"), "[project]\n");
    write_file(
        &source.join("py-minimal/src/example/__init__.py"),
        "def hello() -> None:\n    print('Hello')\n",
    );
    write_file(&source.join("py-minimal/.venv/bin/python"), "#!/bin/sh\n");
    write_file(&source.join("fastapi-minimal/app/main.py"), "app = None\n");
    write_file(&source.join("fastapi-minimal/venv/pyvenv.cfg"), "home = /usr\n");
    source
}

#[test]
fn one_archive_per_template() {
    let dir = tempfile::tempdir().unwrap();
    let source = handbook_templates(dir.path());
    let output = dir.path().join("dist/templates");

    let written = package(&source, &output, &ExcludeSet::with_defaults()).unwrap();

    assert_eq!(
        written,
        vec![
            output.join("fastapi-minimal.zip"),
            output.join("py-minimal.zip")
        ]
    );
    let expected: BTreeSet<String> = ["fastapi-minimal.zip", "py-minimal.zip"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(output_listing(&output), expected);
}

#[test]
fn members_are_relative_to_the_template_root() {
    let dir = tempfile::tempdir().unwrap();
    let source = handbook_templates(dir.path());
    let output = dir.path().join("dist");

    package(&source, &output, &ExcludeSet::with_defaults()).unwrap();

    let names = member_names(&output.join("py-minimal.zip"));
    let expected: BTreeSet<String> = [
        "pyproject.toml",
        "src/",
        "src/example/",
        "src/example/__init__.py",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(names, expected);

    let host_prefix = dir.path().to_string_lossy().to_string();
    assert!(names.iter().all(|n| !n.starts_with('/') && !n.contains(&host_prefix)));
    assert!(names.iter().all(|n| !n.starts_with("py-minimal")));
}

#[test]
fn virtual_environments_never_appear() {
    let dir = tempfile::tempdir().unwrap();
    let source = handbook_templates(dir.path());
    let output = dir.path().join("dist");

    package(&source, &output, &ExcludeSet::with_defaults()).unwrap();

    for archive in &["py-minimal.zip", "fastapi-minimal.zip"] {
        for name in member_names(&output.join(archive)) {
            assert!(!name.contains(".venv") && !name.starts_with("venv"), "{}", name);
        }
    }
}

#[test]
fn custom_patterns_exclude_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("templates");
    write_file(&source.join("node-api/index.js"), "module.exports = {};\n");
    write_file(&source.join("node-api/node_modules/dep/index.js"), "");
    write_file(&source.join("node-api/lib/cache.pyc"), "");
    let output = dir.path().join("dist");

    let excludes = ExcludeSet::from_patterns(&["node_modules", "*.pyc"]).unwrap();
    package(&source, &output, &excludes).unwrap();

    let names = member_names(&output.join("node-api.zip"));
    let expected: BTreeSet<String> = ["index.js", "lib/"].iter().map(|s| s.to_string()).collect();
    assert_eq!(names, expected);
}

#[test]
fn missing_source_fails_without_creating_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("templates");
    let output = dir.path().join("dist/templates");

    let result = package(&source, &output, &ExcludeSet::with_defaults());

    match result {
        Err(ref err @ PackError::SourceNotFound(_)) => {
            assert_eq!(err.exit_code(), exitcode::NOINPUT)
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!output.exists());
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn stale_archive_is_replaced_not_merged() {
    let dir = tempfile::tempdir().unwrap();
    let source = handbook_templates(dir.path());
    let output = dir.path().join("dist");
    fs::create_dir_all(&output).unwrap();

    // A stale archive holding a member that no longer exists in the template.
    {
        let file = File::create(output.join("py-minimal.zip")).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("obsolete.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        std::io::Write::write_all(&mut zip, b"old").unwrap();
        zip.finish().unwrap();
    }

    package(&source, &output, &ExcludeSet::with_defaults()).unwrap();

    let names = member_names(&output.join("py-minimal.zip"));
    assert!(!names.contains("obsolete.txt"));
    assert!(names.contains("pyproject.toml"));
}

#[test]
fn reruns_are_content_equivalent() {
    let dir = tempfile::tempdir().unwrap();
    let source = handbook_templates(dir.path());
    let output = dir.path().join("dist");

    package(&source, &output, &ExcludeSet::with_defaults()).unwrap();
    let first = member_contents(&output.join("py-minimal.zip"));
    package(&source, &output, &ExcludeSet::with_defaults()).unwrap();
    let second = member_contents(&output.join("py-minimal.zip"));

    assert_eq!(first, second);
    assert!(first
        .iter()
        .any(|(name, data)| name == "pyproject.toml" && data == b"[project]\n"));
}

#[test]
fn empty_templates_and_stray_files() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("templates");
    fs::create_dir_all(source.join("static-site")).unwrap();
    write_file(&source.join("README.md"), "not a template");
    let output = dir.path().join("dist");

    let written = package(&source, &output, &ExcludeSet::with_defaults()).unwrap();

    assert_eq!(written, vec![output.join("static-site.zip")]);
    assert!(member_names(&output.join("static-site.zip")).is_empty());
}

#[test]
fn empty_source_root_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("templates");
    fs::create_dir_all(&source).unwrap();
    let output = dir.path().join("dist");

    let written = package(&source, &output, &ExcludeSet::with_defaults()).unwrap();

    assert!(written.is_empty());
    assert!(output.is_dir());
    assert!(output_listing(&output).is_empty());
}

#[test]
fn plan_matches_what_package_writes() {
    let dir = tempfile::tempdir().unwrap();
    let source = handbook_templates(dir.path());
    let output = dir.path().join("dist");
    let options = PackOptions::new(&source, &output);

    let plans = plan(&options).unwrap();
    assert!(!output.exists());

    package(&source, &output, &options.excludes).unwrap();
    for plan in plans {
        assert_eq!(member_names(&plan.archive).len(), plan.entries.len());
    }
}

#[cfg(unix)]
#[test]
fn unix_permissions_are_kept() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("templates");
    let script = source.join("python-cli/run.sh");
    write_file(&script, "#!/bin/sh\n");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let output = dir.path().join("dist");

    package(&source, &output, &ExcludeSet::with_defaults()).unwrap();

    let mut archive = ZipArchive::new(File::open(output.join("python-cli.zip")).unwrap()).unwrap();
    let mode = archive.by_name("run.sh").unwrap().unix_mode().unwrap();
    assert_eq!(mode & 0o777, 0o755);
}

#[cfg(unix)]
#[test]
fn linked_files_are_stored_as_their_content() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("templates");
    write_file(&dir.path().join("shared/LICENSE"), "MIT\n");
    fs::create_dir_all(source.join("node-api")).unwrap();
    symlink(dir.path().join("shared/LICENSE"), source.join("node-api/LICENSE")).unwrap();
    symlink(dir.path().join("shared"), source.join("node-api/shared")).unwrap();
    symlink(dir.path().join("missing"), source.join("node-api/broken")).unwrap();
    let output = dir.path().join("dist");

    package(&source, &output, &ExcludeSet::with_defaults()).unwrap();

    let contents = member_contents(&output.join("node-api.zip"));
    assert_eq!(contents, vec![("LICENSE".to_string(), b"MIT\n".to_vec())]);
}
