use crate::{
    archive,
    error::{PackError, PackResult},
    exclude::ExcludeSet,
    progress::{NoProgress, Progress},
    template::{self, Template},
    walkdir::{self, Visited},
};
use log::{debug, info, warn};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Where to read templates from, where to write archives, and what to leave out.
#[derive(Clone, Debug)]
pub struct PackOptions {
    pub source: PathBuf,
    pub output: PathBuf,
    pub excludes: ExcludeSet,
}

impl PackOptions {
    /// Options using the default exclusions.
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        PackOptions {
            source: source.into(),
            output: output.into(),
            excludes: ExcludeSet::with_defaults(),
        }
    }

    pub fn with_excludes(mut self, excludes: ExcludeSet) -> Self {
        self.excludes = excludes;
        self
    }
}

/// What a run writes for a single template.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    pub template: Template,
    pub archive: PathBuf,
    /// Archive members, sorted by relative path.
    pub entries: Vec<Visited>,
}

/// Packages every template directory under `source` into `<name>.zip` files in
/// `output`, returning the archive paths written.
pub fn package(source: &Path, output: &Path, excludes: &ExcludeSet) -> PackResult<Vec<PathBuf>> {
    let options = PackOptions::new(source, output).with_excludes(excludes.clone());
    package_with_progress(&options, &mut NoProgress)
}

/// Computes what [`package`] would write, without touching the output
/// directory.
///
/// An output directory living under the source root is never packaged: a
/// template that is the output directory is skipped, and an output directory
/// nested in a template is left out of its archive.
pub fn plan(options: &PackOptions) -> PackResult<Vec<TemplatePlan>> {
    let templates = template::discover(&options.source)?;
    let output = fs::canonicalize(&options.output).ok();
    let mut plans = Vec::with_capacity(templates.len());
    for template in templates {
        let nested_output = match (&output, fs::canonicalize(&template.path)) {
            (Some(output), Ok(template_path)) => {
                if *output == template_path {
                    warn!(
                        "Skipping template {}: it is the output directory",
                        template.name
                    );
                    continue;
                }
                output
                    .strip_prefix(&template_path)
                    .ok()
                    .map(Path::to_path_buf)
            }
            _ => None,
        };

        let mut entries = walkdir::collect_sorted(&template.path, &options.excludes)?;
        if let Some(nested) = nested_output {
            entries.retain(|entry| !entry.relative.starts_with(&nested));
        }
        debug!(
            "Template {} has {} archive entries",
            template.name,
            entries.len()
        );
        plans.push(TemplatePlan {
            archive: options.output.join(template.archive_name()),
            template,
            entries,
        });
    }
    Ok(plans)
}

/// [`package`], reporting to `progress` as it goes.
///
/// The first failure aborts the run. Archives completed before the failure are
/// left in place; the archive being written when it happened is removed.
pub fn package_with_progress(
    options: &PackOptions,
    progress: &mut dyn Progress,
) -> PackResult<Vec<PathBuf>> {
    let plans = plan(options)?;
    prepare_output(&options.output)?;

    let mut written = Vec::with_capacity(plans.len());
    for plan in plans {
        progress.on_template(&plan.template);
        remove_stale(&plan.archive)?;

        let template = &plan.template;
        let result = archive::write_archive(&plan.archive, &plan.entries, |entry| {
            debug!("{}: adding {}", template.name, entry.relative.display());
            progress.on_entry(template, entry);
        });
        if let Err(err) = result {
            fs::remove_file(&plan.archive).ok();
            return Err(err);
        }

        progress.on_archive(template, &plan.archive);
        info!(
            "Packaged {} ({} entries) into {}",
            template.name,
            plan.entries.len(),
            plan.archive.display()
        );
        written.push(plan.archive);
    }
    Ok(written)
}

fn prepare_output(output: &Path) -> PackResult<()> {
    if output.exists() && !output.is_dir() {
        return Err(PackError::OutputNotADirectory(output.to_path_buf()));
    }
    fs::create_dir_all(output).map_err(|e| PackError::io(output, e))
}

fn remove_stale(archive: &Path) -> PackResult<()> {
    match fs::remove_file(archive) {
        Ok(()) => {
            debug!("Removed stale archive {}", archive.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(PackError::io(archive, err)),
    }
}
