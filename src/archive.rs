//! Zip writing for template archives.
//!
//! Members are named with `/` separators, relative to the template root.
//! Directories are stored as explicit `name/` entries so that empty
//! directories survive packaging.

use crate::{
    error::{PackError, PackResult},
    walkdir::{EntryKind, Visited},
};
use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Component, Path},
};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Archive member name for a path relative to the template root.
pub fn member_name(relative: &Path, kind: EntryKind) -> String {
    let mut name = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    if kind == EntryKind::Directory {
        name.push('/');
    }
    name
}

/// Writes `entries` into a new archive at `archive_path`, in the given order.
/// An existing file at `archive_path` is truncated.
///
/// `on_entry` is called before each entry is written.
pub fn write_archive(
    archive_path: &Path,
    entries: &[Visited],
    mut on_entry: impl FnMut(&Visited),
) -> PackResult<()> {
    let zip_err = |source| PackError::Zip {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = File::create(archive_path).map_err(|e| PackError::io(archive_path, e))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(6));

    for entry in entries {
        on_entry(entry);
        let name = member_name(&entry.relative, entry.kind);
        match entry.kind {
            EntryKind::Directory => {
                zip.add_directory(name, options).map_err(zip_err)?;
            }
            EntryKind::File => {
                let mut source =
                    File::open(&entry.path).map_err(|e| PackError::io(&entry.path, e))?;
                let file_options = with_permissions(options, &source);
                zip.start_file(name, file_options).map_err(zip_err)?;
                io::copy(&mut source, &mut zip).map_err(|e| PackError::io(&entry.path, e))?;
            }
        }
    }

    let mut writer = zip.finish().map_err(zip_err)?;
    io::Write::flush(&mut writer).map_err(|e| PackError::io(archive_path, e))?;
    Ok(())
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, source: &File) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    match source.metadata() {
        Ok(metadata) => options.unix_permissions(metadata.permissions().mode() & 0o777),
        Err(_) => options,
    }
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _source: &File) -> SimpleFileOptions {
    options
}
