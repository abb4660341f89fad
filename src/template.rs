use crate::error::{PackError, PackResult};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const ARCHIVE_EXTENSION: &str = "zip";

/// A starter project directory, immediately under the source root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub path: PathBuf,
}

impl Template {
    pub fn infer_from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        Some(Template { name, path })
    }

    /// `<name>.zip`
    pub fn archive_name(&self) -> String {
        format!("{}.{}", self.name, ARCHIVE_EXTENSION)
    }
}

/// Lists the immediate subdirectories of `source_root` as templates, sorted by
/// name. Files directly under the source root are not templates.
pub fn discover(source_root: &Path) -> PackResult<Vec<Template>> {
    let metadata = match fs::metadata(source_root) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(PackError::SourceNotFound(source_root.to_path_buf()))
        }
        Err(err) => return Err(PackError::io(source_root, err)),
    };
    if !metadata.is_dir() {
        return Err(PackError::NotADirectory(source_root.to_path_buf()));
    }

    let items = fs::read_dir(source_root).map_err(|e| PackError::io(source_root, e))?;
    let mut templates = Vec::new();
    for item in items {
        let item = item.map_err(|e| PackError::io(source_root, e))?.path();
        if !item.is_dir() {
            continue;
        }
        if let Some(template) = Template::infer_from_path(item) {
            templates.push(template);
        }
    }
    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}
