/// From Shepmaster's answer on [StackOverflow:56717139][0]
///
/// Modified to prune excluded subtrees and to report paths relative to the
/// walked root.
///
/// [0]: https://stackoverflow.com/a/58825638
use crate::{
    error::{PackError, PackResult},
    exclude::ExcludeSet,
};
use futures::{stream, Stream, StreamExt};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A path found under the walked root that survived exclusion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visited {
    pub path: PathBuf,
    pub relative: PathBuf,
    pub kind: EntryKind,
}

struct Walk {
    root: PathBuf,
    excludes: ExcludeSet,
    to_visit: Vec<PathBuf>,
}

/// Streams every file and directory under `root` (the root itself excluded)
/// whose relative path is not excluded by `excludes`. Excluded directories
/// are not descended into.
///
/// The order of the stream is unspecified.
pub fn visit(
    root: PathBuf,
    excludes: ExcludeSet,
) -> impl Stream<Item = PackResult<Visited>> + Send + 'static {
    async fn one_level(
        root: &Path,
        excludes: &ExcludeSet,
        path: PathBuf,
        to_visit: &mut Vec<PathBuf>,
    ) -> PackResult<Vec<Visited>> {
        let mut dir = fs::read_dir(&path)
            .await
            .map_err(|e| PackError::io(&path, e))?;
        let mut files = Vec::new();

        while let Some(child) = dir.next_entry().await.map_err(|e| PackError::io(&path, e))? {
            let child_path = child.path();
            let relative = match child_path.strip_prefix(root) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };
            if excludes.is_excluded(&relative) {
                debug!("Excluding {}", relative.display());
                continue;
            }

            let file_type = child
                .file_type()
                .await
                .map_err(|e| PackError::io(&child_path, e))?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else if file_type.is_symlink() {
                let target = match fs::metadata(&child_path).await {
                    Ok(target) => target,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        warn!("Skipping dangling symbolic link: {}", child_path.display());
                        continue;
                    }
                    Err(e) => return Err(PackError::io(&child_path, e)),
                };
                if target.is_file() {
                    EntryKind::File
                } else {
                    warn!(
                        "Skipping symbolic link to a directory: {}",
                        child_path.display()
                    );
                    continue;
                }
            } else {
                warn!("Skipping special file: {}", child_path.display());
                continue;
            };

            if kind == EntryKind::Directory {
                to_visit.push(child_path.clone());
            }
            // We also want to keep directories, even if they are empty.
            files.push(Visited {
                path: child_path,
                relative,
                kind,
            });
        }

        Ok(files)
    }

    let walk = Walk {
        to_visit: vec![root.clone()],
        root,
        excludes,
    };

    stream::unfold(walk, |mut walk| async move {
        let path = walk.to_visit.pop()?;
        let level = one_level(&walk.root, &walk.excludes, path, &mut walk.to_visit).await;
        let file_stream = match level {
            Ok(files) => stream::iter(files).map(Ok).left_stream(),
            Err(e) => stream::once(async move { Err(e) }).right_stream(),
        };

        Some((file_stream, walk))
    })
    .flatten()
}

/// Drives [`visit`] to completion on a current-thread runtime, returning the
/// visited paths sorted by relative path. Stops at the first error.
pub fn collect_sorted(root: &Path, excludes: &ExcludeSet) -> PackResult<Vec<Visited>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| PackError::io(root, e))?;
    let mut visited = runtime.block_on(async {
        let mut found = Vec::new();
        let mut entries = Box::pin(visit(root.to_path_buf(), excludes.clone()));
        while let Some(entry) = entries.next().await {
            found.push(entry?);
        }
        Ok::<_, PackError>(found)
    })?;
    visited.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(visited)
}
