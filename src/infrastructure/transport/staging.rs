//! Local tree copies with include/exclude filters applied.
//!
//! Used where the copy tool cannot filter by itself (scp).

use std::fs;
use std::io;
use std::path::Path;

use ignore::WalkBuilder;

use crate::domain::value_objects::PathFilters;

/// Copy the contents of `src` into `dst`, skipping filtered paths.
///
/// Returns the number of files written. Existing files in `dst` are
/// overwritten; nothing is deleted.
pub(crate) fn copy_tree(src: &Path, dst: &Path, filters: &PathFilters) -> io::Result<usize> {
    let matcher = filters
        .matcher(src)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    fs::create_dir_all(dst)?;
    let mut written = 0;

    // No gitignore/hidden handling: only the explicit filters apply.
    let walker = WalkBuilder::new(src)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| io::Error::other(e.to_string()))?;
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(src) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }

        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if matcher.is_excluded(rel, file_type.is_dir()) {
            tracing::trace!(path = %rel.display(), "filtered out");
            continue;
        }

        let target = dst.join(rel);
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(path, &target)?;
            written += 1;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &target)?;
            written += 1;
        }
    }

    Ok(written)
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let link = fs::read_link(src)?;
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink(link, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dst).map(|_| ())
}
