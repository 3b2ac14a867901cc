use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::StorageError;

/// Recursively copies `src` to `dst`, which must not exist yet. Symbolic
/// links are recreated as links rather than followed. Returns the number of
/// files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize, StorageError> {
    if !src.is_dir() {
        return Err(StorageError::copy(
            src,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "companion tile directory not found",
            ),
        ));
    }

    std::fs::create_dir(dst).map_err(|e| StorageError::copy(dst, e))?;

    let mut files = 0;
    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| src.to_path_buf());
            StorageError::copy(path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| StorageError::copy(entry.path(), std::io::Error::other(e.to_string())))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir(&target).map_err(|e| StorageError::copy(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)
                .map_err(|e| StorageError::copy(entry.path(), e))?;
            files += 1;
        }
    }

    Ok(files)
}

fn copy_symlink(link: &Path, target: &Path) -> Result<(), StorageError> {
    let destination: PathBuf =
        std::fs::read_link(link).map_err(|e| StorageError::copy(link, e))?;

    #[cfg(unix)]
    std::os::unix::fs::symlink(&destination, target)
        .map_err(|e| StorageError::copy(target, e))?;

    #[cfg(windows)]
    {
        let resolved = link
            .parent()
            .map(|p| p.join(&destination))
            .unwrap_or_else(|| destination.clone());
        if resolved.is_dir() {
            std::os::windows::fs::symlink_dir(&destination, target)
        } else {
            std::os::windows::fs::symlink_file(&destination, target)
        }
        .map_err(|e| StorageError::copy(target, e))?;
    }

    Ok(())
}
