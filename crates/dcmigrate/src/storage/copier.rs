use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::MigrationConfig;
use crate::error::StorageError;
use crate::media::{self, MediaReference};
use crate::storage::tree::copy_tree;

/// What happened to one media reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CopyOutcome {
    Copied { bytes: u64 },
    Pyramid { tile_directory: PathBuf, tiles: usize },
    /// The descriptor was already materialized earlier in this run.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedAsset {
    pub source: MediaReference,
    pub destination: PathBuf,
    pub outcome: CopyOutcome,
}

/// Copies referenced media into the Content directory of an output tree.
pub struct AssetCopier {
    content_dir: PathBuf,
    pyramid_extension: String,
    pyramid_directory_suffix: String,
    temp_prefix: String,
}

impl AssetCopier {
    pub fn new<P: AsRef<Path>>(content_dir: P, config: &MigrationConfig) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            pyramid_extension: config.pyramid_extension.clone(),
            pyramid_directory_suffix: config.pyramid_directory_suffix.clone(),
            temp_prefix: config.temp_prefix.clone(),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Creates the Content directory. An existing one is never merged into.
    pub fn prepare(&self) -> Result<(), StorageError> {
        // symlink_metadata so a dangling link also counts as present
        if std::fs::symlink_metadata(&self.content_dir).is_ok() {
            return Err(StorageError::DestinationExists(self.content_dir.clone()));
        }

        std::fs::create_dir(&self.content_dir).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                StorageError::DestinationExists(self.content_dir.clone())
            } else {
                StorageError::copy(&self.content_dir, e)
            }
        })
    }

    /// Copies every reference in order, calling `on_copied` after each one,
    /// and stops at the first failure. Files copied before the failure stay
    /// on disk.
    pub fn copy_all<F>(
        &self,
        references: &[MediaReference],
        mut on_copied: F,
    ) -> Result<Vec<CopiedAsset>, StorageError>
    where
        F: FnMut(&CopiedAsset),
    {
        let mut assets = Vec::with_capacity(references.len());
        for reference in references {
            let asset = self.copy_one(reference)?;
            on_copied(&asset);
            assets.push(asset);
        }
        Ok(assets)
    }

    pub fn copy_one(&self, reference: &MediaReference) -> Result<CopiedAsset, StorageError> {
        let source = reference.path();
        let base_name = match reference.base_name() {
            Some(name) if source.exists() => name,
            _ => return Err(StorageError::SourceMissing(source.to_path_buf())),
        };

        let destination = self.content_dir.join(base_name);

        let outcome = if reference.is_pyramid(&self.pyramid_extension) {
            self.copy_pyramid(reference, base_name, &destination)?
        } else {
            let bytes =
                std::fs::copy(source, &destination).map_err(|e| StorageError::copy(source, e))?;
            CopyOutcome::Copied { bytes }
        };

        debug!("{} -> {} ({:?})", reference, destination.display(), outcome);

        Ok(CopiedAsset {
            source: reference.clone(),
            destination,
            outcome,
        })
    }

    fn copy_pyramid(
        &self,
        reference: &MediaReference,
        base_name: &str,
        destination: &Path,
    ) -> Result<CopyOutcome, StorageError> {
        if destination.is_file() {
            return Ok(CopyOutcome::Skipped);
        }

        let source = reference.path();
        let old_tiles = media::companion_directory(&read_first_line(source)?);

        let stem = reference.stem().unwrap_or(base_name);
        let new_tiles = self
            .content_dir
            .join(format!("{}.{}", stem, self.pyramid_directory_suffix));
        let tiles = copy_tree(Path::new(&old_tiles), &new_tiles)?;

        let temp = self
            .content_dir
            .join(format!("{}{}", self.temp_prefix, base_name));
        std::fs::copy(source, &temp).map_err(|e| StorageError::copy(source, e))?;

        replace_in_lines(&temp, destination, &old_tiles, &new_tiles.to_string_lossy())?;
        std::fs::remove_file(&temp).map_err(|e| StorageError::copy(&temp, e))?;

        Ok(CopyOutcome::Pyramid {
            tile_directory: new_tiles,
            tiles,
        })
    }
}

fn read_first_line(path: &Path) -> Result<String, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::copy(path, e))?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| StorageError::copy(path, e))?;
    Ok(line)
}

/// Writes `src` to `dst` line by line, replacing every occurrence of `from`
/// with `to`. Plain substring matching: a `from` that also appears inside an
/// unrelated token is replaced there too.
fn replace_in_lines(src: &Path, dst: &Path, from: &str, to: &str) -> Result<(), StorageError> {
    let input = File::open(src).map_err(|e| StorageError::copy(src, e))?;
    let output = File::create(dst).map_err(|e| StorageError::copy(dst, e))?;

    let mut reader = BufReader::new(input);
    let mut writer = BufWriter::new(output);
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| StorageError::copy(src, e))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(line.replace(from, to).as_bytes())
            .map_err(|e| StorageError::copy(dst, e))?;
    }

    writer.flush().map_err(|e| StorageError::copy(dst, e))
}
