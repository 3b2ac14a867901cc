//! Shared fixtures for dcmigrate integration tests.
//!
//! `WallFixture` lays out a source tree of media files and pyramid sets plus
//! an empty output directory inside one temporary directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use assert_fs::TempDir;

use dcmigrate::MigrationRequest;

pub struct WallFixture {
    temp: TempDir,
    pub src: PathBuf,
    pub out: PathBuf,
}

impl WallFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        temp.child("src").create_dir_all().expect("Failed to create src");
        temp.child("out").create_dir_all().expect("Failed to create out");
        let src = temp.path().join("src");
        let out = temp.path().join("out");
        Self { temp, src, out }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Writes an ordinary media file under `src/` and returns its path.
    pub fn media(&self, name: &str, content: &[u8]) -> PathBuf {
        let child = self.temp.child("src").child(name);
        if let Some(parent) = child.path().parent() {
            std::fs::create_dir_all(parent).expect("Failed to create media dir");
        }
        child.write_binary(content).expect("Failed to write media");
        child.path().to_path_buf()
    }

    /// Writes a pyramid descriptor `src/<name>` whose first line names a
    /// tile directory `src/<tiles>` holding `levels` tiles.
    pub fn pyramid(&self, name: &str, tiles: &str, levels: usize) -> PathBuf {
        let tile_dir = self.temp.child("src").child(tiles);
        tile_dir.create_dir_all().expect("Failed to create tile dir");
        for level in 0..levels {
            let level_dir = tile_dir.child(level.to_string());
            level_dir.create_dir_all().expect("Failed to create level dir");
            level_dir
                .child("0_0.jpg")
                .write_binary(format!("tile-{}", level).as_bytes())
                .expect("Failed to write tile");
        }

        let descriptor = self.temp.child("src").child(name);
        descriptor
            .write_str(&format!(
                "\"{}\" more text\nlevels {}\n{}/0/0_0.jpg\n",
                tile_dir.path().display(),
                levels,
                tile_dir.path().display()
            ))
            .expect("Failed to write descriptor");
        descriptor.path().to_path_buf()
    }

    /// Writes a state file referencing `uris` in order.
    pub fn state(&self, name: &str, uris: &[&PathBuf]) -> PathBuf {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<state version=\"1\">\n");
        for uri in uris {
            xml.push_str("  <ContentWindow>\n");
            xml.push_str(&format!("    <URI>{}</URI>\n", uri.display()));
            xml.push_str("    <x>0</x>\n  </ContentWindow>\n");
        }
        xml.push_str("</state>\n");

        let child = self.temp.child("src").child(name);
        child.write_str(&xml).expect("Failed to write state");
        child.path().to_path_buf()
    }

    pub fn request(&self, old_state: &Path, new_state_name: &str) -> MigrationRequest {
        MigrationRequest::new(
            old_state.to_string_lossy(),
            new_state_name,
            self.out.to_string_lossy(),
        )
    }

    pub fn content(&self) -> PathBuf {
        self.out.join("Content")
    }
}
