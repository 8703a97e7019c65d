#![allow(dead_code)]

use std::fs;
use std::path::Path;

use nanomanager::{FileManager, FileManagerOptions};
use tempfile::TempDir;

pub const FIXTURE_FILES: [&str; 6] = [
    "2b.txt",
    "hello.txt",
    "Second-file.txt",
    "1a.txt",
    "11c.txt",
    ".htaccess",
];

/// A managed directory holding the fixture files and one subdirectory.
pub fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in FIXTURE_FILES {
        fs::write(dir.path().join(name), format!("contents of {name}")).unwrap();
    }
    fs::create_dir(dir.path().join("subdir")).unwrap();
    dir
}

pub fn fixture_manager(dir: &TempDir) -> FileManager {
    FileManager::new(
        FileManagerOptions::new(dir.path())
            .base_url("/files")
            .api_url("/api"),
    )
    .unwrap()
}

/// Sorted names of every entry in `dir`, hidden ones included.
pub fn snapshot(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}
