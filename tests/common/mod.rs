#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vecpipe::archive::{ArchiveValue, ArchiveWriter, KeyedSink, SequentialReader, WriterOptions};

/// A scratch directory holding archives for one test.
pub struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `name` inside the workspace, as a string.
    pub fn file(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }
}

/// Writes `entries` to `locator` with default writer options.
pub fn write_archive<T: ArchiveValue>(locator: &str, entries: &[(&str, T)]) {
    let mut writer =
        ArchiveWriter::<T>::open(locator, WriterOptions::default()).expect("open writer");
    for (key, value) in entries {
        writer.write(key, value).expect("write record");
    }
    writer.flush().expect("flush writer");
}

/// Reads every record of `locator` in order.
pub fn read_archive<T: ArchiveValue>(locator: &str) -> Vec<(String, T)> {
    let mut reader = SequentialReader::<T>::open(locator).expect("open reader");
    let mut records = Vec::new();
    while let Some(record) = reader.take_next().expect("read record") {
        records.push(record);
    }
    records
}
