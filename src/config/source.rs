//! Read-only sources of configuration documents

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where base and overlay documents are read from.
///
/// Names are plain file names such as `base.yaml`; a source decides how they
/// map onto storage.
pub trait ConfigSource {
    /// Read the full contents of `name`.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Human-readable location, used in error messages and logs.
    fn describe(&self) -> String;
}

impl<S: ConfigSource + ?Sized> ConfigSource for &S {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        (**self).read(name)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Documents stored as files under a directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ConfigSource for DirSource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.root.join(name))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Documents held in memory, e.g. compiled in with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), contents.into());
    }
}

impl ConfigSource for MemorySource {
    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files.get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{name} not found in memory source"))
        })
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
