// src/fs/mod.rs

//! Filesystem access used by the program loader.
//!
//! The loader only ever lists a directory and opens individual program
//! files, so that is all this trait covers. Tests swap in
//! [`mock::MockFileSystem`] to simulate files that vanish between an event
//! and the subsequent open.

use std::fmt::Debug;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Open a file for reading. The returned reader owns the handle, so
    /// dropping it closes the file.
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;

    fn is_dir(&self, path: &Path) -> bool;

    /// Return the immediate entries of a directory as full paths.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path).with_context(|| format!("opening file {:?}", path))?;
        Ok(Box::new(file))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry?;
            entries.push(entry.path());
        }
        Ok(entries)
    }
}
