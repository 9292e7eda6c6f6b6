//! FileSystem trait definition

use anyhow::Result;
use std::path::Path;

/// A directory entry returned by read_dir
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
}

/// The read-only operations detection needs from a checkout
pub trait FileSystem: Send + Sync {
    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// List the immediate children of a directory (no recursion)
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;
}
