use super::{DirEntry, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
enum MockEntry {
    File(String),
    Unreadable,
    Directory,
}

/// In-memory file tree rooted at `/mock` (or a custom root)
pub struct MockFileSystem {
    entries: RwLock<HashMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        let fs = Self {
            entries: RwLock::new(HashMap::new()),
            root: root.clone(),
        };
        fs.add_dir(root);
        fs
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.insert(path.as_ref(), MockEntry::File(content.to_string()));
    }

    /// Registers a file that is listed but fails on read
    pub fn add_unreadable_file(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Unreadable);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        self.insert(path.as_ref(), MockEntry::Directory);
    }

    fn insert(&self, path: &Path, entry: MockEntry) {
        let path = self.normalize_path(path);
        let mut entries = self.write();

        if let Some(parent) = path.parent() {
            let mut current = PathBuf::new();
            for component in parent.components() {
                current.push(component);
                entries
                    .entry(current.clone())
                    .or_insert(MockEntry::Directory);
            }
        }

        entries.insert(path, entry);
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        matches!(
            self.read().get(&self.normalize_path(path)),
            Some(MockEntry::Directory)
        )
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let path = self.normalize_path(path);
        match self.read().get(&path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Unreadable) => Err(anyhow!("Permission denied: {:?}", path)),
            Some(MockEntry::Directory) => Err(anyhow!("Not a file: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        let entries = self.read();

        match entries.get(&path) {
            Some(MockEntry::Directory) => {}
            Some(_) => return Err(anyhow!("Not a directory: {:?}", path)),
            None => return Err(anyhow!("Directory not found: {:?}", path)),
        }

        Ok(entries
            .keys()
            .filter(|child| child.parent() == Some(path.as_path()))
            .filter_map(|child| child.file_name())
            .map(|name| DirEntry {
                name: name.to_string_lossy().to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("requirements.txt", "flask\n");

        assert!(!fs.is_dir(Path::new("/mock/requirements.txt")));
        assert_eq!(
            fs.read_to_string(Path::new("/mock/requirements.txt")).unwrap(),
            "flask\n"
        );
    }

    #[test]
    fn test_parent_directories_created() {
        let fs = MockFileSystem::new();
        fs.add_file(".github/workflows/ci.yml", "on: push");

        assert!(fs.is_dir(Path::new("/mock/.github")));
        assert!(fs.is_dir(Path::new("/mock/.github/workflows")));
    }

    #[test]
    fn test_read_dir_lists_direct_children_only() {
        let fs = MockFileSystem::new();
        fs.add_file("Makefile", "run:\n\t./app\n");
        fs.add_file(".github/workflows/ci.yml", "on: push");

        let entries = fs.read_dir(Path::new("/mock")).unwrap();
        let mut names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        names.sort();

        assert_eq!(names, vec![".github", "Makefile"]);
    }

    #[test]
    fn test_read_dir_missing_directory_errors() {
        let fs = MockFileSystem::new();
        assert!(fs.read_dir(Path::new("/mock/.github/workflows")).is_err());
    }

    #[test]
    fn test_unreadable_file() {
        let fs = MockFileSystem::new();
        fs.add_unreadable_file("package.json");

        let names: Vec<String> = fs
            .read_dir(Path::new("/mock"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["package.json"]);
        assert!(fs.read_to_string(Path::new("/mock/package.json")).is_err());
    }

    #[test]
    fn test_with_root() {
        let fs = MockFileSystem::with_root(PathBuf::from("/repo"));
        fs.add_file("main.py", "print('hi')");

        assert_eq!(fs.root(), Path::new("/repo"));
        assert_eq!(
            fs.read_to_string(Path::new("/repo/main.py")).unwrap(),
            "print('hi')"
        );
        assert!(fs.is_dir(Path::new("/repo")));
    }
}
