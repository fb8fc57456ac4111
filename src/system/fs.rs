//! Filesystem access behind a trait so the counter-file collector can run
//! against an in-memory tree in tests.

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Names of the entries directly under `path`.
    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            // Entries can vanish while iterating /proc; skip them.
            let Ok(entry) = entry else { continue };
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

/// In-memory filesystem. Directories are implied by the files added.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: HashMap<PathBuf, String>,
    dirs: HashMap<PathBuf, BTreeSet<String>>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let mut child = path.as_path();
        while let Some(parent) = child.parent() {
            if let Some(name) = child.file_name().and_then(|n| n.to_str()) {
                self.dirs
                    .entry(parent.to_path_buf())
                    .or_default()
                    .insert(name.to_string());
            }
            child = parent;
        }
        self.files.insert(path, content.into());
    }

    /// Adds `/<root>/<pid>/stat` and `/<root>/<pid>/status`.
    pub fn add_process(&mut self, root: impl AsRef<Path>, pid: u32, stat: &str, status: &str) {
        let base = root.as_ref().join(pid.to_string());
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("status"), status);
    }

    /// Removes a single file, leaving its directory listed. Mimics a process
    /// exiting between enumeration and the detail read.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.files.remove(path.as_ref());
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn read_dir_names(&self, path: &Path) -> io::Result<Vec<String>> {
        self.dirs
            .get(path)
            .map(|names| names.iter().cloned().collect())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not found", path.display()),
                )
            })
    }
}
