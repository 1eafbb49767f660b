//! Content sources: where an extension's files come from.
//!
//! All paths handed to a [`ContentSource`] are relative to the extension
//! root. A directory that does not exist lists as empty; missing subtrees
//! such as `abstracts/` are normal for small extensions.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Read access to one extension's content tree.
pub trait ContentSource {
    /// Human-readable location, for logs and diagnostics.
    fn describe(&self) -> String;

    /// Files directly inside `dir`, as paths relative to the root, sorted.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Names of the immediate subdirectories of `dir`, sorted.
    fn list_folders(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Read a file's full text.
    fn read(&self, file: &Path) -> io::Result<String>;
}

// ===========================================================================
// Filesystem
// ===========================================================================

/// A content tree on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries(&self, dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
        let full = self.root.join(dir);
        if !full.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = fs::read_dir(full)?.collect::<io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.file_name());
        Ok(entries)
    }
}

impl ContentSource for FsSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in self.entries(dir)? {
            if entry.file_type()?.is_file() {
                files.push(dir.join(entry.file_name()));
            }
        }
        Ok(files)
    }

    fn list_folders(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut folders = Vec::new();
        for entry in self.entries(dir)? {
            if entry.file_type()?.is_dir() {
                folders.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(folders)
    }

    fn read(&self, file: &Path) -> io::Result<String> {
        fs::read_to_string(self.root.join(file))
    }
}

// ===========================================================================
// In-memory
// ===========================================================================

/// A content tree held in memory, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    files: BTreeMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }
}

/// Drop `.` components so `./a.ron` and `a.ron` are the same key.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl ContentSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let dir = normalize(dir);
        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir.as_path()))
            .cloned()
            .collect())
    }

    fn list_folders(&self, dir: &Path) -> io::Result<Vec<String>> {
        let dir = normalize(dir);
        let folders: BTreeSet<String> = self
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(&dir).ok())
            .filter_map(|rest| {
                let mut components = rest.components();
                let first = components.next()?;
                // Only paths with at least one more component live in a folder.
                components.next()?;
                Some(first.as_os_str().to_string_lossy().into_owned())
            })
            .collect();
        Ok(folders.into_iter().collect())
    }

    fn read(&self, file: &Path) -> io::Result<String> {
        self.files.get(&normalize(file)).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found in {}", file.display(), self.describe()),
            )
        })
    }
}
