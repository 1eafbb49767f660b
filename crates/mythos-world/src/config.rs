//! World configuration: which extensions to load and which classes to bind.
//!
//! Read from `world.ron`, `world.toml` or `world.json`. Relative paths are
//! taken against the directory holding the config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mythos_core::class::{ClassResolver, DefaultClasses, DottedPathResolver, StaticClassResolver};
use mythos_data::loader::{deserialize_file, find_data_file};
use mythos_data::{ContentSource, DataLoadError, FsSource};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Base name of the config file.
pub const CONFIG_NAME: &str = "world";

/// Top-level world configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Every immediate subdirectory is an extension named after it.
    pub extensions_dir: Option<PathBuf>,
    /// Explicitly listed extensions, loaded before discovered ones.
    pub extensions: Vec<ExtensionEntry>,
    /// kind -> class path used when a definition names no class.
    pub default_classes: BTreeMap<String, String>,
    pub fallback_class: Option<String>,
    /// When non-empty, only these class paths resolve.
    pub known_classes: Vec<String>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// One explicitly listed extension.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtensionEntry {
    pub name: String,
    pub path: PathBuf,
}

/// A discovered extension root on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRoot {
    pub name: String,
    pub root: PathBuf,
}

impl ExtensionRoot {
    pub fn source(&self) -> FsSource {
        FsSource::new(&self.root)
    }
}

impl WorldConfig {
    /// Read a config file. Its directory becomes `base_dir`.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let mut config: WorldConfig = deserialize_file(path)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        log::debug!("loaded world config from {}", path.display());
        Ok(config)
    }

    /// Find and read the `world.*` file in `dir`.
    pub fn find(dir: &Path) -> Result<Self, LoadError> {
        match find_data_file(dir, CONFIG_NAME)? {
            Some(path) => Self::load(&path),
            None => Err(LoadError::MissingConfig {
                dir: dir.to_path_buf(),
            }),
        }
    }

    /// Load `path` if it is a file, or look for `world.*` inside it if it
    /// is a directory.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        if path.is_dir() {
            Self::find(path)
        } else {
            Self::load(path)
        }
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn default_classes(&self) -> DefaultClasses {
        DefaultClasses {
            by_kind: self.default_classes.clone(),
            fallback: self.fallback_class.clone(),
        }
    }

    /// A [`StaticClassResolver`] over `known_classes`, or a
    /// [`DottedPathResolver`] when the list is empty.
    pub fn class_resolver(&self) -> Box<dyn ClassResolver + Send + Sync> {
        if self.known_classes.is_empty() {
            Box::new(DottedPathResolver)
        } else {
            Box::new(StaticClassResolver::from_paths(self.known_classes.iter().cloned()))
        }
    }

    /// Every extension to load, in load order: listed entries first, then
    /// the subdirectories of `extensions_dir` sorted by name.
    pub fn discover(&self) -> Result<Vec<ExtensionRoot>, LoadError> {
        let mut roots: Vec<ExtensionRoot> = self
            .extensions
            .iter()
            .map(|entry| ExtensionRoot {
                name: entry.name.clone(),
                root: self.resolve_path(&entry.path),
            })
            .collect();

        if let Some(dir) = &self.extensions_dir {
            let dir = self.resolve_path(dir);
            if !dir.is_dir() {
                return Err(LoadError::Config {
                    file: self.base_dir.clone(),
                    detail: format!("extensions_dir {} is not a directory", dir.display()),
                });
            }
            let source = FsSource::new(&dir);
            let names = source
                .list_folders(Path::new(""))
                .map_err(DataLoadError::from)?;
            for name in names {
                let root = dir.join(&name);
                roots.push(ExtensionRoot { name, root });
            }
        }

        let mut seen: BTreeMap<&str, &Path> = BTreeMap::new();
        for root in &roots {
            if let Some(first) = seen.insert(&root.name, &root.root) {
                return Err(LoadError::DuplicateExtension {
                    name: root.name.clone(),
                    first: first.display().to_string(),
                    second: root.root.display().to_string(),
                });
            }
        }

        log::debug!("discovered {} extension(s)", roots.len());
        Ok(roots)
    }
}
