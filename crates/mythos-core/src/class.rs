//! Class lookup: binding class-path strings to runtime types.
//!
//! The core never loads types itself. The host supplies a [`ClassResolver`]
//! and a [`DefaultClasses`] table; [`ClassRegistry`] memoizes every
//! successful lookup for the lifetime of one load.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::id::EntityKey;
use crate::value::DataMap;

// ===========================================================================
// Classes
// ===========================================================================

/// A runtime type that resolved definitions are bound to.
pub trait EntityClass: fmt::Debug + Send + Sync {
    /// The class path this type is registered under.
    fn path(&self) -> &str;

    /// Build a live object from a resolved definition.
    fn instantiate(&self, key: &EntityKey, fields: &DataMap) -> Entity {
        Entity {
            key: key.clone(),
            class_path: self.path().to_string(),
            fields: fields.clone(),
        }
    }
}

/// Shared handle to a resolved class.
pub type ClassRef = Arc<dyn EntityClass>;

/// A live object produced by [`EntityClass::instantiate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub key: EntityKey,
    pub class_path: String,
    pub fields: DataMap,
}

/// A class with no behavior beyond its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedClass {
    path: String,
}

impl NamedClass {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn shared(path: impl Into<String>) -> ClassRef {
        Arc::new(Self::new(path))
    }
}

impl EntityClass for NamedClass {
    fn path(&self) -> &str {
        &self.path
    }
}

// ===========================================================================
// Resolvers
// ===========================================================================

/// Host capability that maps a class path to a runtime type.
pub trait ClassResolver {
    /// Returns `None` if `path` does not name a loadable type.
    fn resolve(&self, kind: &str, path: &str) -> Option<ClassRef>;
}

impl<F> ClassResolver for F
where
    F: Fn(&str, &str) -> Option<ClassRef>,
{
    fn resolve(&self, kind: &str, path: &str) -> Option<ClassRef> {
        self(kind, path)
    }
}

/// Resolves only classes that were explicitly registered.
#[derive(Debug, Default)]
pub struct StaticClassResolver {
    classes: BTreeMap<String, ClassRef>,
}

impl StaticClassResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class under its own path, replacing any previous entry.
    pub fn register(&mut self, class: ClassRef) {
        self.classes.insert(class.path().to_string(), class);
    }

    pub fn with_class(mut self, class: ClassRef) -> Self {
        self.register(class);
        self
    }

    /// Build a resolver that knows a [`NamedClass`] for each path.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut resolver = Self::new();
        for path in paths {
            resolver.register(NamedClass::shared(path));
        }
        resolver
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassResolver for StaticClassResolver {
    fn resolve(&self, _kind: &str, path: &str) -> Option<ClassRef> {
        self.classes.get(path).cloned()
    }
}

/// Accepts any well-formed dotted path (`module.sub.Type`) as a
/// [`NamedClass`]. Useful for validating content without a host runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct DottedPathResolver;

impl DottedPathResolver {
    pub fn is_valid_path(path: &str) -> bool {
        !path.is_empty()
            && path.split('.').all(|segment| {
                let mut chars = segment.chars();
                matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            })
    }
}

impl ClassResolver for DottedPathResolver {
    fn resolve(&self, _kind: &str, path: &str) -> Option<ClassRef> {
        Self::is_valid_path(path).then(|| NamedClass::shared(path))
    }
}

// ===========================================================================
// Defaults
// ===========================================================================

/// Per-kind default class paths, used when a definition names no class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultClasses {
    #[serde(default)]
    pub by_kind: BTreeMap<String, String>,
    /// Used for kinds missing from `by_kind`.
    #[serde(default)]
    pub fallback: Option<String>,
}

impl DefaultClasses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: impl Into<String>, path: impl Into<String>) -> Self {
        self.by_kind.insert(kind.into(), path.into());
        self
    }

    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = Some(path.into());
        self
    }

    pub fn for_kind(&self, kind: &str) -> Option<&str> {
        self.by_kind
            .get(kind)
            .or(self.fallback.as_ref())
            .map(String::as_str)
    }
}

// ===========================================================================
// Registry
// ===========================================================================

/// Memoizing class lookup. Construct one per load; it is never invalidated.
pub struct ClassRegistry<'r> {
    resolver: &'r dyn ClassResolver,
    defaults: DefaultClasses,
    /// kind -> path -> class.
    cache: HashMap<String, HashMap<String, ClassRef>>,
}

impl<'r> ClassRegistry<'r> {
    pub fn new(resolver: &'r dyn ClassResolver, defaults: DefaultClasses) -> Self {
        Self {
            resolver,
            defaults,
            cache: HashMap::new(),
        }
    }

    /// Resolve the class for a definition of `kind`. An absent `path` falls
    /// back to the kind's default. `entry` is reported on failure.
    pub fn get_class(
        &mut self,
        kind: &str,
        path: Option<&str>,
        entry: &EntityKey,
    ) -> Result<ClassRef, ResolveError> {
        let path = match path {
            Some(path) => path,
            None => self
                .defaults
                .for_kind(kind)
                .ok_or_else(|| ResolveError::MissingDefaultClass {
                    kind: kind.to_string(),
                    entry: entry.clone(),
                })?,
        };

        if let Some(class) = self.cache.get(kind).and_then(|paths| paths.get(path)) {
            return Ok(Arc::clone(class));
        }

        let class = self
            .resolver
            .resolve(kind, path)
            .ok_or_else(|| ResolveError::ClassResolution {
                kind: kind.to_string(),
                path: path.to_string(),
                entry: entry.clone(),
            })?;
        log::trace!("resolved class '{path}' for kind '{kind}'");
        self.cache
            .entry(kind.to_string())
            .or_default()
            .insert(path.to_string(), Arc::clone(&class));
        Ok(class)
    }

    /// Number of cached `(kind, path)` bindings.
    pub fn cached(&self) -> usize {
        self.cache.values().map(HashMap::len).sum()
    }

    pub fn defaults(&self) -> &DefaultClasses {
        &self.defaults
    }
}
