//! Extensions: independently authored content packages.
//!
//! An [`Extension`] holds the raw maps produced by scanning its content tree
//! and, once the pipeline has run, the resolved maps of the same shapes. The
//! per-extension stages here are pure; ordering across extensions is the
//! caller's job.

use std::collections::BTreeMap;

use crate::abstracts::AbstractIndex;
use crate::assemble::{InstanceDefinition, ResolvedDefinition, assemble_instance, resolve_kind_map};
use crate::class::ClassRegistry;
use crate::error::ResolveError;
use crate::id::EntityKey;
use crate::value::{DataMap, KindMap, kind_map_len};

/// Raw contents of one instance folder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInstance {
    /// The instance's own fields (`instance.<ext>`).
    pub fields: DataMap,
    pub areas: KindMap<DataMap>,
    pub rooms: KindMap<DataMap>,
    pub gateways: KindMap<DataMap>,
    /// room kind -> room key -> destination key -> fields.
    pub exits: KindMap<BTreeMap<String, DataMap>>,
}

/// Everything scanned from an extension's content tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawContent {
    pub base: KindMap<DataMap>,
    pub abstracts: KindMap<DataMap>,
    pub templates: KindMap<DataMap>,
    pub instances: BTreeMap<String, RawInstance>,
}

/// Resolved counterpart of [`RawContent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedContent {
    pub abstracts: KindMap<DataMap>,
    pub base: KindMap<ResolvedDefinition>,
    pub templates: KindMap<ResolvedDefinition>,
    pub instances: BTreeMap<String, InstanceDefinition>,
}

/// One named content package.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    name: String,
    /// Where the content tree lives, for diagnostics.
    location: String,
    raw: RawContent,
    resolved: ResolvedContent,
}

impl Extension {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            raw: RawContent::default(),
            resolved: ResolvedContent::default(),
        }
    }

    pub fn with_raw(mut self, raw: RawContent) -> Self {
        self.raw = raw;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn raw(&self) -> &RawContent {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut RawContent {
        &mut self.raw
    }

    pub fn resolved(&self) -> &ResolvedContent {
        &self.resolved
    }

    /// Raw abstract entries keyed by their full identity.
    pub fn abstract_entries(&self) -> impl Iterator<Item = (EntityKey, &DataMap)> {
        self.raw.abstracts.iter().flat_map(move |(kind, entries)| {
            entries
                .iter()
                .map(move |(key, fields)| (EntityKey::new(&self.name, kind, key), fields))
        })
    }

    /// Copy this extension's slice of the global resolved abstract set.
    pub fn adopt_abstracts(&mut self, index: &AbstractIndex) {
        self.resolved.abstracts = index.for_extension(&self.name);
    }

    pub fn resolve_base(
        &mut self,
        index: &AbstractIndex,
        registry: &mut ClassRegistry<'_>,
    ) -> Result<(), ResolveError> {
        self.resolved.base = resolve_kind_map(&self.name, &self.raw.base, index, registry)?;
        Ok(())
    }

    pub fn resolve_templates(
        &mut self,
        index: &AbstractIndex,
        registry: &mut ClassRegistry<'_>,
    ) -> Result<(), ResolveError> {
        self.resolved.templates =
            resolve_kind_map(&self.name, &self.raw.templates, index, registry)?;
        Ok(())
    }

    pub fn resolve_instances(
        &mut self,
        index: &AbstractIndex,
        registry: &mut ClassRegistry<'_>,
    ) -> Result<(), ResolveError> {
        let mut instances = BTreeMap::new();
        for (name, raw) in &self.raw.instances {
            let definition = assemble_instance(&self.name, name, raw, index, registry)?;
            instances.insert(name.clone(), definition);
        }
        self.resolved.instances = instances;
        Ok(())
    }

    /// One-line count summary for logging.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} base, {} abstracts, {} templates, {} instances",
            self.name,
            kind_map_len(&self.raw.base),
            kind_map_len(&self.raw.abstracts),
            kind_map_len(&self.raw.templates),
            self.raw.instances.len(),
        )
    }
}
