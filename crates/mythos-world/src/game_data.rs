use std::fmt;

use mythos_core::abstracts::AbstractIndex;
use mythos_core::assemble::{InstanceDefinition, ResolvedDefinition};
use mythos_core::extension::Extension;
use mythos_core::value::kind_map_len;
use mythos_core::{DataMap, KindMap, ResolveError};
use serde::Serialize;

/// The fully resolved output of one load. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    /// In load order.
    extensions: Vec<Extension>,
    abstracts: AbstractIndex,
}

/// Counts across every loaded extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub extensions: usize,
    pub abstracts: usize,
    pub base: usize,
    pub templates: usize,
    pub instances: usize,
    pub rooms: usize,
    pub exits: usize,
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} extensions, {} abstracts, {} base, {} templates, {} instances ({} rooms, {} exits)",
            self.extensions,
            self.abstracts,
            self.base,
            self.templates,
            self.instances,
            self.rooms,
            self.exits
        )
    }
}

impl GameData {
    pub fn new(extensions: Vec<Extension>, abstracts: AbstractIndex) -> Self {
        Self {
            extensions,
            abstracts,
        }
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.name() == name)
    }

    pub fn abstracts(&self) -> &AbstractIndex {
        &self.abstracts
    }

    /// A resolved abstract. Distinguishes an unknown extension, kind, or key.
    pub fn get_abstract(
        &self,
        extension: &str,
        kind: &str,
        key: &str,
    ) -> Result<&DataMap, ResolveError> {
        self.abstracts.get_abstract(extension, kind, key)
    }

    /// Base definitions of every extension. On a shared kind and key the
    /// later-loaded extension wins.
    pub fn base(&self) -> KindMap<&ResolvedDefinition> {
        self.merged(|e| &e.resolved().base)
    }

    /// Templates of every extension, merged like [`GameData::base`].
    pub fn templates(&self) -> KindMap<&ResolvedDefinition> {
        self.merged(|e| &e.resolved().templates)
    }

    fn merged<'a>(
        &'a self,
        select: impl Fn(&'a Extension) -> &'a KindMap<ResolvedDefinition>,
    ) -> KindMap<&'a ResolvedDefinition> {
        let mut out: KindMap<&ResolvedDefinition> = KindMap::new();
        for extension in &self.extensions {
            for (kind, entries) in select(extension) {
                let merged = out.entry(kind.clone()).or_default();
                for (key, definition) in entries {
                    merged.insert(key.clone(), definition);
                }
            }
        }
        out
    }

    /// Every instance, extension by extension in load order.
    pub fn instances(&self) -> impl Iterator<Item = &InstanceDefinition> {
        self.extensions
            .iter()
            .flat_map(|e| e.resolved().instances.values())
    }

    pub fn instance(&self, extension: &str, name: &str) -> Option<&InstanceDefinition> {
        self.extension(extension)?.resolved().instances.get(name)
    }

    pub fn summary(&self) -> LoadSummary {
        let mut summary = LoadSummary {
            extensions: self.extensions.len(),
            abstracts: self.abstracts.len(),
            ..LoadSummary::default()
        };
        for extension in &self.extensions {
            let resolved = extension.resolved();
            summary.base += kind_map_len(&resolved.base);
            summary.templates += kind_map_len(&resolved.templates);
            summary.instances += resolved.instances.len();
        }
        for instance in self.instances() {
            summary.rooms += instance.room_count();
            summary.exits += instance.exit_count();
        }
        summary
    }
}
