//! Multi-parent abstract inheritance.
//!
//! Every abstract may list `parents`, each a reference resolved relative to
//! the abstract's own extension and kind. Resolution peels the dependency
//! graph one layer at a time: an entry is merged once all of its parents are
//! merged, and a pass that merges nothing while entries remain is a cycle.
//!
//! # Merge precedence
//!
//! Parents are applied in listed order onto an empty map, so a later parent
//! overwrites an earlier one. The entry's own fields are applied last and
//! win over every parent. The `parents` field itself never appears in the
//! merged output.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ResolveError;
use crate::id::EntityKey;
use crate::reference::resolve_relative;
use crate::value::{DataMap, KindMap, PARENTS_FIELD, overlay, string_list};

// ===========================================================================
// Index
// ===========================================================================

/// The fully resolved abstract set across all extensions. Immutable once
/// built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbstractIndex {
    extensions: BTreeSet<String>,
    entries: BTreeMap<EntityKey, DataMap>,
}

impl AbstractIndex {
    /// Look up a resolved abstract, distinguishing an unknown extension, an
    /// unknown kind within a known extension, and an unknown key.
    pub fn get_abstract(
        &self,
        extension: &str,
        kind: &str,
        key: &str,
    ) -> Result<&DataMap, ResolveError> {
        lookup(
            &self.extensions,
            &self.entries,
            &EntityKey::new(extension, kind, key),
        )
    }

    /// Resolve `reference` relative to `owner` and look it up.
    pub fn get_relative(
        &self,
        reference: &str,
        owner: &EntityKey,
    ) -> Result<&DataMap, ResolveError> {
        let target = resolve_relative(reference, owner)?;
        lookup(&self.extensions, &self.entries, &target).map_err(|e| e.referenced_by(owner))
    }

    pub fn get(&self, key: &EntityKey) -> Option<&DataMap> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &DataMap)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every extension name the index was built with, including extensions
    /// that contribute no abstracts.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// The resolved abstracts of one extension, as kind -> key -> fields.
    pub fn for_extension(&self, extension: &str) -> KindMap<DataMap> {
        let mut out = KindMap::new();
        for (key, fields) in self.entries.range(range_start(extension, "")..) {
            if key.extension != extension {
                break;
            }
            out.entry(key.kind.clone())
                .or_default()
                .insert(key.key.clone(), fields.clone());
        }
        out
    }
}

fn range_start(extension: &str, kind: &str) -> EntityKey {
    EntityKey::new(extension, kind, "")
}

fn lookup<'a>(
    extensions: &BTreeSet<String>,
    entries: &'a BTreeMap<EntityKey, DataMap>,
    target: &EntityKey,
) -> Result<&'a DataMap, ResolveError> {
    if let Some(fields) = entries.get(target) {
        return Ok(fields);
    }
    if !extensions.contains(&target.extension) {
        return Err(ResolveError::UnknownExtension {
            extension: target.extension.clone(),
            referenced_by: None,
        });
    }
    let kind_exists = entries
        .range(range_start(&target.extension, &target.kind)..)
        .next()
        .is_some_and(|(k, _)| k.extension == target.extension && k.kind == target.kind);
    if !kind_exists {
        return Err(ResolveError::UnknownKind {
            extension: target.extension.clone(),
            kind: target.kind.clone(),
            referenced_by: None,
        });
    }
    Err(ResolveError::UnknownAbstractKey {
        target: target.clone(),
        referenced_by: None,
    })
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Resolve every raw abstract into its merged form.
///
/// `extensions` names every loaded extension so that references into an
/// extension without abstracts report an unknown kind rather than an
/// unknown extension.
pub fn resolve_abstracts<I, S>(
    extensions: I,
    raw: &BTreeMap<EntityKey, DataMap>,
) -> Result<AbstractIndex, ResolveError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut known: BTreeSet<String> = extensions.into_iter().map(Into::into).collect();
    known.extend(raw.keys().map(|k| k.extension.clone()));

    // Parse and validate every parent reference up front so that a dangling
    // reference is reported as such and not as a cycle.
    let mut parents_of: BTreeMap<&EntityKey, Vec<EntityKey>> = BTreeMap::new();
    for (key, fields) in raw {
        let mut parents = Vec::new();
        for reference in string_list(fields, PARENTS_FIELD, key)? {
            let parent = resolve_relative(&reference, key)?;
            lookup(&known, raw, &parent).map_err(|e| e.referenced_by(key))?;
            parents.push(parent);
        }
        parents_of.insert(key, parents);
    }

    let mut resolved: BTreeMap<EntityKey, DataMap> = BTreeMap::new();
    let mut unresolved: BTreeSet<&EntityKey> = raw.keys().collect();
    let mut pass = 0usize;

    while !unresolved.is_empty() {
        pass += 1;
        let mut done = Vec::new();

        for &key in &unresolved {
            let parents = &parents_of[key];
            if !parents.iter().all(|p| resolved.contains_key(p)) {
                continue;
            }
            let mut merged = DataMap::new();
            for parent in parents {
                overlay(&mut merged, &resolved[parent]);
            }
            let mut own = raw[key].clone();
            own.remove(PARENTS_FIELD);
            overlay(&mut merged, &own);
            resolved.insert(key.clone(), merged);
            done.push(key);
        }

        if done.is_empty() {
            let remaining: Vec<EntityKey> = unresolved.iter().map(|&k| k.clone()).collect();
            let entry = find_cycle_member(&remaining[0], &unresolved, &parents_of);
            return Err(ResolveError::UnresolvableCycle { entry, remaining });
        }

        log::debug!(
            "abstract pass {pass}: resolved {}, {} remaining",
            done.len(),
            unresolved.len() - done.len()
        );
        for key in done {
            unresolved.remove(key);
        }
    }

    Ok(AbstractIndex {
        extensions: known,
        entries: resolved,
    })
}

/// Walk unresolved parents from `start` until a node repeats. The repeated
/// node lies on a cycle.
fn find_cycle_member(
    start: &EntityKey,
    unresolved: &BTreeSet<&EntityKey>,
    parents_of: &BTreeMap<&EntityKey, Vec<EntityKey>>,
) -> EntityKey {
    let mut seen = BTreeSet::new();
    let mut current = start;
    loop {
        if !seen.insert(current) {
            return current.clone();
        }
        match parents_of[current].iter().find(|p| unresolved.contains(p)) {
            Some(next) => current = next,
            None => return current.clone(),
        }
    }
}
