//! The load pipeline.
//!
//! Stages run strictly in order, each completing for every extension before
//! the next begins:
//!
//! 1. construct one [`Extension`] per source
//! 2. scan every extension's `abstracts/`
//! 3. resolve the union of all abstracts once
//! 4. scan and resolve every extension's base definitions
//! 5. scan and assemble every extension's instances
//! 6. scan and resolve every extension's templates

use std::collections::BTreeMap;

use mythos_core::abstracts::resolve_abstracts;
use mythos_core::class::{ClassRegistry, ClassResolver, DefaultClasses};
use mythos_core::extension::Extension;
use mythos_core::{DataMap, EntityKey};
use mythos_data::ContentSource;
use mythos_data::scanner::{scan_abstracts, scan_base, scan_instances, scan_templates};

use crate::error::LoadError;
use crate::game_data::GameData;

/// A content source registered under an extension name.
pub struct NamedSource<'a> {
    pub name: String,
    pub source: &'a dyn ContentSource,
}

impl<'a> NamedSource<'a> {
    pub fn new(name: impl Into<String>, source: &'a dyn ContentSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Run the full pipeline over `sources`, in the given order.
///
/// A fresh [`ClassRegistry`] is built over `resolver` and dropped when the
/// load finishes. Nothing is returned unless every stage succeeds.
pub fn load_game_data(
    sources: &[NamedSource<'_>],
    defaults: DefaultClasses,
    resolver: &dyn ClassResolver,
) -> Result<GameData, LoadError> {
    // 1. Extensions
    let mut extensions: Vec<Extension> = Vec::with_capacity(sources.len());
    for named in sources {
        if let Some(first) = extensions.iter().find(|e| e.name() == named.name) {
            return Err(LoadError::DuplicateExtension {
                name: named.name.clone(),
                first: first.location().to_string(),
                second: named.source.describe(),
            });
        }
        extensions.push(Extension::new(&named.name, named.source.describe()));
    }

    // 2. Abstracts (scan)
    for (extension, named) in extensions.iter_mut().zip(sources) {
        scan_abstracts(extension, named.source)?;
    }

    // 3. Abstracts (resolve, globally)
    let raw: BTreeMap<EntityKey, DataMap> = extensions
        .iter()
        .flat_map(|e| e.abstract_entries())
        .map(|(key, fields)| (key, fields.clone()))
        .collect();
    let index = resolve_abstracts(extensions.iter().map(Extension::name), &raw)?;
    for extension in &mut extensions {
        extension.adopt_abstracts(&index);
    }
    log::debug!("resolved {} abstracts", index.len());

    let mut registry = ClassRegistry::new(resolver, defaults);

    // 4. Base
    for (extension, named) in extensions.iter_mut().zip(sources) {
        scan_base(extension, named.source)?;
        extension.resolve_base(&index, &mut registry)?;
    }

    // 5. Instances
    for (extension, named) in extensions.iter_mut().zip(sources) {
        scan_instances(extension, named.source)?;
        extension.resolve_instances(&index, &mut registry)?;
    }

    // 6. Templates
    for (extension, named) in extensions.iter_mut().zip(sources) {
        scan_templates(extension, named.source)?;
        extension.resolve_templates(&index, &mut registry)?;
    }

    for extension in &extensions {
        log::debug!("{}", extension.summary());
    }
    let data = GameData::new(extensions, index);
    log::info!("{} ({} classes bound)", data.summary(), registry.cached());
    Ok(data)
}
