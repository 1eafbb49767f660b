//! Assembly of concrete definitions from raw entries.
//!
//! A concrete entry (base, template, or anything inside an instance) may
//! name one `abstract` to inherit from and a `class` to bind to. Assembly is
//! a single pass against the already resolved [`AbstractIndex`]: concrete
//! entries never inherit from each other.

use std::collections::BTreeMap;

use crate::abstracts::AbstractIndex;
use crate::class::{ClassRef, ClassRegistry, Entity};
use crate::error::ResolveError;
use crate::extension::RawInstance;
use crate::id::EntityKey;
use crate::value::{ABSTRACT_FIELD, CLASS_FIELD, DataMap, KindMap, Value, optional_str, overlay};

/// Kind used for an instance's own entry.
pub const INSTANCE_KIND: &str = "instance";

/// Kind used for exits.
pub const EXIT_KIND: &str = "exits";

// ===========================================================================
// Resolved types
// ===========================================================================

/// A definition after abstract merging and class binding.
#[derive(Debug, Clone)]
pub struct ResolvedDefinition {
    pub key: EntityKey,
    pub class: ClassRef,
    /// Merged fields, without the reserved `abstract` and `class` fields.
    pub fields: DataMap,
}

impl ResolvedDefinition {
    pub fn class_path(&self) -> &str {
        self.class.path()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Build the live object through the bound class.
    pub fn instantiate(&self) -> Entity {
        self.class.instantiate(&self.key, &self.fields)
    }
}

impl PartialEq for ResolvedDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.class.path() == other.class.path()
            && self.fields == other.fields
    }
}

/// A room together with its exits, keyed by destination.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomDefinition {
    pub definition: ResolvedDefinition,
    /// Always present; empty when the room declares no exits.
    pub exits: BTreeMap<String, ResolvedDefinition>,
}

/// One fully assembled instance folder.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDefinition {
    pub extension: String,
    pub name: String,
    pub instance: ResolvedDefinition,
    pub areas: KindMap<ResolvedDefinition>,
    pub rooms: KindMap<RoomDefinition>,
    pub gateways: KindMap<ResolvedDefinition>,
}

impl InstanceDefinition {
    pub fn room(&self, kind: &str, key: &str) -> Option<&RoomDefinition> {
        self.rooms.get(kind)?.get(key)
    }

    /// Find a room by `kind/key`, or by bare key across all room kinds
    /// (first match in kind order).
    pub fn find_room(&self, reference: &str) -> Option<&RoomDefinition> {
        match reference.split_once('/') {
            Some((kind, key)) => self.room(kind, key),
            None => self.rooms.values().find_map(|rooms| rooms.get(reference)),
        }
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomDefinition> {
        self.rooms.values().flat_map(BTreeMap::values)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.values().map(BTreeMap::len).sum()
    }

    pub fn exit_count(&self) -> usize {
        self.rooms().map(|room| room.exits.len()).sum()
    }
}

// ===========================================================================
// Assembly
// ===========================================================================

/// Merge one raw entry against its declared abstract and bind its class.
///
/// The `abstract` reference resolves relative to `key`'s extension and kind;
/// the class default is looked up by `key.kind`.
pub fn resolve_definition(
    key: EntityKey,
    raw: &DataMap,
    abstracts: &AbstractIndex,
    registry: &mut ClassRegistry<'_>,
) -> Result<ResolvedDefinition, ResolveError> {
    let mut fields = match optional_str(raw, ABSTRACT_FIELD, &key)? {
        Some(reference) => abstracts.get_relative(reference, &key)?.clone(),
        None => DataMap::new(),
    };
    overlay(&mut fields, raw);
    fields.remove(ABSTRACT_FIELD);

    let class_path = optional_str(&fields, CLASS_FIELD, &key)?.map(str::to_string);
    fields.remove(CLASS_FIELD);
    let class = registry.get_class(&key.kind, class_path.as_deref(), &key)?;

    Ok(ResolvedDefinition { key, class, fields })
}

/// Resolve every entry of a kind -> key -> fields map.
pub fn resolve_kind_map(
    extension: &str,
    raw: &KindMap<DataMap>,
    abstracts: &AbstractIndex,
    registry: &mut ClassRegistry<'_>,
) -> Result<KindMap<ResolvedDefinition>, ResolveError> {
    let mut out = KindMap::new();
    for (kind, entries) in raw {
        let resolved = out.entry(kind.clone()).or_insert_with(BTreeMap::new);
        for (key, fields) in entries {
            let key_id = EntityKey::new(extension, kind, key);
            let definition = resolve_definition(key_id, fields, abstracts, registry)?;
            resolved.insert(key.clone(), definition);
        }
    }
    Ok(out)
}

/// Build one [`InstanceDefinition`] from a scanned instance folder.
///
/// Failures on entries inside the instance are wrapped in
/// [`ResolveError::InInstance`], naming the owning room for exits.
pub fn assemble_instance(
    extension: &str,
    name: &str,
    raw: &RawInstance,
    abstracts: &AbstractIndex,
    registry: &mut ClassRegistry<'_>,
) -> Result<InstanceDefinition, ResolveError> {
    let in_instance = |e: ResolveError| e.in_instance(extension, name, None);

    let instance = resolve_definition(
        EntityKey::new(extension, INSTANCE_KIND, name),
        &raw.fields,
        abstracts,
        registry,
    )
    .map_err(in_instance)?;
    let areas = resolve_kind_map(extension, &raw.areas, abstracts, registry).map_err(in_instance)?;
    let gateways =
        resolve_kind_map(extension, &raw.gateways, abstracts, registry).map_err(in_instance)?;
    let resolved_rooms =
        resolve_kind_map(extension, &raw.rooms, abstracts, registry).map_err(in_instance)?;

    let mut rooms: KindMap<RoomDefinition> = resolved_rooms
        .into_iter()
        .map(|(kind, entries)| {
            let entries = entries
                .into_iter()
                .map(|(key, definition)| {
                    let room = RoomDefinition {
                        definition,
                        exits: BTreeMap::new(),
                    };
                    (key, room)
                })
                .collect();
            (kind, entries)
        })
        .collect();

    for (room_kind, by_room) in &raw.exits {
        for (room_key, by_destination) in by_room {
            let room = rooms
                .get_mut(room_kind)
                .and_then(|entries| entries.get_mut(room_key))
                .ok_or_else(|| ResolveError::UnknownRoom {
                    extension: extension.to_string(),
                    instance: name.to_string(),
                    room_kind: room_kind.clone(),
                    room: room_key.clone(),
                })?;
            for (destination, fields) in by_destination {
                let exit = resolve_definition(
                    EntityKey::new(extension, EXIT_KIND, destination),
                    fields,
                    abstracts,
                    registry,
                )
                .map_err(|e| {
                    e.in_instance(extension, name, Some(format!("{room_kind}/{room_key}")))
                })?;
                room.exits.insert(destination.clone(), exit);
            }
        }
    }

    Ok(InstanceDefinition {
        extension: extension.to_string(),
        name: name.to_string(),
        instance,
        areas,
        rooms,
        gateways,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstracts::resolve_abstracts;
    use crate::class::DefaultClasses;
    use crate::test_utils::*;
    use serde_json::json;

    fn abstracts() -> AbstractIndex {
        let mut raw = BTreeMap::new();
        raw.insert(
            EntityKey::new("core", "rooms", "indoor"),
            fields(json!({"lit": true, "class": "world.rooms.Indoor"})),
        );
        raw.insert(
            EntityKey::new("core", "exits", "door"),
            fields(json!({"locked": false, "noun": "door"})),
        );
        raw.insert(
            EntityKey::new("core", "instance", "town"),
            fields(json!({"persistent": true})),
        );
        resolve_abstracts(["core"], &raw).unwrap()
    }

    fn raw_instance() -> RawInstance {
        let mut raw = RawInstance {
            fields: fields(json!({"abstract": "town", "title": "Millbrook"})),
            ..RawInstance::default()
        };
        raw.areas
            .entry("areas".into())
            .or_default()
            .insert("market".into(), fields(json!({"name": "Market"})));
        let rooms = raw.rooms.entry("rooms".into()).or_default();
        rooms.insert("square".into(), fields(json!({"abstract": "indoor", "lit": false})));
        rooms.insert("well".into(), fields(json!({"name": "Well"})));
        raw.gateways
            .entry("gateways".into())
            .or_default()
            .insert("north_road".into(), fields(json!({"to": "wilds"})));
        raw.exits
            .entry("rooms".into())
            .or_default()
            .entry("square".into())
            .or_default()
            .insert("well".into(), fields(json!({"abstract": "door", "locked": true})));
        raw
    }

    #[test]
    fn definition_merges_abstract_and_own_fields() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let def = resolve_definition(
            EntityKey::new("core", "rooms", "hall"),
            &fields(json!({"abstract": "indoor", "name": "Hall"})),
            &index,
            &mut registry,
        )
        .unwrap();
        assert_eq!(def.class_path(), "world.rooms.Indoor");
        assert_eq!(def.fields, fields(json!({"lit": true, "name": "Hall"})));
    }

    #[test]
    fn own_class_overrides_abstract_class() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let def = resolve_definition(
            EntityKey::new("core", "rooms", "hall"),
            &fields(json!({"abstract": "indoor", "class": "world.rooms.Hall"})),
            &index,
            &mut registry,
        )
        .unwrap();
        assert_eq!(def.class_path(), "world.rooms.Hall");
    }

    #[test]
    fn missing_class_uses_kind_default() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let def = resolve_definition(
            EntityKey::new("core", "rooms", "plain"),
            &DataMap::new(),
            &index,
            &mut registry,
        )
        .unwrap();
        assert_eq!(def.class_path(), ROOM_CLASS);
    }

    #[test]
    fn unknown_abstract_names_the_entry() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let owner = EntityKey::new("core", "rooms", "hall");
        let result = resolve_definition(
            owner.clone(),
            &fields(json!({"abstract": "outdoor"})),
            &index,
            &mut registry,
        );
        assert!(matches!(
            result,
            Err(ResolveError::UnknownAbstractKey { referenced_by: Some(ref by), .. })
                if *by == owner
        ));
    }

    #[test]
    fn rejected_class_fails() {
        let index = abstracts();
        let resolver = RecordingResolver::rejecting("Broken");
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let result = resolve_definition(
            EntityKey::new("core", "rooms", "hall"),
            &fields(json!({"class": "world.Broken"})),
            &index,
            &mut registry,
        );
        assert!(matches!(result, Err(ResolveError::ClassResolution { .. })));
    }

    #[test]
    fn instance_assembly_attaches_exits() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let def =
            assemble_instance("core", "millbrook", &raw_instance(), &index, &mut registry).unwrap();

        assert_eq!(def.instance.class_path(), INSTANCE_CLASS);
        assert_eq!(
            def.instance.fields,
            fields(json!({"persistent": true, "title": "Millbrook"}))
        );
        assert_eq!(def.areas["areas"]["market"].class_path(), AREA_CLASS);
        assert_eq!(def.gateways["gateways"]["north_road"].class_path(), GATEWAY_CLASS);

        let square = def.room("rooms", "square").unwrap();
        assert_eq!(square.definition.fields["lit"], json!(false));
        let exit = &square.exits["well"];
        assert_eq!(exit.class_path(), EXIT_CLASS);
        assert_eq!(exit.fields, fields(json!({"locked": true, "noun": "door"})));
        assert_eq!(def.exit_count(), 1);
    }

    #[test]
    fn rooms_without_exits_get_empty_exit_maps() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let def =
            assemble_instance("core", "millbrook", &raw_instance(), &index, &mut registry).unwrap();
        let well = def.find_room("well").unwrap();
        assert!(well.exits.is_empty());
        assert_eq!(def.room_count(), 2);
    }

    #[test]
    fn exits_for_unknown_room_fail() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let mut raw = raw_instance();
        raw.exits
            .entry("rooms".into())
            .or_default()
            .entry("attic".into())
            .or_default()
            .insert("well".into(), DataMap::new());
        let result = assemble_instance("core", "millbrook", &raw, &index, &mut registry);
        assert!(matches!(
            result,
            Err(ResolveError::UnknownRoom { ref room, .. }) if room == "attic"
        ));
    }

    #[test]
    fn exit_failures_name_instance_and_owning_room() {
        let index = abstracts();
        let resolver = RecordingResolver::rejecting("Cursed");
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let mut raw = raw_instance();
        raw.exits
            .entry("rooms".into())
            .or_default()
            .entry("well".into())
            .or_default()
            .insert("square".into(), fields(json!({"class": "world.Cursed"})));

        let err = assemble_instance("core", "crypt", &raw, &index, &mut registry).unwrap_err();
        match &err {
            ResolveError::InInstance {
                extension,
                instance,
                room,
                source,
            } => {
                assert_eq!(extension, "core");
                assert_eq!(instance, "crypt");
                assert_eq!(room.as_deref(), Some("rooms/well"));
                assert!(matches!(
                    source.as_ref(),
                    ResolveError::ClassResolution { path, .. } if path == "world.Cursed"
                ));
            }
            other => panic!("expected instance context, got {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("core/crypt"));
        assert!(msg.contains("rooms/well"));
    }

    #[test]
    fn room_failures_name_the_instance() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let mut raw = raw_instance();
        raw.rooms
            .entry("rooms".into())
            .or_default()
            .insert("vault".into(), fields(json!({"abstract": "outdoor"})));

        let err = assemble_instance("core", "abbey", &raw, &index, &mut registry).unwrap_err();
        assert!(matches!(
            &err,
            ResolveError::InInstance { instance, room: None, .. } if instance == "abbey"
        ));
        assert!(matches!(
            err.root_cause(),
            ResolveError::UnknownAbstractKey { referenced_by: Some(by), .. }
                if *by == EntityKey::new("core", "rooms", "vault")
        ));
    }

    #[test]
    fn empty_instance_needs_instance_default_class() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, DefaultClasses::new());
        let result =
            assemble_instance("core", "bare", &RawInstance::default(), &index, &mut registry);
        let err = result.unwrap_err();
        assert!(matches!(
            err.root_cause(),
            ResolveError::MissingDefaultClass { kind, .. } if kind == INSTANCE_KIND
        ));
    }

    #[test]
    fn find_room_accepts_kind_prefix() {
        let index = abstracts();
        let resolver = RecordingResolver::accepting_all();
        let mut registry = ClassRegistry::new(&resolver, default_classes());
        let def =
            assemble_instance("core", "millbrook", &raw_instance(), &index, &mut registry).unwrap();
        assert!(def.find_room("rooms/square").is_some());
        assert!(def.find_room("cellars/square").is_none());
        assert!(def.find_room("nowhere").is_none());
    }
}
