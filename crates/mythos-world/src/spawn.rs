//! Building live objects from an assembled instance.

use std::collections::BTreeMap;

use mythos_core::EntityKey;
use mythos_core::assemble::InstanceDefinition;
use mythos_core::class::Entity;

use crate::error::SpawnError;

/// An exit, linked to the room it leads to.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedExit {
    pub entity: Entity,
    pub destination: EntityKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedRoom {
    pub entity: Entity,
    /// Keyed by destination key as written in the content.
    pub exits: BTreeMap<String, SpawnedExit>,
}

/// Every live object of one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedInstance {
    pub instance: Entity,
    pub areas: Vec<Entity>,
    pub rooms: BTreeMap<EntityKey, SpawnedRoom>,
    pub gateways: Vec<Entity>,
}

impl SpawnedInstance {
    pub fn room(&self, key: &EntityKey) -> Option<&SpawnedRoom> {
        self.rooms.get(key)
    }
}

/// Instantiate an instance and everything in it through the bound classes.
///
/// Exit destinations are looked up among the instance's own rooms, either as
/// `kind/key` or as a bare key.
pub fn spawn_instance(definition: &InstanceDefinition) -> Result<SpawnedInstance, SpawnError> {
    let areas = definition
        .areas
        .values()
        .flat_map(|entries| entries.values())
        .map(|area| area.instantiate())
        .collect();
    let gateways = definition
        .gateways
        .values()
        .flat_map(|entries| entries.values())
        .map(|gateway| gateway.instantiate())
        .collect();

    let mut rooms = BTreeMap::new();
    for room in definition.rooms() {
        let mut exits = BTreeMap::new();
        for (destination, exit) in &room.exits {
            let target = definition.find_room(destination).ok_or_else(|| {
                SpawnError::UnknownDestination {
                    instance: format!("{}/{}", definition.extension, definition.name),
                    room: room.definition.key.to_string(),
                    destination: destination.clone(),
                }
            })?;
            exits.insert(
                destination.clone(),
                SpawnedExit {
                    entity: exit.instantiate(),
                    destination: target.definition.key.clone(),
                },
            );
        }
        rooms.insert(
            room.definition.key.clone(),
            SpawnedRoom {
                entity: room.definition.instantiate(),
                exits,
            },
        );
    }

    log::debug!(
        "spawned instance {}/{} with {} rooms",
        definition.extension,
        definition.name,
        rooms.len()
    );
    Ok(SpawnedInstance {
        instance: definition.instance.instantiate(),
        areas,
        rooms,
        gateways,
    })
}
