//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::class::{ClassRef, ClassResolver, DefaultClasses, NamedClass};
use crate::id::EntityKey;
use crate::value::{DataMap, Value};

// ===========================================================================
// Field maps
// ===========================================================================

/// Unwrap a `json!({...})` literal into a [`DataMap`].
pub fn fields(value: Value) -> DataMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

// ===========================================================================
// Classes
// ===========================================================================

pub const OBJECT_CLASS: &str = "world.objects.Object";
pub const INSTANCE_CLASS: &str = "world.instances.Instance";
pub const AREA_CLASS: &str = "world.areas.Area";
pub const ROOM_CLASS: &str = "world.rooms.Room";
pub const GATEWAY_CLASS: &str = "world.gateways.Gateway";
pub const EXIT_CLASS: &str = "world.exits.Exit";

/// Defaults for the standard instance kinds plus an object fallback.
pub fn default_classes() -> DefaultClasses {
    DefaultClasses::new()
        .with_kind("instance", INSTANCE_CLASS)
        .with_kind("areas", AREA_CLASS)
        .with_kind("rooms", ROOM_CLASS)
        .with_kind("gateways", GATEWAY_CLASS)
        .with_kind("exits", EXIT_CLASS)
        .with_fallback(OBJECT_CLASS)
}

/// Resolver that counts calls and accepts every path, or only paths that do
/// not contain `reject`.
#[derive(Debug, Default)]
pub struct RecordingResolver {
    calls: AtomicUsize,
    reject: Option<String>,
}

impl RecordingResolver {
    pub fn accepting_all() -> Self {
        Self::default()
    }

    /// Reject every path containing `needle`.
    pub fn rejecting(needle: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reject: Some(needle.to_string()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ClassResolver for RecordingResolver {
    fn resolve(&self, _kind: &str, path: &str) -> Option<ClassRef> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match &self.reject {
            Some(needle) if path.contains(needle.as_str()) => None,
            _ => Some(NamedClass::shared(path)),
        }
    }
}

// ===========================================================================
// Generated hierarchies
// ===========================================================================

/// Build `width` independent inheritance chains of `depth` abstracts each in
/// extension `ext`, kind `mobs`. Link `n` inherits from link `n - 1` and
/// sets `level` plus its own `only_{n}` field.
///
/// Keys are zero-padded and count down along the chain (see [`chain_key`]),
/// so sorted key order runs against dependency order.
pub fn chain_hierarchy(ext: &str, width: usize, depth: usize) -> BTreeMap<EntityKey, DataMap> {
    let mut out = BTreeMap::new();
    for c in 0..width {
        for n in 0..depth {
            let mut map = DataMap::new();
            if n > 0 {
                map.insert(
                    "parents".into(),
                    Value::Array(vec![Value::String(chain_key(c, n - 1, depth))]),
                );
            }
            map.insert("level".into(), Value::from(n as u64));
            map.insert(format!("only_{n}"), Value::Bool(true));
            out.insert(EntityKey::new(ext, "mobs", chain_key(c, n, depth)), map);
        }
    }
    out
}

/// Key of link `n` in chain `c` of a [`chain_hierarchy`] of the given depth.
pub fn chain_key(c: usize, n: usize, depth: usize) -> String {
    format!("c{c:04}_{:04}", depth - 1 - n)
}
