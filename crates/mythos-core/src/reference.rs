//! Short-form reference parsing.
//!
//! References are written relative to the entry that contains them:
//!
//! | form | result |
//! |---|---|
//! | `key` | `(default_extension, default_kind, key)` |
//! | `kind/key` | `(default_extension, kind, key)` |
//! | `extension/kind/key` | literal triple |

use crate::error::ResolveError;
use crate::id::EntityKey;

pub const SEPARATOR: char = '/';

/// Expand `reference` into a full [`EntityKey`] using the given defaults for
/// omitted leading segments.
pub fn resolve_reference(
    reference: &str,
    default_extension: &str,
    default_kind: &str,
) -> Result<EntityKey, ResolveError> {
    let segments: Vec<&str> = reference.split(SEPARATOR).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(malformed(reference));
    }
    match segments.as_slice() {
        [key] => Ok(EntityKey::new(default_extension, default_kind, *key)),
        [kind, key] => Ok(EntityKey::new(default_extension, *kind, *key)),
        [extension, kind, key] => Ok(EntityKey::new(*extension, *kind, *key)),
        _ => Err(malformed(reference)),
    }
}

/// Resolve a reference found inside `owner`, using the owner's extension and
/// kind as defaults and tagging any error with the owner.
pub fn resolve_relative(reference: &str, owner: &EntityKey) -> Result<EntityKey, ResolveError> {
    resolve_reference(reference, &owner.extension, &owner.kind).map_err(|e| e.referenced_by(owner))
}

fn malformed(reference: &str) -> ResolveError {
    ResolveError::MalformedReference {
        reference: reference.to_string(),
        referenced_by: None,
    }
}
