use std::fmt;

use serde::{Deserialize, Serialize};

/// Fully-qualified identity of a definition: `(extension, kind, key)`.
///
/// Ordered lexicographically by extension, then kind, then key. All
/// resolution passes iterate in this order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub extension: String,
    pub kind: String,
    pub key: String,
}

impl EntityKey {
    pub fn new(
        extension: impl Into<String>,
        kind: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            extension: extension.into(),
            kind: kind.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.extension, self.kind, self.key)
    }
}
