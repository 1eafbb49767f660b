use crate::id::EntityKey;

/// Errors raised while resolving definitions. All of them are fatal to a
/// load: no partially resolved data escapes a failing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A reference string did not split into one to three non-empty segments.
    #[error("malformed reference '{reference}'{}", at(.referenced_by))]
    MalformedReference {
        reference: String,
        referenced_by: Option<EntityKey>,
    },

    /// A reference named an extension that was never loaded.
    #[error("unknown extension '{extension}'{}", at(.referenced_by))]
    UnknownExtension {
        extension: String,
        referenced_by: Option<EntityKey>,
    },

    /// The extension exists but has no abstracts of the given kind.
    #[error("unknown kind '{kind}' in extension '{extension}'{}", at(.referenced_by))]
    UnknownKind {
        extension: String,
        kind: String,
        referenced_by: Option<EntityKey>,
    },

    /// The extension and kind exist but the key does not.
    #[error("unknown abstract '{target}'{}", at(.referenced_by))]
    UnknownAbstractKey {
        target: EntityKey,
        referenced_by: Option<EntityKey>,
    },

    /// A resolution pass made no progress. `remaining` holds every entry
    /// that could not be resolved, sorted.
    #[error("unresolvable abstract '{entry}': cycle among [{}]", join(.remaining))]
    UnresolvableCycle {
        entry: EntityKey,
        remaining: Vec<EntityKey>,
    },

    /// The class resolver rejected a class path.
    #[error("class '{path}' (kind '{kind}') could not be resolved for '{entry}'")]
    ClassResolution {
        kind: String,
        path: String,
        entry: EntityKey,
    },

    /// No class path was given and no default exists for the kind.
    #[error("no class given for '{entry}' and no default class for kind '{kind}'")]
    MissingDefaultClass { kind: String, entry: EntityKey },

    /// A reserved field holds a value of the wrong shape.
    #[error("invalid '{field}' field in '{entry}': {detail}")]
    InvalidField {
        entry: EntityKey,
        field: &'static str,
        detail: String,
    },

    /// Exits were declared for a room the instance does not define.
    #[error(
        "exits declared for unknown room '{room_kind}/{room}' in instance '{extension}/{instance}'"
    )]
    UnknownRoom {
        extension: String,
        instance: String,
        room_kind: String,
        room: String,
    },

    /// An entry inside an instance failed. `room` is the owning room
    /// (`kind/key`) when the entry is an exit.
    #[error("in instance '{extension}/{instance}'{}: {source}", in_room(.room))]
    InInstance {
        extension: String,
        instance: String,
        room: Option<String>,
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    /// Attach the referencing entry to a lookup error that lacks one.
    pub fn referenced_by(mut self, entry: &EntityKey) -> Self {
        match &mut self {
            ResolveError::MalformedReference { referenced_by, .. }
            | ResolveError::UnknownExtension { referenced_by, .. }
            | ResolveError::UnknownKind { referenced_by, .. }
            | ResolveError::UnknownAbstractKey { referenced_by, .. } => {
                if referenced_by.is_none() {
                    *referenced_by = Some(entry.clone());
                }
            }
            _ => {}
        }
        self
    }

    /// Wrap this error with the instance (and owning room) it came from.
    pub fn in_instance(self, extension: &str, instance: &str, room: Option<String>) -> Self {
        ResolveError::InInstance {
            extension: extension.to_string(),
            instance: instance.to_string(),
            room,
            source: Box::new(self),
        }
    }

    /// The innermost error, below any instance context.
    pub fn root_cause(&self) -> &ResolveError {
        match self {
            ResolveError::InInstance { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

fn in_room(room: &Option<String>) -> String {
    match room {
        Some(room) => format!(", exit from room '{room}'"),
        None => String::new(),
    }
}

fn at(referenced_by: &Option<EntityKey>) -> String {
    match referenced_by {
        Some(entry) => format!(" (referenced by '{entry}')"),
        None => String::new(),
    }
}

fn join(keys: &[EntityKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
