use std::path::PathBuf;

use mythos_core::ResolveError;
use mythos_data::DataLoadError;

/// Errors that abort a world load. A failed load never replaces data that
/// is already live.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A reference, inheritance or class binding failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A content or config file could not be read or parsed.
    #[error(transparent)]
    Data(#[from] DataLoadError),

    /// The configuration is readable but inconsistent.
    #[error("config error in {file}: {detail}")]
    Config { file: PathBuf, detail: String },

    /// No `world.{ron,toml,json}` exists in the directory.
    #[error("no world config found in {dir}")]
    MissingConfig { dir: PathBuf },

    /// Two extensions were registered under the same name.
    #[error("extension '{name}' is defined more than once ({first} and {second})")]
    DuplicateExtension {
        name: String,
        first: String,
        second: String,
    },

    /// A query needed loaded data but nothing has loaded yet.
    #[error("no game data is loaded")]
    NotLoaded,
}

/// Errors raised while building live objects from an instance definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    /// An exit points at a room the instance does not define.
    #[error("exit from '{room}' in instance '{instance}' leads to unknown room '{destination}'")]
    UnknownDestination {
        instance: String,
        room: String,
        destination: String,
    },
}
