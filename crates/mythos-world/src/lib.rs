//! World loading for Mythos content.
//!
//! Reads a world config, discovers extensions on disk, runs the resolution
//! pipeline and holds the result for readers.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mythos_world::GameDataManager;
//!
//! let mut mgr = GameDataManager::from_config("world.toml".as_ref())?;
//! let data = mgr.load()?;
//! let rat = data.get_abstract("core", "mobs", "rat")?;
//! for instance in data.instances() {
//!     let spawned = mythos_world::spawn_instance(instance)?;
//! }
//! ```

pub mod config;
pub mod error;
pub mod game_data;
pub mod manager;
pub mod pipeline;
pub mod spawn;

pub use config::{ExtensionEntry, ExtensionRoot, WorldConfig};
pub use error::{LoadError, SpawnError};
pub use game_data::{GameData, LoadSummary};
pub use manager::GameDataManager;
pub use pipeline::{NamedSource, load_game_data};
pub use spawn::{SpawnedExit, SpawnedInstance, SpawnedRoom, spawn_instance};
