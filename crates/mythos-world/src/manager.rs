use std::path::Path;
use std::sync::Arc;

use mythos_core::DataMap;
use mythos_core::class::ClassResolver;

use crate::config::WorldConfig;
use crate::error::LoadError;
use crate::game_data::GameData;
use crate::pipeline::{NamedSource, load_game_data};

/// Owns the live [`GameData`] and replaces it on successful loads.
///
/// Readers take an `Arc` snapshot through [`GameDataManager::current`]; a
/// reload never mutates a snapshot that is already handed out, and a failed
/// reload leaves the previous data in place.
pub struct GameDataManager {
    config: WorldConfig,
    resolver: Box<dyn ClassResolver + Send + Sync>,
    current: Option<Arc<GameData>>,
}

impl GameDataManager {
    pub fn new(config: WorldConfig, resolver: impl ClassResolver + Send + Sync + 'static) -> Self {
        Self::with_boxed_resolver(config, Box::new(resolver))
    }

    pub fn with_boxed_resolver(
        config: WorldConfig,
        resolver: Box<dyn ClassResolver + Send + Sync>,
    ) -> Self {
        Self {
            config,
            resolver,
            current: None,
        }
    }

    /// Read a config file (or a directory holding `world.*`) and use the
    /// resolver it describes.
    pub fn from_config(path: &Path) -> Result<Self, LoadError> {
        let config = WorldConfig::open(path)?;
        let resolver = config.class_resolver();
        Ok(Self::with_boxed_resolver(config, resolver))
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Discover extensions and run the full pipeline. The new data replaces
    /// the current data only if every stage succeeds.
    pub fn load(&mut self) -> Result<Arc<GameData>, LoadError> {
        let roots = self.config.discover()?;
        let fs_sources: Vec<_> = roots.iter().map(|root| root.source()).collect();
        let sources: Vec<NamedSource<'_>> = roots
            .iter()
            .zip(&fs_sources)
            .map(|(root, source)| NamedSource::new(&root.name, source))
            .collect();

        let data = Arc::new(load_game_data(
            &sources,
            self.config.default_classes(),
            &*self.resolver,
        )?);
        self.current = Some(Arc::clone(&data));
        Ok(data)
    }

    /// Same as [`GameDataManager::load`]; named for call sites that already
    /// have data loaded.
    pub fn reload(&mut self) -> Result<Arc<GameData>, LoadError> {
        log::info!("reloading game data");
        self.load()
    }

    /// Snapshot of the live data, if any load has succeeded.
    pub fn current(&self) -> Option<Arc<GameData>> {
        self.current.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn get_abstract(
        &self,
        extension: &str,
        kind: &str,
        key: &str,
    ) -> Result<&DataMap, LoadError> {
        let data = self.current.as_ref().ok_or(LoadError::NotLoaded)?;
        Ok(data.get_abstract(extension, kind, key)?)
    }
}
