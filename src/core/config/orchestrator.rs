use crate::core::config::data::Config;
use crate::core::config::io::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

#[derive(Default)]
struct ConfigCacheState {
    config: Option<Config>,
    modified: Option<SystemTime>,
}

/// Serializes read-modify-write cycles on one config file and reloads it when
/// it changed on disk since the last read.
pub struct ConfigOrchestrator {
    path: PathBuf,
    state: Mutex<ConfigCacheState>,
}

impl ConfigOrchestrator {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: Mutex::new(ConfigCacheState::default()),
        }
    }

    /// Orchestrator for the platform config file.
    pub fn for_user() -> Result<Self, ConfigError> {
        Ok(Self::new(Config::get_config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn refresh(&self, state: &mut ConfigCacheState) -> Result<Config, ConfigError> {
        let disk_modified = Self::modified_time(&self.path);
        if state.config.is_none() || state.modified != disk_modified {
            let config = Config::load_from_path(&self.path)?;
            state.modified = disk_modified;
            state.config = Some(config);
        }
        Ok(state.config.clone().unwrap_or_default())
    }

    pub fn load_with_cache(&self) -> Result<Config, ConfigError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        self.refresh(&mut state)
    }

    /// Apply `mutator` to a fresh snapshot and persist the result. Nothing is
    /// written when the mutator fails.
    pub fn mutate<F, T, E>(&self, mutator: F) -> Result<T, E>
    where
        F: FnOnce(&mut Config) -> Result<T, E>,
        E: From<ConfigError>,
    {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut working = self.refresh(&mut state)?;
        let result = mutator(&mut working)?;
        working.save_to_path(&self.path)?;
        state.modified = Self::modified_time(&self.path);
        state.config = Some(working);
        Ok(result)
    }

    fn modified_time(path: &Path) -> Option<SystemTime> {
        fs::metadata(path).ok()?.modified().ok()
    }
}
