//! Loading and saving the configuration document.

use super::entities::ConfigurationEntity;
use super::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Storage for the configuration document.
pub trait ConfigurationDataAccess: Send + Sync {
    fn load_configuration(&self) -> Result<ConfigurationEntity, ConfigError>;

    fn save_configuration(&self, configuration: &ConfigurationEntity) -> Result<(), ConfigError>;
}

/// Keeps the configuration as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileDataAccess {
    path: PathBuf,
}

impl JsonFileDataAccess {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl ConfigurationDataAccess for JsonFileDataAccess {
    fn load_configuration(&self) -> Result<ConfigurationEntity, ConfigError> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| ConfigError::Io(self.path.clone(), e))?;
        let configuration: ConfigurationEntity = serde_json::from_str(&contents)?;
        info!(
            "Loaded configuration from {} ({} proxies)",
            self.path.display(),
            configuration.proxies.len()
        );
        Ok(configuration)
    }

    fn save_configuration(&self, configuration: &ConfigurationEntity) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
        }
        let contents = serde_json::to_string_pretty(configuration)?;
        fs::write(&self.path, contents).map_err(|e| ConfigError::Io(self.path.clone(), e))?;
        debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }
}
