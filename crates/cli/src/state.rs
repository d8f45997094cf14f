use std::{fs, path::PathBuf};

use common::prelude::Registry;

use crate::config::AppConfig;
use crate::users::UserDirectory;

pub const APP_NAME: &str = "vendo";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const REGISTRY_FILE_NAME: &str = "registry.json";
pub const USERS_FILE_NAME: &str = "users.json";

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the vendo directory (~/.vendo)
    pub vendo_dir: PathBuf,
    /// Path to the bucket registry snapshot
    pub registry_path: PathBuf,
    /// Path to the user directory
    pub users_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the vendo directory path (custom or default ~/.vendo)
    pub fn vendo_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Check if the vendo directory exists
    #[allow(dead_code)]
    pub fn exists(custom_path: Option<PathBuf>) -> Result<bool, StateError> {
        let vendo_dir = Self::vendo_dir(custom_path)?;
        Ok(vendo_dir.exists())
    }

    /// Initialize a new vendo state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let vendo_dir = Self::vendo_dir(custom_path)?;

        if vendo_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&vendo_dir)?;

        // Create config (use provided or default)
        let config = config.unwrap_or_default();
        let config_path = vendo_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        // Empty registry, so the first command finds a well-formed snapshot
        let registry_path = vendo_dir.join(REGISTRY_FILE_NAME);
        fs::write(&registry_path, serde_json::to_vec_pretty(&Registry::new())?)?;

        let users_path = vendo_dir.join(USERS_FILE_NAME);
        fs::write(&users_path, serde_json::to_vec_pretty(&UserDirectory::default())?)?;

        Ok(Self {
            vendo_dir,
            registry_path,
            users_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the vendo directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let vendo_dir = Self::vendo_dir(custom_path)?;

        if !vendo_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let registry_path = vendo_dir.join(REGISTRY_FILE_NAME);
        let users_path = vendo_dir.join(USERS_FILE_NAME);
        let config_path = vendo_dir.join(CONFIG_FILE_NAME);

        // Verify all required files exist
        if !registry_path.exists() {
            return Err(StateError::MissingFile(REGISTRY_FILE_NAME.to_string()));
        }
        if !users_path.exists() {
            return Err(StateError::MissingFile(USERS_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            vendo_dir,
            registry_path,
            users_path,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("vendo directory not initialized. Run 'vendo init' first")]
    NotInitialized,

    #[error("vendo directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch_dir() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let vendo_dir = temp.path().join("vendo");
        (temp, vendo_dir)
    }

    #[test]
    fn test_init_then_load() {
        let (_temp, vendo_dir) = scratch_dir();

        let state = AppState::init(Some(vendo_dir.clone()), None).unwrap();
        assert!(state.config_path.exists());
        assert!(state.registry_path.exists());
        assert!(state.users_path.exists());

        let loaded = AppState::load(Some(vendo_dir)).unwrap();
        assert!(loaded.config.admins.is_empty());
        assert_eq!(loaded.registry_path, state.registry_path);
    }

    #[test]
    fn test_init_twice_fails() {
        let (_temp, vendo_dir) = scratch_dir();

        AppState::init(Some(vendo_dir.clone()), None).unwrap();
        let result = AppState::init(Some(vendo_dir), None);
        assert!(matches!(result, Err(StateError::AlreadyInitialized)));
    }

    #[test]
    fn test_load_without_init_fails() {
        let (_temp, vendo_dir) = scratch_dir();

        let result = AppState::load(Some(vendo_dir));
        assert!(matches!(result, Err(StateError::NotInitialized)));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let (_temp, vendo_dir) = scratch_dir();

        let state = AppState::init(Some(vendo_dir.clone()), None).unwrap();
        fs::remove_file(&state.users_path).unwrap();

        let result = AppState::load(Some(vendo_dir));
        match result {
            Err(StateError::MissingFile(name)) => assert_eq!(name, USERS_FILE_NAME),
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn test_init_persists_custom_config() {
        let (_temp, vendo_dir) = scratch_dir();

        let config = AppConfig {
            admins: vec!["mona".to_string()],
            ..AppConfig::default()
        };
        AppState::init(Some(vendo_dir.clone()), Some(config)).unwrap();

        let loaded = AppState::load(Some(vendo_dir)).unwrap();
        assert_eq!(loaded.config.admins, vec!["mona".to_string()]);
    }
}
