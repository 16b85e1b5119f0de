use std::fs;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::time::Duration;

use common::crypto::SigningSecret;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "custody";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "db.sqlite";
pub const SIGNING_KEY_FILE_NAME: &str = "signing.key";
pub const UPLOADS_DIR_NAME: &str = "uploads";

const SIGNING_KEY_MODE: u32 = 0o600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the API server
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Lifetime of issued capability tokens, in minutes
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: u64,
    /// Largest accepted upload, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
    /// Root for encrypted blobs (defaults to <custody dir>/uploads)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    /// Content types accepted on upload; empty accepts any
    #[serde(default)]
    pub allowed_content_types: Vec<String>,
    /// Origins allowed by CORS; empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_api_port() -> u16 {
    8080
}

fn default_token_ttl_minutes() -> u64 {
    15
}

fn default_max_upload_mb() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            token_ttl_minutes: default_token_ttl_minutes(),
            max_upload_mb: default_max_upload_mb(),
            storage_dir: None,
            allowed_content_types: Vec::new(),
            cors_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_minutes.saturating_mul(60))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the custody directory (~/.custody)
    pub custody_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the base64 signing key
    pub signing_key_path: PathBuf,
    /// Root for encrypted blobs
    pub storage_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the custody directory path (custom or default ~/.custody)
    pub fn custody_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new custody state directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let custody_dir = Self::custody_dir(custom_path)?;

        if custody_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&custody_dir)?;

        // Create config (use provided or default)
        let config = config.unwrap_or_default();
        let config_path = custody_dir.join(CONFIG_FILE_NAME);
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        let storage_dir = Self::resolve_storage_dir(&custody_dir, &config);
        fs::create_dir_all(&storage_dir)?;

        // Generate the signing key, readable by the owner only
        let secret =
            SigningSecret::generate().map_err(|e| StateError::InvalidSigningKey(e.to_string()))?;
        let signing_key_path = custody_dir.join(SIGNING_KEY_FILE_NAME);
        let mut key_file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(SIGNING_KEY_MODE)
            .open(&signing_key_path)?;
        key_file.write_all(secret.to_base64().as_bytes())?;

        // Create empty database (just touch the file, it will be initialized by the service)
        let db_path = custody_dir.join(DB_FILE_NAME);
        fs::write(&db_path, "")?;

        Ok(Self {
            custody_dir,
            db_path,
            signing_key_path,
            storage_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the custody directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let custody_dir = Self::custody_dir(custom_path)?;

        if !custody_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let db_path = custody_dir.join(DB_FILE_NAME);
        let signing_key_path = custody_dir.join(SIGNING_KEY_FILE_NAME);
        let config_path = custody_dir.join(CONFIG_FILE_NAME);

        if !db_path.exists() {
            return Err(StateError::MissingFile(DB_FILE_NAME.to_string()));
        }
        if !signing_key_path.exists() {
            return Err(StateError::MissingFile(SIGNING_KEY_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;
        let storage_dir = Self::resolve_storage_dir(&custody_dir, &config);

        Ok(Self {
            custody_dir,
            db_path,
            signing_key_path,
            storage_dir,
            config_path,
            config,
        })
    }

    /// Load the signing secret from the key file
    pub fn load_signing_secret(&self) -> Result<SigningSecret, StateError> {
        let encoded = fs::read_to_string(&self.signing_key_path)?;
        SigningSecret::from_base64(&encoded).map_err(|e| StateError::InvalidSigningKey(e.to_string()))
    }

    fn resolve_storage_dir(custody_dir: &std::path::Path, config: &AppConfig) -> PathBuf {
        config
            .storage_dir
            .clone()
            .unwrap_or_else(|| custody_dir.join(UPLOADS_DIR_NAME))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("custody directory not initialized. Run 'custody init' first")]
    NotInitialized,

    #[error("custody directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid signing key: {0}")]
    InvalidSigningKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    #[test]
    fn test_init_then_load() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("custody");

        let created = AppState::init(Some(dir.clone()), None).unwrap();
        assert!(created.storage_dir.is_dir());
        assert_eq!(created.storage_dir, dir.join(UPLOADS_DIR_NAME));

        let loaded = AppState::load(Some(dir)).unwrap();
        assert_eq!(loaded.config, AppConfig::default());

        let secret = loaded.load_signing_secret().unwrap();
        assert_eq!(secret, created.load_signing_secret().unwrap());
    }

    #[test]
    fn test_signing_key_is_owner_only() {
        let temp = tempfile::tempdir().unwrap();
        let state = AppState::init(Some(temp.path().join("custody")), None).unwrap();

        let mode = fs::metadata(&state.signing_key_path)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_init_twice_fails() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("custody");

        AppState::init(Some(dir.clone()), None).unwrap();
        assert!(matches!(
            AppState::init(Some(dir), None),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_load_uninitialized() {
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(temp.path().join("nope"))),
            Err(StateError::NotInitialized)
        ));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("api_port = 9000\n").unwrap();
        assert_eq!(config.api_port, 9000);
        assert_eq!(config.token_ttl(), Duration::from_secs(15 * 60));
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
        assert!(config.allowed_content_types.is_empty());
        assert!(config.storage_dir.is_none());
    }
}
