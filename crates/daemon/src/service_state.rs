use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use url::Url;

use common::capability::{CapabilityAuthority, CapabilityError};
use common::custody::Custody;
use object_store::{EncryptedStore, StoreError};

use super::database::{Database, DatabaseSetupError};
use super::service_config::Config;

/// Limits applied to uploads before they reach custody
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Largest accepted file, in bytes
    pub max_bytes: usize,
    /// Accepted content types; empty accepts any
    pub allowed_content_types: Vec<String>,
}

impl UploadPolicy {
    pub fn allows_size(&self, size: usize) -> bool {
        size <= self.max_bytes
    }

    pub fn allows_content_type(&self, content_type: &str) -> bool {
        self.allowed_content_types.is_empty()
            || self
                .allowed_content_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

/// Main service state, shared by every request handler
#[derive(Clone)]
pub struct State {
    database: Database,
    custody: Custody<Database>,
    upload_policy: Arc<UploadPolicy>,
    shutdown: CancellationToken,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Setup database
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                // check that the path exists
                if !path.exists() {
                    return Err(StateSetupError::DatabasePathDoesNotExist);
                }
                // parse the path into a URL
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        // 2. Setup encrypted blob store
        let store = EncryptedStore::new(config.storage_dir.clone()).await?;
        tracing::info!(root = ?store.root(), "encrypted store ready");

        // 3. Setup the credential authority
        let authority = CapabilityAuthority::new(config.signing_secret.clone(), config.token_ttl)?;

        Ok(Self::new(
            database.clone(),
            Custody::new(database, store, authority),
            UploadPolicy {
                max_bytes: config.max_upload_bytes,
                allowed_content_types: config.allowed_content_types.clone(),
            },
        ))
    }

    pub fn new(database: Database, custody: Custody<Database>, upload_policy: UploadPolicy) -> Self {
        Self {
            database,
            custody,
            upload_policy: Arc::new(upload_policy),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn custody(&self) -> &Custody<Database> {
        &self.custody
    }

    pub fn upload_policy(&self) -> &UploadPolicy {
        &self.upload_policy
    }

    /// Token for a single request; cancelled once the service shuts down
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
    #[error("Storage setup error: {0}")]
    Storage(#[from] StoreError),
    #[error("Credential authority setup error: {0}")]
    Authority(#[from] CapabilityError),
}
