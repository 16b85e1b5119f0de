use std::path::PathBuf;
use std::time::Duration;

use common::crypto::SigningSecret;

/// Everything the service needs to start, resolved up front by the caller.
#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server
    pub api_port: u16,
    /// Origins allowed to make cross-origin requests; empty allows any
    pub cors_origins: Vec<String>,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,
    /// Root directory for encrypted blobs
    pub storage_dir: PathBuf,

    // custody configuration
    /// Secret that signs capability tokens
    pub signing_secret: SigningSecret,
    /// How long an issued capability token stays valid
    pub token_ttl: Duration,
    /// Largest accepted upload body
    pub max_upload_bytes: usize,
    /// Content types accepted on upload; empty accepts any
    pub allowed_content_types: Vec<String>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
