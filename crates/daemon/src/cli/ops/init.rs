use std::path::PathBuf;

use clap::Args;

use custody_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port
    #[arg(long, default_value_t = 8080)]
    pub api_port: u16,

    /// Lifetime of issued tokens, in minutes
    #[arg(long, default_value_t = 15)]
    pub token_ttl_minutes: u64,

    /// Largest accepted upload, in megabytes
    #[arg(long, default_value_t = 10)]
    pub max_upload_mb: usize,

    /// Root for encrypted blobs (defaults to <config dir>/uploads)
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    /// Content type accepted on upload; repeat to allow several (default: any)
    #[arg(long = "allow-content-type")]
    pub allowed_content_types: Vec<String>,

    /// Origin allowed by CORS; repeat to allow several (default: any)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            api_port: self.api_port,
            token_ttl_minutes: self.token_ttl_minutes,
            max_upload_mb: self.max_upload_mb,
            storage_dir: self.storage_dir.clone(),
            allowed_content_types: self.allowed_content_types.clone(),
            cors_origins: self.cors_origins.clone(),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let allowed = if state.config.allowed_content_types.is_empty() {
            "any".to_string()
        } else {
            state.config.allowed_content_types.join(", ")
        };

        Ok(format!(
            "Initialized custody directory at: {}\n\
             - Database: {}\n\
             - Signing key: {}\n\
             - Storage: {}\n\
             - Config: {}\n\
             - API port: {}\n\
             - Token TTL: {} minutes\n\
             - Max upload: {} MB\n\
             - Allowed content types: {}",
            state.custody_dir.display(),
            state.db_path.display(),
            state.signing_key_path.display(),
            state.storage_dir.display(),
            state.config_path.display(),
            state.config.api_port,
            state.config.token_ttl_minutes,
            state.config.max_upload_mb,
            allowed
        ))
    }
}
