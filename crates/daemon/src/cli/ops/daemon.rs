use clap::Args;

use common::crypto::SigningSecret;
use custody_daemon::state::AppState;
use custody_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Base64 signing secret, overriding the signing.key file
    #[arg(long, env = "CUSTODY_SIGNING_SECRET", hide_env_values = true)]
    pub signing_secret: Option<String>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] custody_daemon::state::StateError),

    #[error("invalid signing secret: {0}")]
    SigningSecret(String),

    #[error("daemon failed: {0:#}")]
    Failed(#[source] anyhow::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;

        let signing_secret = match &self.signing_secret {
            Some(encoded) => SigningSecret::from_base64(encoded)
                .map_err(|e| DaemonError::SigningSecret(e.to_string()))?,
            None => state.load_signing_secret()?,
        };

        let config = ServiceConfig {
            api_port: self.api_port.unwrap_or(state.config.api_port),
            cors_origins: state.config.cors_origins.clone(),
            sqlite_path: Some(state.db_path.clone()),
            storage_dir: state.storage_dir.clone(),
            signing_secret,
            token_ttl: state.config.token_ttl(),
            max_upload_bytes: state.config.max_upload_bytes(),
            allowed_content_types: state.config.allowed_content_types.clone(),
            log_level: tracing::Level::INFO,
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await.map_err(DaemonError::Failed)?;
        Ok("daemon ended".to_string())
    }
}
