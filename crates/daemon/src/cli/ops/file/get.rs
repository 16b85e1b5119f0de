use std::path::PathBuf;

use clap::Args;
use custody_daemon::http_server::api::client::ApiError;
use custody_daemon::http_server::api::v0::files::DownloadRequest;
use uuid::Uuid;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// ID of the file
    #[arg(long)]
    pub file_id: Uuid,

    /// Token issued when the file was uploaded
    #[arg(long, env = "CUSTODY_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Write the content here instead of printing it
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum FileGetError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = FileGetError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let download = ctx
            .client
            .download(DownloadRequest {
                file_id: self.file_id,
                token: self.token.clone(),
            })
            .await?;

        let name = download.filename.as_deref().unwrap_or("file");
        let content_type = download.content_type.as_deref().unwrap_or("unknown");

        if let Some(output) = &self.output {
            tokio::fs::write(output, &download.content)
                .await
                .map_err(|e| FileGetError::Write(output.clone(), e))?;
            return Ok(format!(
                "Wrote {} ({} bytes, {}) to {}",
                name,
                download.content.len(),
                content_type,
                output.display()
            ));
        }

        match String::from_utf8(download.content) {
            Ok(text) => Ok(text),
            Err(e) => Ok(format!(
                "{} is binary ({} bytes, {}); use --output to save it",
                name,
                e.as_bytes().len(),
                content_type
            )),
        }
    }
}
