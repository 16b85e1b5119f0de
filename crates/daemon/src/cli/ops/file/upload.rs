use std::path::PathBuf;

use clap::Args;
use custody_daemon::http_server::api::client::ApiError;
use custody_daemon::http_server::api::v0::files::{UploadRequest, UploadResponse};

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// File to upload
    #[arg(long)]
    pub path: PathBuf,

    /// Owner to record the file under
    #[arg(long)]
    pub owner_id: Option<String>,

    /// Content type to declare (guessed from the file name if omitted)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Name to store instead of the file's own name
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FileUploadError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("cannot derive a file name from {0}; pass --name")]
    NoFileName(PathBuf),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = FileUploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let file_name = match &self.name {
            Some(name) => name.clone(),
            None => self
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| FileUploadError::NoFileName(self.path.clone()))?,
        };

        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FileUploadError::Read(self.path.clone(), e))?;

        let request = UploadRequest {
            file_name,
            content,
            content_type: self.content_type.clone(),
            owner_id: self.owner_id.clone(),
        };
        let response: UploadResponse = ctx.client.call(request).await?;

        Ok(format!(
            "Uploaded {} ({} bytes, {})\n\
             File ID: {}\n\
             Token (expires in {}s):\n{}",
            self.path.display(),
            response.size_bytes,
            response.content_type,
            response.file_id,
            response.expires_in,
            response.token
        ))
    }
}
