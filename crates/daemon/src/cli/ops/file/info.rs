use custody_daemon::http_server::api::client::ApiError;
use custody_daemon::http_server::api::v0::files::{MetadataRequest, MetadataResponse};
use time::format_description::well_known::Rfc3339;

#[derive(Debug, thiserror::Error)]
pub enum FileInfoError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("invalid timestamp in response: {0}")]
    Timestamp(#[from] time::error::Format),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for MetadataRequest {
    type Error = FileInfoError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response: MetadataResponse = ctx.client.call(self.clone()).await?;

        let mut lines = vec![
            format!("File ID:      {}", response.file_id),
            format!("Name:         {}", response.original_name),
            format!("Content type: {}", response.content_type),
            format!("Size:         {} bytes", response.size_bytes),
            format!(
                "Encryption:   {}-{}",
                response.encryption_alg, response.authentication_alg
            ),
        ];
        if let Some(owner) = &response.owner_id {
            lines.push(format!("Owner:        {}", owner));
        }
        lines.push(format!("Created:      {}", response.created_at.format(&Rfc3339)?));
        lines.push(format!("Updated:      {}", response.updated_at.format(&Rfc3339)?));

        Ok(lines.join("\n"))
    }
}
