use custody_daemon::http_server::api::client::ApiError;
use custody_daemon::http_server::api::v0::files::{ListRequest, ListResponse};
use time::format_description::well_known::Rfc3339;

#[derive(Debug, thiserror::Error)]
pub enum FileLsError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("invalid timestamp in response: {0}")]
    Timestamp(#[from] time::error::Format),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for ListRequest {
    type Error = FileLsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response: ListResponse = ctx.client.call(self.clone()).await?;

        if response.files.is_empty() {
            return Ok(format!("No files for owner {}", self.owner_id));
        }

        let mut lines = Vec::with_capacity(response.count + 1);
        lines.push(format!("{} file(s) for owner {}:", response.count, self.owner_id));
        for file in &response.files {
            lines.push(format!(
                "  {}  {:>10} B  {:<24}  {}  {}",
                file.file_id,
                file.size_bytes,
                file.content_type,
                file.created_at.format(&Rfc3339)?,
                file.original_name
            ));
        }

        Ok(lines.join("\n"))
    }
}
