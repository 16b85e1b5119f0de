use custody_daemon::http_server::api::client::ApiError;
use custody_daemon::http_server::api::v0::files::{DeleteRequest, DeleteResponse};

#[derive(Debug, thiserror::Error)]
pub enum FileRmError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for DeleteRequest {
    type Error = FileRmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response: DeleteResponse = ctx.client.call(self.clone()).await?;
        Ok(format!("{}: {}", self.file_id, response.message))
    }
}
