use clap::{Args, Subcommand};

pub mod get;
pub mod info;
pub mod ls;
pub mod rm;
pub mod upload;

use crate::cli::op::Op;
use custody_daemon::http_server::api::v0::files::{DeleteRequest, ListRequest, MetadataRequest};

crate::command_enum! {
    (Upload, upload::Upload),
    (Get, get::Get),
    (Info, MetadataRequest),
    (Rm, DeleteRequest),
    (Ls, ListRequest),
}

pub type FileCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct File {
    #[command(subcommand)]
    pub command: FileCommand,
}

#[async_trait::async_trait]
impl Op for File {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
