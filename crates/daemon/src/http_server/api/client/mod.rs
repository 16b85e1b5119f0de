#[allow(clippy::module_inception)]
mod client;
mod error;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

pub use client::{ApiClient, FileDownload};
pub use error::ApiError;

/// A request the CLI can send to the daemon API.
///
/// Implemented next to the handler that serves it so the two stay in step.
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
