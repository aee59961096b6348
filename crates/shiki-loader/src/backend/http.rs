//! HTTP backend for batched lookups.

use async_trait::async_trait;
use shiki_domain::{BatchPlan, LoaderError, LoaderResult};
use tracing::debug;
use url::Url;

use super::{BatchResponse, ResourceBackend, TransportError};

/// Path of the batched lookup endpoint, relative to the base URL.
pub const API_PATH: &str = "api/shiki_editor";

/// Backend issuing one `GET <base>/<path>?kind=id1,id2&...` per batch.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBackend {
    /// Creates a backend for the endpoint at `api_path` below `base_url`.
    ///
    /// The path is appended to the base URL as written, so a base URL with a
    /// path prefix keeps it.
    pub fn new(client: reqwest::Client, base_url: &Url, api_path: &str) -> LoaderResult<Self> {
        let raw = format!(
            "{}/{}",
            base_url.as_str().trim_end_matches('/'),
            api_path.trim_start_matches('/')
        );
        let endpoint = Url::parse(&raw).map_err(|err| LoaderError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, plan: &BatchPlan) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(plan.query_pairs());
        url
    }
}

#[async_trait]
impl ResourceBackend for HttpBackend {
    async fn fetch_batch(&self, plan: &BatchPlan) -> Result<BatchResponse, TransportError> {
        let url = self.request_url(plan);
        debug!(ids = plan.len(), %url, "Requesting batch");

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<BatchResponse>()
            .await?;

        debug!(answered = response.len(), "Batch answered");
        Ok(response)
    }
}
