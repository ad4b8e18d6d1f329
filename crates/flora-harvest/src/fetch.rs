//! Async HTTP fetcher wrapping reqwest.
//!
//! Plain GET requests with a fixed browser user-agent. No timeout, no
//! retries; redirects follow the client default.

use crate::types::{HarvestError, HarvestResult};

/// HTTP client shared by the resolver and the image downloads.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher that sends `user_agent` with every request.
    pub fn new(user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// GET `url` and return the body as text, whatever the status code.
    pub async fn get_text(&self, url: &str) -> HarvestResult<String> {
        let resp = self.client.get(url).send().await?;
        tracing::debug!("GET {url} -> {}", resp.status());
        Ok(resp.text().await?)
    }

    /// GET `url` and return the raw body. Non-2xx responses are errors.
    pub async fn get_bytes(&self, url: &str) -> HarvestResult<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        tracing::debug!("GET {url} -> {status}");

        if !status.is_success() {
            return Err(HarvestError::Download {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_USER_AGENT)
    }
}
