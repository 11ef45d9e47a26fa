//! Remote progress sync client.

use async_trait::async_trait;
use url::Url;

use storage::repository::{ProgressSync, StorageError, SyncUpdate};

/// Pushes progress updates to the remote sync endpoint.
///
/// Best effort by contract: callers log failures and move on, and no
/// retry happens here.
#[derive(Debug, Clone)]
pub struct HttpProgressSync {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpProgressSync {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ProgressSync for HttpProgressSync {
    async fn push(&self, update: &SyncUpdate) -> Result<(), StorageError> {
        let url = self
            .base_url
            .join("api/progress")
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .json(update)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Connection(format!(
                "progress sync returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
