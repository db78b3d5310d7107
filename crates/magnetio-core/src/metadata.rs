//! Metadata resolution against the OMDB API
//!
//! Resolves an external id (IMDB-style `tt...`) to a title and year.
//! Positive answers are cached for the process lifetime; negative answers
//! and transport failures are not cached, so a persistently unknown id
//! re-hits the network on every lookup.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{MagnetioError, Result};
use crate::types::Metadata;

const DEFAULT_BASE_URL: &str = "http://www.omdbapi.com";
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// OMDB wire response, only the fields the pipeline needs
#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Response")]
    response: Option<String>,
}

/// Cached lookup of title/year by external identifier
///
/// The cache is owned by the resolver and guarded by a mutex; construct
/// one resolver at process start and share it across requests.
pub struct MetadataResolver {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    cache: Mutex<HashMap<String, Metadata>>,
}

impl MetadataResolver {
    /// Create a resolver talking to the real OMDB endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a resolver with a custom endpoint (for tests)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(METADATA_TIMEOUT)
            .build()
            .map_err(MagnetioError::Http)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Resolve an external id to title/year metadata
    ///
    /// Never fails: any transport error or negative API answer yields the
    /// not-found sentinel.
    pub async fn resolve(&self, external_id: &str) -> Metadata {
        {
            let cache = self.cache.lock().await;
            if let Some(cached) = cache.get(external_id) {
                debug!(external_id, "Metadata cache hit");
                return cached.clone();
            }
        }

        match self.lookup(external_id).await {
            Ok(metadata) => {
                let mut cache = self.cache.lock().await;
                cache.insert(external_id.to_string(), metadata.clone());
                metadata
            }
            Err(e) => {
                warn!(external_id, error = %e, "Metadata lookup failed");
                Metadata::not_found()
            }
        }
    }

    /// Single network lookup, errors on transport failure or negative answer
    async fn lookup(&self, external_id: &str) -> Result<Metadata> {
        let url = format!(
            "{}/?i={}&apikey={}",
            self.base_url,
            urlencoding::encode(external_id),
            self.api_key
        );

        let response: OmdbResponse = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(MagnetioError::Http)?
            .error_for_status()
            .map_err(MagnetioError::Http)?
            .json()
            .await
            .map_err(MagnetioError::Http)?;

        if response.response.as_deref() != Some("True") {
            return Err(MagnetioError::MetadataNotFound(external_id.to_string()));
        }

        match response.title {
            Some(title) if !title.is_empty() => Ok(Metadata {
                title,
                year: response.year.unwrap_or_default(),
                found: true,
            }),
            _ => Err(MagnetioError::MetadataNotFound(external_id.to_string())),
        }
    }

    /// Number of cached entries (for tests)
    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Drop all cached entries (for tests)
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }
}
