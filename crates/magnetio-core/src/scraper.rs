//! High-level stream lookup API
//!
//! Combines the metadata resolver, HTTP client and site searchers into
//! one entry point: resolve the title, fan out to every source at once,
//! collect whatever succeeded, and post-process the pile.

use futures::future::join_all;
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::client::{ClientConfig, HttpClient};
use crate::error::Result;
use crate::metadata::MetadataResolver;
use crate::sources::{search_source, SiteProfile};
use crate::types::{CandidateStream, MediaQuery, UserConfig};

/// Configuration for the scraper
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// API key for the OMDB metadata service
    pub api_key: String,
    /// Base URL of the metadata service (override for tests)
    pub metadata_base_url: Option<String>,
    /// HTTP client tuning
    pub client: ClientConfig,
}

impl ScraperConfig {
    /// Default configuration with the given metadata API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            metadata_base_url: None,
            client: ClientConfig::default(),
        }
    }
}

/// Multi-source torrent stream scraper
///
/// Construct one per process and share it: the rate-limiter windows and
/// the metadata cache live inside and must be common to all requests.
pub struct TorrentScraper {
    client: HttpClient,
    resolver: MetadataResolver,
    sources: Vec<SiteProfile>,
}

impl TorrentScraper {
    /// Create a scraper over the built-in site roster
    pub fn new(config: ScraperConfig) -> Result<Self> {
        Self::with_sources(config, SiteProfile::defaults())
    }

    /// Create a scraper over a custom site roster (for tests)
    pub fn with_sources(config: ScraperConfig, sources: Vec<SiteProfile>) -> Result<Self> {
        let client = HttpClient::with_config(config.client)?;
        let resolver = match &config.metadata_base_url {
            Some(base) => MetadataResolver::with_base_url(&config.api_key, base)?,
            None => MetadataResolver::new(&config.api_key)?,
        };
        Ok(Self {
            client,
            resolver,
            sources,
        })
    }

    /// Look up streams for one media query
    ///
    /// Never fails: an unresolvable id, or every source failing, yields an
    /// empty list. Sources run concurrently; each failure is logged and
    /// contributes nothing.
    pub async fn find_streams(
        &self,
        query: &MediaQuery,
        user_config: &UserConfig,
    ) -> Vec<CandidateStream> {
        info!(id = %query.external_id, "Looking up streams");

        let metadata = self.resolver.resolve(&query.external_id).await;
        if !metadata.found {
            info!(id = %query.external_id, "No metadata, returning no streams");
            return Vec::new();
        }
        info!(title = %metadata.title, year = %metadata.year, "Resolved metadata");

        let searches = self.sources.iter().map(|profile| {
            let metadata = &metadata;
            async move {
                (
                    profile.name,
                    search_source(profile, &self.client, metadata, query).await,
                )
            }
        });

        let mut collected = Vec::new();
        for (source, result) in join_all(searches).await {
            match result {
                Ok(streams) => collected.extend(streams),
                Err(e) => warn!(source, error = %e, "Source search failed"),
            }
        }

        let streams = aggregate(collected, user_config);
        info!(count = streams.len(), "Stream lookup done");
        streams
    }

    /// The metadata resolver (for cache inspection in tests)
    pub fn resolver(&self) -> &MetadataResolver {
        &self.resolver
    }

    /// The HTTP client shared by all sources
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scraper_creation() {
        let scraper = TorrentScraper::new(ScraperConfig::new("test-key"));
        assert!(scraper.is_ok());
    }

    #[test]
    fn test_scraper_with_empty_roster() {
        let scraper = TorrentScraper::with_sources(ScraperConfig::new("test-key"), Vec::new());
        assert!(scraper.is_ok());
    }

    #[test]
    fn test_scraper_config_defaults() {
        let config = ScraperConfig::new("key");
        assert_eq!(config.api_key, "key");
        assert!(config.metadata_base_url.is_none());
        assert_eq!(config.client.timeout_secs, 15);
    }
}
