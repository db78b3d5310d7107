//! Magnetio Core Library
//!
//! Aggregates torrent stream links for movies and series by scraping
//! multiple third-party search pages, then filtering, deduplicating and
//! ranking the results for a media-player addon.
//!
//! # Overview
//!
//! The pipeline is: resolve title/year metadata for an external id, fan
//! out concurrently to every configured source site (each one rate-limited
//! and fetched with retries), extract magnet links and metadata from the
//! result pages with cascading CSS-selector heuristics, then post-process
//! the collected candidates (filter, dedup on info-hash, sort, cap).
//!
//! Extraction is explicitly best-effort: pages are untrusted and may not
//! match any expected structure, in which case a source simply contributes
//! nothing. A stream lookup never fails, it only comes back empty.
//!
//! # Example
//!
//! ```no_run
//! use magnetio_core::{
//!     MediaQuery, MediaType, ScraperConfig, TorrentScraper, UserConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> magnetio_core::Result<()> {
//!     let scraper = TorrentScraper::new(ScraperConfig::new("omdb-api-key"))?;
//!
//!     let query = MediaQuery::parse(MediaType::Movie, "tt1375666").unwrap();
//!     let streams = scraper.find_streams(&query, &UserConfig::default()).await;
//!
//!     for stream in streams {
//!         println!("[{}] {} ({} seeds)", stream.quality, stream.title, stream.seed_count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregate;
mod client;
mod error;
pub mod extract;
mod metadata;
mod scraper;
pub mod sources;
mod types;

// Re-export client types
pub use client::{ClientConfig, HttpClient, RateLimiter};

// Re-export error types
pub use error::{MagnetioError, Result};

// Re-export metadata resolver
pub use metadata::MetadataResolver;

// Re-export the main scraper API
pub use scraper::{ScraperConfig, TorrentScraper};

// Re-export source searcher types
pub use sources::{search_source, EpisodeFormat, SiteProfile};

// Re-export data types
pub use types::{
    CandidateStream, MediaQuery, MediaType, Metadata, Quality, QualityFilter, UserConfig,
};

// Re-export aggregation helpers
pub use aggregate::{aggregate as aggregate_streams, info_hash, MAX_RESULTS};
