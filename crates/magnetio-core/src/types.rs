//! Core data types for the magnetio pipeline
//!
//! Contains the data structures flowing through the pipeline: the incoming
//! media query, resolved metadata, candidate streams and the per-request
//! user configuration.

use serde::{Deserialize, Serialize};

/// Kind of media being looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
}

impl MediaType {
    /// Parse from the addon path segment ("movie" / "series")
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "series" => Some(Self::Series),
            _ => None,
        }
    }
}

/// One stream lookup request, constructed once per incoming request
///
/// The id format on the wire is `externalId[:season[:episode]]`,
/// e.g. `tt0903747:2:5` for a series episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaQuery {
    pub external_id: String,
    pub media_type: MediaType,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl MediaQuery {
    /// Parse a wire id like `tt0903747:2:5` into a query
    ///
    /// Returns `None` when the id is empty. Unparseable season/episode
    /// segments are dropped rather than rejected.
    pub fn parse(media_type: MediaType, id: &str) -> Option<Self> {
        let mut parts = id.split(':');
        let external_id = parts.next().filter(|p| !p.is_empty())?.to_string();
        let season = parts.next().and_then(|p| p.parse().ok());
        let episode = parts.next().and_then(|p| p.parse().ok());
        Some(Self {
            external_id,
            media_type,
            season,
            episode,
        })
    }
}

/// Title/year metadata resolved from the external metadata API
///
/// `found == false` is the sentinel for "the API had no answer"; such
/// values are never cached, so the next lookup re-hits the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub year: String,
    pub found: bool,
}

impl Metadata {
    /// Sentinel for a failed or negative lookup
    pub fn not_found() -> Self {
        Self {
            title: String::new(),
            year: String::new(),
            found: false,
        }
    }
}

/// Coarse quality tier derived heuristically from release titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "4K")]
    FourK,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Quality {
    /// Rank used for sorting, higher is better
    pub fn rank(self) -> u8 {
        match self {
            Self::FourK => 4,
            Self::P1080 => 3,
            Self::P720 => 2,
            Self::P480 => 1,
            Self::Unknown => 0,
        }
    }

    /// Label as shown to users ("4K", "1080p", ...)
    pub fn label(self) -> &'static str {
        match self {
            Self::FourK => "4K",
            Self::P1080 => "1080p",
            Self::P720 => "720p",
            Self::P480 => "480p",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One scraped torrent stream candidate, produced by a source searcher
///
/// No identity beyond structural equality; the aggregator dedups on the
/// 40-hex `btih` info-hash inside `magnet_uri` when one is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStream {
    /// Display name of the source (e.g. "🧲 Ext.to")
    pub source_name: String,
    /// Release title as scraped from the page
    pub title: String,
    /// Magnet URI, always `magnet:`-schemed
    pub magnet_uri: String,
    /// Quality tier derived from the title
    pub quality: Quality,
    /// Seeder count, 0 when nothing could be extracted
    pub seed_count: u32,
    /// Human-readable size ("1.4 GB"), "Unknown" when not extracted
    pub size_label: String,
    /// Machine id of the source site (e.g. "ext.to")
    pub source_id: String,
    /// Binge group hint forwarded to the player
    pub binge_group: String,
}

/// Quality preference supplied per request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityFilter {
    #[default]
    All,
    #[serde(rename = "4k")]
    FourK,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
}

impl QualityFilter {
    /// Case-insensitive match against a candidate's quality tier
    pub fn matches(self, quality: Quality) -> bool {
        match self {
            Self::All => true,
            Self::FourK => quality == Quality::FourK,
            Self::P1080 => quality == Quality::P1080,
            Self::P720 => quality == Quality::P720,
        }
    }
}

/// Per-request user configuration, read-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub quality: QualityFilter,
    #[serde(rename = "minSeeds")]
    pub min_seeds: u32,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            quality: QualityFilter::All,
            min_seeds: 5,
        }
    }
}
