//! Per-site search modules, driven by data rather than code
//!
//! Every target site follows the same contract: build a query string,
//! fetch the search results page, try container selector groups in order,
//! run the extractors on each matched node, and accept a node only when it
//! yields a magnet link and a plausible title. Adding a site means adding
//! a [`SiteProfile`], not a new module.

use scraper::{Html, Selector};
use tracing::{debug, info, warn};

use crate::client::HttpClient;
use crate::error::Result;
use crate::extract::{extract_magnet, extract_quality, extract_seeds, extract_size, extract_text};
use crate::types::{CandidateStream, MediaQuery, MediaType, Metadata};

/// How a site prefers episode designations in search queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeFormat {
    /// Zero-padded `S02E05`
    Compact,
    /// Spelled out `season 2 episode 5`
    Verbose,
}

/// Scraping profile for one target site
///
/// Selector groups are ordered best-guess-first; sites shuffle their
/// markup often enough that the later, vaguer groups earn their keep.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Machine id, also the rate-limit domain in production ("ext.to")
    pub name: &'static str,
    /// Display name forwarded to the player ("🧲 Ext.to")
    pub display_name: &'static str,
    /// Binge group hint for the player
    pub binge_group: &'static str,
    /// Scheme + host, overridable for tests
    pub base_url: String,
    /// Search path up to and including the query parameter ("/search?q=")
    pub search_path: &'static str,
    /// Episode designation style for series queries
    pub episode_format: EpisodeFormat,
    /// Ordered container selector groups tried against the whole document
    pub container_selectors: &'static [&'static str],
    /// Ordered title selector groups tried within each container
    pub title_selectors: &'static [&'static str],
}

impl SiteProfile {
    /// Profile for ext.to
    pub fn ext_to() -> Self {
        Self {
            name: "ext.to",
            display_name: "🧲 Ext.to",
            binge_group: "ext-to",
            base_url: "https://ext.to".to_string(),
            search_path: "/search?q=",
            episode_format: EpisodeFormat::Compact,
            container_selectors: &[
                ".torrent-item, .result-item, .search-result",
                r#"tr[class*="torrent"], tr[class*="result"]"#,
                ".list-group-item, .media, .card",
            ],
            title_selectors: &[
                ".title, .name, .torrent-title, .result-title",
                r#"a[href*="torrent"], a[href*="magnet"]"#,
                "td:first-child, .media-heading",
            ],
        }
    }

    /// Profile for watchsomuch.to
    pub fn watchsomuch() -> Self {
        Self {
            name: "watchsomuch.to",
            display_name: "🎬 WatchSomuch",
            binge_group: "watchsomuch",
            base_url: "https://watchsomuch.to".to_string(),
            search_path: "/search?query=",
            episode_format: EpisodeFormat::Verbose,
            container_selectors: &[
                ".result-item, .search-result, .movie-item",
                "article, .post, .entry",
                ".row .col, .grid-item",
            ],
            title_selectors: &[
                ".title, .name, .result-title",
                "h1, h2, h3, h4, h5",
                r#"a[href*="torrent"], .download-link"#,
            ],
        }
    }

    /// The built-in site roster
    pub fn defaults() -> Vec<Self> {
        vec![Self::ext_to(), Self::watchsomuch()]
    }

    /// Override the base URL (for tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the search query string for this site
    ///
    /// Movies get the release year appended; series with a known season
    /// and episode get the site's preferred episode designation; bare
    /// series ids search on the title alone.
    pub fn build_query(&self, metadata: &Metadata, query: &MediaQuery) -> String {
        match (query.media_type, query.season, query.episode) {
            (MediaType::Series, Some(season), Some(episode)) => match self.episode_format {
                EpisodeFormat::Compact => {
                    format!("{} S{:02}E{:02}", metadata.title, season, episode)
                }
                EpisodeFormat::Verbose => {
                    format!("{} season {} episode {}", metadata.title, season, episode)
                }
            },
            (MediaType::Movie, _, _) => format!("{} {}", metadata.title, metadata.year),
            _ => metadata.title.clone(),
        }
    }

    /// Full search URL for a query string
    pub fn search_url(&self, search_query: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url,
            self.search_path,
            urlencoding::encode(search_query)
        )
    }
}

/// Search one site for candidate streams
///
/// Internal failures surface as `Err` so the aggregator can log them per
/// source; callers treat any error as an empty contribution.
pub async fn search_source(
    profile: &SiteProfile,
    client: &HttpClient,
    metadata: &Metadata,
    query: &MediaQuery,
) -> Result<Vec<CandidateStream>> {
    let search_query = profile.build_query(metadata, query);
    let url = profile.search_url(&search_query);

    info!(source = profile.name, query = %search_query, "Searching");
    let html = client.fetch(&url).await?;

    let streams = parse_streams(profile, &html);
    info!(source = profile.name, count = streams.len(), "Search done");
    Ok(streams)
}

/// Parse a search results page into candidate streams
///
/// Container groups are tried in order; a group that matches no nodes, or
/// whose nodes all fail extraction, does not stop the cascade. The first
/// group yielding at least one accepted stream wins.
pub fn parse_streams(profile: &SiteProfile, html: &str) -> Vec<CandidateStream> {
    let document = Html::parse_document(html);

    for group in profile.container_selectors {
        let Ok(selector) = Selector::parse(group) else {
            warn!(source = profile.name, group, "Bad container selector");
            continue;
        };

        let mut streams = Vec::new();
        let mut matched = 0usize;

        for node in document.select(&selector) {
            matched += 1;

            let title = extract_text(&node, profile.title_selectors);
            let Some(magnet_uri) = extract_magnet(&node) else {
                continue;
            };
            if title.len() <= 5 {
                continue;
            }

            streams.push(CandidateStream {
                source_name: profile.display_name.to_string(),
                quality: extract_quality(&title),
                seed_count: extract_seeds(&node),
                size_label: extract_size(&node),
                title,
                magnet_uri,
                source_id: profile.name.to_string(),
                binge_group: profile.binge_group.to_string(),
            });
        }

        debug!(
            source = profile.name,
            group,
            matched,
            accepted = streams.len(),
            "Container group tried"
        );

        if !streams.is_empty() {
            return streams;
        }
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quality;

    fn movie_query() -> MediaQuery {
        MediaQuery {
            external_id: "tt1375666".to_string(),
            media_type: MediaType::Movie,
            season: None,
            episode: None,
        }
    }

    fn episode_query(season: u32, episode: u32) -> MediaQuery {
        MediaQuery {
            external_id: "tt0903747".to_string(),
            media_type: MediaType::Series,
            season: Some(season),
            episode: Some(episode),
        }
    }

    fn metadata(title: &str, year: &str) -> Metadata {
        Metadata {
            title: title.to_string(),
            year: year.to_string(),
            found: true,
        }
    }

    #[test]
    fn test_build_query_movie_appends_year() {
        let profile = SiteProfile::ext_to();
        let q = profile.build_query(&metadata("Inception", "2010"), &movie_query());
        assert_eq!(q, "Inception 2010");
    }

    #[test]
    fn test_build_query_series_compact() {
        let profile = SiteProfile::ext_to();
        let q = profile.build_query(&metadata("Breaking Bad", "2008"), &episode_query(2, 5));
        assert_eq!(q, "Breaking Bad S02E05");
    }

    #[test]
    fn test_build_query_series_verbose() {
        let profile = SiteProfile::watchsomuch();
        let q = profile.build_query(&metadata("Breaking Bad", "2008"), &episode_query(2, 5));
        assert_eq!(q, "Breaking Bad season 2 episode 5");
    }

    #[test]
    fn test_build_query_series_without_episode_is_title_only() {
        let profile = SiteProfile::ext_to();
        let query = MediaQuery {
            external_id: "tt0903747".to_string(),
            media_type: MediaType::Series,
            season: None,
            episode: None,
        };
        let q = profile.build_query(&metadata("Breaking Bad", "2008"), &query);
        assert_eq!(q, "Breaking Bad");
    }

    #[test]
    fn test_search_url_encodes_query() {
        let profile = SiteProfile::ext_to();
        assert_eq!(
            profile.search_url("Inception 2010"),
            "https://ext.to/search?q=Inception%202010"
        );
    }

    #[test]
    fn test_parse_streams_first_group() {
        let html = r#"
        <html><body>
            <div class="torrent-item">
                <span class="title">Inception.2010.1080p.BluRay</span>
                <a href="magnet:?xt=urn:btih:ABCDEF0123456789ABCDEF0123456789ABCDEF01">magnet</a>
                <span class="seeds">120</span>
                <span class="size">1.8 GB</span>
            </div>
        </body></html>
        "#;

        let streams = parse_streams(&SiteProfile::ext_to(), html);
        assert_eq!(streams.len(), 1);
        let stream = &streams[0];
        assert_eq!(stream.title, "Inception.2010.1080p.BluRay");
        assert_eq!(stream.quality, Quality::P1080);
        assert_eq!(stream.seed_count, 120);
        assert_eq!(stream.size_label, "1.8 GB");
        assert_eq!(stream.source_id, "ext.to");
        assert_eq!(stream.source_name, "🧲 Ext.to");
    }

    #[test]
    fn test_parse_streams_falls_through_to_later_group() {
        // First group matches nothing; the table-row group should carry it
        let html = r#"
        <html><body><table>
            <tr class="torrent-row">
                <td>Inception.2010.720p.WEB-DL</td>
                <td><a href="magnet:?xt=urn:btih:0000000000000000000000000000000000000002">dl</a></td>
                <td class="seeds">44</td>
            </tr>
        </table></body></html>
        "#;

        let streams = parse_streams(&SiteProfile::ext_to(), html);
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].title, "Inception.2010.720p.WEB-DL");
        assert_eq!(streams[0].quality, Quality::P720);
    }

    #[test]
    fn test_parse_streams_group_with_no_accepts_does_not_stop_cascade() {
        // The first group matches .search-result but accepts nothing from
        // it; the stream lives in a .card, only reachable via group three
        let html = r#"
        <html><body>
            <div class="search-result"><span class="title">No magnet at all here</span></div>
            <div class="card">
                <span class="title">Some.Show.S01E01.1080p</span>
                <a href="magnet:?xt=urn:btih:0000000000000000000000000000000000000003">m</a>
            </div>
        </body></html>
        "#;

        let streams = parse_streams(&SiteProfile::ext_to(), html);
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].title, "Some.Show.S01E01.1080p");
    }

    #[test]
    fn test_parse_streams_rejects_short_titles() {
        let html = r#"
        <html><body>
            <div class="torrent-item">
                <span class="title">abc</span>
                <a href="magnet:?xt=urn:btih:0000000000000000000000000000000000000004">m</a>
            </div>
        </body></html>
        "#;

        // Title selector matches "abc" but falls through (len <= 3), and the
        // fallback first-line text is also too short to accept
        let streams = parse_streams(&SiteProfile::ext_to(), html);
        assert!(streams.is_empty());
    }

    #[test]
    fn test_parse_streams_requires_magnet() {
        let html = r#"
        <html><body>
            <div class="torrent-item">
                <span class="title">Perfectly.Good.Title.1080p</span>
                <a href="/torrent/12345">details</a>
            </div>
        </body></html>
        "#;

        let streams = parse_streams(&SiteProfile::ext_to(), html);
        assert!(streams.is_empty());
    }

    #[test]
    fn test_parse_streams_empty_document() {
        let streams = parse_streams(&SiteProfile::watchsomuch(), "<html><body></body></html>");
        assert!(streams.is_empty());
    }
}
