//! Post-processing of collected candidate streams
//!
//! Filter by the user's seed/quality preferences, dedup on the BitTorrent
//! info-hash, sort by quality then seeds, and cap the result count.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{CandidateStream, UserConfig};

/// Hard cap on the number of streams returned to the player
pub const MAX_RESULTS: usize = 20;

static INFO_HASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"btih:([a-fA-F0-9]{40})").unwrap());

/// Extract the lowercase 40-hex info-hash from a magnet URI, if present
pub fn info_hash(magnet_uri: &str) -> Option<String> {
    INFO_HASH_RE
        .captures(magnet_uri)
        .map(|c| c[1].to_lowercase())
}

/// Keep streams meeting the user's minimum seed count and quality preference
pub fn filter_streams(streams: Vec<CandidateStream>, config: &UserConfig) -> Vec<CandidateStream> {
    streams
        .into_iter()
        .filter(|s| s.seed_count >= config.min_seeds && config.quality.matches(s.quality))
        .collect()
}

/// Drop streams whose info-hash was already seen, keeping first occurrences
///
/// Streams without an extractable info-hash are never deduped against
/// others and always kept.
pub fn dedup_streams(streams: Vec<CandidateStream>) -> Vec<CandidateStream> {
    let mut seen = HashSet::new();
    streams
        .into_iter()
        .filter(|s| match info_hash(&s.magnet_uri) {
            Some(hash) => seen.insert(hash),
            None => true,
        })
        .collect()
}

/// Sort by quality rank descending, ties broken by seed count descending
pub fn sort_streams(streams: &mut [CandidateStream]) {
    streams.sort_by(|a, b| {
        b.quality
            .rank()
            .cmp(&a.quality.rank())
            .then(b.seed_count.cmp(&a.seed_count))
    });
}

/// Full post-processing pass: filter, dedup, sort, cap
pub fn aggregate(streams: Vec<CandidateStream>, config: &UserConfig) -> Vec<CandidateStream> {
    let mut streams = dedup_streams(filter_streams(streams, config));
    sort_streams(&mut streams);
    streams.truncate(MAX_RESULTS);
    streams
}
