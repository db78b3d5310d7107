//! Field extractors for scraped HTML fragments
//!
//! Pure, stateless functions deriving title, magnet link, seed count, size
//! and quality from one DOM subtree. Each extractor walks an ordered list
//! of selector groups and takes the first usable hit, with a regex (or
//! first-line-of-text) scan over the whole subtree as the last resort.
//! Untrusted pages rarely match the first group; that is expected.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::types::Quality;

static MAGNET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"magnet:\?[^\s"'<>]+"#).unwrap());
static SEED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*seed").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());
static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?\s*(?:GB|MB|KB))").unwrap());

/// Selector cascade for magnet links
const MAGNET_SELECTORS: &[&str] = &[
    r#"a[href^="magnet:"]"#,
    "[data-magnet]",
    ".magnet-link",
    r#".download-link[href*="magnet"]"#,
];

/// Selector cascade for seed counts
const SEED_SELECTORS: &[&str] = &[".seeds", ".seed", r#"[class*="seed"]"#, ".s"];

/// Selector cascade for file sizes
const SIZE_SELECTORS: &[&str] = &[".size", ".filesize", r#"[class*="size"]"#];

/// Ordered keyword -> quality mapping; first match wins.
/// "hd" and "sd" are broad substrings and can false-positive on unrelated
/// title words; accepted heuristic limitation.
const QUALITY_KEYWORDS: &[(&str, Quality)] = &[
    ("2160p", Quality::FourK),
    ("4k", Quality::FourK),
    ("uhd", Quality::FourK),
    ("1080p", Quality::P1080),
    ("fhd", Quality::P1080),
    ("720p", Quality::P720),
    ("hd", Quality::P720),
    ("480p", Quality::P480),
    ("sd", Quality::P480),
];

/// Collect the full text content of a subtree
fn full_text(element: &ElementRef) -> String {
    element.text().collect::<String>()
}

/// Extract a display title from a subtree
///
/// Tries each selector group in order and returns the first matched text
/// longer than 3 characters; falls back to the first line of the subtree's
/// own text.
pub fn extract_text(element: &ElementRef, selector_groups: &[&str]) -> String {
    for group in selector_groups {
        let Ok(selector) = Selector::parse(group) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            let text = full_text(&found).trim().to_string();
            if text.len() > 3 {
                return text;
            }
        }
    }

    full_text(element)
        .trim()
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Extract a magnet URI from a subtree
///
/// Tries magnet-schemed anchors, `data-magnet` attributes and class
/// markers, then scans the subtree's full text for a magnet URI.
pub fn extract_magnet(element: &ElementRef) -> Option<String> {
    for group in MAGNET_SELECTORS {
        let Ok(selector) = Selector::parse(group) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            let link = found
                .value()
                .attr("href")
                .or_else(|| found.value().attr("data-magnet"));
            if let Some(link) = link
                && link.starts_with("magnet:")
            {
                return Some(link.to_string());
            }
        }
    }

    MAGNET_RE
        .find(&full_text(element))
        .map(|m| m.as_str().to_string())
}

/// Extract a seed count from a subtree, 0 when nothing matches
pub fn extract_seeds(element: &ElementRef) -> u32 {
    for group in SEED_SELECTORS {
        let Ok(selector) = Selector::parse(group) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            let text = full_text(&found);
            if let Some(captures) = NUMBER_RE.captures(&text)
                && let Ok(seeds) = captures[1].parse()
            {
                return seeds;
            }
        }
    }

    SEED_RE
        .captures(&full_text(element))
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(0)
}

/// Extract a human-readable size label, "Unknown" when nothing matches
pub fn extract_size(element: &ElementRef) -> String {
    for group in SIZE_SELECTORS {
        let Ok(selector) = Selector::parse(group) else {
            continue;
        };
        if let Some(found) = element.select(&selector).next() {
            let text = full_text(&found).trim().to_string();
            if SIZE_RE.is_match(&text) {
                return text;
            }
        }
    }

    SIZE_RE
        .captures(&full_text(element))
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Derive a quality tier from a release title
pub fn extract_quality(title: &str) -> Quality {
    let lowered = title.to_lowercase();
    for (keyword, quality) in QUALITY_KEYWORDS {
        if lowered.contains(keyword) {
            return *quality;
        }
    }
    Quality::Unknown
}
