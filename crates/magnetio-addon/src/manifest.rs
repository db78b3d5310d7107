//! Static addon manifest
//!
//! The manifest is a fixed external contract consumed by the media
//! player; field names and values are part of the addon's published
//! identity and must not drift between releases.

use serde_json::{json, Value};

/// Build the addon manifest JSON
pub fn manifest() -> Value {
    json!({
        "id": "org.torrent.multi-scraper",
        "version": "1.2.0",
        "name": "🧲 Multi-Source Torrent Addon",
        "description": "Search torrents from multiple sources including ext.to and watchsomuch.to",
        "resources": ["stream"],
        "types": ["movie", "series"],
        "catalogs": [],
        "idPrefixes": ["tt"],
        "config": [
            {
                "key": "quality",
                "type": "select",
                "options": ["all", "4k", "1080p", "720p"],
                "default": "all",
                "title": "Preferred Quality"
            },
            {
                "key": "minSeeds",
                "type": "number",
                "default": 5,
                "title": "Minimum Seeds"
            }
        ]
    })
}
