//! Addon HTTP routes
//!
//! Exposes the media-player addon contract: `/manifest.json` and
//! `/stream/{type}/{id}.json`, each optionally prefixed with a
//! URL-encoded JSON config segment. Stream lookups always answer 200
//! with a (possibly empty) stream list; errors never reach the wire.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use magnetio_core::{CandidateStream, MediaQuery, MediaType, TorrentScraper, UserConfig};

use crate::manifest::manifest;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub scraper: Arc<TorrentScraper>,
}

/// Wire shape of one stream descriptor
#[derive(Debug, Serialize)]
pub struct StreamDescriptor {
    pub name: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "behaviorHints")]
    pub behavior_hints: BehaviorHints,
}

#[derive(Debug, Serialize)]
pub struct BehaviorHints {
    #[serde(rename = "notWebReady")]
    pub not_web_ready: bool,
    #[serde(rename = "bingeGroup")]
    pub binge_group: String,
}

impl From<CandidateStream> for StreamDescriptor {
    fn from(stream: CandidateStream) -> Self {
        Self {
            name: stream.source_name,
            title: stream.title,
            url: stream.magnet_uri,
            behavior_hints: BehaviorHints {
                not_web_ready: true,
                binge_group: stream.binge_group,
            },
        }
    }
}

/// Wire shape of a stream lookup response
#[derive(Debug, Serialize)]
pub struct StreamsResponse {
    pub streams: Vec<StreamDescriptor>,
}

/// Build the addon router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/manifest.json", get(get_manifest))
        .route("/{config}/manifest.json", get(get_manifest_with_config))
        .route("/stream/{media_type}/{id}", get(get_streams))
        .route(
            "/{config}/stream/{media_type}/{id}",
            get(get_streams_with_config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_manifest() -> Json<Value> {
    Json(manifest())
}

async fn get_manifest_with_config(Path(_config): Path<String>) -> Json<Value> {
    Json(manifest())
}

async fn get_streams(
    State(state): State<AppState>,
    Path((media_type, id)): Path<(String, String)>,
) -> Json<StreamsResponse> {
    lookup(&state, &media_type, &id, UserConfig::default()).await
}

async fn get_streams_with_config(
    State(state): State<AppState>,
    Path((config, media_type, id)): Path<(String, String, String)>,
) -> Json<StreamsResponse> {
    let user_config = parse_user_config(&config);
    lookup(&state, &media_type, &id, user_config).await
}

/// Run one stream lookup; malformed requests yield an empty list
async fn lookup(
    state: &AppState,
    media_type: &str,
    id: &str,
    user_config: UserConfig,
) -> Json<StreamsResponse> {
    let Some(media_type) = MediaType::parse(media_type) else {
        debug!(media_type, "Unknown media type");
        return Json(StreamsResponse { streams: vec![] });
    };

    let id = id.strip_suffix(".json").unwrap_or(id);
    let Some(query) = MediaQuery::parse(media_type, id) else {
        debug!(id, "Unparseable stream id");
        return Json(StreamsResponse { streams: vec![] });
    };

    let streams = state.scraper.find_streams(&query, &user_config).await;
    Json(StreamsResponse {
        streams: streams.into_iter().map(StreamDescriptor::from).collect(),
    })
}

/// Parse the URL-encoded JSON config path segment
///
/// Anything unparseable falls back to the defaults; a bad config must
/// not break stream lookups.
pub fn parse_user_config(segment: &str) -> UserConfig {
    let decoded = urlencoding::decode(segment).map(|s| s.into_owned());
    match decoded {
        Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
        Err(_) => UserConfig::default(),
    }
}
