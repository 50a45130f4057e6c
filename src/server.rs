//! HTTP surface: welcome, health and author profile search.

use crate::error::ErrorDetail;
use crate::fetcher::{ProfileFetcher, PublicationLimit};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared handler state.
pub struct AppState {
    pub fetcher: ProfileFetcher,
    /// Budget for the publication loop; once spent the partial profile is returned
    pub request_timeout: Option<Duration>,
}

/// Build the application router.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/docs", get(docs_handler))
        .route("/search/{professor_name}", get(search_handler))
        .with_state(Arc::new(state))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for a fixed origin allow-list with credentials.
///
/// Credentialed CORS cannot use `*`, so methods and headers are mirrored from
/// the preflight request instead.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let patterns: Arc<[String]> = origins.into();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|o| origin_allowed(&patterns, o))
                    .unwrap_or(false)
            },
        ))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Match an origin against exact entries and `scheme://*.domain` wildcards.
pub fn origin_allowed(patterns: &[String], origin: &str) -> bool {
    patterns.iter().any(|pattern| match pattern.split_once("://*.") {
        Some((scheme, suffix)) => origin
            .strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix("://"))
            .and_then(|host| host.strip_suffix(suffix))
            .is_some_and(|sub| sub.len() > 1 && sub.ends_with('.')),
        None => pattern == origin,
    })
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Scholar Scraper API",
        "version": env!("CARGO_PKG_VERSION"),
        "links": {
            "documentation": "/docs",
            "search": "/search/{professor_name}?max_publications=<int>",
            "health": "/health",
        }
    }))
}

/// Endpoint reference.
async fn docs_handler() -> Json<Value> {
    Json(json!({
        "title": "Scholar Scraper API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            {
                "method": "GET",
                "path": "/",
                "description": "Welcome message and links",
            },
            {
                "method": "GET",
                "path": "/health",
                "description": "Liveness check",
            },
            {
                "method": "GET",
                "path": "/search/{professor_name}",
                "description": "Author profile with classified publications",
                "query": {
                    "max_publications": "Optional integer. Missing or 0 fills every publication; a negative value fills none.",
                },
                "responses": {
                    "200": "Author profile",
                    "404": "No author matched the name",
                    "422": "Malformed query string",
                    "500": "Google Scholar lookup failed",
                },
            },
        ],
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Query string of the search endpoint
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub max_publications: Option<i64>,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Path(professor_name): Path<String>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected search query");
            let body = ErrorDetail {
                detail: rejection.body_text(),
            };
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };

    info!(
        professor = %professor_name,
        max_publications = ?params.max_publications,
        "Search request"
    );

    let limit = PublicationLimit::from_requested(params.max_publications);
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let deadline = state.request_timeout.map(|budget| {
        tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            let _ = cancel_tx.send(true);
        })
    });

    let result = state
        .fetcher
        .fetch_profile_with_cancel(&professor_name, limit, cancel_rx)
        .await;

    if let Some(handle) = deadline {
        handle.abort();
    }

    match result {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => {
            error!(professor = %professor_name, error = %e, "Search failed");
            e.into_response()
        }
    }
}
