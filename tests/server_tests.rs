//! Router-level tests for the HTTP API, driven through `tower::ServiceExt::oneshot`
//! with an in-memory provider.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use scholar_profile::config::{FetcherConfig, DEFAULT_CORS_ORIGINS};
use scholar_profile::fetcher::ProfileFetcher;
use scholar_profile::provider::{
    AuthorDetail, AuthorStub, Authors, Bibliography, FilledPublication, PublicationStub,
    ScholarProvider,
};
use scholar_profile::server::{create_router, AppState};
use scholar_profile::{Result, ScholarError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// ─── Stub provider ──────────────────────────────────────────────────────────

#[derive(Default)]
struct StubProvider {
    publications: usize,
    no_authors: bool,
    search_fails: bool,
    publication_fails: bool,
}

#[async_trait]
impl ScholarProvider for StubProvider {
    async fn search_authors(&self, name: &str) -> Result<Vec<AuthorStub>> {
        if self.search_fails {
            return Err(ScholarError::Api {
                code: 503,
                message: "upstream unavailable".to_string(),
            });
        }
        if self.no_authors {
            return Ok(Vec::new());
        }
        Ok(vec![AuthorStub {
            scholar_id: "STUB0001AAAJ".to_string(),
            name: Some(name.to_string()),
            ..Default::default()
        }])
    }

    async fn fill_author(&self, stub: &AuthorStub) -> Result<AuthorDetail> {
        Ok(AuthorDetail {
            scholar_id: stub.scholar_id.clone(),
            name: stub.name.clone(),
            affiliation: Some("Stanford University".to_string()),
            cited_by: Some(4321),
            h_index: Some(30),
            i10_index: Some(55),
            interests: vec!["Machine Learning".to_string(), "Vision".to_string()],
            url_picture: Some("https://scholar.example/photo?user=STUB0001AAAJ".to_string()),
            publications: (1..=self.publications)
                .map(|i| PublicationStub {
                    author_pub_id: format!("STUB0001AAAJ:p{i}"),
                    title: Some(format!("Paper {i}")),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
    }

    async fn fill_publication(&self, stub: &PublicationStub) -> Result<FilledPublication> {
        if self.publication_fails {
            return Err(ScholarError::Parse("unreadable citation page".to_string()));
        }
        Ok(FilledPublication {
            bib: Bibliography {
                title: stub.title.clone(),
                pub_year: Some("2021".to_string()),
                author: Some(Authors::List(vec![
                    "Ada Lovelace".to_string(),
                    "Alan Turing".to_string(),
                ])),
                journal: Some("Journal of Machine Learning Research".to_string()),
                ..Default::default()
            },
            num_citations: Some(42),
            pub_url: Some("https://example.org/paper".to_string()),
            cites_per_year: [("2022".to_string(), 20), ("2021".to_string(), 22)]
                .into_iter()
                .collect(),
            ..Default::default()
        })
    }
}

fn build_router(provider: StubProvider) -> Router {
    build_router_with(provider, Duration::ZERO, None)
}

fn build_router_with(
    provider: StubProvider,
    pacing: Duration,
    request_timeout: Option<Duration>,
) -> Router {
    let fetcher = ProfileFetcher::new(Arc::new(provider), FetcherConfig { pacing });
    let origins: Vec<String> = DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect();
    create_router(
        AppState {
            fetcher,
            request_timeout,
        },
        &origins,
    )
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&body).expect("json body");
    (status, json)
}

// ─── Welcome & health ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_root_welcome() {
    let (status, json) = get_json(build_router(StubProvider::default()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Welcome to Scholar Scraper API");
    assert_eq!(json["links"]["health"], "/health");
    assert_eq!(json["links"]["documentation"], "/docs");
}

#[tokio::test]
async fn test_docs_lists_endpoints() {
    let (status, json) = get_json(build_router(StubProvider::default()), "/docs").await;
    assert_eq!(status, StatusCode::OK);
    let paths: Vec<&str> = json["endpoints"]
        .as_array()
        .expect("endpoints")
        .iter()
        .filter_map(|e| e["path"].as_str())
        .collect();
    assert_eq!(paths, vec!["/", "/health", "/search/{professor_name}"]);
}

#[tokio::test]
async fn test_health() {
    let (status, json) = get_json(build_router(StubProvider::default()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!({ "status": "healthy" }));
}

// ─── Search ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_returns_profile() {
    let app = build_router(StubProvider {
        publications: 1,
        ..Default::default()
    });
    let (status, json) = get_json(app, "/search/Jane%20Doe").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Jane Doe");
    assert_eq!(json["affiliation"], "Stanford University");
    assert_eq!(json["total_citations"], 4321);
    assert_eq!(json["h_index"], 30);
    assert_eq!(json["i10_index"], 55);
    assert_eq!(json["interests"][1], "Vision");
    assert_eq!(
        json["profile_url"],
        "https://scholar.example/photo?user=STUB0001AAAJ"
    );

    let publication = &json["publications"][0];
    assert_eq!(publication["title"], "Paper 1");
    assert_eq!(publication["year"], "2021");
    assert_eq!(publication["authors"][0], "Ada Lovelace");
    assert_eq!(publication["type"], "Journal Article");
    assert_eq!(publication["citations"], 42);
    assert_eq!(publication["abstract"], "No abstract available");
    assert_eq!(publication["venue"], "");
    assert_eq!(publication["citations_per_year"]["2022"], 20);
    assert!(publication["gsrank"].is_null());
}

#[tokio::test]
async fn test_search_not_found() {
    let app = build_router(StubProvider {
        no_authors: true,
        ..Default::default()
    });
    let (status, json) = get_json(app, "/search/Nobody%20Here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["detail"], "No results found for professor: Nobody Here");
}

#[tokio::test]
async fn test_search_upstream_failure() {
    let app = build_router(StubProvider {
        search_fails: true,
        ..Default::default()
    });
    let (status, json) = get_json(app, "/search/Jane").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["detail"]
        .as_str()
        .is_some_and(|d| d.contains("upstream unavailable")));
}

#[tokio::test]
async fn test_search_invalid_max_publications() {
    let app = build_router(StubProvider::default());
    let (status, json) = get_json(app, "/search/Jane?max_publications=abc").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json["detail"].is_string());
}

#[tokio::test]
async fn test_search_respects_max_publications() {
    let app = build_router(StubProvider {
        publications: 3,
        ..Default::default()
    });
    let (status, json) = get_json(app, "/search/Jane?max_publications=2").await;
    assert_eq!(status, StatusCode::OK);
    let publications = json["publications"].as_array().expect("array");
    assert_eq!(publications.len(), 2);
    assert_eq!(publications[1]["title"], "Paper 2");
}

#[tokio::test]
async fn test_search_zero_max_publications_returns_all() {
    let app = build_router(StubProvider {
        publications: 3,
        ..Default::default()
    });
    let (_, json) = get_json(app, "/search/Jane?max_publications=0").await;
    assert_eq!(json["publications"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn test_search_negative_max_publications_returns_author_only() {
    let app = build_router(StubProvider {
        publications: 3,
        ..Default::default()
    });
    let (status, json) = get_json(app, "/search/Jane?max_publications=-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Jane");
    assert_eq!(json["total_citations"], 4321);
    assert_eq!(json["publications"], serde_json::json!([]));
}

#[tokio::test]
async fn test_search_timeout_returns_partial_profile() {
    let app = build_router_with(
        StubProvider {
            publications: 3,
            ..Default::default()
        },
        Duration::from_secs(3600),
        Some(Duration::from_millis(100)),
    );
    let (status, json) = tokio::time::timeout(
        Duration::from_secs(10),
        get_json(app, "/search/Jane"),
    )
    .await
    .expect("handler returned once the budget was spent");

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Jane");
    assert_eq!(json["affiliation"], "Stanford University");
    let publications = json["publications"].as_array().expect("array");
    assert_eq!(publications.len(), 1);
    assert_eq!(publications[0]["title"], "Paper 1");
}

#[tokio::test]
async fn test_search_skips_failed_publications() {
    let app = build_router(StubProvider {
        publications: 2,
        publication_fails: true,
        ..Default::default()
    });
    let (status, json) = get_json(app, "/search/Jane").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Jane");
    assert_eq!(json["publications"], serde_json::json!([]));
}

// ─── CORS ───────────────────────────────────────────────────────────────────

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/search/Jane")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "x-requested-with")
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn test_cors_preflight_allowed_origin() {
    let response = build_router(StubProvider::default())
        .oneshot(preflight("https://scholar-ui.vercel.app"))
        .await
        .expect("response");

    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://scholar-ui.vercel.app")
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
    assert!(headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|h| h.contains("x-requested-with")));
}

#[tokio::test]
async fn test_cors_preflight_rejected_origin() {
    let response = build_router(StubProvider::default())
        .oneshot(preflight("https://attacker.example"))
        .await
        .expect("response");
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_simple_request_from_localhost() {
    let response = build_router(StubProvider::default())
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
}
