//! QuickCart storefront library.
//!
//! The router, route guard, model registry and JSON API, exposed as a
//! library so the binary and the integration tests build the same app.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{Router, extract::Request};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use state::AppState;

/// Build the application router.
///
/// Health probes are mounted outside the session layer and route guard;
/// every other route, including the fallback, passes through both.
pub fn app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = middleware::create_session_layer(session_store, state.config());

    let guarded = routes::routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::route_guard_middleware,
        ))
        .layer(session_layer);

    Router::new()
        .merge(routes::health_routes())
        .merge(guarded)
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        app(AppState::in_memory(), tower_sessions::MemoryStore::default())
    }

    #[tokio::test]
    async fn test_health_needs_no_session() {
        for uri in ["/health", "/health/ready"] {
            let response = test_app()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let response = test_app()
            .oneshot(
                Request::get("/health")
                    .header(middleware::request_id::REQUEST_ID_HEADER, "edge-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(middleware::request_id::REQUEST_ID_HEADER).unwrap(),
            "edge-42"
        );
    }

    #[tokio::test]
    async fn test_unknown_page_redirects_before_404() {
        let response = test_app()
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/sign-in?redirect_url=%2Fnowhere"
        );
    }
}
