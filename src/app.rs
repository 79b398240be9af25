use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::state::AppState;
use crate::{courses, health, instructors, traces, users};

async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .nest(
            "/v1",
            Router::new()
                .merge(users::router())
                .merge(instructors::router())
                .merge(courses::router())
                .merge(traces::router()),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// Routing and pre-storage behavior: everything below runs against a fake
// state whose pool is never reached, so each assertion exercises the
// extractor/validation path that fires before any query.
#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        build_app(AppState::fake())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn protected_routes_challenge_without_credentials() {
        for (method, uri) in [
            (Method::GET, "/v1/user"),
            (Method::PUT, "/v1/user"),
            (Method::POST, "/v1/instructor"),
            (Method::POST, "/v1/course"),
            (Method::DELETE, "/v1/course/6f9a2f36-0c87-4e7a-9be4-2f1b1a1d6f00"),
            (
                Method::GET,
                "/v1/course/6f9a2f36-0c87-4e7a-9be4-2f1b1a1d6f00/trace",
            ),
        ] {
            let response = app()
                .oneshot(
                    Request::builder()
                        .method(method.clone())
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert!(
                response.headers().contains_key(header::WWW_AUTHENTICATE),
                "{method} {uri} should carry a challenge"
            );
            let body = body_json(response).await;
            assert_eq!(body["error"], "Authentication required");
        }
    }

    #[tokio::test]
    async fn malformed_basic_header_is_unauthorized() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/v1/user")
                    .header(header::AUTHORIZATION, "Basic not!base64")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn registration_validates_before_touching_storage() {
        let response = app()
            .oneshot(json_request(
                Method::POST,
                "/v1/user",
                r#"{
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "username": "ada",
                    "password": "difference-engine",
                    "role": "dean",
                    "email": "ada@example.edu"
                }"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "role must be student, admin, or instructor");
    }

    #[tokio::test]
    async fn malformed_json_body_is_a_bad_request() {
        let response = app()
            .oneshot(json_request(Method::POST, "/v1/user", "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn instructor_lookup_requires_an_id() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/instructor")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Instructor ID is required");
    }

    #[tokio::test]
    async fn course_lookup_rejects_a_malformed_id() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/course/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid course ID format");
    }

    #[tokio::test]
    async fn unknown_routes_return_json_not_found() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/degree")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Resource not found");
    }

    #[tokio::test]
    async fn healthz_rejects_other_methods() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
