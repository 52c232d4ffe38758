pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::explanation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Explanation API
        .route(
            "/api/v1/skills/normalize",
            post(handlers::handle_normalize_skills),
        )
        .route("/api/v1/reports/parse", post(handlers::handle_parse_report))
        .route(
            "/api/v1/recommendations/explain",
            post(handlers::handle_explain),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::explanation::dialect::ReportDialect;
    use crate::explanation::report_parser::ReportParser;

    fn router_with(config: Config) -> Router {
        build_router(AppState {
            config,
            report_parser: Arc::new(ReportParser::new(ReportDialect::standard()).unwrap()),
        })
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = router_with(Config::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_normalize_skills_route() {
        let (status, body) = post_json(
            router_with(Config::default()),
            "/api/v1/skills/normalize",
            json!({ "skills": "['Rust', 'Tokio']" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], json!(["Rust", "Tokio"]));
    }

    #[tokio::test]
    async fn test_parse_report_route_renders_fallback_text() {
        let report = "Per-candidate detailed analysis\n**Kim Min Su**\n⭐ Main feature: Go\n";
        let (status, body) = post_json(
            router_with(Config::default()),
            "/api/v1/reports/parse",
            json!({ "report": { "text": report } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["blocks"][0]["name"], "Kim Min Su");
        assert_eq!(body["blocks"][0]["main_feature"], "Go");
        assert_eq!(body["blocks"][0]["core_commonality"], "No analysis available");
    }

    #[tokio::test]
    async fn test_explain_route() {
        let (status, body) = post_json(
            router_with(Config::default()),
            "/api/v1/recommendations/explain",
            json!({
                "target": { "name": "Target", "position": "SRE", "skills": ["Linux"] },
                "recommendations": [{
                    "candidate": { "name": "Park", "position": "SRE", "experience": 4 },
                    "final_score": 0.7,
                    "vector_score": 0.7,
                    "keyword_score": 0.2,
                    "search_methods": ["vector", "keyword"]
                }],
                "report": { "text": null, "success": false }
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let explanation = &body["explanations"][0];
        assert_eq!(explanation["source"], "computed");
        assert_eq!(explanation["explanation"].as_array().map(Vec::len), Some(4));
        assert_eq!(explanation["explanation"][0]["text"], "Both work as SRE");
        assert_eq!(explanation["explanation"][1]["text"], "SRE, experience 4");
        assert_eq!(body["summary"]["computed"], 1);
    }

    #[tokio::test]
    async fn test_explain_rejects_oversized_batch() {
        let config = Config {
            max_batch_size: 1,
            ..Config::default()
        };
        let record = json!({ "candidate": { "name": "A" } });
        let (status, body) = post_json(
            router_with(config),
            "/api/v1/recommendations/explain",
            json!({
                "target": { "name": "Target" },
                "recommendations": [record.clone(), record]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
