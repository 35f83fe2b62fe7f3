//! superclass-server - REST API server for superclass.
//!
//! Exposes document classification (`POST /classify`), feature extraction
//! (`POST /features`), the supported format list and the model catalog over
//! HTTP.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use superclass_classifiers::ClassifierFactory;
//! use superclass_core::{ClassificationPipeline, Settings};
//! use superclass_extractors::ExtractorRegistry;
//! use superclass_server::{create_server, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(ExtractorRegistry::with_defaults()?);
//!     let pipeline = ClassificationPipeline::new(registry, Arc::new(ClassifierFactory::default()));
//!     let state = AppState::new(pipeline, Settings::from_env()?, ServerConfig::from_env()?);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, create_server(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use superclass_core::catalog::{self, ContentType};
    use superclass_core::error::SuperclassResult;
    use superclass_core::traits::{BackendFactory, Classifier, Prompt};
    use superclass_core::types::{ModelConfig, Provider};
    use superclass_core::{ClassificationPipeline, Settings};
    use superclass_extractors::ExtractorRegistry;

    const BOUNDARY: &str = "superclass-test-boundary";

    /// Backend answering every prompt with the same reply.
    struct FixedReply {
        reply: String,
        config: ModelConfig,
    }

    #[async_trait]
    impl Classifier for FixedReply {
        async fn complete(&self, _prompt: &Prompt) -> SuperclassResult<String> {
            Ok(self.reply.clone())
        }

        fn configure(&mut self, config: ModelConfig) -> SuperclassResult<()> {
            self.config.merge(config);
            Ok(())
        }

        fn config(&self) -> &ModelConfig {
            &self.config
        }

        fn provider(&self) -> Provider {
            Provider::OpenAI
        }
    }

    struct FixedReplyFactory(String);

    impl BackendFactory for FixedReplyFactory {
        fn create(&self, _provider: Provider, config: &ModelConfig) -> SuperclassResult<Box<dyn Classifier>> {
            Ok(Box::new(FixedReply {
                reply: self.0.clone(),
                config: config.clone(),
            }))
        }
    }

    fn app(reply: Value, upload_dir: &std::path::Path) -> Router {
        let pipeline = ClassificationPipeline::new(
            Arc::new(ExtractorRegistry::new()),
            Arc::new(FixedReplyFactory(reply.to_string())),
        );
        let config = ServerConfig {
            upload_dir: upload_dir.to_path_buf(),
            ..Default::default()
        };
        create_server(AppState::new(pipeline, Settings::default(), config))
    }

    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\r\n",
                    name, file_name
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                    name
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));

        Request::builder()
            .method("POST")
            .uri("/classify")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn classification_reply() -> Value {
        json!({"category": "finance", "confidence": 0.9, "summary": "Quarterly numbers", "keywords": ["revenue"]})
    }

    #[tokio::test]
    async fn test_health_sets_request_id() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(classification_reply(), dir.path())
            .oneshot(get("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(middleware::REQUEST_ID_HEADER));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_formats() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(classification_reply(), dir.path()), get("/formats")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["formats"], json!([".txt"]));
    }

    #[tokio::test]
    async fn test_classify_text_upload() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart(&[
            ("file", Some("q3.txt"), "Revenue grew 12% this quarter"),
            ("categories", None, r#"["Tech", "Finance"]"#),
        ]);
        let (status, body) = send(app(classification_reply(), dir.path()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "Finance");
        assert_eq!(body["keywords"], json!(["revenue"]));
        assert_eq!(body["raw_text"], "Revenue grew 12% this quarter");
        // Staged uploads are removed once the request finishes.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_classify_without_text() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart(&[
            ("file", Some("notes.txt"), "some notes"),
            ("include_text", None, "false"),
        ]);
        let (status, body) = send(app(classification_reply(), dir.path()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.get("raw_text").is_none());
    }

    #[tokio::test]
    async fn test_classify_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart(&[("file", Some("clip.mp4"), "binary")]);
        let (status, body) = send(app(classification_reply(), dir.path()), request).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "EXT_001");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_classify_category_violation() {
        let dir = tempfile::tempdir().unwrap();
        let request = multipart(&[
            ("file", Some("match.txt"), "The match ended 2-1"),
            ("categories", None, r#"["Tech"]"#),
        ]);
        let (status, body) = send(app(json!({"category": "Sports"}), dir.path()), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "CAT_001");
    }

    #[tokio::test]
    async fn test_classify_rejects_bad_form() {
        let dir = tempfile::tempdir().unwrap();

        let (status, _) = send(
            app(classification_reply(), dir.path()),
            multipart(&[("categories", None, r#"["Tech"]"#)]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            app(classification_reply(), dir.path()),
            multipart(&[("file", Some("a.txt"), "x"), ("categories", None, "Tech, Finance")]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("categories"));
    }

    #[tokio::test]
    async fn test_features_report() {
        let dir = tempfile::tempdir().unwrap();
        let reply = json!({"category": "Tech", "word_count": 4, "sentiment_score": 0.2});
        let mut request = multipart(&[("file", Some("doc.txt"), "Rust compiles to native code")]);
        *request.uri_mut() = "/features".parse().unwrap();

        let (status, body) = send(app(reply, dir.path()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["classification"]["category"], "Tech");
        assert_eq!(body["features"]["word_count"], 4);
        assert!(body.get("features_error").map_or(true, Value::is_null));
    }

    #[tokio::test]
    async fn test_model_lookup() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(app(classification_reply(), dir.path()), get("/models/gpt-4")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "gpt-4");

        let (status, body) = send(app(classification_reply(), dir.path()), get("/models/gpt-9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "MOD_001");

        let (status, body) = send(app(classification_reply(), dir.path()), get("/models")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["models"].as_array().unwrap().len(), catalog::models().len());
    }

    #[tokio::test]
    async fn test_estimate_and_compare() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(
            app(classification_reply(), dir.path()),
            post_json("/models/estimate", json!({"model": "gpt-4", "input_tokens": 1000, "output_tokens": 1000})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!((body["estimated_cost"].as_f64().unwrap() - 0.09).abs() < 1e-9);

        let (status, _) = send(
            app(classification_reply(), dir.path()),
            post_json("/models/estimate", json!({"model": "nope", "input_tokens": 1, "output_tokens": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            app(classification_reply(), dir.path()),
            post_json("/models/compare", json!({"first": "gpt-4", "second": "gpt-3.5-turbo"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["token_limit_diff"].as_i64().unwrap(),
            i64::from(catalog::model_info("gpt-4").unwrap().max_tokens)
                - i64::from(catalog::model_info("gpt-3.5-turbo").unwrap().max_tokens)
        );
    }

    #[tokio::test]
    async fn test_recommend_uses_server_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(classification_reply(), dir.path()),
            post_json("/models/recommend", json!({"content_type": "technical_doc"})),
        )
        .await;

        let expected = catalog::recommend_models(
            ContentType::TechnicalDoc,
            &ServerConfig::default().default_constraints(),
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["content_type"], "technical_doc");
        assert_eq!(body["models"], json!(expected));
    }
}
