//! Pattern and model catalog routes.
//!
//! # Endpoints
//!
//! - `GET /patterns?alternate=` - List patterns
//! - `GET /models?alternate=` - List models
//! - `POST /models/default` - Change fabric's default model

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};

use crate::api::error::ApiResult;
use crate::api::models::{
    CatalogQuery, DefaultModelRequest, ModelListResponse, OutputResponse, PatternListResponse,
};
use crate::api::server::AppState;
use crate::pipeline::Flavor;

/// Create the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/patterns", get(list_patterns))
        .route("/models", get(list_models))
        .route("/models/default", post(set_default_model))
}

async fn list_patterns(
    State(state): State<AppState>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> ApiResult<Json<PatternListResponse>> {
    let Query(query) = query?;
    let patterns = state.connector.list_templates(query.flavor()).await?;
    Ok(Json(PatternListResponse::new(patterns)))
}

async fn list_models(
    State(state): State<AppState>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> ApiResult<Json<ModelListResponse>> {
    let Query(query) = query?;
    let models = state.connector.list_models(query.flavor()).await?;
    Ok(Json(ModelListResponse::new(models)))
}

async fn set_default_model(
    State(state): State<AppState>,
    payload: Result<Json<DefaultModelRequest>, JsonRejection>,
) -> ApiResult<Json<OutputResponse>> {
    let Json(body) = payload?;
    let flavor = Flavor::from_alternate(body.alternate);
    let output = state.connector.set_default_model(flavor, &body.model).await?;
    Ok(Json(OutputResponse { output }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::api::routes::create_router;
    use crate::api::server::AppState;
    use crate::pipeline::test_support::{ScriptedLauncher, unix_strategy};
    use crate::service::Connector;

    fn app(launcher: Arc<ScriptedLauncher>, root: &std::path::Path) -> axum::Router {
        let connector = Connector::new(unix_strategy(), launcher, root);
        create_router(AppState::new(Arc::new(connector)))
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_patterns_local() {
        let root = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::new(vec![Ok("summarize\nextract_wisdom\n".to_string())]);

        let (status, body) = get_json(app(launcher.clone(), root.path()), "/patterns").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"data": {"patterns": [{"name": "summarize"}, {"name": "extract_wisdom"}]}})
        );
        assert_eq!(launcher.calls()[0].tool_argv()[1], "--list");
    }

    #[tokio::test]
    async fn test_list_models_alternate() {
        let root = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::new(vec![Ok("Available models:\n[1] gpt-4o\n[2] llama3".to_string())]);

        let (status, body) =
            get_json(app(launcher.clone(), root.path()), "/models?alternate=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["models"][0]["name"], "gpt-4o");
        assert_eq!(body["data"]["models"][1]["name"], "llama3");
        assert_eq!(launcher.calls()[0].tool_argv()[0], "/home/me/go/bin/fabric");
    }

    #[tokio::test]
    async fn test_set_default_model() {
        let root = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::new(vec![Ok("Default model changed".to_string())]);
        let app = app(launcher.clone(), root.path());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/models/default")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"model": "gpt-4o"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            launcher.calls()[0].tool_argv(),
            &["/home/me/.local/bin/fabric", "--changeDefaultModel", "gpt-4o"]
        );
    }

    #[tokio::test]
    async fn test_bad_query_and_body_are_validation_errors() {
        let root = tempfile::tempdir().unwrap();
        let launcher = ScriptedLauncher::new(vec![]);

        let (status, body) =
            get_json(app(launcher.clone(), root.path()), "/models?alternate=maybe").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let response = app(launcher.clone(), root.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/models/default")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"alternate": true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");

        assert!(launcher.calls().is_empty());
    }
}
