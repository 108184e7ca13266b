//! Pipeline routes.
//!
//! # Endpoints
//!
//! - `POST /fabric` - Run patterns over text
//! - `POST /yt` - Run patterns over a video transcript
//! - `POST /file` - Run patterns over a transcribed media file

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::models::{
    FilePipelineRequest, OutputResponse, TextPipelineRequest, UrlPipelineRequest,
};
use crate::api::server::AppState;

/// Create the pipeline router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fabric", post(run_text))
        .route("/yt", post(run_url))
        .route("/file", post(run_file))
}

async fn run_text(
    State(state): State<AppState>,
    payload: Result<Json<TextPipelineRequest>, JsonRejection>,
) -> ApiResult<Json<OutputResponse>> {
    let Json(body) = payload?;
    let request = body.options.into_request()?;
    info!(patterns = ?request.steps(), text_bytes = body.data.len(), "Text pipeline requested");

    let output = state.connector.run_text(&request, &body.data).await?;
    Ok(Json(OutputResponse { output }))
}

async fn run_url(
    State(state): State<AppState>,
    payload: Result<Json<UrlPipelineRequest>, JsonRejection>,
) -> ApiResult<Json<OutputResponse>> {
    let Json(body) = payload?;
    let request = body.options.into_request()?;
    info!(patterns = ?request.steps(), url = %body.url, "URL pipeline requested");

    let output = state.connector.run_url(&request, &body.url).await?;
    Ok(Json(OutputResponse { output }))
}

async fn run_file(
    State(state): State<AppState>,
    payload: Result<Json<FilePipelineRequest>, JsonRejection>,
) -> ApiResult<Json<OutputResponse>> {
    let Json(body) = payload?;
    let request = body.options.into_request()?;
    info!(patterns = ?request.steps(), path = %body.path, "File pipeline requested");

    let output = state.connector.run_file(&request, &body.path).await?;
    Ok(Json(OutputResponse { output }))
}
