// POST /api/blog/titles: extract topics from the body and title each one.
//
// Request:  {"content": "...", "max_concurrency": 4}   (max_concurrency optional)
// Response: {"topic_titles": [{"topic": "...", "titles": ["...", "..."]}]}

use std::num::NonZeroUsize;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::PipelineError;
use crate::topics::model::InputText;
use crate::web::{api_error, AppState};

#[derive(Debug, Deserialize)]
pub struct TitlesRequest {
    pub content: String,
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

/// Run the pipeline once for the posted text.
pub async fn generate_titles(
    State(state): State<AppState>,
    payload: Result<Json<TitlesRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return api_error(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    let text = InputText::new(request.content);
    if text.is_blank() {
        return api_error(StatusCode::BAD_REQUEST, "content must not be empty");
    }

    let pipeline = match request.max_concurrency {
        None => state.pipeline.clone(),
        Some(n) => match NonZeroUsize::new(n) {
            Some(n) => state.pipeline.with_max_concurrency(n),
            None => {
                return api_error(StatusCode::BAD_REQUEST, "max_concurrency must be at least 1")
            }
        },
    };

    match pipeline.run_with_deadline(&text, state.run_timeout).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => pipeline_error_response(&e),
    }
}

/// Map a pipeline failure to a single HTTP error.
fn pipeline_error_response(err: &PipelineError) -> Response {
    let status = match err {
        PipelineError::Extraction(_) | PipelineError::Generation(_) => StatusCode::BAD_GATEWAY,
        PipelineError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
    };

    let mut body = serde_json::json!({
        "error": err.to_string(),
        "stage": err.stage(),
    });
    if let PipelineError::Generation(generation) = err {
        body["topic"] = serde_json::json!(generation.topic());
        body["index"] = serde_json::json!(generation.index());
    }

    (status, Json(body)).into_response()
}
