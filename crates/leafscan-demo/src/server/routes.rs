use crate::acquire::{acquire, CaptureSource};
use crate::config::PageConfig;
use crate::pipeline;
use crate::render::{
    render_acquire_error, render_analysis, render_idle, render_inference_error, render_load_error,
    PageView,
};
use crate::state::{AppState, ModelStatus};
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use leafscan_core::{AcquireError, InferenceError};
use serde::Serialize;
use tracing::debug;

// ============================================================================
// Health endpoints
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}

// ============================================================================
// Model status
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ready: bool,
    pub model: Option<String>,
    pub classes: usize,
    /// Blocking load error text, when the model is unavailable
    pub error: Option<String>,
    pub page: PageConfig,
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let page = state.config.page.clone();
    let response = match &state.model {
        ModelStatus::Ready(classifier) => StatusResponse {
            ready: true,
            model: Some(classifier.name().to_string()),
            classes: classifier.labels().len(),
            error: None,
            page,
        },
        ModelStatus::Unavailable(e) => StatusResponse {
            ready: false,
            model: None,
            classes: 0,
            error: render_load_error(e).banner.map(|b| b.text),
            page,
        },
    };
    Json(response)
}

// ============================================================================
// Analysis
// ============================================================================

/// Multipart fields of an analyze request
#[derive(Debug, Default)]
struct AnalyzeForm {
    source: CaptureSource,
    image: Option<Bytes>,
}

async fn read_form(multipart: &mut Multipart) -> Result<AnalyzeForm, Response> {
    let mut form = AnalyzeForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("source") => {
                let text = field.text().await.map_err(IntoResponse::into_response)?;
                form.source = text
                    .parse()
                    .map_err(|e: String| (StatusCode::BAD_REQUEST, e).into_response())?;
            }
            Some("image") => {
                form.image = Some(field.bytes().await.map_err(IntoResponse::into_response)?);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(form)
}

pub async fn analyze(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let classifier = match &state.model {
        ModelStatus::Ready(classifier) => classifier.clone(),
        ModelStatus::Unavailable(e) => {
            return view_response(StatusCode::SERVICE_UNAVAILABLE, render_load_error(e));
        }
    };

    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let leaf = match acquire(form.source, form.image.as_deref()) {
        Ok(Some(leaf)) => leaf,
        Ok(None) => return view_response(StatusCode::OK, render_idle()),
        Err(e) => {
            metrics::counter!("leafscan_errors_total", "kind" => e.kind()).increment(1);
            let status = match &e {
                AcquireError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                AcquireError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            };
            return view_response(status, render_acquire_error(&e));
        }
    };

    match pipeline::analyze(classifier, leaf, state.transient.clone()).await {
        Ok(report) => view_response(StatusCode::OK, render_analysis(&report, &state.config.page)),
        Err(e) => view_response(inference_status(&e), render_inference_error(&e)),
    }
}

/// The transient image failing to round-trip is the client's image; anything else is ours
fn inference_status(error: &InferenceError) -> StatusCode {
    match error {
        InferenceError::Image(_) => StatusCode::UNPROCESSABLE_ENTITY,
        InferenceError::Io(_) | InferenceError::Runtime(_) | InferenceError::MalformedResult(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn view_response(status: StatusCode, view: PageView) -> Response {
    (status, Json(view)).into_response()
}
