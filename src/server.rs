//! HTTP surface: upload an audio clip, get back an emotion label.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, info};

use crate::audio::{self, AudioError};
use crate::classifier::{self, ClassifierError, Predictor};
use crate::config::AnalysisConfig;
use crate::features::{FeatureError, FeatureExtractor, FeatureSelection};

/// Maximum accepted upload size (bytes)
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Shared state for the prediction endpoint.
///
/// The predictor is loaded once at startup and never reassigned; the mutex
/// serializes inference calls, which take `&mut` on the session.
#[derive(Clone)]
pub struct AppState {
    predictor: Arc<Mutex<dyn Predictor>>,
    analysis: AnalysisConfig,
}

impl AppState {
    pub fn new<P: Predictor + 'static>(predictor: P) -> Self {
        Self {
            predictor: Arc::new(Mutex::new(predictor)),
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Errors surfaced by the prediction endpoint.
///
/// The endpoint has no structured error shape; every failure maps to a 500
/// with a plain-text body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing 'file' field in multipart form")]
    MissingFile,

    #[error("Failed to read upload: {0}")]
    Upload(String),

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Classify(#[from] ClassifierError),

    #[error("Predictor lock poisoned")]
    Poisoned,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Prediction failed: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Build the service router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn predict_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut upload: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Upload(e.to_string()))?;
            upload = Some(bytes.to_vec());
            break;
        }
    }

    let upload = upload.ok_or(ApiError::MissingFile)?;
    debug!("Received upload of {} bytes", upload.len());

    // Scratch file scoped to this request; removed when dropped on every
    // exit path, so concurrent uploads never share a path.
    let mut temp = tempfile::NamedTempFile::new()?;
    temp.write_all(&upload)?;
    temp.flush()?;

    let clip = audio::read_wav(temp.path())?;
    debug!(
        "Decoded {} samples at {} Hz",
        clip.samples.len(),
        clip.sample_rate
    );

    let mut extractor = FeatureExtractor::new(state.analysis.clone(), clip.sample_rate)?;
    let features = extractor.extract(&clip.samples, FeatureSelection::default())?;
    let encoded = classifier::encode(&features);

    let emotion = state
        .predictor
        .lock()
        .map_err(|_| ApiError::Poisoned)?
        .predict(&encoded)?;

    info!("Predicted emotion: {}", emotion);

    Ok(Json(json!({ "emotion": emotion })))
}
