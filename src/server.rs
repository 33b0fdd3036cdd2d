//! HTTP surface.
//!
//! Endpoints:
//!   POST /analyze_dream   → interpret a dream, store and return it
//!   GET  /dream_history   → every stored dream, oldest first

use crate::interpret::{build_prompt, parse_interpretation};
use crate::provider::{ProviderError, TextProvider};
use crate::store::{DreamRecord, DreamStore, NewDream, StoreError};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

pub const INVALID_API_KEY_MESSAGE: &str = "Invalid API key. Please check your Gemini API key.";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DreamStore>,
    pub provider: Arc<dyn TextProvider>,
}

#[derive(Debug, Deserialize)]
pub struct DreamRequest {
    pub dream_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DreamResponse {
    pub dream_text: String,
    pub interpretation: String,
    pub emotion: String,
    pub confidence: f64,
}

impl From<DreamRecord> for DreamResponse {
    fn from(r: DreamRecord) -> Self {
        Self {
            dream_text: r.dream_text,
            interpretation: r.interpretation,
            emotion: r.emotion,
            confidence: r.confidence,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", INVALID_API_KEY_MESSAGE)]
    InvalidApiKey,
    #[error("An error occurred while processing your request: {0}")]
    Processing(String),
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        if e.is_auth() {
            ApiError::InvalidApiKey
        } else {
            ApiError::Processing(e.to_string())
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Processing(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(serde_json::json!({ "detail": self.to_string() })),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze_dream", post(analyze_dream))
        .route("/dream_history", get(dream_history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn analyze_dream(
    State(state): State<AppState>,
    Json(dream): Json<DreamRequest>,
) -> Result<Json<DreamResponse>, ApiError> {
    info!("Interpreting dream ({} chars)", dream.dream_text.len());

    let prompt = build_prompt(&dream.dream_text);
    let raw = state.provider.generate(&prompt).await.map_err(|e| {
        warn!("Provider call failed: {}", e);
        ApiError::from(e)
    })?;

    let parsed = parse_interpretation(&raw);
    let saved = state
        .store
        .create(NewDream {
            dream_text: dream.dream_text,
            interpretation: parsed.interpretation,
            emotion: parsed.emotion,
            confidence: parsed.confidence,
        })
        .await
        .map_err(|e| {
            error!("Failed to store dream: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(saved.into()))
}

async fn dream_history(State(state): State<AppState>) -> Result<Json<Vec<DreamRecord>>, ApiError> {
    let dreams = state.store.list_all().await.map_err(|e| {
        error!("Failed to load dream history: {}", e);
        ApiError::from(e)
    })?;
    Ok(Json(dreams))
}
