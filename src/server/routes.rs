//! HTTP surface: one endpoint per concern.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api_connection::endpoints::ChatMessage;
use crate::errors::{NutriError, Result};
use crate::gateway::CompletionGateway;
use crate::meal_analyzer::{Ingredient, MealAnalyzer};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<CompletionGateway>,
    pub analyzer: Arc<MealAnalyzer>,
}

impl AppState {
    pub fn new(gateway: Arc<CompletionGateway>) -> Self {
        let analyzer = Arc::new(MealAnalyzer::new(Arc::clone(&gateway)));
        Self { gateway, analyzer }
    }
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeMealRequest {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze-meal", post(analyze_meal))
        .route("/chatgpt", post(chatgpt))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn analyze_meal(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeMealRequest>, JsonRejection>,
) -> Result<Json<Vec<Ingredient>>> {
    let Json(request) = payload?;
    let description = request.description.unwrap_or_default();

    let ingredients = state.analyzer.analyze(&description).await?;
    info!(count = ingredients.len(), "meal analyzed");
    Ok(Json(ingredients))
}

async fn chatgpt(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;
    let messages = request
        .messages
        .filter(|m| !m.is_empty())
        .ok_or_else(|| NutriError::InvalidInput("messages are required".to_string()))?;

    let body = state.gateway.relay(messages).await?;
    Ok(Json(body))
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
