//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    domain::DisplayName,
    infrastructure::dto::http::{HealthDto, PresenceDto},
    ui::state::AppState,
};

pub async fn root() -> &'static str {
    "Chat Server is running!"
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

/// Current presence snapshot
pub async fn get_presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let snapshot = state.get_presence_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(PresenceDto {
        display_names: snapshot
            .display_names
            .into_iter()
            .map(DisplayName::into_string)
            .collect(),
        connections: snapshot.connections,
    })
}
