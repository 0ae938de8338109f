//! Root, health, and greeting endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// Configured application version
    pub version: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HelloQuery {
    /// Name to greet
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HelloResponse {
    pub message: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    /// Path of the interactive API docs
    pub docs: String,
}

#[utoipa::path(get, path = "/api/v1/health", tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse)))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: state.config.app_version.clone(),
    })
}

/// Greet the caller, by name when one is given.
#[utoipa::path(get, path = "/api/v1/hello", tag = "Greeting",
    params(HelloQuery),
    responses((status = 200, description = "Greeting", body = HelloResponse)))]
pub async fn hello(
    State(state): State<AppState>,
    Query(query): Query<HelloQuery>,
) -> Json<HelloResponse> {
    let app_name = &state.config.app_name;
    let message = match query.name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => format!("Hello, {}! Welcome to {}.", name, app_name),
        None => format!("Hello! Welcome to {}.", app_name),
    };
    Json(HelloResponse {
        message,
        name: query.name,
    })
}

#[utoipa::path(get, path = "/", tag = "Root",
    responses((status = 200, description = "Service banner", body = RootResponse)))]
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("Welcome to {}", state.config.app_name),
        version: state.config.app_version.clone(),
        docs: "/docs".to_string(),
    })
}
