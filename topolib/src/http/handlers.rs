//! HTTP handlers for the REST API.

use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::{CallRequest, CallResponse, FunctionListResponse, HealthResponse};
use super::error::AppError;
use super::state::AppState;
use crate::engine::GeodesyEngine;
use crate::functions::Function;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.functions.facade().engine().name().to_string(),
    }))
}

/// GET /v1/functions
pub async fn list_functions(State(state): State<AppState>) -> HandlerResult<FunctionListResponse> {
    let functions: Vec<String> = state
        .functions
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let total = functions.len();
    Ok(Json(FunctionListResponse { functions, total }))
}

/// POST /v1/functions/{name}
///
/// Engine calls are synchronous and may touch the network or disk, so they
/// run on the blocking pool.
pub async fn call_function(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<CallRequest>,
) -> HandlerResult<CallResponse> {
    let function = Function::lookup(&name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown function '{}'", name)))?;
    let args = request.to_blocks().map_err(AppError::BadRequest)?;

    let functions = state.functions.clone();
    let value = tokio::task::spawn_blocking(move || functions.invoke(function, &args)).await?;

    Ok(Json(CallResponse {
        function: function.name().to_string(),
        value,
    }))
}
