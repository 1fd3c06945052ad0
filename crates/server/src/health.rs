//! Liveness probe: checks the store connection is usable.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::server::ServerState;

pub async fn check(State(state): State<ServerState>) -> Result<Json<Value>, StatusCode> {
    state
        .db
        .ping()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(json!({ "status": "ok" })))
}
