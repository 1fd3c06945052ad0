//! Group endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::group::{GroupNew, GroupView};

use crate::{ServerError, server::ServerState};

fn group_view(group: engine::Group) -> GroupView {
    GroupView {
        id: group.id,
        name: group.name,
        description: group.description,
        created_at: group.created_at,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupView>), ServerError> {
    let group = state
        .engine
        .create_group(&payload.name, payload.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(group_view(group))))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupView>, ServerError> {
    let group = state.engine.group(group_id).await?;
    Ok(Json(group_view(group)))
}
