//! Membership endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::member::{MemberView, MembersAddRequest, MembersAddedResponse, MembersResponse};

use crate::{ServerError, server::ServerState};

fn member_view(info: engine::MemberInfo) -> MemberView {
    MemberView {
        member_id: info.member_id,
        user_id: info.user_id,
        name: info.name,
        email: info.email,
    }
}

pub async fn add(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<MembersAddRequest>,
) -> Result<(StatusCode, Json<MembersAddedResponse>), ServerError> {
    let members: Vec<engine::MemberAdd> = payload
        .members
        .into_iter()
        .map(|member| engine::MemberAdd {
            email: member.email,
            name: member.name,
        })
        .collect();

    let result = state.engine.add_members(group_id, &members).await?;

    Ok((
        StatusCode::CREATED,
        Json(MembersAddedResponse {
            group_id: result.group_id,
            members_added: result.added.into_iter().map(member_view).collect(),
        }),
    ))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .list_members(group_id)
        .await?
        .into_iter()
        .map(member_view)
        .collect();

    Ok(Json(MembersResponse { members }))
}
