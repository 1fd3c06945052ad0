//! Summary and analytics endpoints.

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use api_types::summary::{
    GroupActivityResponse, GroupStanding, GroupStandingView, MemberTotalsView, TimelinePointView,
    UserSummaryResponse,
};

use crate::{ServerError, server::ServerState};

fn standing_view(value: engine::GroupStanding) -> GroupStanding {
    match value {
        engine::GroupStanding::GetsBack => GroupStanding::GetsBack,
        engine::GroupStanding::Owes => GroupStanding::Owes,
        engine::GroupStanding::Settled => GroupStanding::Settled,
    }
}

pub async fn user_summary(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserSummaryResponse>, ServerError> {
    let summary = state.engine.user_summary(user_id).await?;

    Ok(Json(UserSummaryResponse {
        user_id: summary.user_id,
        name: summary.name,
        overall_balance_minor: summary.overall_balance.cents(),
        groups: summary
            .groups
            .into_iter()
            .map(|entry| GroupStandingView {
                group_id: entry.group_id,
                group_name: entry.group_name,
                balance_minor: entry.balance.cents(),
                status: standing_view(entry.standing),
            })
            .collect(),
    }))
}

pub async fn group_activity(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupActivityResponse>, ServerError> {
    let activity = state.engine.group_activity(group_id).await?;

    Ok(Json(GroupActivityResponse {
        group_id: activity.group_id,
        members: activity
            .members
            .into_iter()
            .map(|member| MemberTotalsView {
                member_id: member.member_id,
                name: member.name,
                total_paid_minor: member.total_paid.cents(),
                total_owed_minor: member.total_owed.cents(),
                net_minor: member.net.cents(),
            })
            .collect(),
        timeline: activity
            .timeline
            .into_iter()
            .map(|point| TimelinePointView {
                date: point.date,
                cumulative_minor: point.cumulative.cents(),
            })
            .collect(),
    }))
}
