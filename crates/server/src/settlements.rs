//! Settlement endpoint.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::settlement::{SettlementNew, SettlementResponse};
use engine::MoneyCents;

use crate::{ServerError, member_ref, server::ServerState};

pub async fn create(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<SettlementNew>,
) -> Result<(StatusCode, Json<SettlementResponse>), ServerError> {
    let recorded = state
        .engine
        .record_settlement(
            group_id,
            payload.from_member_id,
            payload.to_member_id,
            MoneyCents::new(payload.amount_minor),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SettlementResponse {
            id: recorded.id,
            from: member_ref(recorded.from),
            to: member_ref(recorded.to),
            amount_minor: recorded.amount.cents(),
            settled_at: recorded.settled_at,
        }),
    ))
}
