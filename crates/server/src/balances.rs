//! Group balance endpoint.

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use api_types::balance::{BalanceResponse, MemberBalanceView, TransferView};

use crate::{ServerError, member_ref, server::ServerState};

pub async fn get(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let balance = state.engine.group_balance(group_id).await?;

    Ok(Json(BalanceResponse {
        group_id: balance.group_id,
        group_name: balance.group_name,
        members: balance
            .members
            .into_iter()
            .map(|member| MemberBalanceView {
                member_id: member.member_id,
                name: member.name,
                total_paid_minor: member.total_paid.cents(),
                total_owed_minor: member.total_owed.cents(),
                balance_minor: member.balance.cents(),
            })
            .collect(),
        suggested_transfers: balance
            .transfers
            .into_iter()
            .map(|transfer| TransferView {
                from: member_ref(transfer.from),
                to: member_ref(transfer.to),
                amount_minor: transfer.amount.cents(),
            })
            .collect(),
    }))
}
