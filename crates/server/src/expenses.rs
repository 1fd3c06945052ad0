//! Expense endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::expense::{
    ExpenseListParams, ExpenseListResponse, ExpenseNew, ExpenseResponse, ExpenseView, SplitType,
    SplitView,
};
use engine::MoneyCents;

use crate::{ServerError, member_ref, server::ServerState};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

fn split_type_to_engine(value: SplitType) -> engine::SplitType {
    match value {
        SplitType::Equal => engine::SplitType::Equal,
        SplitType::Exact => engine::SplitType::Exact,
        SplitType::Percentage => engine::SplitType::Percentage,
    }
}

fn split_type_view(value: engine::SplitType) -> SplitType {
    match value {
        engine::SplitType::Equal => SplitType::Equal,
        engine::SplitType::Exact => SplitType::Exact,
        engine::SplitType::Percentage => SplitType::Percentage,
    }
}

fn expense_response(created: engine::ExpenseCreated) -> ExpenseResponse {
    ExpenseResponse {
        id: created.id,
        description: created.description,
        amount_minor: created.amount.cents(),
        split_type: split_type_view(created.split_type),
        paid_by: member_ref(created.paid_by),
        splits: created
            .splits
            .into_iter()
            .map(|split| SplitView {
                member_id: split.member_id,
                member_name: split.member_name,
                amount_minor: split.amount.cents(),
                percent_bp: split.percent_bp,
            })
            .collect(),
        created_at: created.created_at,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ServerError> {
    let cmd = engine::CreateExpenseCmd {
        group_id,
        description: payload.description,
        amount: MoneyCents::new(payload.amount_minor),
        paid_by: payload.paid_by,
        split_type: split_type_to_engine(payload.split_type),
        splits: payload
            .splits
            .iter()
            .map(|split| engine::SplitInput {
                member_id: split.member_id,
                amount: split.amount_minor.map(MoneyCents::new),
                percent_bp: split.percent_bp,
            })
            .collect(),
    };

    let created = state.engine.create_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(expense_response(created))))
}

pub async fn get_detail(
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ExpenseResponse>, ServerError> {
    let expense = state.engine.expense_with_splits(group_id, expense_id).await?;
    Ok(Json(expense_response(expense)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path((group_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(group_id, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    State(state): State<ServerState>,
    Path(group_id): Path<Uuid>,
    Query(params): Query<ExpenseListParams>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .min(MAX_PAGE_SIZE);
    let (expenses, next_cursor) = state
        .engine
        .list_expenses_page(group_id, limit, params.cursor.as_deref())
        .await?;

    Ok(Json(ExpenseListResponse {
        expenses: expenses
            .into_iter()
            .map(|expense| ExpenseView {
                id: expense.id,
                description: expense.description,
                amount_minor: expense.amount.cents(),
                split_type: split_type_view(expense.split_type),
                paid_by: expense.paid_by,
                created_at: expense.created_at,
            })
            .collect(),
        next_cursor,
    }))
}
