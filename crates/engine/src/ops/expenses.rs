use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Expense, MoneyCents, ResultEngine, SplitDetail, SplitInput, SplitType,
    compute_splits, expenses, split_details,
};

use super::{Engine, MemberRef, normalize_required_name, with_tx};

/// Inputs for creating an expense together with its splits.
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub group_id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub paid_by: Uuid,
    pub split_type: SplitType,
    pub splits: Vec<SplitInput>,
}

/// One split row decorated with the member's display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitView {
    pub member_id: Uuid,
    pub member_name: String,
    pub amount: MoneyCents,
    pub percent_bp: Option<i32>,
}

/// A created (or fetched) expense with its full split list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseCreated {
    pub id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub split_type: SplitType,
    pub paid_by: MemberRef,
    pub splits: Vec<SplitView>,
    pub created_at: DateTime<Utc>,
}

/// Header-level expense view, as returned by the paged listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseView {
    pub id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub split_type: SplitType,
    pub paid_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ExpensesCursor {
    created_at: DateTime<Utc>,
    expense_id: String,
}

impl ExpensesCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidInput("invalid expenses cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidInput("invalid expenses cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidInput("invalid expenses cursor".to_string()))
    }
}

impl Engine {
    /// Creates an expense and its split rows in one transaction.
    ///
    /// Validates that the group exists, that the payer and every split
    /// member belong to it, and that the split inputs reconcile (see
    /// [`compute_splits`]). Either the expense and all of its splits are
    /// committed, or nothing is.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<ExpenseCreated> {
        let description = normalize_required_name(&cmd.description, "expense")?;

        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, cmd.group_id).await?;
            self.require_member_in_group(&db_tx, cmd.group_id, cmd.paid_by)
                .await?;

            let names = self.member_names(&db_tx, cmd.group_id).await?;
            for input in &cmd.splits {
                if !names.contains_key(&input.member_id) {
                    return Err(EngineError::NotFound(
                        "member not exists in group".to_string(),
                    ));
                }
            }

            let shares = compute_splits(cmd.amount, cmd.split_type, &cmd.splits)?;

            let expense = Expense::new(
                cmd.group_id,
                description,
                cmd.amount,
                cmd.paid_by,
                cmd.split_type,
                Utc::now(),
            )?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            let mut splits = Vec::with_capacity(shares.len());
            for share in &shares {
                let detail = SplitDetail::new(expense.id, share);
                split_details::ActiveModel::from(&detail)
                    .insert(&db_tx)
                    .await?;
                splits.push(SplitView {
                    member_id: share.member_id,
                    member_name: names
                        .get(&share.member_id)
                        .cloned()
                        .unwrap_or_default(),
                    amount: share.amount,
                    percent_bp: share.percent_bp,
                });
            }

            let payer_name = names.get(&cmd.paid_by).cloned().unwrap_or_default();
            Ok(ExpenseCreated {
                id: expense.id,
                description: expense.description,
                amount: expense.amount,
                split_type: expense.split_type,
                paid_by: MemberRef {
                    id: cmd.paid_by,
                    name: payer_name,
                },
                splits,
                created_at: expense.created_at,
            })
        })
    }

    /// Returns a single expense with all of its splits (detail view).
    pub async fn expense_with_splits(
        &self,
        group_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<ExpenseCreated> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let expense_model = self
                .require_expense_in_group(&db_tx, group_id, expense_id)
                .await?;
            let expense = Expense::try_from(expense_model)?;
            let names = self.member_names(&db_tx, group_id).await?;

            let detail_models: Vec<split_details::Model> = split_details::Entity::find()
                .filter(split_details::Column::ExpenseId.eq(expense_id.to_string()))
                .order_by_asc(split_details::Column::Id)
                .all(&db_tx)
                .await?;

            let mut splits = Vec::with_capacity(detail_models.len());
            for model in detail_models {
                let detail = SplitDetail::try_from(model)?;
                splits.push(SplitView {
                    member_id: detail.member_id,
                    member_name: names
                        .get(&detail.member_id)
                        .cloned()
                        .unwrap_or_default(),
                    amount: detail.amount,
                    percent_bp: detail.percent_bp,
                });
            }

            let payer_name = names.get(&expense.paid_by).cloned().unwrap_or_default();
            Ok(ExpenseCreated {
                id: expense.id,
                description: expense.description,
                amount: expense.amount,
                split_type: expense.split_type,
                paid_by: MemberRef {
                    id: expense.paid_by,
                    name: payer_name,
                },
                splits,
                created_at: expense.created_at,
            })
        })
    }

    /// Deletes an expense and all of its split rows in one transaction.
    pub async fn delete_expense(&self, group_id: Uuid, expense_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_expense_in_group(&db_tx, group_id, expense_id)
                .await?;

            split_details::Entity::delete_many()
                .filter(split_details::Column::ExpenseId.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }

    /// Lists a group's expenses with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(created_at DESC, id DESC)`; the
    /// cursor is an opaque base64 token from a previous page.
    pub async fn list_expenses_page(
        &self,
        group_id: Uuid,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<ExpenseView>, Option<String>)> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group_id.to_string()))
                .order_by_desc(expenses::Column::CreatedAt)
                .order_by_desc(expenses::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = ExpensesCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(expenses::Column::CreatedAt.lt(cursor.created_at))
                        .add(
                            Condition::all()
                                .add(expenses::Column::CreatedAt.eq(cursor.created_at))
                                .add(expenses::Column::Id.lt(cursor.expense_id)),
                        ),
                );
            }

            let rows: Vec<expenses::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<ExpenseView> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                let expense = Expense::try_from(model)?;
                out.push(ExpenseView {
                    id: expense.id,
                    description: expense.description,
                    amount: expense.amount,
                    split_type: expense.split_type,
                    paid_by: expense.paid_by,
                    created_at: expense.created_at,
                });
            }

            let next_cursor = out.last().map(|expense| ExpensesCursor {
                created_at: expense.created_at,
                expense_id: expense.id.to_string(),
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}
