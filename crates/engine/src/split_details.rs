//! Split rows: one member's owed share of one expense.
//!
//! Exactly one row exists per (expense, member). `percent_bp` is only set
//! for PERCENTAGE splits and records the basis points that produced the
//! amount.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, split::SplitShare};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitDetail {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub member_id: Uuid,
    pub amount: MoneyCents,
    pub percent_bp: Option<i32>,
}

impl SplitDetail {
    pub fn new(expense_id: Uuid, share: &SplitShare) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            member_id: share.member_id,
            amount: share.amount,
            percent_bp: share.percent_bp,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "split_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub member_id: String,
    pub amount_minor: i64,
    pub percent_bp: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
    #[sea_orm(
        belongs_to = "super::group_members::Entity",
        from = "Column::MemberId",
        to = "super::group_members::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Members,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SplitDetail> for ActiveModel {
    fn from(detail: &SplitDetail) -> Self {
        Self {
            id: ActiveValue::Set(detail.id.to_string()),
            expense_id: ActiveValue::Set(detail.expense_id.to_string()),
            member_id: ActiveValue::Set(detail.member_id.to_string()),
            amount_minor: ActiveValue::Set(detail.amount.cents()),
            percent_bp: ActiveValue::Set(detail.percent_bp),
        }
    }
}

impl TryFrom<Model> for SplitDetail {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidInput("invalid split id".to_string()))?,
            expense_id: Uuid::parse_str(&model.expense_id)
                .map_err(|_| EngineError::InvalidInput("invalid expense id".to_string()))?,
            member_id: Uuid::parse_str(&model.member_id)
                .map_err(|_| EngineError::InvalidInput("invalid member id".to_string()))?,
            amount: MoneyCents::new(model.amount_minor),
            percent_bp: model.percent_bp,
        })
    }
}
