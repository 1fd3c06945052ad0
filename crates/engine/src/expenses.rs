//! Expense primitives.
//!
//! An `Expense` is a payment one member made on behalf of the group. How it
//! is divided among members is described by its split type and recorded as
//! one split row per charged member.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitType {
    Equal,
    Exact,
    Percentage,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::Exact => "EXACT",
            Self::Percentage => "PERCENTAGE",
        }
    }
}

impl TryFrom<&str> for SplitType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EQUAL" => Ok(Self::Equal),
            "EXACT" => Ok(Self::Exact),
            "PERCENTAGE" => Ok(Self::Percentage),
            other => Err(EngineError::InvalidInput(format!(
                "invalid split type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub paid_by: Uuid,
    pub split_type: SplitType,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        group_id: Uuid,
        description: String,
        amount: MoneyCents,
        paid_by: Uuid,
        split_type: SplitType,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidInput(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            description,
            amount,
            paid_by,
            split_type,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub description: String,
    pub amount_minor: i64,
    pub paid_by: String,
    pub split_type: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
    #[sea_orm(
        belongs_to = "super::group_members::Entity",
        from = "Column::PaidBy",
        to = "super::group_members::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Payer,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id.to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            paid_by: ActiveValue::Set(expense.paid_by.to_string()),
            split_type: ActiveValue::Set(expense.split_type.as_str().to_string()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidInput("invalid expense id".to_string()))?,
            group_id: Uuid::parse_str(&model.group_id)
                .map_err(|_| EngineError::InvalidInput("invalid group id".to_string()))?,
            description: model.description,
            amount: MoneyCents::new(model.amount_minor),
            paid_by: Uuid::parse_str(&model.paid_by)
                .map_err(|_| EngineError::InvalidInput("invalid payer id".to_string()))?,
            split_type: SplitType::try_from(model.split_type.as_str())?,
            created_at: model.created_at,
        })
    }
}
