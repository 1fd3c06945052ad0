//! Settlements: recorded payments between two members of the same group.
//!
//! Settlement rows are append-only. There is no update or reversal surface;
//! a mistaken payment is corrected with a payment in the other direction.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::MoneyCents;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub id: Uuid,
    pub group_id: Uuid,
    pub from_member_id: Uuid,
    pub to_member_id: Uuid,
    pub amount: MoneyCents,
    pub settled_at: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        group_id: Uuid,
        from_member_id: Uuid,
        to_member_id: Uuid,
        amount: MoneyCents,
        settled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            from_member_id,
            to_member_id,
            amount,
            settled_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: String,
    pub from_member_id: String,
    pub to_member_id: String,
    pub amount_minor: i64,
    pub settled_at: DateTimeUtc,
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
        from = "Column::FromMemberId",
        to = "super::group_members::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    FromMember,
    #[sea_orm(
        belongs_to = "super::group_members::Entity",
        from = "Column::ToMemberId",
        to = "super::group_members::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ToMember,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Settlement> for ActiveModel {
    fn from(settlement: &Settlement) -> Self {
        Self {
            id: ActiveValue::Set(settlement.id.to_string()),
            group_id: ActiveValue::Set(settlement.group_id.to_string()),
            from_member_id: ActiveValue::Set(settlement.from_member_id.to_string()),
            to_member_id: ActiveValue::Set(settlement.to_member_id.to_string()),
            amount_minor: ActiveValue::Set(settlement.amount.cents()),
            settled_at: ActiveValue::Set(settlement.settled_at),
        }
    }
}

