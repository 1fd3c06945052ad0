use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{JoinType, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, expenses, group_members, groups, split_details,
};

use super::{Engine, parse_member_id, with_tx};

/// Whether a member is owed money, owes money, or is even.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStanding {
    GetsBack,
    Owes,
    Settled,
}

impl GroupStanding {
    fn for_balance(balance: MoneyCents) -> Self {
        if balance.is_positive() {
            Self::GetsBack
        } else if balance.is_negative() {
            Self::Owes
        } else {
            Self::Settled
        }
    }
}

/// One group's standing within a user summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupStandingEntry {
    pub group_id: Uuid,
    pub group_name: String,
    pub balance: MoneyCents,
    pub standing: GroupStanding,
}

/// A user's balance across every group they belong to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub name: String,
    pub overall_balance: MoneyCents,
    pub groups: Vec<GroupStandingEntry>,
}

/// Expense-only paid/owed/net totals for one member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberTotals {
    pub member_id: Uuid,
    pub name: String,
    pub total_paid: MoneyCents,
    pub total_owed: MoneyCents,
    pub net: MoneyCents,
}

/// Running group spend at the end of one calendar day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub cumulative: MoneyCents,
}

/// Spending analytics for one group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupActivity {
    pub group_id: Uuid,
    pub members: Vec<MemberTotals>,
    pub timeline: Vec<TimelinePoint>,
}

impl Engine {
    /// Summarises a user's standing in every group they belong to.
    pub async fn user_summary(&self, user_id: Uuid) -> ResultEngine<UserSummary> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;

            let memberships: Vec<group_members::Model> = group_members::Entity::find()
                .filter(group_members::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(group_members::Column::Id)
                .all(&db_tx)
                .await?;

            let mut entries = Vec::with_capacity(memberships.len());
            let mut overall = MoneyCents::ZERO;
            for membership in memberships {
                let group_id = Uuid::parse_str(&membership.group_id)
                    .map_err(|_| EngineError::InvalidInput("invalid group id".to_string()))?;
                let group = groups::Entity::find_by_id(membership.group_id.clone())
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::NotFound("group not exists".to_string()))?;

                let member_id = parse_member_id(&membership.id)?;
                let totals = self.group_totals(&db_tx, group_id).await?;
                let balance = totals
                    .get(&member_id)
                    .map(|t| t.net())
                    .unwrap_or(MoneyCents::ZERO);
                overall += balance;

                entries.push(GroupStandingEntry {
                    group_id,
                    group_name: group.name,
                    balance,
                    standing: GroupStanding::for_balance(balance),
                });
            }

            Ok(UserSummary {
                user_id,
                name: user.name,
                overall_balance: overall,
                groups: entries,
            })
        })
    }

    /// Returns spending analytics for a group: expense-only totals per
    /// member and a cumulative day-by-day spend timeline.
    pub async fn group_activity(&self, group_id: Uuid) -> ResultEngine<GroupActivity> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let names = self.member_names(&db_tx, group_id).await?;

            let expense_models: Vec<expenses::Model> = expenses::Entity::find()
                .filter(expenses::Column::GroupId.eq(group_id.to_string()))
                .order_by_asc(expenses::Column::CreatedAt)
                .order_by_asc(expenses::Column::Id)
                .all(&db_tx)
                .await?;
            let split_models: Vec<split_details::Model> = split_details::Entity::find()
                .join(JoinType::InnerJoin, split_details::Relation::Expenses.def())
                .filter(expenses::Column::GroupId.eq(group_id.to_string()))
                .all(&db_tx)
                .await?;

            let mut paid: BTreeMap<Uuid, i64> = BTreeMap::new();
            let mut owed: BTreeMap<Uuid, i64> = BTreeMap::new();
            for expense in &expense_models {
                *paid.entry(parse_member_id(&expense.paid_by)?).or_default() +=
                    expense.amount_minor;
            }
            for split in &split_models {
                *owed.entry(parse_member_id(&split.member_id)?).or_default() +=
                    split.amount_minor;
            }

            let members = names
                .iter()
                .map(|(member_id, name)| {
                    let total_paid = paid.get(member_id).copied().unwrap_or(0);
                    let total_owed = owed.get(member_id).copied().unwrap_or(0);
                    MemberTotals {
                        member_id: *member_id,
                        name: name.clone(),
                        total_paid: MoneyCents::new(total_paid),
                        total_owed: MoneyCents::new(total_owed),
                        net: MoneyCents::new(total_paid - total_owed),
                    }
                })
                .collect();

            // Fold daily totals first so a day with several expenses yields
            // one timeline point.
            let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
            for expense in &expense_models {
                *per_day.entry(expense.created_at.date_naive()).or_default() +=
                    expense.amount_minor;
            }
            let mut timeline = Vec::with_capacity(per_day.len());
            let mut cumulative = 0i64;
            for (date, amount) in per_day {
                cumulative += amount;
                timeline.push(TimelinePoint {
                    date,
                    cumulative: MoneyCents::new(cumulative),
                });
            }

            Ok(GroupActivity {
                group_id,
                members,
                timeline,
            })
        })
    }
}
