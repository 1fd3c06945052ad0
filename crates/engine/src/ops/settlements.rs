use chrono::{DateTime, Utc};
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, Settlement, settlements, users};

use super::{Engine, MemberRef, with_tx};

/// A recorded settlement with both parties' names resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementRecorded {
    pub id: Uuid,
    pub from: MemberRef,
    pub to: MemberRef,
    pub amount: MoneyCents,
    pub settled_at: DateTime<Utc>,
}

impl Engine {
    /// Validates and records a payment between two members of a group.
    ///
    /// Checks, in order: the group exists, both memberships belong to it,
    /// the parties differ, the amount is positive, and the amount does not
    /// exceed the payer's outstanding balance (absolute value). Balance
    /// recomputation and the insert run in the same transaction, so two
    /// concurrent settlements cannot both validate against a stale balance.
    pub async fn record_settlement(
        &self,
        group_id: Uuid,
        from_member: Uuid,
        to_member: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<SettlementRecorded> {
        if from_member == to_member {
            return Err(EngineError::InvalidInput(
                "from and to member must differ".to_string(),
            ));
        }
        if !amount.is_positive() {
            return Err(EngineError::InvalidInput(
                "settlement amount must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let from_model = self
                .require_member_in_group(&db_tx, group_id, from_member)
                .await?;
            let to_model = self
                .require_member_in_group(&db_tx, group_id, to_member)
                .await?;

            let totals = self.group_totals(&db_tx, group_id).await?;
            let available = totals
                .get(&from_member)
                .map(|t| t.net())
                .unwrap_or(MoneyCents::ZERO)
                .abs();
            if amount > available {
                return Err(EngineError::SettlementExceedsBalance {
                    requested: amount,
                    available,
                });
            }

            let settlement = Settlement::new(group_id, from_member, to_member, amount, Utc::now());
            settlements::ActiveModel::from(&settlement)
                .insert(&db_tx)
                .await?;

            let from_user = users::Entity::find_by_id(from_model.user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))?;
            let to_user = users::Entity::find_by_id(to_model.user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))?;

            Ok(SettlementRecorded {
                id: settlement.id,
                from: MemberRef {
                    id: from_member,
                    name: from_user.name,
                },
                to: MemberRef {
                    id: to_member,
                    name: to_user.name,
                },
                amount: settlement.amount,
                settled_at: settlement.settled_at,
            })
        })
    }
}
