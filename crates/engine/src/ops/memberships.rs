use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, group_members, users};

use super::{
    Engine, name_key, normalize_email, normalize_required_name, parse_member_id, with_tx,
};

/// One member to add: a user identity plus the display name to use.
#[derive(Clone, Debug)]
pub struct MemberAdd {
    pub email: String,
    pub name: String,
}

/// A membership joined with its user identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInfo {
    pub member_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MembersAdded {
    pub group_id: Uuid,
    pub added: Vec<MemberInfo>,
}

impl Engine {
    /// Adds members to a group, idempotently per user.
    ///
    /// For each entry, in order:
    /// - a display name already used in the group is a [`EngineError::Conflict`]
    /// - the user is looked up by email and created if missing
    /// - when the user already belongs to the group the entry is skipped
    /// - otherwise a membership row is inserted
    ///
    /// Returns only the memberships actually created.
    pub async fn add_members(
        &self,
        group_id: Uuid,
        members: &[MemberAdd],
    ) -> ResultEngine<MembersAdded> {
        if members.is_empty() {
            return Err(EngineError::InvalidInput(
                "members must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;

            let mut added = Vec::new();
            for member in members {
                let name = normalize_required_name(&member.name, "member")?;
                let email = normalize_email(&member.email)?;

                let existing = self.members_with_users(&db_tx, group_id).await?;
                if existing
                    .iter()
                    .any(|(_, user)| name_key(&user.name) == name_key(&name))
                {
                    return Err(EngineError::Conflict(name));
                }

                let user = match self.find_user_by_email(&db_tx, &email).await? {
                    Some(user) => user,
                    None => {
                        let model = users::ActiveModel {
                            id: ActiveValue::Set(Uuid::new_v4().to_string()),
                            name: ActiveValue::Set(name.clone()),
                            email: ActiveValue::Set(email.clone()),
                        };
                        model.insert(&db_tx).await?
                    }
                };

                if self
                    .find_membership(&db_tx, group_id, &user.id)
                    .await?
                    .is_some()
                {
                    continue;
                }

                let membership = group_members::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4().to_string()),
                    group_id: ActiveValue::Set(group_id.to_string()),
                    user_id: ActiveValue::Set(user.id.clone()),
                };
                let membership = membership.insert(&db_tx).await?;

                added.push(MemberInfo {
                    member_id: parse_member_id(&membership.id)?,
                    user_id: Uuid::parse_str(&user.id).map_err(|_| {
                        EngineError::InvalidInput("invalid user id".to_string())
                    })?,
                    name: user.name,
                    email: user.email,
                });
            }

            Ok(MembersAdded { group_id, added })
        })
    }

    /// Lists a group's members with their user identities.
    pub async fn list_members(&self, group_id: Uuid) -> ResultEngine<Vec<MemberInfo>> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;

            let rows = self.members_with_users(&db_tx, group_id).await?;
            let mut out = Vec::with_capacity(rows.len());
            for (member, user) in rows {
                out.push(MemberInfo {
                    member_id: parse_member_id(&member.id)?,
                    user_id: Uuid::parse_str(&user.id).map_err(|_| {
                        EngineError::InvalidInput("invalid user id".to_string())
                    })?,
                    name: user.name,
                    email: user.email,
                });
            }
            Ok(out)
        })
    }
}
