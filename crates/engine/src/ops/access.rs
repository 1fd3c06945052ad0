use std::collections::BTreeMap;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, expenses, group_members, groups, users};

use super::{Engine, parse_member_id};

impl Engine {
    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("group not exists".to_string()))
    }

    pub(super) async fn require_member_in_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        member_id: Uuid,
    ) -> ResultEngine<group_members::Model> {
        group_members::Entity::find_by_id(member_id.to_string())
            .filter(group_members::Column::GroupId.eq(group_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("member not exists in group".to_string()))
    }

    pub(super) async fn require_expense_in_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<expenses::Model> {
        expenses::Entity::find_by_id(expense_id.to_string())
            .filter(expenses::Column::GroupId.eq(group_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("expense not exists in group".to_string()))
    }

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))
    }

    pub(super) async fn find_user_by_email(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn find_membership(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<group_members::Model>> {
        group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.to_string()))
            .filter(group_members::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Loads a group's memberships joined with their users, ordered by
    /// membership id.
    pub(super) async fn members_with_users(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<(group_members::Model, users::Model)>> {
        let rows: Vec<(group_members::Model, Option<users::Model>)> =
            group_members::Entity::find()
                .filter(group_members::Column::GroupId.eq(group_id.to_string()))
                .order_by_asc(group_members::Column::Id)
                .find_also_related(users::Entity)
                .all(db)
                .await?;

        let mut out = Vec::with_capacity(rows.len());
        for (member, user) in rows {
            let user = user
                .ok_or_else(|| EngineError::NotFound("user not exists".to_string()))?;
            out.push((member, user));
        }
        Ok(out)
    }

    /// Member id → display name for every member of the group.
    pub(super) async fn member_names(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<BTreeMap<Uuid, String>> {
        let rows = self.members_with_users(db, group_id).await?;
        let mut names = BTreeMap::new();
        for (member, user) in rows {
            names.insert(parse_member_id(&member.id)?, user.name);
        }
        Ok(names)
    }
}
