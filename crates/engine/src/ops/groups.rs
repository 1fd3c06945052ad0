use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Group, ResultEngine, groups};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Creates a group.
    pub async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<Group> {
        let name = normalize_required_name(name, "group")?;
        let description = normalize_optional_text(description);
        let group = Group::new(name, description, Utc::now());
        let group_model: groups::ActiveModel = (&group).into();

        with_tx!(self, |db_tx| {
            group_model.insert(&db_tx).await?;
            Ok(group)
        })
    }

    /// Returns a group by id.
    pub async fn group(&self, group_id: Uuid) -> ResultEngine<Group> {
        with_tx!(self, |db_tx| {
            let model = self.require_group(&db_tx, group_id).await?;
            Group::try_from(model)
        })
    }
}
