use sea_orm::DatabaseConnection;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod access;
mod balances;
mod expenses;
mod groups;
mod memberships;
mod reports;
mod settlements;

pub use balances::{GroupBalance, MemberBalance, TransferView};
pub use expenses::{CreateExpenseCmd, ExpenseCreated, ExpenseView, SplitView};
pub use memberships::{MemberAdd, MemberInfo, MembersAdded};
pub use reports::{
    GroupActivity, GroupStanding, GroupStandingEntry, MemberTotals, TimelinePoint, UserSummary,
};
pub use settlements::SettlementRecorded;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// A member reference with its resolved display name, as embedded in
/// operation results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.nfc().collect())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(EngineError::InvalidInput("invalid email".to_string()));
    }
    Ok(trimmed.to_lowercase())
}

/// Case-insensitive, NFC-normalized key used to compare display names.
fn name_key(value: &str) -> String {
    value.trim().nfc().collect::<String>().to_lowercase()
}

fn parse_member_id(raw: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(raw).map_err(|_| EngineError::InvalidInput("invalid member id".to_string()))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
