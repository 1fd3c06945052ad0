use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member reference with its resolved display name.
///
/// Monetary fields across the API are integer **minor units** (cents) named
/// `*_minor`; percentages are integer basis points (`1% = 100`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: Uuid,
    pub name: String,
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod member {
    use super::*;

    /// One member to add: user identity plus display name.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub email: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersAddRequest {
        pub members: Vec<MemberAdd>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub member_id: Uuid,
        pub user_id: Uuid,
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersAddedResponse {
        pub group_id: Uuid,
        /// Only the memberships actually created; already-present users are
        /// skipped silently.
        pub members_added: Vec<MemberView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum SplitType {
        Equal,
        Exact,
        Percentage,
    }

    /// One member's split input. `amount_minor` is required for EXACT
    /// splits, `percent_bp` for PERCENTAGE splits.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitInputNew {
        pub member_id: Uuid,
        pub amount_minor: Option<i64>,
        pub percent_bp: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub amount_minor: i64,
        /// Membership id of the payer.
        pub paid_by: Uuid,
        pub split_type: SplitType,
        pub splits: Vec<SplitInputNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SplitView {
        pub member_id: Uuid,
        pub member_name: String,
        pub amount_minor: i64,
        pub percent_bp: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseResponse {
        pub id: Uuid,
        pub description: String,
        pub amount_minor: i64,
        pub split_type: SplitType,
        pub paid_by: MemberRef,
        pub splits: Vec<SplitView>,
        pub created_at: DateTime<Utc>,
    }

    /// Query string for the paged listing.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListParams {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub description: String,
        pub amount_minor: i64,
        pub split_type: SplitType,
        pub paid_by: Uuid,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberBalanceView {
        pub member_id: Uuid,
        pub name: String,
        pub total_paid_minor: i64,
        pub total_owed_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub from: MemberRef,
        pub to: MemberRef,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceResponse {
        pub group_id: Uuid,
        pub group_name: String,
        pub members: Vec<MemberBalanceView>,
        /// Greedy netting of the members' balances into pairwise payments.
        pub suggested_transfers: Vec<TransferView>,
    }
}

pub mod settlement {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementNew {
        pub from_member_id: Uuid,
        pub to_member_id: Uuid,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementResponse {
        pub id: Uuid,
        pub from: MemberRef,
        pub to: MemberRef,
        pub amount_minor: i64,
        pub settled_at: DateTime<Utc>,
    }
}

pub mod summary {
    use super::*;

    /// Whether a member is owed money, owes money, or is even.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GroupStanding {
        GetsBack,
        Owes,
        Settled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupStandingView {
        pub group_id: Uuid,
        pub group_name: String,
        pub balance_minor: i64,
        pub status: GroupStanding,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSummaryResponse {
        pub user_id: Uuid,
        pub name: String,
        pub overall_balance_minor: i64,
        pub groups: Vec<GroupStandingView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberTotalsView {
        pub member_id: Uuid,
        pub name: String,
        pub total_paid_minor: i64,
        pub total_owed_minor: i64,
        pub net_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TimelinePointView {
        pub date: NaiveDate,
        pub cumulative_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupActivityResponse {
        pub group_id: Uuid,
        pub members: Vec<MemberTotalsView>,
        pub timeline: Vec<TimelinePointView>,
    }
}
