pub use error::EngineError;
pub use expenses::{Expense, SplitType};
pub use groups::Group;
pub use money::MoneyCents;
pub use ops::{
    CreateExpenseCmd, Engine, EngineBuilder, ExpenseCreated, ExpenseView, GroupActivity,
    GroupBalance, GroupStanding, GroupStandingEntry, MemberAdd, MemberBalance, MemberInfo,
    MemberRef, MemberTotals, MembersAdded, SettlementRecorded, SplitView, TimelinePoint,
    TransferView, UserSummary,
};
pub use settlements::Settlement;
pub use simplify::{Transfer, simplify_debts};
pub use split::{PERCENT_SCALE, SplitInput, SplitShare, compute_splits};
pub use split_details::SplitDetail;

mod error;
mod expenses;
mod group_members;
mod groups;
mod money;
mod ops;
mod settlements;
mod simplify;
mod split;
mod split_details;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
