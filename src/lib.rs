//! # split-ledger
//!
//! Shared-expense ledger engine: who owes whom.
//!
//! Given a group's members and its log of expenses and settlements, the
//! engine derives each member's net balance and a short list of
//! peer-to-peer transfers that would bring every balance to zero.
//!
//! ## Architecture
//!
//! - **core** — Members, transactions, participant encodings, balance sheet, document decoding
//! - **engine** — Share resolution, balance aggregation, debt simplification, presentation
//! - **simulation** — Random groups for property tests and benchmarks
//! - **config** / **error** — Tunables and error types

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::core::ledger::BalanceSheet;
    pub use crate::core::member::{Member, MemberId};
    pub use crate::core::share_spec::{AnnotatedShare, InclusionFlag, ShareSpec, ShareValue};
    pub use crate::core::transaction::{Expense, Settlement, Transaction, TransactionLog};
    pub use crate::core::transfer::SettlementTransfer;
    pub use crate::engine::balances::BalanceAggregator;
    pub use crate::engine::expense_builder::{ExpenseDraft, SplitType};
    pub use crate::engine::group::{Group, GroupSummary};
    pub use crate::engine::presentation::{MemberTransfers, TransferView};
    pub use crate::engine::shares::ShareResolver;
    pub use crate::engine::simplify::{SettlementSimplifier, SimplifyOutcome};
}
