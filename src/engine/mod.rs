//! The settlement pipeline and the views built on its output.
//!
//! Share resolution feeds balance aggregation, which feeds debt
//! simplification. Every stage is a pure function of its inputs.

pub mod balances;
pub mod expense_builder;
pub mod group;
pub mod presentation;
pub mod shares;
pub mod simplify;
