//! Data model: members, transactions, participant encodings, balances and
//! recommended transfers, plus decoding from stored documents.

pub mod decode;
pub mod ledger;
pub mod member;
pub mod share_spec;
pub mod transaction;
pub mod transfer;
