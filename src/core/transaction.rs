use crate::core::member::MemberId;
use crate::core::share_spec::ShareSpec;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Money advanced by `paid_by` on behalf of some subset of the group.
///
/// The amount is not validated here. A missing or non-positive amount makes
/// the expense a no-op for balance purposes rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    id: Uuid,
    amount: Decimal,
    paid_by: MemberId,
    #[serde(default)]
    shares: ShareSpec,
    #[serde(default)]
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    split_type: Option<String>,
}

impl Expense {
    pub fn new(amount: Decimal, paid_by: impl Into<MemberId>, shares: ShareSpec) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            paid_by: paid_by.into(),
            shares,
            timestamp: Utc::now(),
            title: None,
            split_type: None,
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_split_type(mut self, split_type: impl Into<String>) -> Self {
        self.split_type = Some(split_type.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn paid_by(&self) -> &MemberId {
        &self.paid_by
    }

    pub fn shares(&self) -> &ShareSpec {
        &self.shares
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn split_type(&self) -> Option<&str> {
        self.split_type.as_deref()
    }
}

/// A transfer that already happened between exactly two members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    id: Uuid,
    amount: Decimal,
    paid_by: MemberId,
    received_by: MemberId,
    #[serde(default)]
    timestamp: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        amount: Decimal,
        paid_by: impl Into<MemberId>,
        received_by: impl Into<MemberId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            paid_by: paid_by.into(),
            received_by: received_by.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn paid_by(&self) -> &MemberId {
        &self.paid_by
    }

    pub fn received_by(&self) -> &MemberId {
        &self.received_by
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// An entry of a group's transaction log.
///
/// Transactions are immutable once created; the log only grows or has
/// expenses retracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Transaction {
    #[serde(rename = "expense")]
    Expense(Expense),
    #[serde(rename = "settle")]
    Settlement(Settlement),
}

impl Transaction {
    pub fn id(&self) -> Uuid {
        match self {
            Transaction::Expense(e) => e.id(),
            Transaction::Settlement(s) => s.id(),
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Transaction::Expense(e) => e.amount(),
            Transaction::Settlement(s) => s.amount(),
        }
    }

    pub fn paid_by(&self) -> &MemberId {
        match self {
            Transaction::Expense(e) => e.paid_by(),
            Transaction::Settlement(s) => s.paid_by(),
        }
    }

    /// Display ordering only. Balance logic never reads it.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Transaction::Expense(e) => e.timestamp(),
            Transaction::Settlement(s) => s.timestamp(),
        }
    }

    pub fn as_expense(&self) -> Option<&Expense> {
        match self {
            Transaction::Expense(e) => Some(e),
            Transaction::Settlement(_) => None,
        }
    }

    pub fn is_settlement(&self) -> bool {
        matches!(self, Transaction::Settlement(_))
    }
}

impl From<Expense> for Transaction {
    fn from(expense: Expense) -> Self {
        Transaction::Expense(expense)
    }
}

impl From<Settlement> for Transaction {
    fn from(settlement: Settlement) -> Self {
        Transaction::Settlement(settlement)
    }
}

/// A group's transaction log, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionLog {
    transactions: Vec<Transaction>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    pub fn add(&mut self, transaction: impl Into<Transaction>) {
        self.transactions.push(transaction.into());
    }

    /// Retract an expense. Settlements are never removed.
    ///
    /// Returns the removed expense, if one matched.
    pub fn retract_expense(&mut self, id: Uuid) -> Option<Expense> {
        let idx = self
            .transactions
            .iter()
            .position(|t| !t.is_settlement() && t.id() == id)?;
        match self.transactions.remove(idx) {
            Transaction::Expense(e) => Some(e),
            Transaction::Settlement(_) => None,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn expenses(&self) -> impl Iterator<Item = &Expense> {
        self.transactions.iter().filter_map(Transaction::as_expense)
    }

    /// Sum of all positive expense amounts. Settlements are transfers, not spend.
    pub fn total_spent(&self) -> Decimal {
        self.expenses()
            .map(Expense::amount)
            .filter(|a| *a > Decimal::ZERO)
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
    }

    /// Transactions sorted newest first, for display.
    pub fn newest_first(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        sorted
    }
}

impl FromIterator<Transaction> for TransactionLog {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}
