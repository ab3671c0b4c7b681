use crate::core::decode::parse_decimal;
use crate::core::member::{Member, MemberId};
use crate::core::share_spec::ShareSpec;
use crate::core::transaction::Expense;
use crate::error::BuildError;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an expense being entered is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    Equal,
    Unequal,
}

impl SplitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Unequal => "unequal",
        }
    }
}

fn cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Form input for a new expense, validated by [`ExpenseDraft::build`].
///
/// Amounts are kept as the text the user typed until validation.
///
/// # Examples
///
/// ```
/// use split_ledger::prelude::*;
///
/// let members = vec![Member::new("a", "A", ""), Member::new("b", "B", "")];
/// let expense = ExpenseDraft::new("Taxi", "25", "a")
///     .equal(vec!["a".into(), "b".into()])
///     .build(&members, chrono::Utc::now())
///     .unwrap();
/// assert_eq!(expense.split_type(), Some("equal"));
/// ```
#[derive(Debug, Clone)]
pub struct ExpenseDraft {
    title: String,
    amount: String,
    paid_by: MemberId,
    split_type: SplitType,
    selected: Vec<MemberId>,
    unequal_amounts: BTreeMap<MemberId, String>,
}

impl ExpenseDraft {
    pub fn new(
        title: impl Into<String>,
        amount: impl Into<String>,
        paid_by: impl Into<MemberId>,
    ) -> Self {
        Self {
            title: title.into(),
            amount: amount.into(),
            paid_by: paid_by.into(),
            split_type: SplitType::Equal,
            selected: Vec::new(),
            unequal_amounts: BTreeMap::new(),
        }
    }

    /// Split equally among `selected`.
    pub fn equal(mut self, selected: Vec<MemberId>) -> Self {
        self.split_type = SplitType::Equal;
        self.selected = selected;
        self
    }

    /// Split by the amounts typed for each selected member.
    pub fn unequal<I, M, S>(mut self, amounts: I) -> Self
    where
        I: IntoIterator<Item = (M, S)>,
        M: Into<MemberId>,
        S: Into<String>,
    {
        self.split_type = SplitType::Unequal;
        self.unequal_amounts = amounts
            .into_iter()
            .map(|(m, s)| (m.into(), s.into()))
            .collect();
        self.selected = self.unequal_amounts.keys().cloned().collect();
        self
    }

    /// Validate the draft and produce the expense to log.
    ///
    /// The stored split map holds two-decimal amounts; an equal split that
    /// does not divide evenly is rescaled by the share resolver when
    /// balances are computed.
    pub fn build(
        &self,
        members: &[Member],
        timestamp: DateTime<Utc>,
    ) -> Result<Expense, BuildError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(BuildError::MissingTitle);
        }

        let amount = parse_decimal(&self.amount)
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| BuildError::InvalidAmount(self.amount.clone()))?;
        let amount = cents(amount);

        if self.selected.is_empty() {
            return Err(BuildError::NoParticipants);
        }

        let is_member = |id: &MemberId| members.iter().any(|m| m.id() == id);
        if !is_member(&self.paid_by) {
            return Err(BuildError::UnknownPayer(self.paid_by.to_string()));
        }
        if let Some(stranger) = self.selected.iter().find(|&id| !is_member(id)) {
            return Err(BuildError::UnknownParticipant(stranger.to_string()));
        }

        let splits: Vec<(MemberId, Decimal)> = match self.split_type {
            SplitType::Equal => {
                let per_person = cents(amount / Decimal::from(self.selected.len()));
                self.selected.iter().map(|id| (id.clone(), per_person)).collect()
            }
            SplitType::Unequal => self.unequal_splits(amount)?,
        };

        Ok(Expense::new(amount, self.paid_by.clone(), ShareSpec::from_amounts(splits))
            .with_title(title)
            .with_split_type(self.split_type.as_str())
            .with_timestamp(timestamp))
    }

    fn unequal_splits(&self, amount: Decimal) -> Result<Vec<(MemberId, Decimal)>, BuildError> {
        let mut splits = Vec::with_capacity(self.selected.len());
        let mut sum = Decimal::ZERO;

        for id in &self.selected {
            let share = self
                .unequal_amounts
                .get(id)
                .and_then(|raw| parse_decimal(raw))
                .filter(|a| *a >= Decimal::ZERO)
                .ok_or_else(|| BuildError::InvalidShare(id.to_string()))?;
            sum = sum
                .checked_add(share)
                .ok_or_else(|| BuildError::InvalidShare(id.to_string()))?;
            splits.push((id.clone(), cents(share)));
        }

        if cents(sum) != amount {
            return Err(BuildError::SplitMismatch {
                expected: amount,
                actual: cents(sum),
            });
        }
        Ok(splits)
    }
}
