use crate::core::member::{Member, MemberId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net balance of each member of a group.
///
/// A positive balance means the member is owed money by the group.
/// A negative balance means the member owes the group.
///
/// Only members the sheet was opened with can be credited or debited;
/// updates naming anyone else are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    positions: BTreeMap<MemberId, Decimal>,
}

impl BalanceSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a sheet with every member at zero.
    pub fn for_members(members: &[Member]) -> Self {
        Self {
            positions: members
                .iter()
                .map(|m| (m.id().clone(), Decimal::ZERO))
                .collect(),
        }
    }

    pub fn from_positions<I, M>(positions: I) -> Self
    where
        I: IntoIterator<Item = (M, Decimal)>,
        M: Into<MemberId>,
    {
        Self {
            positions: positions.into_iter().map(|(m, v)| (m.into(), v)).collect(),
        }
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.positions.contains_key(member)
    }

    /// Add `amount` to a member's balance.
    ///
    /// Returns false, leaving the sheet untouched, for unknown members or
    /// when the balance would overflow.
    pub fn credit(&mut self, member: &MemberId, amount: Decimal) -> bool {
        self.apply_all(&[(member, amount)])
    }

    /// Subtract `amount` from a member's balance. Same failure rules as
    /// [`credit`](Self::credit).
    pub fn debit(&mut self, member: &MemberId, amount: Decimal) -> bool {
        self.credit(member, -amount)
    }

    /// Apply a completed transfer: the payer's debt shrinks, the receiver
    /// has collected.
    ///
    /// Nothing is applied unless both members are on the sheet and neither
    /// balance overflows.
    pub fn apply_settlement(
        &mut self,
        paid_by: &MemberId,
        received_by: &MemberId,
        amount: Decimal,
    ) -> bool {
        self.apply_all(&[(paid_by, amount), (received_by, -amount)])
    }

    /// Apply several balance changes as one unit.
    ///
    /// Either every change lands or none does: an unknown member or an
    /// overflowing balance rejects the whole batch.
    pub fn apply_all(&mut self, changes: &[(&MemberId, Decimal)]) -> bool {
        let mut updated: BTreeMap<MemberId, Decimal> = BTreeMap::new();
        for (member, change) in changes {
            let current = match updated.get(*member).or_else(|| self.positions.get(*member)) {
                Some(balance) => *balance,
                None => return false,
            };
            match current.checked_add(*change) {
                Some(next) => {
                    updated.insert((*member).clone(), next);
                }
                None => return false,
            }
        }
        self.positions.extend(updated);
        true
    }

    /// Balance of a member; zero for members not on the sheet.
    pub fn balance(&self, member: &MemberId) -> Decimal {
        self.positions
            .get(member)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn positions(&self) -> &BTreeMap<MemberId, Decimal> {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Sum of all balances. Zero for any well-formed transaction set.
    pub fn total(&self) -> Decimal {
        self.positions
            .values()
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }

    /// Whether the balances sum to zero within `tolerance`.
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        self.total().abs() <= tolerance
    }

    /// Total owed to creditors (sum of positive balances).
    /// This is the amount that actually has to change hands.
    pub fn total_outstanding(&self) -> Decimal {
        self.positions
            .values()
            .filter(|v| **v > Decimal::ZERO)
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
    }

    /// Members whose balance lies within `epsilon` of zero.
    pub fn settled_members(&self, epsilon: Decimal) -> Vec<&MemberId> {
        self.positions
            .iter()
            .filter(|(_, v)| v.abs() <= epsilon)
            .map(|(m, _)| m)
            .collect()
    }
}
