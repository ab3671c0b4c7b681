use crate::core::ledger::BalanceSheet;
use crate::core::member::Member;
use crate::core::transaction::{Expense, Settlement, Transaction};
use crate::engine::shares::ShareResolver;
use rust_decimal::Decimal;

/// Folds a transaction log into one net balance per member.
///
/// The fold is a plain sum, so the result does not depend on the order of
/// the transactions. It holds no state and can be re-run on every change.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Compute the net balance of every listed member.
    ///
    /// # Algorithm
    ///
    /// 1. Open every member at zero.
    /// 2. Settlement: credit the payer, debit the receiver.
    /// 3. Expense: credit the payer the full amount, then debit each resolved
    ///    share. A payer who also participates nets `amount - own share`.
    ///    With no resolvable participants only the payer's credit applies.
    ///
    /// Transactions with a non-positive amount, or naming a payer or
    /// receiver outside the member list, are skipped. Shares owed by
    /// unknown members are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use split_ledger::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let members = vec![
    ///     Member::new("a", "A", ""),
    ///     Member::new("b", "B", ""),
    ///     Member::new("c", "C", ""),
    /// ];
    /// let expense = Expense::new(
    ///     dec!(90),
    ///     "a",
    ///     ShareSpec::participants(vec!["a".into(), "b".into(), "c".into()]),
    /// );
    /// let balances = BalanceAggregator::aggregate(&members, &[Transaction::from(expense)]);
    ///
    /// assert_eq!(balances.balance(&"a".into()), dec!(60));
    /// assert_eq!(balances.balance(&"b".into()), dec!(-30));
    /// ```
    pub fn aggregate(members: &[Member], transactions: &[Transaction]) -> BalanceSheet {
        let mut sheet = BalanceSheet::for_members(members);

        for transaction in transactions {
            if transaction.amount() <= Decimal::ZERO {
                log::debug!(
                    "ignoring transaction {} with non-positive amount",
                    transaction.id()
                );
                continue;
            }
            match transaction {
                Transaction::Settlement(s) => Self::apply_settlement(&mut sheet, s),
                Transaction::Expense(e) => Self::apply_expense(&mut sheet, e),
            }
        }

        let drift = sheet.total();
        if !drift.is_zero() {
            log::debug!(
                "balances sum to {} after {} transactions",
                drift,
                transactions.len()
            );
        }
        sheet
    }

    fn apply_settlement(sheet: &mut BalanceSheet, settlement: &Settlement) {
        let (paid_by, received_by) = (settlement.paid_by(), settlement.received_by());
        if !sheet.contains(paid_by) || !sheet.contains(received_by) {
            log::debug!(
                "ignoring settlement {}: {} or {} is not a member",
                settlement.id(),
                paid_by,
                received_by
            );
        } else if !sheet.apply_settlement(paid_by, received_by, settlement.amount()) {
            log::debug!("ignoring settlement {}: balance overflow", settlement.id());
        }
    }

    /// Credit the payer and debit every member share as one update, so an
    /// overflowing expense leaves no partial effect.
    fn apply_expense(sheet: &mut BalanceSheet, expense: &Expense) {
        if !sheet.contains(expense.paid_by()) {
            log::debug!(
                "ignoring expense {}: payer {} is not a member",
                expense.id(),
                expense.paid_by()
            );
            return;
        }

        let shares = ShareResolver::resolve(expense);
        let mut changes = vec![(expense.paid_by(), expense.amount())];
        for (member, share) in &shares {
            if sheet.contains(member) {
                changes.push((member, -*share));
            } else {
                log::debug!(
                    "expense {}: dropping share of non-member {}",
                    expense.id(),
                    member
                );
            }
        }

        if !sheet.apply_all(&changes) {
            log::debug!("ignoring expense {}: balance overflow", expense.id());
        }
    }
}
