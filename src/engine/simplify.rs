use crate::config::EngineConfig;
use crate::core::ledger::BalanceSheet;
use crate::core::member::MemberId;
use crate::core::transfer::SettlementTransfer;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Transfers recommended for a balance sheet, plus whatever could not be
/// matched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplifyOutcome {
    pub transfers: Vec<SettlementTransfer>,
    /// Balances still outstanding after one side ran out. Empty whenever the
    /// input sums to zero.
    pub residual: BTreeMap<MemberId, Decimal>,
}

impl SimplifyOutcome {
    pub fn is_complete(&self) -> bool {
        self.residual.is_empty()
    }

    /// Sum of all recommended transfer amounts.
    pub fn total_transferred(&self) -> Decimal {
        self.transfers
            .iter()
            .map(|t| t.amount)
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
    }
}

/// Reduces net balances to a short list of peer-to-peer transfers.
pub struct SettlementSimplifier;

impl SettlementSimplifier {
    /// Recommend transfers that bring every balance to zero, using the
    /// default epsilon of one cent.
    pub fn simplify(balances: &BalanceSheet) -> Vec<SettlementTransfer> {
        Self::simplify_with(balances, &EngineConfig::default()).transfers
    }

    /// Greedy creditor/debtor matching.
    ///
    /// # Algorithm
    ///
    /// 1. Members below `-epsilon` are debtors, above `epsilon` creditors.
    ///    Everyone else is treated as settled.
    /// 2. While both sides are non-empty, match the first debtor with the
    ///    first creditor (ascending member id) for the smaller of the two
    ///    amounts, and drop whichever side falls within `epsilon` of zero.
    ///
    /// Every step retires at least one member, so at most
    /// `debtors + creditors - 1` transfers are emitted. If the balances do
    /// not sum to zero the leftover side is returned as a residual rather
    /// than matched.
    ///
    /// # Examples
    ///
    /// ```
    /// use split_ledger::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let balances = BalanceSheet::from_positions([
    ///     ("a", dec!(60)),
    ///     ("b", dec!(-30)),
    ///     ("c", dec!(-30)),
    /// ]);
    /// let outcome = SettlementSimplifier::simplify_with(&balances, &EngineConfig::default());
    ///
    /// assert_eq!(outcome.transfers.len(), 2);
    /// assert!(outcome.is_complete());
    /// ```
    pub fn simplify_with(balances: &BalanceSheet, config: &EngineConfig) -> SimplifyOutcome {
        let epsilon = config.epsilon;
        let mut debtors: BTreeMap<MemberId, Decimal> = BTreeMap::new();
        let mut creditors: BTreeMap<MemberId, Decimal> = BTreeMap::new();

        for (member, balance) in balances.positions() {
            if *balance < -epsilon {
                debtors.insert(member.clone(), *balance);
            } else if *balance > epsilon {
                creditors.insert(member.clone(), *balance);
            }
        }

        let max_steps = debtors.len() + creditors.len();
        let mut transfers = Vec::new();

        for _ in 0..max_steps {
            let (Some((debtor, owed)), Some((creditor, due))) =
                (debtors.first_key_value(), creditors.first_key_value())
            else {
                break;
            };
            let (debtor, creditor) = (debtor.clone(), creditor.clone());
            let amount = owed.abs().min(*due);
            let owed_after = *owed + amount;
            let due_after = *due - amount;

            log::trace!("{} pays {} {}", debtor, creditor, amount);
            transfers.push(SettlementTransfer::new(debtor.clone(), creditor.clone(), amount));

            if owed_after.abs() < epsilon {
                debtors.remove(&debtor);
            } else {
                debtors.insert(debtor, owed_after);
            }
            if due_after < epsilon {
                creditors.remove(&creditor);
            } else {
                creditors.insert(creditor, due_after);
            }
        }

        let residual: BTreeMap<MemberId, Decimal> = debtors.into_iter().chain(creditors).collect();
        if !residual.is_empty() {
            log::warn!(
                "balances do not sum to zero: {} member(s) left unmatched, residual total {}",
                residual.len(),
                residual.values().fold(Decimal::ZERO, |acc, v| acc.saturating_add(*v))
            );
        }

        SimplifyOutcome {
            transfers,
            residual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settle(balances: &BalanceSheet, transfers: &[SettlementTransfer]) -> BalanceSheet {
        let mut sheet = balances.clone();
        for t in transfers {
            assert!(sheet.apply_settlement(&t.from, &t.to, t.amount));
        }
        sheet
    }

    #[test]
    fn test_single_payer_scenario() {
        let balances =
            BalanceSheet::from_positions([("A", dec!(60)), ("B", dec!(-30)), ("C", dec!(-30))]);
        let transfers = SettlementSimplifier::simplify(&balances);

        assert_eq!(
            transfers,
            vec![
                SettlementTransfer::new("B", "A", dec!(30)),
                SettlementTransfer::new("C", "A", dec!(30)),
            ]
        );
    }

    #[test]
    fn test_full_payoff() {
        let balances = BalanceSheet::from_positions([
            ("a", dec!(45.5)),
            ("b", dec!(-12.25)),
            ("c", dec!(20)),
            ("d", dec!(-53.25)),
        ]);
        let transfers = SettlementSimplifier::simplify(&balances);
        let settled = settle(&balances, &transfers);

        assert!(settled.positions().values().all(|v| v.is_zero()));
        assert!(transfers.len() <= 3);
    }

    #[test]
    fn test_all_settled() {
        let balances = BalanceSheet::from_positions([("a", dec!(0.005)), ("b", dec!(-0.005))]);
        let outcome = SettlementSimplifier::simplify_with(&balances, &EngineConfig::default());
        assert!(outcome.transfers.is_empty());
        assert!(outcome.is_complete());
    }

    #[test]
    fn test_fewer_than_two_members() {
        assert!(SettlementSimplifier::simplify(&BalanceSheet::new()).is_empty());
        let lone = BalanceSheet::from_positions([("a", Decimal::ZERO)]);
        assert!(SettlementSimplifier::simplify(&lone).is_empty());
    }

    #[test]
    fn test_unbalanced_input_leaves_residual() {
        let balances = BalanceSheet::from_positions([("a", dec!(20)), ("b", dec!(-5))]);
        let outcome = SettlementSimplifier::simplify_with(&balances, &EngineConfig::default());

        assert_eq!(outcome.transfers, vec![SettlementTransfer::new("b", "a", dec!(5))]);
        assert_eq!(outcome.residual.len(), 1);
        assert_eq!(outcome.residual[&MemberId::new("a")], dec!(15));
    }

    #[test]
    fn test_only_creditors() {
        let balances = BalanceSheet::from_positions([("a", dec!(20)), ("b", Decimal::ZERO)]);
        let outcome = SettlementSimplifier::simplify_with(&balances, &EngineConfig::default());
        assert!(outcome.transfers.is_empty());
        assert_eq!(outcome.residual[&MemberId::new("a")], dec!(20));
    }

    #[test]
    fn test_custom_epsilon() {
        let balances = BalanceSheet::from_positions([("a", dec!(0.5)), ("b", dec!(-0.5))]);
        let config = EngineConfig {
            epsilon: dec!(1),
            ..EngineConfig::default()
        };
        assert!(SettlementSimplifier::simplify_with(&balances, &config).transfers.is_empty());
    }

    #[test]
    fn test_total_transferred() {
        let balances = BalanceSheet::from_positions([
            ("a", dec!(10)),
            ("b", dec!(10)),
            ("c", dec!(-20)),
        ]);
        let outcome = SettlementSimplifier::simplify_with(&balances, &EngineConfig::default());
        assert_eq!(outcome.total_transferred(), dec!(20));
        assert_eq!(outcome.transfers.len(), 2);
    }
}
