use crate::config::EngineConfig;
use crate::core::decode::{decode_log, decode_members};
use crate::core::ledger::BalanceSheet;
use crate::core::member::{Member, MemberId};
use crate::core::transaction::TransactionLog;
use crate::core::transfer::SettlementTransfer;
use crate::engine::balances::BalanceAggregator;
use crate::engine::presentation::{MemberTransfers, TransferView};
use crate::engine::simplify::SettlementSimplifier;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Snapshot of a group: its members and its transaction log.
///
/// This is everything the pipeline needs. Recomputing is cheap and
/// stateless, so callers rebuild the summary whenever either list changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: String,
    pub members: Vec<Member>,
    #[serde(default)]
    pub transactions: TransactionLog,
}

/// Stored-document form of a group, as read from the document store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupDocuments {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<Value>,
    #[serde(default)]
    pub transactions: Vec<Value>,
}

impl Group {
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            members,
            transactions: TransactionLog::new(),
        }
    }

    /// Decode a group from raw documents, skipping unreadable ones.
    pub fn from_documents(docs: &GroupDocuments) -> Self {
        Self {
            name: docs.name.clone(),
            members: decode_members(&docs.members),
            transactions: decode_log(&docs.transactions),
        }
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id() == id)
    }

    /// Net balance of every member.
    pub fn balances(&self) -> BalanceSheet {
        BalanceAggregator::aggregate(&self.members, self.transactions.transactions())
    }

    /// Run the whole pipeline with default settings.
    pub fn summary(&self) -> GroupSummary {
        self.summary_with(&EngineConfig::default())
    }

    /// Run the whole pipeline: balances, then recommended transfers.
    ///
    /// Groups with fewer than two members never get transfers.
    pub fn summary_with(&self, config: &EngineConfig) -> GroupSummary {
        let balances = self.balances();
        let outcome = if self.members.len() < 2 {
            Default::default()
        } else {
            SettlementSimplifier::simplify_with(&balances, config)
        };

        GroupSummary {
            total_spent: self.transactions.total_spent(),
            balances,
            transfers: outcome.transfers,
            residual: outcome.residual,
        }
    }
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub total_spent: Decimal,
    pub balances: BalanceSheet,
    pub transfers: Vec<SettlementTransfer>,
    pub residual: BTreeMap<MemberId, Decimal>,
}

impl GroupSummary {
    /// The settle-up view for one member.
    pub fn for_member(&self, member: &MemberId, members: &[Member]) -> MemberTransfers {
        MemberTransfers::for_member(&TransferView::label_all(&self.transfers, members), member)
    }
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Group Summary ===")?;
        writeln!(f, "Total spent:  {:.2}", self.total_spent)?;
        writeln!(f, "Outstanding:  {:.2}", self.balances.total_outstanding())?;
        writeln!(f, "Transfers:    {}", self.transfers.len())?;

        writeln!(f, "\nBalances:")?;
        for (member, balance) in self.balances.positions() {
            writeln!(f, "  {:<16} {:>12.2}", member.as_str(), balance)?;
        }

        if !self.transfers.is_empty() {
            writeln!(f, "\nSettle up:")?;
            for transfer in &self.transfers {
                writeln!(f, "  {}", transfer)?;
            }
        }

        if !self.residual.is_empty() {
            writeln!(f, "\nUnmatched (data integrity warning):")?;
            for (member, amount) in &self.residual {
                writeln!(f, "  {:<16} {:>12.2}", member.as_str(), amount)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::share_spec::ShareSpec;
    use crate::core::transaction::{Expense, Settlement};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn trio() -> Group {
        Group::new(
            "Trip",
            vec![
                Member::new("A", "Anil", ""),
                Member::new("B", "Bea", ""),
                Member::new("C", "Cyd", ""),
            ],
        )
    }

    #[test]
    fn test_summary_scenario() {
        let mut group = trio();
        group.transactions.add(Expense::new(
            dec!(90),
            "A",
            ShareSpec::participants(vec!["A".into(), "B".into(), "C".into()]),
        ));

        let summary = group.summary();
        assert_eq!(summary.total_spent, dec!(90));
        assert_eq!(summary.balances.balance(&"A".into()), dec!(60));
        assert_eq!(
            summary.transfers,
            vec![
                SettlementTransfer::new("B", "A", dec!(30)),
                SettlementTransfer::new("C", "A", dec!(30)),
            ]
        );
        assert!(summary.residual.is_empty());

        let for_a = summary.for_member(&"A".into(), &group.members);
        assert_eq!(for_a.owed_to_me.len(), 2);
        assert_eq!(for_a.owed_to_me[0].from_name, "Bea");
    }

    #[test]
    fn test_settling_clears_transfers() {
        let mut group = trio();
        group.transactions.add(Expense::new(
            dec!(90),
            "A",
            ShareSpec::participants(vec!["A".into(), "B".into(), "C".into()]),
        ));
        let now = chrono::Utc::now();
        for transfer in group.summary().transfers {
            group.transactions.add(transfer.into_settlement(now));
        }

        let summary = group.summary();
        assert!(summary.transfers.is_empty());
        assert!(summary.balances.positions().values().all(|v| v.is_zero()));
    }

    #[test]
    fn test_single_member_group_has_no_transfers() {
        let mut group = Group::new("Solo", vec![Member::new("A", "Anil", "")]);
        group.transactions.add(Expense::new(dec!(20), "A", ShareSpec::none()));
        let summary = group.summary();
        assert!(summary.transfers.is_empty());
        assert!(summary.residual.is_empty());
        assert_eq!(summary.balances.balance(&"A".into()), dec!(20));
    }

    #[test]
    fn test_from_documents() {
        let docs: GroupDocuments = serde_json::from_value(json!({
            "name": "Flat",
            "members": [{ "id": "x" }, { "id": "y" }, { "oops": true }],
            "transactions": [
                { "type": "settle", "amount": 40, "paidBy": "x", "receivedBy": "y" },
                { "amount": 10 }
            ]
        }))
        .unwrap();
        let group = Group::from_documents(&docs);
        assert_eq!(group.members.len(), 2);
        assert_eq!(group.transactions.len(), 1);
        assert_eq!(group.balances().balance(&"x".into()), dec!(40));
        assert!(group.member(&"y".into()).is_some());
    }

    #[test]
    fn test_group_serde_round_trip() {
        let mut group = trio();
        group.transactions.add(Settlement::new(dec!(5), "B", "A"));
        let json = serde_json::to_string(&group).unwrap();
        let back: Group = serde_json::from_str(&json).unwrap();
        assert_eq!(back, group);
    }

    #[test]
    fn test_summary_display() {
        let mut group = trio();
        group.transactions.add(Expense::new(
            dec!(30),
            "A",
            ShareSpec::participants(vec!["B".into()]),
        ));
        let text = group.summary().to_string();
        assert!(text.contains("Group Summary"));
        assert!(text.contains("B → A: 30"));
    }
}
