//! Views over engine output for the two-sided settle-up screen and the
//! expense detail screen.

use crate::core::member::{Member, MemberId};
use crate::core::transaction::Expense;
use crate::core::transfer::SettlementTransfer;
use crate::engine::shares::ShareResolver;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const UNKNOWN_NAME: &str = "Unknown";

fn name_index(members: &[Member]) -> HashMap<&MemberId, &str> {
    members.iter().map(|m| (m.id(), m.display_name())).collect()
}

/// A transfer with display names attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferView {
    pub from: MemberId,
    pub from_name: String,
    pub to: MemberId,
    pub to_name: String,
    pub amount: Decimal,
}

impl TransferView {
    /// Attach names to transfers. Ids missing from `members` show as "Unknown".
    pub fn label_all(transfers: &[SettlementTransfer], members: &[Member]) -> Vec<TransferView> {
        let names = name_index(members);
        let lookup = |id: &MemberId| names.get(id).copied().unwrap_or(UNKNOWN_NAME).to_string();
        transfers
            .iter()
            .map(|t| TransferView {
                from: t.from.clone(),
                from_name: lookup(&t.from),
                to: t.to.clone(),
                to_name: lookup(&t.to),
                amount: t.amount,
            })
            .collect()
    }

    pub fn transfer(&self) -> SettlementTransfer {
        SettlementTransfer::new(self.from.clone(), self.to.clone(), self.amount)
    }
}

impl fmt::Display for TransferView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {:.2}", self.from_name, self.to_name, self.amount)
    }
}

/// One member's side of the settle-up screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberTransfers {
    /// Transfers in which the member is the creditor.
    pub owed_to_me: Vec<TransferView>,
    /// Transfers in which the member is the debtor.
    pub i_owe: Vec<TransferView>,
}

impl MemberTransfers {
    pub fn for_member(views: &[TransferView], member: &MemberId) -> Self {
        Self {
            owed_to_me: views.iter().filter(|v| &v.to == member).cloned().collect(),
            i_owe: views.iter().filter(|v| &v.from == member).cloned().collect(),
        }
    }

    pub fn total_owed_to_me(&self) -> Decimal {
        self.owed_to_me
            .iter()
            .map(|v| v.amount)
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
    }

    pub fn total_i_owe(&self) -> Decimal {
        self.i_owe
            .iter()
            .map(|v| v.amount)
            .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
    }

    pub fn is_empty(&self) -> bool {
        self.owed_to_me.is_empty() && self.i_owe.is_empty()
    }
}

impl fmt::Display for MemberTransfers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Owed to you ({:.2}):", self.total_owed_to_me())?;
        if self.owed_to_me.is_empty() {
            writeln!(f, "  nobody owes you anything")?;
        }
        for view in &self.owed_to_me {
            writeln!(f, "  {}", view)?;
        }
        writeln!(f, "You owe ({:.2}):", self.total_i_owe())?;
        if self.i_owe.is_empty() {
            writeln!(f, "  you are all settled up")?;
        }
        for view in &self.i_owe {
            writeln!(f, "  {}", view)?;
        }
        Ok(())
    }
}

/// A participant row of the expense detail screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub member: MemberId,
    pub name: String,
    pub share: Decimal,
    pub is_payer: bool,
}

/// Per-participant breakdown of one expense, payer first.
///
/// A payer who is not among the participants still gets a row with a zero
/// share, so the screen always shows who paid.
pub fn expense_breakdown(expense: &Expense, members: &[Member]) -> Vec<ParticipantRow> {
    let names = name_index(members);
    let shares = ShareResolver::resolve(expense);
    let payer = expense.paid_by();

    let mut rows: Vec<ParticipantRow> = shares
        .iter()
        .map(|(member, share)| ParticipantRow {
            member: member.clone(),
            name: names.get(member).copied().unwrap_or(UNKNOWN_NAME).to_string(),
            share: *share,
            is_payer: member == payer,
        })
        .collect();

    if !shares.contains_key(payer) {
        rows.push(ParticipantRow {
            member: payer.clone(),
            name: names.get(payer).copied().unwrap_or(UNKNOWN_NAME).to_string(),
            share: Decimal::ZERO,
            is_payer: true,
        });
    }

    rows.sort_by_key(|r| !r.is_payer);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::share_spec::ShareSpec;
    use rust_decimal_macros::dec;

    fn members() -> Vec<Member> {
        vec![
            Member::new("a", "Asha", ""),
            Member::new("b", "Bilal", ""),
            Member::new("c", "Chen", ""),
        ]
    }

    fn views() -> Vec<TransferView> {
        TransferView::label_all(
            &[
                SettlementTransfer::new("b", "a", dec!(30)),
                SettlementTransfer::new("c", "a", dec!(30)),
                SettlementTransfer::new("zz", "b", dec!(5)),
            ],
            &members(),
        )
    }

    #[test]
    fn test_names_are_attached() {
        let views = views();
        assert_eq!(views[0].from_name, "Bilal");
        assert_eq!(views[0].to_name, "Asha");
        assert_eq!(views[2].from_name, "Unknown");
        assert_eq!(views[0].to_string(), "Bilal pays Asha 30.00");
    }

    #[test]
    fn test_two_sided_split() {
        let views = views();
        let for_a = MemberTransfers::for_member(&views, &"a".into());
        assert_eq!(for_a.owed_to_me.len(), 2);
        assert!(for_a.i_owe.is_empty());
        assert_eq!(for_a.total_owed_to_me(), dec!(60));

        let for_b = MemberTransfers::for_member(&views, &"b".into());
        assert_eq!(for_b.owed_to_me.len(), 1);
        assert_eq!(for_b.i_owe.len(), 1);
        assert_eq!(for_b.total_i_owe(), dec!(30));

        assert!(MemberTransfers::for_member(&views, &"nobody".into()).is_empty());
    }

    #[test]
    fn test_breakdown_payer_first() {
        let expense = Expense::new(
            dec!(90),
            "c",
            ShareSpec::participants(vec!["a".into(), "b".into(), "c".into()]),
        );
        let rows = expense_breakdown(&expense, &members());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].member.as_str(), "c");
        assert!(rows[0].is_payer);
        assert_eq!(rows[0].share, dec!(30));
        assert!(rows[1..].iter().all(|r| !r.is_payer));
    }

    #[test]
    fn test_breakdown_payer_not_participating() {
        let expense = Expense::new(dec!(20), "a", ShareSpec::participants(vec!["b".into()]));
        let rows = expense_breakdown(&expense, &members());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].member.as_str(), "a");
        assert_eq!(rows[0].share, Decimal::ZERO);
        assert_eq!(rows[1].name, "Bilal");
        assert_eq!(rows[1].share, dec!(20));
    }
}
