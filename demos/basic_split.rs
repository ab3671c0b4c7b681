//! Basic shared-expense example.
//!
//! Logs a few expenses for a weekend trip, shows each member's balance and
//! the transfers that settle the group.

use chrono::Utc;
use rust_decimal_macros::dec;
use split_ledger::prelude::*;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║   split-ledger: Weekend Trip Example     ║");
    println!("╚══════════════════════════════════════════╝\n");

    let members = vec![
        Member::new("asha", "Asha", "asha@example.com"),
        Member::new("bilal", "Bilal", "bilal@example.com"),
        Member::new("chen", "Chen", "chen@example.com"),
        Member::new("dara", "Dara", "dara@example.com"),
    ];
    let everyone: Vec<MemberId> = members.iter().map(|m| m.id().clone()).collect();
    let mut group = Group::new("Weekend trip", members.clone());

    // --- Scenario 1: Equal and unequal expenses ---
    println!("━━━ Scenario 1: Logging Expenses ━━━\n");

    let drafts = vec![
        ExpenseDraft::new("Cabin", "480", "asha").equal(everyone.clone()),
        ExpenseDraft::new("Groceries", "96.40", "bilal").equal(everyone.clone()),
        ExpenseDraft::new("Kayaks", "150", "chen").unequal([
            ("chen", "50"),
            ("dara", "50"),
            ("bilal", "50"),
        ]),
        ExpenseDraft::new("Fuel", "60", "dara").unequal([("asha", "20"), ("dara", "40")]),
    ];

    for draft in drafts {
        match draft.build(&members, Utc::now()) {
            Ok(expense) => {
                println!(
                    "  {:<12} {:>8.2} paid by {}",
                    expense.title().unwrap_or("-"),
                    expense.amount(),
                    expense.paid_by()
                );
                group.transactions.add(expense);
            }
            Err(e) => println!("  rejected: {}", e),
        }
    }

    // An entry that fails validation never reaches the log.
    if let Err(e) = ExpenseDraft::new("Snacks", "12", "asha")
        .unequal([("asha", "5"), ("bilal", "5")])
        .build(&members, Utc::now())
    {
        println!("  rejected:    {}", e);
    }
    println!();

    // --- Scenario 2: Balances and settle-up ---
    println!("━━━ Scenario 2: Settle Up ━━━\n");

    let summary = group.summary();
    println!("{}", summary);

    for view in TransferView::label_all(&summary.transfers, &group.members) {
        println!("  {}", view);
    }
    println!();

    // --- Scenario 3: One member's view, then paying ---
    println!("━━━ Scenario 3: Bilal's View ━━━\n");

    let bilal = MemberId::new("bilal");
    print!("{}", summary.for_member(&bilal, &group.members));

    for transfer in summary.transfers.iter().filter(|t| t.from == bilal) {
        match transfer.confirm(transfer.amount, Utc::now()) {
            Ok(settlement) => group.transactions.add(settlement),
            Err(e) => println!("  could not confirm: {}", e),
        }
    }

    println!("\nAfter Bilal pays:\n");
    print!("{}", group.summary().for_member(&bilal, &group.members));

    let balances = group.balances();
    println!("\n━━━ Net Positions ━━━\n");
    for member in &members {
        let pos = balances.balance(member.id());
        let status = if pos > dec!(0.01) {
            "GETS BACK"
        } else if pos < dec!(-0.01) {
            "OWES"
        } else {
            "SETTLED"
        };
        println!("  {:<10} {:>10.2}  [{}]", member.display_name(), pos, status);
    }
}
