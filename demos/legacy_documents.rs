//! Reading stored documents written by older app versions.
//!
//! The same log mixes all three participant encodings, string and numeric
//! amounts, and every timestamp format. Unreadable documents are skipped.

use serde_json::json;
use split_ledger::core::decode::decode_transaction;
use split_ledger::engine::group::{Group, GroupDocuments};
use split_ledger::engine::presentation::expense_breakdown;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("╔══════════════════════════════════════════╗");
    println!("║  split-ledger: Legacy Document Example   ║");
    println!("╚══════════════════════════════════════════╝\n");

    let raw = json!({
        "name": "Flat 3B",
        "members": [
            { "id": "u1", "name": "Asha", "email": "asha@example.com" },
            { "id": "u2", "name": "Bilal" },
            { "id": "u3" }
        ],
        "transactions": [
            {
                "title": "Rent (v1 splits)",
                "amount": 900,
                "paidBy": "u1",
                "splits": { "u1": 450, "u2": 300, "u3": 150 },
                "timestamp": 1680307200000i64
            },
            {
                "title": "Internet (flag splits)",
                "amount": "45.00",
                "paidBy": "u2",
                "splits": { "u1": true, "u2": true, "u3": false }
            },
            {
                "title": "Cleaning (v2 list)",
                "amount": 60,
                "paidBy": "u3",
                "splitBetween": ["u1", "u2", "u3"],
                "timestamp": "2023-04-10T09:30:00Z"
            },
            {
                "title": "Plants (v3 annotated)",
                "amount": 30,
                "paidBy": "u1",
                "splitWith": [
                    { "userId": "u1", "included": "TRUE" },
                    { "userId": "u3", "included": 1 },
                    { "userId": "u2", "included": false }
                ],
                "timestamp": { "_seconds": 1681200000, "_nanoseconds": 0 }
            },
            { "type": "settle", "amount": 100, "paidBy": "u3", "receivedBy": "u1" },
            { "title": "No payer", "amount": 12 },
            42
        ]
    });

    println!("━━━ Decoding ━━━\n");
    if let Some(docs) = raw["transactions"].as_array() {
        for doc in docs {
            match decode_transaction(doc) {
                Ok(tx) => println!("  ok       {:>8} by {}", tx.amount(), tx.paid_by()),
                Err(e) => println!("  skipped  {}", e),
            }
        }
    }
    println!();

    let docs: GroupDocuments = match serde_json::from_value(raw) {
        Ok(docs) => docs,
        Err(e) => {
            eprintln!("bad group document: {}", e);
            return;
        }
    };
    let group = Group::from_documents(&docs);

    println!("━━━ Expense Breakdown ━━━\n");
    for expense in group.transactions.expenses() {
        println!("  {}", expense.title().unwrap_or("(untitled)"));
        for row in expense_breakdown(expense, &group.members) {
            let marker = if row.is_payer { "paid" } else { "" };
            println!("    {:<8} {:>10.2}  {}", row.name, row.share, marker);
        }
    }
    println!();

    println!("{}", group.summary());
}
