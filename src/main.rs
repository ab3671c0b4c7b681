//! split-ledger CLI
//!
//! Compute balances and settle-up transfers for a group snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Net balance of every member
//! split-ledger balances --input group.json
//!
//! # Recommended transfers, optionally from one member's point of view
//! split-ledger settle --input group.json --member u-42
//!
//! # Generate a random group for testing
//! split-ledger generate --members 6 --expenses 40
//! ```
//!
//! The input file holds raw stored documents:
//!
//! ```json
//! {
//!   "name": "Goa trip",
//!   "members": [{ "id": "a", "name": "Asha" }, { "id": "b", "name": "Bilal" }],
//!   "transactions": [
//!     { "amount": 90, "paidBy": "a", "splitBetween": ["a", "b"] },
//!     { "type": "settle", "amount": 20, "paidBy": "b", "receivedBy": "a" }
//!   ]
//! }
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use split_ledger::config::EngineConfig;
use split_ledger::core::member::MemberId;
use split_ledger::core::transaction::Transaction;
use split_ledger::engine::group::{Group, GroupDocuments};
use split_ledger::engine::presentation::TransferView;
use split_ledger::error::Result;
use split_ledger::simulation::random_group::{generate_random_group, GroupConfig};
use std::fs;
use std::process;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "split-ledger",
    version,
    about = "Shared-expense balances and settle-up transfers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Net balance of every member
    Balances {
        /// Group snapshot JSON file
        #[arg(short, long)]
        input: String,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Recommended transfers that settle the group
    Settle {
        /// Group snapshot JSON file
        #[arg(short, long)]
        input: String,
        /// Only show transfers involving this member, split by direction
        #[arg(short, long)]
        member: Option<String>,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Generate a random group snapshot
    Generate {
        #[arg(long, default_value_t = 5)]
        members: usize,
        #[arg(long, default_value_t = 20)]
        expenses: usize,
        #[arg(long, default_value_t = 3)]
        settlements: usize,
        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn load_group(path: &str) -> Result<Group> {
    let content = fs::read_to_string(path)?;
    let docs: GroupDocuments = serde_json::from_str(&content)?;
    let group = Group::from_documents(&docs);
    log::info!(
        "loaded '{}': {} members, {} transactions",
        group.name,
        group.members.len(),
        group.transactions.len()
    );
    Ok(group)
}

fn cmd_balances(input: &str, format: Format, config: &EngineConfig) -> Result<()> {
    let group = load_group(input)?;
    let summary = group.summary_with(config);

    match format {
        Format::Json => {
            let output = json!({
                "group": group.name,
                "total_spent": summary.total_spent,
                "balanced": summary.balances.is_balanced(config.zero_sum_tolerance),
                "balances": summary.balances,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Format::Text => {
            println!("=== {} ===", group.name);
            for member in &group.members {
                let balance = summary.balances.balance(member.id());
                let status = if balance > config.epsilon {
                    "gets back"
                } else if balance < -config.epsilon {
                    "owes"
                } else {
                    "settled"
                };
                println!("  {:<20} {:>12.2}  {}", member.display_name(), balance, status);
            }
        }
    }
    Ok(())
}

fn cmd_settle(
    input: &str,
    member: Option<&str>,
    format: Format,
    config: &EngineConfig,
) -> Result<()> {
    let group = load_group(input)?;
    let summary = group.summary_with(config);

    match (member, format) {
        (Some(id), Format::Json) => {
            let view = summary.for_member(&MemberId::new(id), &group.members);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        (Some(id), Format::Text) => {
            print!("{}", summary.for_member(&MemberId::new(id), &group.members));
        }
        (None, Format::Json) => {
            let output = json!({
                "transfers": TransferView::label_all(&summary.transfers, &group.members),
                "residual": summary.residual,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        (None, Format::Text) => {
            print!("{}", summary);
        }
    }
    Ok(())
}

fn transaction_document(transaction: &Transaction) -> Value {
    let timestamp = transaction.timestamp().timestamp_millis();
    match transaction {
        Transaction::Settlement(s) => json!({
            "id": s.id().to_string(),
            "type": "settle",
            "amount": s.amount(),
            "paidBy": s.paid_by(),
            "receivedBy": s.received_by(),
            "timestamp": timestamp,
        }),
        Transaction::Expense(e) => {
            let mut doc = json!({
                "id": e.id().to_string(),
                "type": "expense",
                "title": e.title(),
                "amount": e.amount(),
                "paidBy": e.paid_by(),
                "timestamp": timestamp,
            });
            let shares = e.shares();
            if let Some(explicit) = &shares.explicit {
                doc["splits"] = json!(explicit);
            }
            if let Some(participants) = &shares.participants {
                doc["splitBetween"] = json!(participants);
            }
            if let Some(annotated) = &shares.annotated {
                doc["splitWith"] = Value::Array(
                    annotated
                        .iter()
                        .map(|a| {
                            let mut entry =
                                json!({ "userId": a.member_id, "included": a.is_included() });
                            if let Some(amount) = a.amount {
                                entry["amount"] = json!(amount);
                            }
                            entry
                        })
                        .collect(),
                );
            }
            doc
        }
    }
}

fn cmd_generate(config: GroupConfig, output: Option<&str>) -> Result<()> {
    let group = generate_random_group(&config);
    let doc = json!({
        "name": group.name,
        "members": group.members,
        "transactions": group
            .transactions
            .transactions()
            .iter()
            .map(transaction_document)
            .collect::<Vec<_>>(),
    });
    let text = serde_json::to_string_pretty(&doc)?;

    match output {
        Some(path) => {
            fs::write(path, text)?;
            eprintln!(
                "Generated {} transactions across {} members → {}",
                group.transactions.len(),
                group.members.len(),
                path
            );
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn run(cli: Cli, config: &EngineConfig) -> Result<()> {
    match cli.command {
        Command::Balances { input, format } => cmd_balances(&input, format, config),
        Command::Settle {
            input,
            member,
            format,
        } => cmd_settle(&input, member.as_deref(), format, config),
        Command::Generate {
            members,
            expenses,
            settlements,
            output,
        } => cmd_generate(
            GroupConfig {
                member_count: members,
                expense_count: expenses,
                settlement_count: settlements,
                ..Default::default()
            },
            output.as_deref(),
        ),
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if let Err(e) = run(cli, &config) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
