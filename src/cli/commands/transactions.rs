use std::{fs, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::ledger::{Transaction, TransactionKind};

use super::{parse_amount, parse_date, require_arg};

const ADD_USAGE: &str = "add <single|installment|recurring> <description> <amount> <YYYY-MM-DD> [installments|end date]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "scope",
            "Show, create, or switch the active scope",
            "scope [new|<id>]",
            cmd_scope,
        ),
        CommandEntry::new("add", "Record a transaction", ADD_USAGE, cmd_add),
        CommandEntry::new(
            "remove",
            "Delete a transaction by id or id prefix",
            "remove <id>",
            cmd_remove,
        )
        .with_aliases(&["rm"]),
        CommandEntry::new("list", "List transactions of the active scope", "list", cmd_list)
            .with_aliases(&["ls"]),
        CommandEntry::new(
            "import",
            "Import transactions from a JSON array file",
            "import <path>",
            cmd_import,
        ),
    ]
}

fn cmd_scope(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().copied() {
        None => {
            match context.config.active_scope {
                Some(scope) => output::info(format!("Active scope: {}", scope)),
                None => output::info("No scope selected."),
            }
            Ok(())
        }
        Some("new") => {
            let scope = Uuid::new_v4();
            context.set_scope(scope)?;
            output::success(format!("Created scope {}.", scope));
            Ok(())
        }
        Some(raw) => {
            let scope = Uuid::from_str(raw).map_err(|_| {
                CommandError::InvalidArguments(format!("invalid scope id `{}`", raw))
            })?;
            context.set_scope(scope)?;
            output::success(format!("Switched to scope {}.", scope));
            Ok(())
        }
    }
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let scope = context.active_scope()?;
    let kind_name = require_arg(args, 0, ADD_USAGE)?;
    let description = require_arg(args, 1, ADD_USAGE)?;
    let amount = parse_amount(require_arg(args, 2, ADD_USAGE)?)?;
    let start_date = parse_date(require_arg(args, 3, ADD_USAGE)?)?;
    let extra = args.get(4).copied();
    if args.len() > 5 {
        return Err(CommandError::InvalidArguments(format!("usage: {}", ADD_USAGE)));
    }

    let kind = match (kind_name.to_lowercase().as_str(), extra) {
        ("single", None) => TransactionKind::Single,
        ("installment", Some(count)) => TransactionKind::Installment {
            installments: count.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("invalid installment count `{}`", count))
            })?,
        },
        ("installment", None) => {
            return Err(CommandError::InvalidArguments(
                "installment transactions need an installment count".into(),
            ))
        }
        ("recurring", end) => TransactionKind::Recurring {
            end_date: end.map(parse_date).transpose()?,
        },
        ("single", Some(_)) => {
            return Err(CommandError::InvalidArguments(format!("usage: {}", ADD_USAGE)))
        }
        (other, _) => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown transaction type `{}` (single, installment, recurring)",
                other
            )))
        }
    };

    let created = context
        .service
        .create(Transaction::new(scope, description, amount, kind, start_date))?;
    output::success(format!(
        "Added {} `{}` ({}).",
        created.transaction_type(),
        created.description,
        short_id(created.id)
    ));
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let scope = context.active_scope()?;
    let needle = require_arg(args, 0, "remove <id>")?;
    let id = resolve_id(context, scope, needle)?;
    let removed = context.service.delete(scope, id)?;
    output::success(format!("Removed `{}`.", removed.description));
    Ok(())
}

/// Accepts a full id or a unique prefix of its simple (hyphen-less) form.
fn resolve_id(context: &ShellContext, scope: Uuid, needle: &str) -> Result<Uuid, CommandError> {
    if let Ok(id) = Uuid::from_str(needle) {
        return Ok(id);
    }
    let prefix = needle.to_ascii_lowercase().replace('-', "");
    let matches: Vec<Uuid> = context
        .service
        .list(scope)?
        .into_iter()
        .map(|txn| txn.id)
        .filter(|id| id.simple().to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CommandError::Message(format!(
            "no transaction matches `{}`",
            needle
        ))),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{}` matches {} transactions; use more characters",
            needle,
            matches.len()
        ))),
    }
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let scope = context.active_scope()?;
    let rows = context.service.list(scope)?;
    if rows.is_empty() {
        output::info("No transactions recorded.");
        return Ok(());
    }

    output::section(format!("Transactions ({})", rows.len()));
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|txn| {
            vec![
                short_id(txn.id),
                txn.start_date.to_string(),
                txn.transaction_type().to_string(),
                kind_detail(&txn.kind),
                txn.description.clone(),
                context.format_amount(txn.amount),
            ]
        })
        .collect();
    output::line(output::table(
        &["Id", "Start", "Type", "Plan", "Description", "Amount"],
        &cells,
        &[5],
    ));
    Ok(())
}

fn kind_detail(kind: &TransactionKind) -> String {
    match kind {
        TransactionKind::Single => String::new(),
        TransactionKind::Installment { installments } => format!("{}x", installments),
        TransactionKind::Recurring { end_date: Some(end) } => format!("until {}", end),
        TransactionKind::Recurring { end_date: None } => "open".to_string(),
    }
}

/// One row of an import file. Ids and timestamps are assigned on import.
#[derive(Debug, Deserialize)]
struct ImportRow {
    description: String,
    amount: Decimal,
    #[serde(flatten)]
    kind: TransactionKind,
    start_date: NaiveDate,
    #[serde(default)]
    category_id: Option<Uuid>,
    #[serde(default)]
    class_id: Option<Uuid>,
}

impl ImportRow {
    fn into_transaction(self, scope: Uuid) -> Transaction {
        let mut txn = Transaction::new(scope, self.description, self.amount, self.kind, self.start_date);
        txn.category_id = self.category_id;
        txn.class_id = self.class_id;
        txn
    }
}

fn cmd_import(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let scope = context.active_scope()?;
    let path = require_arg(args, 0, "import <path>")?;
    let data = fs::read_to_string(path)?;
    let rows: Vec<ImportRow> = serde_json::from_str(&data)?;
    let transactions = rows
        .into_iter()
        .map(|row| row.into_transaction(scope))
        .collect();
    let count = context.service.import_many(transactions)?;
    output::success(format!("Imported {} transactions.", count));
    Ok(())
}
