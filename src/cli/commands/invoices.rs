use serde::Serialize;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::ledger::{Invoice, KindTotals, LimitUsage, LineItemDetail};

use super::parse_month_or_current;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "invoice",
            "Show the invoice of a month",
            "invoice [YYYY-MM] [--json]",
            cmd_invoice,
        ),
        CommandEntry::new(
            "window",
            "Show the storage filters used for a month",
            "window [YYYY-MM]",
            cmd_window,
        ),
    ]
}

#[derive(Serialize)]
struct InvoiceReport<'a> {
    invoice: &'a Invoice,
    totals: KindTotals,
    limit: LimitUsage,
}

fn cmd_invoice(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let scope = context.active_scope()?;
    let json = args.contains(&"--json");
    let selector = args.iter().copied().find(|arg| !arg.starts_with("--"));
    let month = parse_month_or_current(selector)?;

    let invoice = context.service.invoice(scope, month)?;
    let totals = invoice
        .totals_by_kind()
        .map_err(|err| CommandError::Message(err.to_string()))?;
    let limit = invoice.limit_usage(context.config.spending_limit);

    if json {
        let report = InvoiceReport {
            invoice: &invoice,
            totals,
            limit,
        };
        output::line(serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::section(format!("Invoice {}", invoice.month));
    if invoice.is_empty() {
        output::info(format!("No charges for {}.", invoice.month));
    } else {
        let cells: Vec<Vec<String>> = invoice
            .items
            .iter()
            .map(|item| {
                vec![
                    item.description.clone(),
                    item.kind().to_string(),
                    detail_label(&item.detail),
                    context.format_amount(item.amount),
                ]
            })
            .collect();
        output::line(output::table(
            &["Description", "Type", "Detail", "Amount"],
            &cells,
            &[3],
        ));
    }

    output::two_column(&[
        ("Single", context.format_amount(totals.single)),
        ("Installment", context.format_amount(totals.installment)),
        ("Recurring", context.format_amount(totals.recurring)),
        ("Total", context.format_amount(invoice.total)),
    ]);
    print_limit(context, &limit);
    Ok(())
}

fn detail_label(detail: &LineItemDetail) -> String {
    match detail {
        LineItemDetail::Single => String::new(),
        LineItemDetail::Installment { position, count } => format!("{}/{}", position, count),
        LineItemDetail::Recurring { open_ended: true } => "open".to_string(),
        LineItemDetail::Recurring { open_ended: false } => String::new(),
    }
}

fn print_limit(context: &ShellContext, usage: &LimitUsage) {
    match usage {
        LimitUsage::Unlimited { .. } => output::hint("No spending limit set."),
        LimitUsage::Limited {
            limit,
            remaining,
            used_percent,
            is_over,
            ..
        } => {
            let percent = used_percent.round_dp(1);
            if *is_over {
                output::warning(format!(
                    "Over the {} limit by {} ({}% used).",
                    context.format_amount(*limit),
                    context.format_amount(-*remaining),
                    percent
                ));
            } else {
                output::info(format!(
                    "{}% of the {} limit used, {} left.",
                    percent,
                    context.format_amount(*limit),
                    context.format_amount(*remaining)
                ));
            }
        }
    }
}

fn cmd_window(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = parse_month_or_current(args.first().copied())?;
    let window = context.service.window(month)?;

    output::section(format!("Window {}", month));
    output::two_column(&[
        (
            "Month range",
            format!("{} .. {} (exclusive)", window.month_start, window.month_end_exclusive),
        ),
        ("Lookback", format!("{} months", window.lookback_months)),
        ("Installments from", window.installment_lower_bound.to_string()),
    ]);
    for predicate in window.predicates() {
        output::line(format!("  {:<12} {}", predicate.transaction_type().as_str(), predicate));
    }

    if let Ok(scope) = context.active_scope() {
        let candidates = context.service.candidates(scope, month)?;
        output::info(format!("{} candidate rows in the active scope.", candidates.len()));
    }
    Ok(())
}
