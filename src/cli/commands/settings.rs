use rust_decimal::Decimal;

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;

use super::parse_amount;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "limit",
            "Show or set the monthly spending limit",
            "limit [<amount>|clear]",
            cmd_limit,
        ),
        CommandEntry::new(
            "lookback",
            "Show or set how many months back installments are fetched",
            "lookback [<months>]",
            cmd_lookback,
        ),
    ]
}

fn cmd_limit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first().copied() else {
        match context.config.spending_limit {
            Some(limit) => output::info(format!("Spending limit: {}", context.format_amount(limit))),
            None => output::info("No spending limit set."),
        }
        return Ok(());
    };

    let limit = if raw.eq_ignore_ascii_case("clear") {
        None
    } else {
        let amount = parse_amount(raw)?;
        if amount < Decimal::ZERO {
            return Err(CommandError::InvalidArguments(
                "spending limit must not be negative".into(),
            ));
        }
        // Zero means no limit.
        Some(amount).filter(|amount| !amount.is_zero())
    };

    context.config.spending_limit = limit;
    context.persist_config()?;
    match limit {
        Some(limit) => output::success(format!("Spending limit set to {}.", context.format_amount(limit))),
        None => output::success("Spending limit cleared."),
    }
    Ok(())
}

fn cmd_lookback(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        output::info(format!(
            "Installments are fetched up to {} months back.",
            context.config.lookback_months
        ));
        return Ok(());
    };

    let months: u32 = raw.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("invalid month count `{}`", raw))
    })?;
    let mut updated = context.config.clone();
    updated.lookback_months = months;
    updated.validate()?;

    context.config = updated;
    context.persist_config()?;
    context.service.set_lookback_months(months);
    output::success(format!("Lookback set to {} months.", months));
    Ok(())
}
