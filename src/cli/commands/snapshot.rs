use std::path::PathBuf;

use crate::cli::core::{
    format_date, record_heading, CommandError, CommandResult, ShellContext,
};
use crate::cli::output::{info, key_values, section, success, warning};
use crate::cli::registry::CommandEntry;
use crate::core::services::{CalendarService, CostAggregator};
use crate::domain::SubscriptionRecord;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "load",
            "Load a JSON snapshot of subscriptions",
            "load <path>",
            cmd_load,
        ),
        CommandEntry::new(
            "list",
            "List loaded subscriptions",
            "list",
            cmd_list,
        ),
        CommandEntry::new(
            "detail",
            "Show one subscription with its yearly costs",
            "detail <id|id-prefix>",
            cmd_detail,
        ),
    ]
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [path] = args else {
        return Err(CommandError::InvalidArguments("usage: load <path>".into()));
    };
    let count = context.load_snapshot(PathBuf::from(*path))?;
    success(format!("Loaded {count} subscriptions from {path}."));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let records = context.records()?;
    section(format!("Subscriptions ({})", records.len()));
    if records.is_empty() {
        info("  (none)");
    }
    for record in records {
        info(format!(
            "  {:<32} {:<9} {:>12}  {}",
            record_heading(record),
            record.state,
            context.format_amount(record.amount_or_zero()),
            schedule_label(record)
        ));
    }
    Ok(())
}

fn cmd_detail(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [key] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: detail <id|id-prefix>".into(),
        ));
    };
    let today = context.today();
    let record = context.find_record(key)?;
    let summary = CostAggregator::summarize_subscription(record, today);
    let next = CalendarService::next_renewal(record, today)
        .map(format_date)
        .unwrap_or_else(|| "none within a year".into());

    section(record_heading(record));
    key_values(&[
        ("Id", record.id.to_string()),
        ("State", record.state.to_string()),
        ("Amount", context.format_amount(record.amount_or_zero())),
        ("Schedule", schedule_label(record)),
        (
            "Start date",
            record
                .start_date
                .map(format_date)
                .unwrap_or_else(|| "(unset)".into()),
        ),
        ("Category", optional(&record.category)),
        ("Funding", optional(&record.funding_source)),
        ("Auto renew", if record.auto_renewal { "yes" } else { "no" }.into()),
        ("Next renewal", next),
    ]);
    section(format!("Costs in {}", today.format("%Y")));
    key_values(&[
        ("Daily", context.format_amount(summary.daily())),
        ("Weekly", context.format_amount(summary.weekly())),
        ("Monthly", context.format_amount(summary.monthly())),
        ("Yearly", context.format_amount(summary.yearly())),
    ]);
    if let Some(Err(err)) = record.parsed_rule() {
        warning(format!("Recurrence rule ignored: {err}"));
    }
    Ok(())
}

fn schedule_label(record: &SubscriptionRecord) -> String {
    match record.parsed_rule() {
        Some(Ok(rule)) => rule.label(),
        Some(Err(_)) => "invalid rule".into(),
        None => "no schedule".into(),
    }
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "(unset)".into())
}
