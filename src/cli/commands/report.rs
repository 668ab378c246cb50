use chrono::Datelike;

use crate::cli::core::{
    format_date, parse_date, parse_report_options, CommandError, CommandResult, ShellContext,
};
use crate::cli::output::{info, key_values, section};
use crate::cli::registry::CommandEntry;
use crate::core::{
    filter::SubscriptionFilter,
    services::{CalendarService, CostAggregator, DashboardService},
};
use crate::domain::CostSummary;
use crate::recurrence::occurrences_in_range;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Project costs for the current calendar year",
            "summary [--all] [--today YYYY-MM-DD]",
            cmd_summary,
        ),
        CommandEntry::new(
            "dashboard",
            "Show remaining costs and subscription breakdowns",
            "dashboard [--all] [--today YYYY-MM-DD]",
            cmd_dashboard,
        ),
        CommandEntry::new(
            "calendar",
            "List renewals in a calendar month",
            "calendar <year> <month>",
            cmd_calendar,
        ),
        CommandEntry::new(
            "occurrences",
            "Expand a recurrence rule inside a date range",
            "occurrences <rule> <start> <end> [series-start]",
            cmd_occurrences,
        ),
    ]
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let options = parse_report_options(args)?;
    let today = options.today.unwrap_or_else(|| context.today());
    let filter = active_filter(context, options.all);
    let records = context.records()?;
    let counted = filter.apply(records);
    let summary = CostAggregator::summarize(&counted, today);

    section(format!("Cost summary {}", today.year()));
    info(format!(
        "  Counted {} of {} subscriptions",
        counted.len(),
        records.len()
    ));
    print_summary(context, &summary);
    Ok(())
}

fn cmd_dashboard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let options = parse_report_options(args)?;
    let today = options.today.unwrap_or_else(|| context.today());
    let filter = active_filter(context, options.all);
    let stats = DashboardService::stats(context.records()?, &filter, today);

    section(format!("Dashboard as of {}", format_date(today)));
    key_values(&[
        ("Subscriptions", stats.total_subscriptions.to_string()),
        ("Counted", stats.counted_subscriptions.to_string()),
        ("Auto renewing", stats.auto_renewal_count.to_string()),
    ]);
    section("Remaining this year");
    print_summary(context, &stats.remaining_year);

    section("By category");
    for (category, count) in &stats.categories {
        info(format!("  {category}: {count}"));
    }
    section("By funding source");
    for (source, count) in &stats.funding_sources {
        info(format!("  {source}: {count}"));
    }
    section("By state");
    for (state, count) in &stats.state_distribution {
        info(format!("  {state}: {count}"));
    }
    Ok(())
}

fn cmd_calendar(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [year, month] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: calendar <year> <month>".into(),
        ));
    };
    let year: i32 = year
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid year `{year}`")))?;
    let month: u32 = month
        .parse()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid month `{month}`")))?;

    let counted = context.config().filter().apply(context.records()?);
    let events = CalendarService::month_renewals(&counted, year, month)?;

    section(format!("Renewals {year}-{month:02}"));
    if events.is_empty() {
        info("  (none)");
    }
    for event in &events {
        info(format!(
            "  {}  {:<32} {:>12}",
            format_date(event.date),
            event.title,
            context.format_amount(event.amount)
        ));
    }
    let total: f64 = events.iter().map(|event| event.amount).sum();
    info(format!("  Total: {}", context.format_amount(total)));
    Ok(())
}

fn cmd_occurrences(_context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (rule, start, end, series_start) = match args {
        [rule, start, end] => (rule, start, end, None),
        [rule, start, end, series] => (rule, start, end, Some(parse_date(series)?)),
        _ => {
            return Err(CommandError::InvalidArguments(
                "usage: occurrences <rule> <start> <end> [series-start]".into(),
            ))
        }
    };
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let dates = occurrences_in_range(rule, start, end, series_start)?;

    for date in &dates {
        info(format!("  {}", format_date(*date)));
    }
    info(format!("{} occurrence(s)", dates.len()));
    Ok(())
}

fn active_filter(context: &ShellContext, all: bool) -> SubscriptionFilter {
    if all {
        SubscriptionFilter::all()
    } else {
        context.config().filter()
    }
}

fn print_summary(context: &ShellContext, summary: &CostSummary) {
    key_values(&[
        ("Daily", context.format_amount(summary.daily())),
        ("Weekly", context.format_amount(summary.weekly())),
        ("Monthly", context.format_amount(summary.monthly())),
        ("Yearly", context.format_amount(summary.yearly())),
    ]);
}
