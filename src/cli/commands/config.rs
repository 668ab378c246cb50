use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output::{key_values, section, success};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change preferences",
        "config show | config set <key> <value>",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => show_config(context),
        ["set", key, value] => {
            context.set_config_value(key, value)?;
            success(format!("Configuration updated: {key} = {value}"));
            Ok(())
        }
        _ => Err(CommandError::InvalidArguments(
            "usage: config show | config set <key> <value>".into(),
        )),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = context.config();
    let join = |items: Vec<String>| {
        if items.is_empty() {
            "(none)".to_string()
        } else {
            items.join(", ")
        }
    };

    section("Configuration");
    key_values(&[
        ("locale", config.locale.clone()),
        ("currency", config.currency.clone()),
        (
            "currency_precision",
            config
                .currency_precision
                .map(|value| value.to_string())
                .unwrap_or_else(|| "auto".into()),
        ),
        (
            "counted_states",
            join(config.counted_states.iter().map(ToString::to_string).collect()),
        ),
        ("excluded_categories", join(config.excluded_categories.clone())),
        (
            "last_snapshot",
            config
                .last_snapshot
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "(none)".into()),
        ),
    ]);
    Ok(())
}
