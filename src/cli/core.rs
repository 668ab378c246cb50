//! Shell context, dispatch, and argument helpers shared by the commands.

use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::{
        services::ServiceError,
        time::{Clock, SystemClock},
    },
    currency::format_amount,
    domain::{Displayable, SubscriptionRecord},
    errors::{InvalidRuleError, StoreError},
    storage::{JsonSnapshotStore, SubscriptionStore},
};

use super::commands;
use super::output;
use super::registry::{CommandEntry, CommandRegistry};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Failures that abort the shell itself.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Failures of a single command; reported and the shell keeps running.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No snapshot loaded. Use `load <path>` first.")]
    SnapshotNotLoaded,
    #[error("{0}")]
    InvalidArguments(String),
    #[error("invalid recurrence rule: {0}")]
    Rule(#[from] InvalidRuleError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
        }
    }
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    config_manager: ConfigManager,
    config: Config,
    clock: Box<dyn Clock>,
    records: Vec<SubscriptionRecord>,
    snapshot_path: Option<PathBuf>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::from_env()?;
        Self::with_parts(mode, config_manager, Box::new(SystemClock))
    }

    pub fn with_parts(
        mode: CliMode,
        config_manager: ConfigManager,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let mut context = ShellContext {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            config_manager,
            config,
            clock,
            records: Vec::new(),
            snapshot_path: None,
            running: true,
        };
        context.auto_load_last();
        Ok(context)
    }

    fn auto_load_last(&mut self) {
        if self.mode != CliMode::Interactive {
            return;
        }
        let Some(path) = self.config.last_snapshot.clone() else {
            return;
        };
        match JsonSnapshotStore::new(&path).load() {
            Ok(records) => {
                output::success(format!(
                    "Automatically loaded {} subscriptions from {}.",
                    records.len(),
                    path.display()
                ));
                self.records = records;
                self.snapshot_path = Some(path);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not reload last snapshot");
            }
        }
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        match self.snapshot_path.as_deref().and_then(Path::file_name) {
            Some(name) => format!("subtrack [{}]> ", name.to_string_lossy()),
            None => "subtrack> ".to_string(),
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn records(&self) -> Result<&[SubscriptionRecord], CommandError> {
        if self.snapshot_path.is_none() {
            return Err(CommandError::SnapshotNotLoaded);
        }
        Ok(&self.records)
    }

    pub(crate) fn load_snapshot(&mut self, path: PathBuf) -> Result<usize, CommandError> {
        let records = JsonSnapshotStore::new(&path).load()?;
        let count = records.len();
        self.records = records;
        self.snapshot_path = Some(path.clone());
        self.config.last_snapshot = Some(path);
        self.persist_config()?;
        Ok(count)
    }

    pub(crate) fn set_config_value(&mut self, key: &str, value: &str) -> CommandResult {
        self.config
            .set(&key.to_lowercase(), value)
            .map_err(CommandError::InvalidArguments)?;
        self.persist_config()
    }

    fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn format_amount(&self, amount: f64) -> String {
        format_amount(
            amount,
            &self.config.currency_code(),
            &self.config.separators(),
            self.config.currency_precision,
        )
    }

    /// Finds a record by full id or by an unambiguous id prefix.
    pub(crate) fn find_record(&self, key: &str) -> Result<&SubscriptionRecord, CommandError> {
        let records = self.records()?;
        if let Ok(id) = Uuid::parse_str(key) {
            return records
                .iter()
                .find(|record| record.id == id)
                .ok_or_else(|| CommandError::InvalidArguments(format!("no subscription `{key}`")));
        }
        let needle = key.to_ascii_lowercase();
        let mut matches = records
            .iter()
            .filter(|record| record.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(record), None) => Ok(record),
            (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
                "id prefix `{key}` is ambiguous"
            ))),
            (None, _) => Err(CommandError::InvalidArguments(format!(
                "no subscription `{key}`"
            ))),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.get(command).map(|entry| entry.handler) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let lowered = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &lowered), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                output::hint(format!("Did you mean `{}`?", name));
            }
        }
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::SnapshotNotLoaded => {
                output::error(CommandError::SnapshotNotLoaded);
                output::hint("Try `load subscriptions.json` to get started.");
            }
            other => output::error(other),
        }
        Ok(())
    }

    pub(crate) fn print_warning(&self, message: &str) {
        output::warning(message);
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = crate::cli::shell::parse_command_line(line)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.dispatch(&raw.to_lowercase(), raw, &args)
    }
}

/// Label for a record, with its short id for disambiguation.
pub(crate) fn record_heading(record: &SubscriptionRecord) -> String {
    format!("{} [{}]", record.display_label(), short_id(record.id))
}

pub(crate) fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{raw}`, expected YYYY-MM-DD"))
    })
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Options shared by the reporting commands.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ReportOptions {
    pub all: bool,
    pub today: Option<NaiveDate>,
}

pub(crate) fn parse_report_options(args: &[&str]) -> Result<ReportOptions, CommandError> {
    let mut options = ReportOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--all" => options.all = true,
            "--today" => {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments("`--today` expects a date".into())
                })?;
                options.today = Some(parse_date(value)?);
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unexpected argument `{other}`"
                )))
            }
        }
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::domain::SubscriptionState;

    fn context_in(dir: &tempfile::TempDir) -> ShellContext {
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        ShellContext::with_parts(CliMode::Script, manager, Box::new(clock)).unwrap()
    }

    #[test]
    fn report_options_parse_flags() {
        let options = parse_report_options(&["--today", "2024-03-01", "--all"]).unwrap();
        assert!(options.all);
        assert_eq!(options.today, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(parse_report_options(&["--today"]).is_err());
        assert!(parse_report_options(&["--bogus"]).is_err());
    }

    #[test]
    fn records_require_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let context = context_in(&dir);
        assert!(matches!(
            context.records(),
            Err(CommandError::SnapshotNotLoaded)
        ));
    }

    #[test]
    fn load_remembers_snapshot_and_finds_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let record = SubscriptionRecord::new(SubscriptionState::Active).with_provider("Netflix");
        let path = dir.path().join("subs.json");
        JsonSnapshotStore::new(&path)
            .save(std::slice::from_ref(&record))
            .unwrap();

        let mut context = context_in(&dir);
        assert_eq!(context.load_snapshot(path.clone()).unwrap(), 1);
        assert_eq!(context.config().last_snapshot.as_deref(), Some(path.as_path()));

        let prefix = short_id(record.id);
        assert_eq!(context.find_record(&prefix).unwrap().id, record.id);
        assert!(context.find_record("zzzz").is_err());
    }

    #[test]
    fn unknown_commands_do_not_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut context = context_in(&dir);
        assert_eq!(
            context.process_line("sumary").unwrap(),
            LoopControl::Continue
        );
        assert_eq!(context.process_line("exit").unwrap(), LoopControl::Exit);
    }
}
