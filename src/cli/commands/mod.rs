pub mod config;
pub mod report;
pub mod snapshot;
pub mod system;

use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(snapshot::definitions());
    commands.extend(report::definitions());
    commands.extend(config::definitions());
    commands
}
