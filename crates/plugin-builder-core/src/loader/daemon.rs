use tracing::debug;

use super::command::{command_classes, daemon_script};
use super::setting::Arguments;
use super::{entity, expect_setting, file_label, global_variables, outline, setting_literal};
use crate::domain::{DaemonDefinition, DaemonStatus, DefinitionKind, DiscoveredFile, DomainError};

const SETTING_PARAMS: &[&str] = &[
    "unlimited",
    "count",
    "interval",
    "status",
    "workspace",
    "category",
    "name",
    "version",
    "update",
];

/// Loads a daemon from its `DaemonHeader` class and `Script` commands.
pub fn load_daemon(file: &DiscoveredFile, text: &str) -> Result<DaemonDefinition, DomainError> {
    let label = file_label(file);
    let outline = outline(file, text)?;
    let header = entity(&outline, "DaemonHeader", file)?;
    let literal = setting_literal(&outline, header, file)?;
    let call = expect_setting(&literal, "Setting", file)?;
    let args = Arguments::bind(call, SETTING_PARAMS, &label)?;

    let name = args.string("name")?.unwrap_or_else(|| file.stem.clone());
    let unit = super::definition_unit(&args, name, file, DefinitionKind::Daemon)?;

    let status = match args.string("status")? {
        Some(status) => status
            .parse::<DaemonStatus>()
            .map_err(|reason| DomainError::setting(&label, reason))?,
        None => DaemonStatus::default(),
    };

    let commands = command_classes(&outline, file, DefinitionKind::Daemon, &["Script"])?
        .into_iter()
        .map(|class| daemon_script(&outline, class, file))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(daemon = %unit.name, commands = commands.len(), "daemon loaded");
    Ok(DaemonDefinition {
        unlimited: args.bool_or("unlimited", true)?,
        count: args.int_or("count", -1)?,
        interval: args.int_or("interval", 60)?,
        status,
        global_variables: global_variables(&outline, file)?,
        commands,
        unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fixtures::discovered;

    const LOG: &str = "\
from plugin_sdk.daemon_libs import component as comp


class DaemonHeader(comp.BaseHeader):
    def __setting__(self):
        return comp.Setting(status='active', interval=30)


class Command0(comp.Script):
    def __setting__(self):
        return comp.ScriptSetting(label='0')

    async def code(self):
        logger.info('executed!!')
";

    fn load(text: &str) -> Result<DaemonDefinition, DomainError> {
        load_daemon(&discovered(DefinitionKind::Daemon, "Log"), text)
    }

    #[test]
    fn loads_settings_and_scripts() {
        let daemon = load(LOG).unwrap();
        assert_eq!(daemon.unit.name, "Log");
        assert_eq!(daemon.status, DaemonStatus::Active);
        assert_eq!(daemon.interval, 30);
        assert!(daemon.unlimited);
        assert_eq!(daemon.count, -1);
        assert_eq!(daemon.commands.len(), 1);
        assert_eq!(daemon.commands[0].label.as_deref(), Some("0"));
        assert_eq!(daemon.commands[0].code, "logger.info('executed!!')\n");
        assert!(daemon.global_variables.is_empty());
    }

    #[test]
    fn only_scripts_are_accepted() {
        let text = LOG.replace("class Command0(comp.Script)", "class Command0(comp.Serve)");
        assert!(matches!(
            load(&text),
            Err(DomainError::UnsupportedCommand {
                kind: DefinitionKind::Daemon,
                ..
            })
        ));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let text = LOG.replace("status='active'", "status='paused'");
        assert!(matches!(load(&text), Err(DomainError::InvalidSetting { .. })));
    }

    #[test]
    fn cancellation_options_are_not_daemon_settings() {
        let text = LOG.replace(
            "comp.ScriptSetting(label='0')",
            "comp.ScriptSetting(label='0', cancellable=False)",
        );
        assert!(matches!(load(&text), Err(DomainError::InvalidSetting { .. })));
    }
}
