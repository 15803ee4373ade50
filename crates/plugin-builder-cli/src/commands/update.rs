//! Implementation of the `plugin-builder update` command.

use tracing::{info, instrument};

use plugin_builder_adapters::{LocalFilesystem, YamlEncoder};
use plugin_builder_core::application::BuildService;

use crate::{cli::ProjectArgs, config::AppConfig, error::CliResult};

/// Execute the `plugin-builder update` command.
#[instrument(skip_all, fields(project = %args.project_path.display()))]
pub fn execute(args: ProjectArgs, config: &AppConfig) -> CliResult<()> {
    let report = service(config).update(&args.project_path)?;
    info!(
        records = report.records,
        modules = report.modules,
        files = report.libs_files,
        "Update finished"
    );
    Ok(())
}

pub(crate) fn service(config: &AppConfig) -> BuildService {
    BuildService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(YamlEncoder::new()),
        config.scaffold_options(),
    )
}
