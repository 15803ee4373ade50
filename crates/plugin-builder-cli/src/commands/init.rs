//! Implementation of the `plugin-builder init` command.

use tracing::{info, instrument};

use plugin_builder_adapters::{LocalFilesystem, starter_kit};
use plugin_builder_core::application::InitService;

use crate::{cli::ProjectArgs, config::AppConfig, error::CliResult, output::OutputManager};

/// Execute the `plugin-builder init` command.
#[instrument(skip_all, fields(project = %args.project_path.display()))]
pub fn execute(args: ProjectArgs, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let service = InitService::new(
        Box::new(LocalFilesystem::new()),
        starter_kit(),
        config.scaffold_options(),
    );
    let written = service.init(&args.project_path)?;
    for path in &written {
        output.detail(&path.display().to_string())?;
    }
    info!(files = written.len(), "Project initialized");
    Ok(())
}
