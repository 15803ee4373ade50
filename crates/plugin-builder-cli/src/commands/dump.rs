//! Implementation of the `plugin-builder dump` command.

use tracing::{info, instrument};

use crate::{cli::DumpArgs, config::AppConfig, error::CliResult, output::OutputManager};

/// Execute the `plugin-builder dump` command.
///
/// Regenerates libs first so the dumped documents and the scaffolding the
/// definitions import never disagree.
#[instrument(
    skip_all,
    fields(
        project = %args.project_path.display(),
        output_path = %args.yaml_path.display()
    )
)]
pub fn execute(args: DumpArgs, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let report = super::update::service(config).dump(&args.project_path, &args.yaml_path)?;
    for path in &report.documents {
        output.detail(&path.display().to_string())?;
    }
    info!(
        records = report.records,
        scenarios = report.scenarios,
        modules = report.modules,
        daemons = report.daemons,
        "Dump finished"
    );
    Ok(())
}
