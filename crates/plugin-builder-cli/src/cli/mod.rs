//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name     = "plugin-builder",
    bin_name = "plugin-builder",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Compile plugin definitions into configuration documents",
    long_about = "plugin-builder reads record, scenario, daemon and module \
                  definitions without running them, regenerates the libs \
                  package they import and dumps one YAML document per \
                  definition.",
    after_help = "EXAMPLES:\n\
        \x20 plugin-builder init   ./my-project\n\
        \x20 plugin-builder update ./my-project\n\
        \x20 plugin-builder dump   ./my-project ./out",
    disable_version_flag = true,
)]
pub struct Cli {
    /// Print version.
    #[allow(dead_code)]
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute. Without one, help is printed.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Lay down a starter plugin tree in an existing project.
    #[command(
        about = "Initialize a project",
        after_help = "EXAMPLES:\n\
            \x20 plugin-builder init .\n\
            \x20 plugin-builder --config team.toml init ./svc"
    )]
    Init(ProjectArgs),

    /// Regenerate the libs package from records and modules.
    #[command(about = "Update libs")]
    Update(ProjectArgs),

    /// Update libs, then write every definition as a YAML document.
    #[command(
        about = "Dump YAML documents",
        after_help = "EXAMPLES:\n\
            \x20 plugin-builder dump . ./yaml"
    )]
    Dump(DumpArgs),
}

/// Arguments for `init` and `update`.
#[derive(Debug, Args)]
pub struct ProjectArgs {
    /// Project directory containing the plugin root.
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,
}

/// Arguments for `dump`.
#[derive(Debug, Args)]
pub struct DumpArgs {
    /// Project directory containing the plugin root.
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output directory for the documents.
    #[arg(value_name = "YAML_PATH")]
    pub yaml_path: PathBuf,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::global::LogLevel;
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_dump_command() {
        let cli = Cli::parse_from(["plugin-builder", "dump", "proj", "out"]);
        match cli.command {
            Some(Commands::Dump(args)) => {
                assert_eq!(args.project_path, PathBuf::from("proj"));
                assert_eq!(args.yaml_path, PathBuf::from("out"));
            }
            other => panic!("expected Dump, got {other:?}"),
        }
        assert_eq!(cli.global.log_level, LogLevel::Info);
    }

    #[test]
    fn log_level_is_global() {
        let cli = Cli::parse_from(["plugin-builder", "update", "proj", "--log-level", "debug"]);
        assert_eq!(cli.global.log_level, LogLevel::Debug);
        assert!(matches!(cli.command, Some(Commands::Update(_))));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let result = Cli::try_parse_from(["plugin-builder", "--log-level", "trace", "init", "."]);
        assert!(result.is_err());
    }

    #[test]
    fn subcommand_is_optional() {
        let cli = Cli::parse_from(["plugin-builder"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn short_v_prints_version() {
        let err = Cli::try_parse_from(["plugin-builder", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
