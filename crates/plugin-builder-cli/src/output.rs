//! Output management and formatting.
//!
//! Progress detail goes through `tracing` on stderr; this module prints the
//! few lines meant for the user on stdout.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;

use crate::cli::GlobalArgs;
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        Self {
            no_color: args.no_color || config.output.no_color || !io::stdout().is_terminal(),
            term: Term::stdout(),
        }
    }

    /// The final line of a successful run.
    pub fn succeeded(&self) -> io::Result<()> {
        let line = if self.no_color {
            "Succeeded.".to_string()
        } else {
            "Succeeded.".green().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// The final line of a failed run, preceded by a blank line.
    pub fn failed(&self) -> io::Result<()> {
        let line = if self.no_color {
            "Failed.".to_string()
        } else {
            "Failed.".red().bold().to_string()
        };
        self.term.write_line("")?;
        self.term.write_line(&line)
    }

    /// Dimmed detail line, e.g. a written path.
    pub fn detail(&self, msg: &str) -> io::Result<()> {
        let line = if self.no_color {
            format!("  {msg}")
        } else {
            format!("  {}", msg.dimmed())
        };
        self.term.write_line(&line)
    }

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::global::LogLevel;

    fn make_manager(no_color: bool) -> OutputManager {
        let args = GlobalArgs {
            log_level: LogLevel::Info,
            no_color,
            config: None,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn no_color_flag_disables_color() {
        assert!(!make_manager(true).supports_color());
    }

    #[test]
    fn config_can_disable_color() {
        let args = GlobalArgs {
            log_level: LogLevel::Info,
            no_color: false,
            config: None,
        };
        let mut config = AppConfig::default();
        config.output.no_color = true;
        assert!(!OutputManager::new(&args, &config).supports_color());
    }

    #[test]
    fn writes_do_not_fail_without_a_tty() {
        let out = make_manager(true);
        assert!(out.succeeded().is_ok());
        assert!(out.detail("libs/atom.py").is_ok());
    }
}
