//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use std::fmt::Write as _;
use std::path::Path;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::paths::config_path;
use crate::common::Result;
use crate::scenario::Scenario;
use crate::script::{Channel, Command};

/// Dispatch a CLI command
///
/// Returns `Ok(false)` when the command ran but found problems.
pub fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Lint { files } => {
            let mut all_ok = true;
            for file in &files {
                let (ok, line) = lint_file(file);
                println!("{}", line);
                all_ok &= ok;
            }
            Ok(all_ok)
        }

        Commands::Show { file, verbose } => {
            let scenario = Scenario::load(&file)?;
            print!("{}", render_scenario(&scenario, verbose));
            Ok(true)
        }

        Commands::Config => {
            let config = Config::load()?;
            print!("{}", render_config(config_path().as_deref(), &config));
            Ok(true)
        }
    }
}

/// Render the effective session settings and where they came from
fn render_config(path: Option<&Path>, config: &Config) -> String {
    let source = match path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (not found, using defaults)", path.display()),
        None => "(no config directory, using defaults)".to_string(),
    };

    let session = &config.session;
    format!(
        "{} {}\n  verbose_errors: {}\n  history_capacity: {}\n  write_log: {}\n",
        "Config:".blue().bold(),
        source,
        session.verbose_errors,
        session.history_capacity,
        session.write_log
    )
}

/// Lint one file, returning whether it passed and the line to print
fn lint_file(path: &Path) -> (bool, String) {
    match Scenario::load(path) {
        Ok(scenario) => (
            true,
            format!(
                "  {} {} ({} steps)",
                "✓".green(),
                path.display(),
                scenario.steps.len()
            ),
        ),
        Err(e) => (
            false,
            format!("  {} {}: {}", "✗".red(), path.display(), e),
        ),
    }
}

/// Render the command queue a scenario expands to
fn render_scenario(scenario: &Scenario, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", "Scenario:".blue().bold(), scenario.name.bold());
    if let Some(desc) = &scenario.description {
        let _ = writeln!(out, "  {}", desc.dimmed());
    }
    if verbose {
        let _ = writeln!(
            out,
            "  verbose_errors: {}, history_capacity: {}",
            scenario.verbose_errors, scenario.history_capacity
        );
    }

    let session = scenario.to_session();
    session.for_each_command(|i, command| {
        let _ = writeln!(out, "  {:>3}. {}", i + 1, format_command(command));
    });
    out
}

fn format_command(command: &Command) -> String {
    let tag = match command.channel() {
        Channel::Input => "[IN] ".cyan(),
        Channel::Output => "[OUT]".green(),
    };
    let body = match command {
        Command::AnyLine => "(any line)".dimmed().to_string(),
        Command::Predicate(_) => "(matching line)".dimmed().to_string(),
        other => other.describe(),
    };
    format!("{} {}", tag, body)
}
