//! Scenario files
//!
//! A scenario describes a whole scripted session in YAML or JSON so the
//! same interaction can be shared between test suites or reviewed without
//! reading Rust:
//!
//! ```yaml
//! name: greeting
//! steps:
//!   - action: output
//!     text: "What is your name?"
//!   - action: input
//!     text: "Alice"
//!   - action: contains
//!     text: "Alice"
//! ```

mod config;

pub use config::*;

use std::path::Path;

use crate::common::{Error, Result};
use crate::session::{InputSource, OutputInterceptor, Session};

impl Scenario {
    /// Load a scenario, picking the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let scenario = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(Error::UnsupportedFormat(other.to_string())),
        };

        tracing::debug!(
            path = %path.display(),
            name = %scenario.name,
            steps = scenario.steps.len(),
            "Loaded scenario"
        );
        Ok(scenario)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let scenario: Self = serde_yaml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject scenarios that parse but cannot mean anything
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_scenario("", "name must not be empty"));
        }

        for (i, step) in self.steps.iter().enumerate() {
            if let Step::Lines { count: 0 } = step {
                return Err(Error::invalid_scenario(
                    &self.name,
                    &format!("step {} skips zero lines", i + 1),
                ));
            }
        }

        if self.steps.is_empty() {
            tracing::warn!(name = %self.name, "Scenario has no steps");
        }
        Ok(())
    }

    /// Build the equivalent scripted session
    pub fn to_session(&self) -> Session {
        let session = Session::with_options(self.verbose_errors, self.history_capacity);

        self.steps.iter().fold(session, |session, step| match step {
            Step::Input { text } => session.simulate_input(text.as_str()),
            Step::Output { text } => session.expect_output(text.as_str()),
            Step::Contains { text } => {
                let needle = text.clone();
                session.match_output(move |line| line.contains(&needle))
            }
            Step::Lines { count } => session.expect_n_lines(*count),
            Step::MultiLine { text } => session.expect_multi_line_output(text),
        })
    }

    /// Play this scenario against `program` and check it ran to completion
    pub fn run<T>(
        &self,
        program: impl FnOnce(&mut InputSource, &mut OutputInterceptor) -> T,
    ) -> Result<T> {
        tracing::info!(name = %self.name, "Running scenario");
        self.to_session().run(program)
    }
}
