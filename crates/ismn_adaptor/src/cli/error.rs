//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use ismn_adaptor::MissingNetwork;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    /// The network directory is not part of the database
    pub fn network_not_found(missing: &MissingNetwork) -> Self {
        Self::new(format!(
            "The specified network \"{}\" does not exist in the database \"{}\"",
            missing.pattern, missing.database
        ))
        .with_context(format!(
            "Expected a directory at {}",
            missing.database_path.join(&missing.pattern).display()
        ))
        .with_suggestions([
            format!("TRY: List the networks of the database: ls {}", missing.database_path.display()),
            "TRY: Pass the network name with --pattern".to_string(),
            "TRY: Run from the directory containing the database, or pass --root".to_string(),
        ])
    }

    /// Config file could not be loaded
    pub fn invalid_config(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot load config: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check the file exists: ls -la {}", path.display()),
                "TRY: Valid keys: pattern, extension, include_hidden, follow_symlinks".to_string(),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
