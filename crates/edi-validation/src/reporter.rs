//! Validation reporter

use crate::engine::{Severity, ValidationError, ValidationResult};
use std::fmt::Write;

/// Renders validation results as plain text, one finding per line
#[derive(Debug, Clone, Default)]
pub struct ValidationReporter {
    include_warnings: bool,
}

impl ValidationReporter {
    /// Create a new validation reporter that lists errors and warnings
    #[must_use]
    pub fn new() -> Self {
        Self {
            include_warnings: true,
        }
    }

    /// Only list errors; warnings are still counted in the summary
    #[must_use]
    pub fn errors_only(mut self) -> Self {
        self.include_warnings = false;
        self
    }

    /// One-line verdict with finding counts
    #[must_use]
    pub fn summary(result: &ValidationResult) -> String {
        format!(
            "{}: {} error(s), {} warning(s)",
            if result.is_valid { "VALID" } else { "INVALID" },
            result.errors.len(),
            result.warnings.len()
        )
    }

    #[must_use]
    pub fn render(&self, result: &ValidationResult) -> String {
        let mut out = Self::summary(result);
        out.push('\n');

        let warnings = if self.include_warnings {
            result.warnings.as_slice()
        } else {
            &[]
        };
        for issue in result.errors.iter().chain(warnings) {
            // writing to a String cannot fail
            let _ = writeln!(out, "  {}", Self::line(issue));
        }
        out
    }

    fn line(issue: &ValidationError) -> String {
        let label = match issue.severity {
            Severity::Error => "error  ",
            Severity::Warning => "warning",
        };
        format!("{label} {issue}")
    }
}
