#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # edi-validation
//!
//! Structural validation of parsed X12 interchanges.
//!
//! The engine checks envelope completeness (interchange, group and
//! transaction set present and closed), trailer counts and control-number
//! agreement, and reports envelope anomalies recorded by the parser.
//! Strictness decides which findings make a result invalid.
//!
//! ## Example Usage
//!
//! ```rust
//! use edi_validation::engine::{StrictnessLevel, ValidationConfig, ValidationEngine};
//!
//! let outcome = edi_adapter_x12::parse("");
//!
//! let engine = ValidationEngine::with_config(ValidationConfig {
//!     strictness: StrictnessLevel::Lenient,
//!     ..Default::default()
//! });
//! let result = engine.validate(&outcome);
//! assert!(!result.is_valid);
//! assert_eq!(result.errors[0].code, "NO_INTERCHANGE");
//! ```

pub mod engine;
pub mod reporter;

// Re-export main types
pub use engine::{
    Severity, StrictnessLevel, ValidationConfig, ValidationEngine, ValidationError,
    ValidationResult, codes,
};
pub use reporter::ValidationReporter;

use edi_adapter_x12::ParseOutcome;
use thiserror::Error;

/// Errors that can occur during validation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed with {errors} error(s) and {warnings} warning(s): {first}")]
    Invalid {
        errors: usize,
        warnings: usize,
        first: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Convenience function to validate a parse outcome with default settings
#[must_use]
pub fn validate(outcome: &ParseOutcome) -> ValidationResult {
    ValidationEngine::new().validate(outcome)
}

/// Parse raw X12 text and validate the outcome
#[must_use]
pub fn validate_text(raw: &str, config: ValidationConfig) -> ValidationResult {
    ValidationEngine::with_config(config).validate(&edi_adapter_x12::parse(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convenience_validate() {
        let result = validate(&edi_adapter_x12::parse("ST*850*0001~SE*2*0001~"));
        assert!(!result.is_valid);
        assert!(result.has_code(codes::ORPHAN_TRANSACTION));
        assert!(result.has_code(codes::NO_INTERCHANGE));
    }

    #[test]
    fn test_validate_text_honours_config() {
        let result = validate_text(
            "ST*850*0001~",
            ValidationConfig {
                strictness: StrictnessLevel::Lenient,
                ..Default::default()
            },
        );
        assert!(result.warnings.iter().any(|w| w.code == codes::ORPHAN_TRANSACTION));
    }
}
