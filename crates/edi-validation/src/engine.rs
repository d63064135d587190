//! Validation engine
//!
//! A read-only pass over a [`ParseOutcome`]: envelope completeness, trailer
//! counts and control-number agreement. Nothing here mutates the tree or
//! fails; every problem becomes an entry in the [`ValidationResult`].

use edi_adapter_x12::{EnvelopeAnomaly, FunctionalGroup, Interchange, ParseOutcome, TransactionSet};
use tracing::{debug, trace};

/// Finding codes
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const NO_INTERCHANGE: &str = "NO_INTERCHANGE";
    pub const MISSING_SENDER_ID: &str = "MISSING_SENDER_ID";
    pub const MISSING_RECEIVER_ID: &str = "MISSING_RECEIVER_ID";
    pub const ISA_ELEMENT_COUNT: &str = "ISA_ELEMENT_COUNT";
    pub const NO_FUNCTIONAL_GROUP: &str = "NO_FUNCTIONAL_GROUP";
    pub const EMPTY_GROUP: &str = "EMPTY_GROUP";
    pub const UNCLOSED_INTERCHANGE: &str = "UNCLOSED_INTERCHANGE";
    pub const UNCLOSED_GROUP: &str = "UNCLOSED_GROUP";
    pub const UNCLOSED_TRANSACTION: &str = "UNCLOSED_TRANSACTION";
    pub const IEA_COUNT_MISMATCH: &str = "IEA_COUNT_MISMATCH";
    pub const GE_COUNT_MISMATCH: &str = "GE_COUNT_MISMATCH";
    pub const SE_COUNT_MISMATCH: &str = "SE_COUNT_MISMATCH";
    pub const CONTROL_NUMBER_MISMATCH: &str = "CONTROL_NUMBER_MISMATCH";
    pub const ORPHAN_GROUP: &str = "ORPHAN_GROUP";
    pub const ORPHAN_TRANSACTION: &str = "ORPHAN_TRANSACTION";
    pub const ORPHAN_SEGMENT: &str = "ORPHAN_SEGMENT";
    pub const STRAY_TRAILER: &str = "STRAY_TRAILER";
}

/// Strictness level for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrictnessLevel {
    /// Strict: warnings also make the result invalid
    Strict,
    /// Moderate: only errors make the result invalid
    #[default]
    Moderate,
    /// Lenient: broken envelope nesting is reported as warnings
    Lenient,
}

/// Validation configuration
#[derive(Debug, Clone, Default)]
pub struct ValidationConfig {
    /// Strictness level
    pub strictness: StrictnessLevel,
    /// Maximum errors collected (0 = unlimited)
    pub max_errors: usize,
}

/// Validation result
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether validation passed
    pub is_valid: bool,
    /// List of errors found
    pub errors: Vec<ValidationError>,
    /// List of warnings found
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new valid result
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if there are any errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.is_valid = false;
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: ValidationError) {
        self.warnings.push(warning);
    }

    /// Whether any finding (error or warning) carries `code`
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|issue| issue.code == code)
    }

    /// Turn an invalid result into an error
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invalid`] when the result is not valid.
    pub fn ensure_valid(&self) -> crate::Result<()> {
        if self.is_valid {
            return Ok(());
        }
        let first = self
            .errors
            .first()
            .or_else(|| self.warnings.first())
            .map(ToString::to_string)
            .unwrap_or_default();
        Err(crate::Error::Invalid {
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            first,
        })
    }
}

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error message
    pub message: String,
    /// Envelope path, e.g. `ISA[0]/GS[1]/ST[0]`; empty for whole-input findings
    pub path: String,
    /// Index of the offending segment in the tokenized stream, when known
    pub position: Option<usize>,
    /// Severity level
    pub severity: Severity,
    /// Finding code, one of [`codes`]
    pub code: &'static str,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ", self.code)?;
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(position) = self.position {
            write!(f, " (segment {position})")?;
        }
        Ok(())
    }
}

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failed
    Error,
    /// Warning - issue but not blocking
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// Main validation engine
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    config: ValidationConfig,
}

/// Accumulates findings under the engine's configuration
struct Collector<'a> {
    config: &'a ValidationConfig,
    result: ValidationResult,
    dropped: usize,
}

impl Collector<'_> {
    fn error(&mut self, code: &'static str, path: &str, message: String) {
        self.push(Severity::Error, code, path, None, message);
    }

    fn warning(&mut self, code: &'static str, path: &str, message: String) {
        self.push(Severity::Warning, code, path, None, message);
    }

    /// Envelope nesting problems, downgraded under lenient strictness
    fn envelope(&mut self, code: &'static str, path: &str, position: Option<usize>, message: String) {
        let severity = if self.config.strictness == StrictnessLevel::Lenient {
            Severity::Warning
        } else {
            Severity::Error
        };
        self.push(severity, code, path, position, message);
    }

    fn push(
        &mut self,
        severity: Severity,
        code: &'static str,
        path: &str,
        position: Option<usize>,
        message: String,
    ) {
        trace!(code, path, %severity, "Validation finding");
        let issue = ValidationError {
            message,
            path: path.to_string(),
            position,
            severity,
            code,
        };
        match severity {
            Severity::Error => {
                if self.config.max_errors > 0 && self.result.errors.len() >= self.config.max_errors {
                    self.dropped += 1;
                    self.result.is_valid = false;
                } else {
                    self.result.add_error(issue);
                }
            }
            Severity::Warning => self.result.add_warning(issue),
        }
    }
}

impl ValidationEngine {
    /// Create a new validation engine
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with specific configuration
    #[must_use]
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a parse outcome
    #[must_use]
    pub fn validate(&self, outcome: &ParseOutcome) -> ValidationResult {
        let mut collector = Collector {
            config: &self.config,
            result: ValidationResult::valid(),
            dropped: 0,
        };

        for error in &outcome.errors {
            collector.error(codes::PARSE_ERROR, "", error.message.clone());
        }

        for anomaly in &outcome.anomalies {
            check_anomaly(&mut collector, anomaly);
        }

        if outcome.interchanges.is_empty() {
            collector.error(
                codes::NO_INTERCHANGE,
                "",
                "No ISA interchange found".to_string(),
            );
        }

        for (index, interchange) in outcome.interchanges.iter().enumerate() {
            check_interchange(&mut collector, interchange, &format!("ISA[{index}]"));
        }

        let Collector {
            mut result, dropped, ..
        } = collector;

        if self.config.strictness == StrictnessLevel::Strict && result.has_warnings() {
            result.is_valid = false;
        }

        debug!(
            valid = result.is_valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            dropped,
            "Validated X12 structure"
        );
        result
    }
}

fn check_anomaly(collector: &mut Collector<'_>, anomaly: &EnvelopeAnomaly) {
    let position = Some(anomaly.position());
    match anomaly {
        EnvelopeAnomaly::OrphanGroup { .. } => {
            collector.envelope(codes::ORPHAN_GROUP, "", position, anomaly.describe());
        }
        EnvelopeAnomaly::OrphanTransaction { .. } => {
            collector.envelope(codes::ORPHAN_TRANSACTION, "", position, anomaly.describe());
        }
        EnvelopeAnomaly::OrphanSegment { .. } => {
            collector.push(
                Severity::Warning,
                codes::ORPHAN_SEGMENT,
                "",
                position,
                anomaly.describe(),
            );
        }
        EnvelopeAnomaly::StrayTrailer { .. } => {
            collector.push(
                Severity::Warning,
                codes::STRAY_TRAILER,
                "",
                position,
                anomaly.describe(),
            );
        }
    }
}

fn check_interchange(collector: &mut Collector<'_>, interchange: &Interchange, path: &str) {
    let header = &interchange.header;

    if header.sender_id.is_empty() {
        collector.error(
            codes::MISSING_SENDER_ID,
            path,
            "ISA06 interchange sender id is empty".to_string(),
        );
    }
    if header.receiver_id.is_empty() {
        collector.error(
            codes::MISSING_RECEIVER_ID,
            path,
            "ISA08 interchange receiver id is empty".to_string(),
        );
    }
    if header.element_count != 16 {
        collector.warning(
            codes::ISA_ELEMENT_COUNT,
            path,
            format!("ISA has {} elements, expected 16", header.element_count),
        );
    }

    if interchange.groups.is_empty() {
        collector.error(
            codes::NO_FUNCTIONAL_GROUP,
            path,
            "Interchange contains no functional group".to_string(),
        );
    }

    match &interchange.trailer {
        None => collector.envelope(
            codes::UNCLOSED_INTERCHANGE,
            path,
            None,
            format!("Interchange {} has no IEA trailer", header.control_number),
        ),
        Some(trailer) => {
            if !count_matches(trailer.group_count, interchange.groups.len()) {
                collector.warning(
                    codes::IEA_COUNT_MISMATCH,
                    path,
                    format!(
                        "IEA declares {} groups, found {}",
                        trailer.group_count,
                        interchange.groups.len()
                    ),
                );
            }
            if trailer.control_number != header.control_number {
                collector.warning(
                    codes::CONTROL_NUMBER_MISMATCH,
                    path,
                    format!(
                        "IEA control number {} does not match ISA {}",
                        trailer.control_number, header.control_number
                    ),
                );
            }
        }
    }

    for (index, group) in interchange.groups.iter().enumerate() {
        check_group(collector, group, &format!("{path}/GS[{index}]"));
    }
}

fn check_group(collector: &mut Collector<'_>, group: &FunctionalGroup, path: &str) {
    let control_number = &group.header.control_number;

    if group.transactions.is_empty() {
        collector.error(
            codes::EMPTY_GROUP,
            path,
            format!("Functional group {control_number} contains no transaction sets"),
        );
    }

    match &group.trailer {
        None => collector.envelope(
            codes::UNCLOSED_GROUP,
            path,
            None,
            format!("Functional group {control_number} has no GE trailer"),
        ),
        Some(trailer) => {
            if !count_matches(trailer.transaction_count, group.transactions.len()) {
                collector.warning(
                    codes::GE_COUNT_MISMATCH,
                    path,
                    format!(
                        "GE declares {} transaction sets, found {}",
                        trailer.transaction_count,
                        group.transactions.len()
                    ),
                );
            }
            if &trailer.control_number != control_number {
                collector.warning(
                    codes::CONTROL_NUMBER_MISMATCH,
                    path,
                    format!(
                        "GE control number {} does not match GS {control_number}",
                        trailer.control_number
                    ),
                );
            }
        }
    }

    for (index, transaction) in group.transactions.iter().enumerate() {
        check_transaction(collector, transaction, &format!("{path}/ST[{index}]"));
    }
}

fn check_transaction(collector: &mut Collector<'_>, transaction: &TransactionSet, path: &str) {
    let header = &transaction.header;

    let Some(trailer) = &transaction.trailer else {
        collector.envelope(
            codes::UNCLOSED_TRANSACTION,
            path,
            None,
            format!(
                "Transaction set {} {} has no SE trailer",
                header.transaction_set_id, header.control_number
            ),
        );
        return;
    };

    let expected = transaction.expected_segment_count();
    if !count_matches(trailer.segment_count, expected) {
        collector.warning(
            codes::SE_COUNT_MISMATCH,
            path,
            format!(
                "SE declares {} segments, found {expected} including ST and SE",
                trailer.segment_count
            ),
        );
    }
    if trailer.control_number != header.control_number {
        collector.warning(
            codes::CONTROL_NUMBER_MISMATCH,
            path,
            format!(
                "SE control number {} does not match ST {}",
                trailer.control_number, header.control_number
            ),
        );
    }
}

fn count_matches(declared: u32, actual: usize) -> bool {
    usize::try_from(declared).ok() == Some(actual)
}
