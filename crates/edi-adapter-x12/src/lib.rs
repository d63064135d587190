//! # edi-adapter-x12
//!
//! ANSI X12 parser/generator and envelope handling.
//!
//! This crate translates between raw X12 interchange text and typed
//! warehouse/order documents (850, 855, 856, 810, 940, 943, 944, 945, 947),
//! and generates enveloped outbound documents with managed control numbers.
//!
//! ```rust
//! use edi_adapter_x12::parse;
//!
//! let outcome = parse("");
//! assert!(outcome.interchanges.is_empty());
//! assert!(outcome.errors.is_empty());
//! ```

pub mod control;
pub mod documents;
pub mod envelopes;
pub mod generator;
mod numeric;
pub mod parser;
pub mod registry;
pub mod serializer;
pub mod syntax;

pub use control::{
    ControlNumberAllocator, ControlNumberKind, ControlNumbers, CounterOverrides,
    FileControlNumberAllocator, MemoryControlNumberAllocator,
};
pub use documents::{Document, OutboundDocument};
pub use envelopes::{EnvelopeOptions, FunctionalGroup, Interchange, PartyId, TransactionSet};
pub use generator::X12Generator;
pub use parser::{
    EnvelopeAnomaly, ParseError, ParseOptions, ParseOutcome, Segment, X12Parser, parse,
    parse_with_overrides,
};
pub use registry::{Direction, TransactionSetType};
pub use serializer::{SegmentBuilder, TransactionBuilder};
pub use syntax::{DelimiterOverrides, Delimiters};

use thiserror::Error;

/// Errors that can occur when parsing/generating X12
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid delimiter set: {0}")]
    Delimiters(String),

    #[error("Envelope error: {0}")]
    Envelope(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Control number error: {0}")]
    ControlNumber(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
