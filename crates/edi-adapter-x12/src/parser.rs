//! X12 tokenizer and envelope parser
//!
//! Parsing is a single forward pass: the raw text is split into segments,
//! the envelope state machine rebuilds the ISA → GS → ST nesting, and every
//! transaction set is then dispatched to its document parser. Malformed
//! partner data never aborts the parse; problems are collected on the
//! [`ParseOutcome`] for the validator to report.

use crate::documents;
use crate::envelopes::{
    FunctionalGroup, Interchange, TransactionSet, parse_ge, parse_gs, parse_iea, parse_isa,
    parse_se, parse_st,
};
use crate::syntax::{DelimiterOverrides, Delimiters};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// A tokenized X12 segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment identifier (e.g. "ST", "N1", "PO1")
    pub id: String,
    /// Data elements after the identifier, untrimmed
    pub elements: Vec<String>,
}

impl Segment {
    /// Create a segment from an id and its elements
    pub fn new<I, S>(id: impl Into<String>, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// Raw element at a zero-based position (`element(0)` is XX01), or "" if absent
    pub fn element(&self, index: usize) -> &str {
        self.elements.get(index).map_or("", String::as_str)
    }

    /// Trimmed element value, `None` when absent or blank
    pub fn value(&self, index: usize) -> Option<String> {
        let trimmed = self.element(index).trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Trimmed element value, "" when absent
    pub fn text(&self, index: usize) -> String {
        self.element(index).trim().to_string()
    }

    /// Render this segment without its terminator
    pub fn render(&self, delimiters: &Delimiters) -> String {
        let mut out = self.id.clone();
        for element in &self.elements {
            out.push(delimiters.element);
            out.push_str(element);
        }
        out
    }
}

/// Split raw interchange text into segments.
///
/// CR/LF are stripped everywhere, blank fragments are discarded, and segment
/// order is preserved exactly.
pub fn tokenize(raw: &str, delimiters: &Delimiters) -> Vec<Segment> {
    let cleaned: String = raw.chars().filter(|c| *c != '\r' && *c != '\n').collect();

    cleaned
        .split(delimiters.segment)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(|fragment| {
            let mut parts = fragment.split(delimiters.element);
            let id = parts.next().unwrap_or_default().trim().to_string();
            Segment {
                id,
                elements: parts.map(str::to_string).collect(),
            }
        })
        .collect()
}

/// A fatal problem that stopped the parse early
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
}

impl From<Error> for ParseError {
    fn from(error: Error) -> Self {
        Self {
            message: error.to_string(),
        }
    }
}

/// Out-of-order envelope structure seen while building the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnvelopeAnomaly {
    /// GS with no open interchange; the group and its contents are dropped
    OrphanGroup { position: usize, control_number: String },
    /// ST with no open group; the transaction and its contents are dropped
    OrphanTransaction { position: usize, control_number: String },
    /// Data segment with no open transaction
    OrphanSegment { position: usize, segment_id: String },
    /// IEA/GE/SE with nothing open to close
    StrayTrailer { position: usize, segment_id: String },
}

impl EnvelopeAnomaly {
    /// Zero-based index of the offending segment in the tokenized stream
    pub fn position(&self) -> usize {
        match self {
            Self::OrphanGroup { position, .. }
            | Self::OrphanTransaction { position, .. }
            | Self::OrphanSegment { position, .. }
            | Self::StrayTrailer { position, .. } => *position,
        }
    }

    /// Human-readable description
    pub fn describe(&self) -> String {
        match self {
            Self::OrphanGroup { control_number, .. } => format!(
                "GS {} appears outside an interchange (missing ISA)",
                control_number
            ),
            Self::OrphanTransaction { control_number, .. } => format!(
                "ST {} appears outside a functional group (missing GS)",
                control_number
            ),
            Self::OrphanSegment { segment_id, .. } => {
                format!("{} segment appears outside a transaction set", segment_id)
            }
            Self::StrayTrailer { segment_id, .. } => {
                format!("{} trailer has no matching open header", segment_id)
            }
        }
    }
}

/// Result of parsing a raw interchange
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseOutcome {
    /// Delimiters the text was tokenized with
    pub delimiters: Delimiters,
    /// Interchanges built (possibly partial)
    pub interchanges: Vec<Interchange>,
    /// Fatal parse errors (at most one per call)
    pub errors: Vec<ParseError>,
    /// Envelope structure problems tolerated during the parse
    pub anomalies: Vec<EnvelopeAnomaly>,
}

impl ParseOutcome {
    /// Iterate over every transaction set in document order
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionSet> + '_ {
        self.interchanges
            .iter()
            .flat_map(|i| i.groups.iter())
            .flat_map(|g| g.transactions.iter())
    }
}

/// Options for a parse call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Delimiters used when the text does not start with ISA
    #[serde(default)]
    pub delimiters: DelimiterOverrides,
    /// Reject inputs larger than this many bytes (None = unlimited)
    #[serde(default)]
    pub max_input_bytes: Option<usize>,
}

/// Parse raw X12 text with default delimiters
pub fn parse(raw: &str) -> ParseOutcome {
    X12Parser::new().parse(raw)
}

/// Parse raw X12 text, using `overrides` when no ISA header is present
pub fn parse_with_overrides(raw: &str, overrides: DelimiterOverrides) -> ParseOutcome {
    X12Parser::with_options(ParseOptions {
        delimiters: overrides,
        ..Default::default()
    })
    .parse(raw)
}

/// X12 parser producing interchange trees with dispatched documents
#[derive(Debug, Clone, Default)]
pub struct X12Parser {
    options: ParseOptions,
}

impl X12Parser {
    /// Create a parser with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with explicit options
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse a complete raw interchange. Never fails: fatal problems are
    /// reported in [`ParseOutcome::errors`] alongside whatever was built.
    pub fn parse(&self, raw: &str) -> ParseOutcome {
        let delimiters = Delimiters::resolve(raw, &self.options.delimiters);
        let mut builder = EnvelopeBuilder::default();

        let mut outcome = ParseOutcome {
            delimiters,
            ..Default::default()
        };

        if let Err(error) = self.build(raw, &delimiters, &mut builder) {
            warn!(%error, "X12 parse stopped early");
            outcome.errors.push(error.into());
        }

        outcome.interchanges = builder.interchanges;
        outcome.anomalies = builder.anomalies;

        for transaction in outcome
            .interchanges
            .iter_mut()
            .flat_map(|i| i.groups.iter_mut())
            .flat_map(|g| g.transactions.iter_mut())
        {
            transaction.parsed = Some(documents::dispatch(
                &transaction.header.transaction_set_id,
                &transaction.segments,
            ));
        }

        debug!(
            interchanges = outcome.interchanges.len(),
            anomalies = outcome.anomalies.len(),
            errors = outcome.errors.len(),
            "Finished parsing X12"
        );
        outcome
    }

    fn build(&self, raw: &str, delimiters: &Delimiters, builder: &mut EnvelopeBuilder) -> Result<()> {
        if let Some(limit) = self.options.max_input_bytes {
            if raw.len() > limit {
                return Err(Error::Parse(format!(
                    "input of {} bytes exceeds the {} byte limit",
                    raw.len(),
                    limit
                )));
            }
        }

        if raw.trim().is_empty() {
            return Ok(());
        }

        delimiters.validate()?;

        let segments = tokenize(raw, delimiters);
        trace!(segments = segments.len(), "Tokenized X12 input");

        for (position, segment) in segments.into_iter().enumerate() {
            builder.push(position, segment);
        }

        Ok(())
    }
}

/// State of one envelope level while walking the segment stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Slot {
    /// Nothing open at this level
    #[default]
    Closed,
    /// Open, and the last element of its parent's list
    Attached,
    /// Open but attached nowhere (its parent was missing)
    Detached,
}

/// Envelope segment kinds driving the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EnvelopeTag {
    Isa,
    Iea,
    Gs,
    Ge,
    St,
    Se,
    Data,
}

impl EnvelopeTag {
    fn of(id: &str) -> Self {
        match id {
            "ISA" => Self::Isa,
            "IEA" => Self::Iea,
            "GS" => Self::Gs,
            "GE" => Self::Ge,
            "ST" => Self::St,
            "SE" => Self::Se,
            _ => Self::Data,
        }
    }
}

/// Rebuilds Interchange → FunctionalGroup → TransactionSet nesting
#[derive(Debug, Default)]
struct EnvelopeBuilder {
    interchanges: Vec<Interchange>,
    anomalies: Vec<EnvelopeAnomaly>,
    interchange: Slot,
    group: Slot,
    transaction: Slot,
}

impl EnvelopeBuilder {
    fn push(&mut self, position: usize, segment: Segment) {
        match EnvelopeTag::of(&segment.id) {
            EnvelopeTag::Isa => {
                self.interchanges.push(Interchange::new(parse_isa(&segment)));
                self.interchange = Slot::Attached;
                self.group = Slot::Closed;
                self.transaction = Slot::Closed;
            }
            EnvelopeTag::Iea => {
                match self.interchange {
                    Slot::Attached => {
                        if let Some(interchange) = self.interchanges.last_mut() {
                            interchange.trailer = Some(parse_iea(&segment));
                        }
                    }
                    _ => self.stray(position, &segment),
                }
                self.interchange = Slot::Closed;
                self.group = Slot::Closed;
                self.transaction = Slot::Closed;
            }
            EnvelopeTag::Gs => {
                let header = parse_gs(&segment);
                match self.current_interchange() {
                    Some(interchange) => {
                        interchange.groups.push(FunctionalGroup::new(header));
                        self.group = Slot::Attached;
                    }
                    None => {
                        self.anomalies.push(EnvelopeAnomaly::OrphanGroup {
                            position,
                            control_number: header.control_number,
                        });
                        self.group = Slot::Detached;
                    }
                }
                self.transaction = Slot::Closed;
            }
            EnvelopeTag::Ge => {
                match self.group {
                    Slot::Attached => {
                        if let Some(group) = self.current_group() {
                            group.trailer = Some(parse_ge(&segment));
                        }
                    }
                    Slot::Detached => {}
                    Slot::Closed => self.stray(position, &segment),
                }
                self.group = Slot::Closed;
                self.transaction = Slot::Closed;
            }
            EnvelopeTag::St => {
                let header = parse_st(&segment);
                match self.group {
                    Slot::Attached => {
                        if let Some(group) = self.current_group() {
                            group.transactions.push(TransactionSet::new(header));
                        }
                        self.transaction = Slot::Attached;
                    }
                    Slot::Detached => self.transaction = Slot::Detached,
                    Slot::Closed => {
                        self.anomalies.push(EnvelopeAnomaly::OrphanTransaction {
                            position,
                            control_number: header.control_number,
                        });
                        self.transaction = Slot::Detached;
                    }
                }
            }
            EnvelopeTag::Se => {
                match self.transaction {
                    Slot::Attached => {
                        if let Some(transaction) = self.current_transaction() {
                            transaction.trailer = Some(parse_se(&segment));
                        }
                    }
                    Slot::Detached => {}
                    Slot::Closed => self.stray(position, &segment),
                }
                self.transaction = Slot::Closed;
            }
            EnvelopeTag::Data => match self.transaction {
                Slot::Attached => {
                    if let Some(transaction) = self.current_transaction() {
                        transaction.segments.push(segment);
                    }
                }
                Slot::Detached => {}
                Slot::Closed => {
                    trace!(position, id = %segment.id, "Dropping orphan segment");
                    self.anomalies.push(EnvelopeAnomaly::OrphanSegment {
                        position,
                        segment_id: segment.id,
                    });
                }
            },
        }
    }

    fn stray(&mut self, position: usize, segment: &Segment) {
        self.anomalies.push(EnvelopeAnomaly::StrayTrailer {
            position,
            segment_id: segment.id.clone(),
        });
    }

    fn current_interchange(&mut self) -> Option<&mut Interchange> {
        match self.interchange {
            Slot::Attached => self.interchanges.last_mut(),
            _ => None,
        }
    }

    fn current_group(&mut self) -> Option<&mut FunctionalGroup> {
        if self.group != Slot::Attached {
            return None;
        }
        self.current_interchange()?.groups.last_mut()
    }

    fn current_transaction(&mut self) -> Option<&mut TransactionSet> {
        if self.transaction != Slot::Attached {
            return None;
        }
        self.current_group()?.transactions.last_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;

    const MINIMAL_850: &str = "ISA*00*          *00*          *ZZ*BUYER          *ZZ*WAREHOUSE      *240115*1030*^*00401*000000101*0*P*:~\
GS*PO*BUYER*WAREHOUSE*20240115*1030*201*X*004010~\
ST*850*0001~\
BEG*00*NE*PO-1001**20240115~\
REF*DP*042~\
PO1*1*24*EA*3.50**SK*WIDGET-1~\
SE*5*0001~\
GE*1*201~\
IEA*1*000000101~";

    #[test]
    fn test_tokenize_strips_line_endings_and_blank_fragments() {
        let raw = "ST*850*0001~\r\nBEG*00*NE*PO1~\n~  ~SE*3*0001~";
        let segments = tokenize(raw, &Delimiters::default());
        let ids: Vec<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["ST", "BEG", "SE"]);
        assert_eq!(segments[1].elements, vec!["00", "NE", "PO1"]);
    }

    #[test]
    fn test_tokenize_keeps_empty_and_untrimmed_elements() {
        let segments = tokenize("N3* 12 Main St **~", &Delimiters::default());
        assert_eq!(segments[0].elements, vec![" 12 Main St ", "", ""]);
        assert_eq!(segments[0].value(0).as_deref(), Some("12 Main St"));
        assert_eq!(segments[0].value(1), None);
        assert_eq!(segments[0].element(9), "");
    }

    #[test]
    fn test_empty_input_is_not_malformed() {
        for raw in ["", "   ", "\r\n"] {
            let outcome = parse(raw);
            assert!(outcome.interchanges.is_empty());
            assert!(outcome.errors.is_empty());
            assert!(outcome.anomalies.is_empty());
        }
    }

    #[test]
    fn test_parse_minimal_850() {
        let outcome = parse(MINIMAL_850);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.delimiters.element, '*');

        let interchange = &outcome.interchanges[0];
        assert_eq!(interchange.header.sender_id, "BUYER");
        assert_eq!(interchange.header.control_number, "000000101");
        assert_eq!(interchange.trailer.as_ref().unwrap().group_count, 1);

        let group = &interchange.groups[0];
        assert_eq!(group.header.functional_id, "PO");
        let transaction = &group.transactions[0];
        assert_eq!(transaction.header.transaction_set_id, "850");
        assert_eq!(transaction.segments.len(), 3);
        assert_eq!(transaction.trailer.as_ref().unwrap().segment_count, 5);

        match transaction.parsed.as_ref().unwrap() {
            Document::PurchaseOrder(po) => {
                assert_eq!(po.header.po_number.as_deref(), Some("PO-1001"));
                assert_eq!(po.items[0].quantity, 24.0);
            }
            other => panic!("expected purchase order, got {:?}", other),
        }
    }

    #[test]
    fn test_orphan_group_and_segments_are_recorded() {
        let raw = "GS*PO*A*B*20240101*1200*7*X*004010~ST*850*0001~BEG*00*NE*X~SE*3*0001~GE*1*7~";
        let outcome = parse(raw);
        assert!(outcome.interchanges.is_empty());
        assert!(outcome.errors.is_empty());
        assert_eq!(
            outcome.anomalies,
            vec![EnvelopeAnomaly::OrphanGroup {
                position: 0,
                control_number: "7".to_string()
            }]
        );
    }

    #[test]
    fn test_segment_outside_transaction_is_dropped() {
        let raw = "ISA*00*          *00*          *ZZ*A              *ZZ*B              *240101*1200*^*00401*000000001*0*P*:~\
REF*XX*1~IEA*0*000000001~";
        let outcome = parse(raw);
        assert_eq!(outcome.interchanges.len(), 1);
        assert!(outcome.interchanges[0].groups.is_empty());
        assert!(matches!(
            outcome.anomalies.as_slice(),
            [EnvelopeAnomaly::OrphanSegment { position: 1, .. }]
        ));
    }

    #[test]
    fn test_stray_trailer_is_recorded() {
        let outcome = parse("SE*2*0001~");
        assert!(matches!(
            outcome.anomalies.as_slice(),
            [EnvelopeAnomaly::StrayTrailer { segment_id, .. }] if segment_id == "SE"
        ));
    }

    #[test]
    fn test_unclosed_interchange_keeps_partial_tree() {
        let raw = MINIMAL_850.trim_end_matches("IEA*1*000000101~");
        let outcome = parse(raw);
        assert_eq!(outcome.interchanges.len(), 1);
        assert!(outcome.interchanges[0].trailer.is_none());
        assert_eq!(outcome.interchanges[0].groups[0].transactions.len(), 1);
    }

    #[test]
    fn test_unpadded_isa_still_parses_its_transaction() {
        let raw = "ISA*00**00**ZZ*SENDER*ZZ*RECV*240115*1030*U*00401*000000001*0*P*:~\
GS*IJ*SENDER*RECV*20240115*1030*1*X*004010~ST*947*0001~W15*20240115*ADJ-1~\
SE*3*0001~GE*1*1~IEA*1*000000001~";
        let outcome = parse(raw);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.delimiters, Delimiters::default());
        assert_eq!(outcome.interchanges[0].header.sender_id, "SENDER");
        let transaction = outcome.transactions().next().unwrap();
        assert_eq!(transaction.header.transaction_set_id, "947");
        assert_eq!(transaction.segments.len(), 1);
    }

    #[test]
    fn test_conflicting_delimiters_surface_as_single_error() {
        let overrides = DelimiterOverrides {
            segment: Some('*'),
            ..Default::default()
        };
        let outcome = parse_with_overrides("ST*850*1*", overrides);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.interchanges.is_empty());
    }

    #[test]
    fn test_input_limit() {
        let parser = X12Parser::with_options(ParseOptions {
            max_input_bytes: Some(10),
            ..Default::default()
        });
        let outcome = parser.parse(MINIMAL_850);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("byte limit"));
    }

    #[test]
    fn test_unknown_transaction_passes_through() {
        let raw = MINIMAL_850.replace("ST*850", "ST*999");
        let outcome = parse(&raw);
        let transaction = outcome.transactions().next().unwrap();
        match transaction.parsed.as_ref().unwrap() {
            Document::Unknown { type_code, segments } => {
                assert_eq!(type_code, "999");
                assert_eq!(segments.len(), 3);
            }
            other => panic!("expected passthrough, got {:?}", other),
        }
    }
}
