//! X12 serializer
//!
//! Ordered segment assembly and rendering to delimited text. Every rendered
//! segment, including the last, ends with exactly one terminator.

use crate::parser::Segment;
use crate::syntax::Delimiters;
use tracing::warn;

/// Render segments as delimited text with a trailing terminator
pub fn render(segments: &[Segment], delimiters: &Delimiters) -> String {
    let mut out = String::new();
    for segment in segments {
        if let Some(value) = delimiter_clash(segment, delimiters) {
            warn!(
                segment = %segment.id,
                value,
                "Element value contains a separator and will split on read"
            );
        }
        out.push_str(&segment.render(delimiters));
        out.push(delimiters.segment);
    }
    out
}

/// Ordered-append builder that tracks the running segment count
#[derive(Debug, Clone, Default)]
pub struct SegmentBuilder {
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment
    pub fn add<I, S>(&mut self, id: &str, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segments.push(Segment::new(id, elements));
        self
    }

    /// Append an already built segment
    pub fn push(&mut self, segment: Segment) -> &mut Self {
        self.segments.push(segment);
        self
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn render(&self, delimiters: &Delimiters) -> String {
        render(&self.segments, delimiters)
    }
}

/// Builds one ST … SE transaction set
///
/// ```rust
/// use edi_adapter_x12::TransactionBuilder;
///
/// let mut tx = TransactionBuilder::new("947", "000000001");
/// tx.add("W15", ["A", "20240115"]);
/// let segments = tx.finish();
/// assert_eq!(segments.last().unwrap().elements, vec!["3", "000000001"]);
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    builder: SegmentBuilder,
    control_number: String,
}

impl TransactionBuilder {
    /// Start a transaction set, emitting its ST header
    pub fn new(transaction_set_id: &str, control_number: &str) -> Self {
        let mut builder = SegmentBuilder::new();
        builder.add("ST", [transaction_set_id, control_number]);
        Self {
            builder,
            control_number: control_number.to_string(),
        }
    }

    pub fn add<I, S>(&mut self, id: &str, elements: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder.add(id, elements);
        self
    }

    /// Segments emitted so far, ST included
    pub fn segment_count(&self) -> usize {
        self.builder.segment_count()
    }

    /// Close the set with an SE whose count includes both ST and SE
    pub fn finish(mut self) -> Vec<Segment> {
        let count = self.builder.segment_count() + 1;
        self.builder
            .add("SE", [count.to_string(), self.control_number.clone()]);
        self.builder.into_segments()
    }
}

/// First element value holding the element separator or segment terminator
fn delimiter_clash<'a>(segment: &'a Segment, delimiters: &Delimiters) -> Option<&'a str> {
    segment
        .elements
        .iter()
        .map(String::as_str)
        .find(|value| value.contains(delimiters.element) || value.contains(delimiters.segment))
}
