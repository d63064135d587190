//! X12 envelope handling (ISA/IEA, GS/GE, ST/SE)
//!
//! This module provides parsing and generation of the three envelope levels.
//! Parsing is positional and permissive: missing elements read as empty
//! strings and trailer counts fall back to zero.

use crate::documents::Document;
use crate::numeric::lenient_u32;
use crate::parser::Segment;
use crate::syntax::Delimiters;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Interchange envelope (ISA … IEA)
#[derive(Debug, Clone, Serialize)]
pub struct Interchange {
    /// ISA segment (interchange header)
    pub header: IsaHeader,
    /// IEA segment (interchange trailer) - None until seen
    pub trailer: Option<InterchangeTrailer>,
    /// Functional groups within this interchange
    pub groups: Vec<FunctionalGroup>,
}

/// Functional group envelope (GS … GE)
#[derive(Debug, Clone, Serialize)]
pub struct FunctionalGroup {
    pub header: GsHeader,
    pub trailer: Option<GroupTrailer>,
    pub transactions: Vec<TransactionSet>,
}

/// Transaction set envelope (ST … SE)
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSet {
    pub header: StHeader,
    pub trailer: Option<TransactionTrailer>,
    /// Segments between ST and SE, exclusive
    pub segments: Vec<Segment>,
    /// Typed document, filled in by the dispatcher
    pub parsed: Option<Document>,
}

impl Interchange {
    pub fn new(header: IsaHeader) -> Self {
        Self {
            header,
            trailer: None,
            groups: Vec::new(),
        }
    }

    /// Whether the matching IEA was seen
    pub fn is_closed(&self) -> bool {
        self.trailer.is_some()
    }
}

impl FunctionalGroup {
    pub fn new(header: GsHeader) -> Self {
        Self {
            header,
            trailer: None,
            transactions: Vec::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.trailer.is_some()
    }
}

impl TransactionSet {
    pub fn new(header: StHeader) -> Self {
        Self {
            header,
            trailer: None,
            segments: Vec::new(),
            parsed: None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.trailer.is_some()
    }

    /// Segment count the SE trailer should carry (body plus ST and SE)
    pub fn expected_segment_count(&self) -> usize {
        self.segments.len() + 2
    }
}

/// ISA - Interchange Control Header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsaHeader {
    pub auth_info_qualifier: String,
    pub auth_info: String,
    pub security_info_qualifier: String,
    pub security_info: String,
    pub sender_id_qualifier: String,
    pub sender_id: String,
    pub receiver_id_qualifier: String,
    pub receiver_id: String,
    /// YYMMDD
    pub date: String,
    /// HHMM
    pub time: String,
    pub repetition_separator: String,
    pub control_version: String,
    pub control_number: String,
    pub ack_requested: String,
    /// P = production, T = test
    pub usage_indicator: String,
    pub component_separator: String,
    /// Number of data elements actually present (16 when well-formed)
    pub element_count: usize,
}

/// IEA - Interchange Control Trailer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeTrailer {
    pub group_count: u32,
    pub control_number: String,
}

/// GS - Functional Group Header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GsHeader {
    /// Functional identifier code (PO, SH, IN, ...)
    pub functional_id: String,
    pub sender_code: String,
    pub receiver_code: String,
    /// CCYYMMDD
    pub date: String,
    pub time: String,
    pub control_number: String,
    pub responsible_agency: String,
    pub version: String,
}

/// GE - Functional Group Trailer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTrailer {
    pub transaction_count: u32,
    pub control_number: String,
}

/// ST - Transaction Set Header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StHeader {
    /// Transaction set identifier (850, 856, ...)
    pub transaction_set_id: String,
    pub control_number: String,
    pub implementation_convention: Option<String>,
}

/// SE - Transaction Set Trailer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTrailer {
    /// Number of segments including ST and SE
    pub segment_count: u32,
    pub control_number: String,
}

/// Party identifier (sender or receiver)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartyId {
    /// Interchange id (e.g. DUNS number or mutually defined code)
    pub id: String,
    /// ID qualifier (e.g. "01" DUNS, "ZZ" mutually defined); ZZ when absent
    #[serde(default)]
    pub qualifier: Option<String>,
}

impl PartyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            qualifier: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    fn qualifier_or_default(&self) -> &str {
        self.qualifier.as_deref().unwrap_or("ZZ")
    }
}

impl std::str::FromStr for PartyId {
    type Err = std::convert::Infallible;

    /// Accepts `ID` or `QUALIFIER:ID`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.split_once(':') {
            Some((qualifier, id)) => PartyId::new(id).with_qualifier(qualifier),
            None => PartyId::new(s),
        })
    }
}

/// Envelope settings for generated interchanges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeOptions {
    /// ISA01
    pub auth_qualifier: String,
    /// ISA02
    pub auth_info: String,
    /// ISA03
    pub security_qualifier: String,
    /// ISA04
    pub security_info: String,
    /// ISA12
    pub control_version: String,
    /// ISA14
    pub ack_requested: String,
    /// ISA15 (P = production, T = test)
    pub usage_indicator: String,
    /// GS08
    pub group_version: String,
    /// Fixed preparation time; the current time when unset
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            auth_qualifier: "00".to_string(),
            auth_info: String::new(),
            security_qualifier: "00".to_string(),
            security_info: String::new(),
            control_version: "00401".to_string(),
            ack_requested: "0".to_string(),
            usage_indicator: "P".to_string(),
            group_version: "004010".to_string(),
            timestamp: None,
        }
    }
}

// ============================================================================
// Parsing Functions
// ============================================================================

/// Parse an ISA (Interchange Control Header) segment
pub fn parse_isa(segment: &Segment) -> IsaHeader {
    IsaHeader {
        auth_info_qualifier: segment.text(0),
        auth_info: segment.text(1),
        security_info_qualifier: segment.text(2),
        security_info: segment.text(3),
        sender_id_qualifier: segment.text(4),
        sender_id: segment.text(5),
        receiver_id_qualifier: segment.text(6),
        receiver_id: segment.text(7),
        date: segment.text(8),
        time: segment.text(9),
        repetition_separator: segment.text(10),
        control_version: segment.text(11),
        control_number: segment.text(12),
        ack_requested: segment.text(13),
        usage_indicator: segment.text(14),
        component_separator: segment.text(15),
        element_count: segment.elements.len(),
    }
}

/// Parse an IEA (Interchange Control Trailer) segment
pub fn parse_iea(segment: &Segment) -> InterchangeTrailer {
    InterchangeTrailer {
        group_count: lenient_u32(segment.element(0)),
        control_number: segment.text(1),
    }
}

/// Parse a GS (Functional Group Header) segment
pub fn parse_gs(segment: &Segment) -> GsHeader {
    GsHeader {
        functional_id: segment.text(0),
        sender_code: segment.text(1),
        receiver_code: segment.text(2),
        date: segment.text(3),
        time: segment.text(4),
        control_number: segment.text(5),
        responsible_agency: segment.text(6),
        version: segment.text(7),
    }
}

/// Parse a GE (Functional Group Trailer) segment
pub fn parse_ge(segment: &Segment) -> GroupTrailer {
    GroupTrailer {
        transaction_count: lenient_u32(segment.element(0)),
        control_number: segment.text(1),
    }
}

/// Parse an ST (Transaction Set Header) segment
pub fn parse_st(segment: &Segment) -> StHeader {
    StHeader {
        transaction_set_id: segment.text(0),
        control_number: segment.text(1),
        implementation_convention: segment.value(2),
    }
}

/// Parse an SE (Transaction Set Trailer) segment
pub fn parse_se(segment: &Segment) -> TransactionTrailer {
    TransactionTrailer {
        segment_count: lenient_u32(segment.element(0)),
        control_number: segment.text(1),
    }
}

// ============================================================================
// Generation Functions
// ============================================================================

/// Reject ISA values the fixed-width header cannot carry.
///
/// Widths are counted in bytes by readers, so every field and delimiter
/// must be ASCII for ISA16 to land on offset 104.
pub fn check_isa_values(
    sender: &PartyId,
    receiver: &PartyId,
    options: &EnvelopeOptions,
    delimiters: &Delimiters,
) -> Result<()> {
    let fields = [
        ("ISA01", options.auth_qualifier.as_str()),
        ("ISA02", options.auth_info.as_str()),
        ("ISA03", options.security_qualifier.as_str()),
        ("ISA04", options.security_info.as_str()),
        ("ISA05", sender.qualifier_or_default()),
        ("ISA06", sender.id.as_str()),
        ("ISA07", receiver.qualifier_or_default()),
        ("ISA08", receiver.id.as_str()),
        ("ISA12", options.control_version.as_str()),
        ("ISA14", options.ack_requested.as_str()),
        ("ISA15", options.usage_indicator.as_str()),
    ];
    if let Some((name, value)) = fields.iter().find(|(_, value)| !value.is_ascii()) {
        return Err(Error::Envelope(format!("{name} value {value:?} is not ASCII")));
    }

    let separators = [
        delimiters.element,
        delimiters.segment,
        delimiters.component,
        delimiters.repetition,
    ];
    if let Some(c) = separators.iter().find(|c| !c.is_ascii()) {
        return Err(Error::Envelope(format!("delimiter {c:?} is not ASCII")));
    }
    Ok(())
}

/// Generate an ISA segment. Fixed-width fields are space padded (and
/// truncated when too long) so the separators land on offsets 104/105.
pub fn generate_isa(
    sender: &PartyId,
    receiver: &PartyId,
    control_number: &str,
    options: &EnvelopeOptions,
    delimiters: &Delimiters,
    timestamp: DateTime<Utc>,
) -> Segment {
    Segment::new(
        "ISA",
        [
            fixed_width(&options.auth_qualifier, 2),
            fixed_width(&options.auth_info, 10),
            fixed_width(&options.security_qualifier, 2),
            fixed_width(&options.security_info, 10),
            fixed_width(sender.qualifier_or_default(), 2),
            fixed_width(&sender.id, 15),
            fixed_width(receiver.qualifier_or_default(), 2),
            fixed_width(&receiver.id, 15),
            timestamp.format("%y%m%d").to_string(),
            timestamp.format("%H%M").to_string(),
            delimiters.repetition.to_string(),
            fixed_width(&options.control_version, 5),
            control_number.to_string(),
            fixed_width(&options.ack_requested, 1),
            fixed_width(&options.usage_indicator, 1),
            delimiters.component.to_string(),
        ],
    )
}

/// Generate an IEA segment
pub fn generate_iea(group_count: usize, control_number: &str) -> Segment {
    Segment::new("IEA", [group_count.to_string(), control_number.to_string()])
}

/// Generate a GS segment
pub fn generate_gs(
    functional_id: &str,
    sender: &PartyId,
    receiver: &PartyId,
    control_number: &str,
    options: &EnvelopeOptions,
    timestamp: DateTime<Utc>,
) -> Segment {
    Segment::new(
        "GS",
        [
            functional_id.to_string(),
            sender.id.clone(),
            receiver.id.clone(),
            timestamp.format("%Y%m%d").to_string(),
            timestamp.format("%H%M").to_string(),
            control_number.to_string(),
            "X".to_string(),
            options.group_version.clone(),
        ],
    )
}

/// Generate a GE segment
pub fn generate_ge(transaction_count: usize, control_number: &str) -> Segment {
    Segment::new("GE", [transaction_count.to_string(), control_number.to_string()])
}

/// Pads or truncates an ASCII value to `width` bytes
fn fixed_width(value: &str, width: usize) -> String {
    if value.len() > width {
        warn!(value, width, "Truncating ISA field to its fixed width");
        return value.chars().take(width).collect();
    }
    format!("{:<width$}", value, width = width)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use chrono::TimeZone;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    fn first_segment(raw: &str) -> Segment {
        tokenize(raw, &Delimiters::default()).remove(0)
    }

    #[test]
    fn test_parse_isa_trims_fixed_width_fields() {
        let isa = first_segment(
            "ISA*00*          *00*          *ZZ*SENDER         *01*RECEIVER       *240115*1030*^*00401*000000042*0*T*:~",
        );
        let header = parse_isa(&isa);
        assert_eq!(header.sender_id, "SENDER");
        assert_eq!(header.receiver_id_qualifier, "01");
        assert_eq!(header.receiver_id, "RECEIVER");
        assert_eq!(header.control_number, "000000042");
        assert_eq!(header.usage_indicator, "T");
        assert_eq!(header.component_separator, ":");
        assert_eq!(header.element_count, 16);
    }

    #[test]
    fn test_parse_trailers_are_lenient() {
        let iea = parse_iea(&first_segment("IEA*x*000000001~"));
        assert_eq!(iea.group_count, 0);
        assert_eq!(iea.control_number, "000000001");

        let se = parse_se(&first_segment("SE*12*0001~"));
        assert_eq!(se.segment_count, 12);
    }

    #[test]
    fn test_parse_gs_and_st() {
        let gs = parse_gs(&first_segment("GS*SH*SND*RCV*20240115*1030*7*X*004010~"));
        assert_eq!(gs.functional_id, "SH");
        assert_eq!(gs.control_number, "7");
        assert_eq!(gs.version, "004010");

        let st = parse_st(&first_segment("ST*856*0001*005010X123~"));
        assert_eq!(st.transaction_set_id, "856");
        assert_eq!(st.implementation_convention.as_deref(), Some("005010X123"));
    }

    #[test]
    fn test_generate_isa_is_fixed_width() {
        let delimiters = Delimiters::default();
        let isa = generate_isa(
            &PartyId::new("SENDER"),
            &PartyId::new("RECEIVER").with_qualifier("01"),
            "000000001",
            &EnvelopeOptions::default(),
            &delimiters,
            timestamp(),
        );
        assert_eq!(isa.elements.len(), 16);

        let rendered = format!("{}{}", isa.render(&delimiters), delimiters.segment);
        assert_eq!(rendered.len(), 106);
        assert_eq!(&rendered[104..105], ":");
        assert_eq!(&rendered[105..106], "~");
        assert!(rendered.contains("*240115*1030*"));
    }

    #[test]
    fn test_generate_isa_truncates_long_ids() {
        let isa = generate_isa(
            &PartyId::new("A-VERY-LONG-SENDER-IDENTIFIER"),
            &PartyId::new("R"),
            "000000001",
            &EnvelopeOptions::default(),
            &Delimiters::default(),
            timestamp(),
        );
        assert_eq!(isa.elements[5], "A-VERY-LONG-SEN");
    }

    #[test]
    fn test_generate_gs_and_trailers() {
        let gs = generate_gs(
            "SH",
            &PartyId::new("SND"),
            &PartyId::new("RCV"),
            "000000003",
            &EnvelopeOptions::default(),
            timestamp(),
        );
        assert_eq!(
            gs.render(&Delimiters::default()),
            "GS*SH*SND*RCV*20240115*1030*000000003*X*004010"
        );
        assert_eq!(generate_ge(1, "000000003").elements, vec!["1", "000000003"]);
        assert_eq!(generate_iea(1, "000000009").id, "IEA");
    }

    #[test]
    fn test_party_id_from_str() {
        let party: PartyId = "01:123456789".parse().unwrap();
        assert_eq!(party.id, "123456789");
        assert_eq!(party.qualifier.as_deref(), Some("01"));

        let plain: PartyId = "WAREHOUSE".parse().unwrap();
        assert_eq!(plain.qualifier, None);
    }
}
