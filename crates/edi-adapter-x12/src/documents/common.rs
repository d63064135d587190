//! Building blocks shared by the per-type documents: parties, product
//! identifiers, references, lots, and the date/number helpers used on both
//! the parse and the build side.

use crate::numeric::format_number;
use crate::parser::Segment;
use crate::serializer::TransactionBuilder;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// Qualified product identifier (UP = UPC, SK = SKU, VP = vendor part, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductId {
    pub qualifier: String,
    pub value: String,
}

/// Collect qualifier/value pairs starting at `start`. Pairs with a blank
/// qualifier or value are skipped.
pub(crate) fn product_ids(segment: &Segment, start: usize) -> Vec<ProductId> {
    (start..segment.elements.len())
        .step_by(2)
        .filter_map(|i| {
            Some(ProductId {
                qualifier: segment.value(i)?,
                value: segment.value(i + 1)?,
            })
        })
        .collect()
}

/// First product id carrying `qualifier`
pub fn find_product_id<'a>(ids: &'a [ProductId], qualifier: &str) -> Option<&'a str> {
    ids.iter()
        .find(|id| id.qualifier == qualifier)
        .map(|id| id.value.as_str())
}

/// REF / N9 reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub qualifier: String,
    pub value: Option<String>,
    pub description: Option<String>,
}

impl Reference {
    pub(crate) fn from_segment(segment: &Segment) -> Self {
        Self {
            qualifier: segment.text(0),
            value: segment.value(1),
            description: segment.value(2),
        }
    }
}

/// DTM date reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateReference {
    /// 002 = delivery requested, 010 = requested ship, 011 = shipped, ...
    pub qualifier: String,
    pub date: Option<String>,
}

/// G61 contact attached to a party
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub function: String,
    pub name: Option<String>,
    pub communication_qualifier: Option<String>,
    pub number: Option<String>,
}

/// N1 party with the N3/N4/G61 segments that followed it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Entity identifier (ST = ship to, BT = bill to, SF = ship from, DE = depositor)
    pub qualifier: String,
    pub name: Option<String>,
    pub id_qualifier: Option<String>,
    pub id: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub contact: Option<Contact>,
}

/// Feed a party-loop segment into `parties`. Returns false for segments
/// that are not part of an N1 loop; address lines with no preceding N1 are
/// consumed and dropped.
pub(crate) fn apply_party_segment(parties: &mut Vec<Party>, segment: &Segment) -> bool {
    match segment.id.as_str() {
        "N1" => parties.push(Party {
            qualifier: segment.text(0),
            name: segment.value(1),
            id_qualifier: segment.value(2),
            id: segment.value(3),
            ..Default::default()
        }),
        "N3" => {
            if let Some(party) = parties.last_mut() {
                party.address1 = segment.value(0);
                party.address2 = segment.value(1);
            }
        }
        "N4" => {
            if let Some(party) = parties.last_mut() {
                party.city = segment.value(0);
                party.state = segment.value(1);
                party.zip = segment.value(2);
                party.country = segment.value(3);
            }
        }
        "G61" => {
            if let Some(party) = parties.last_mut() {
                party.contact = Some(Contact {
                    function: segment.text(0),
                    name: segment.value(1),
                    communication_qualifier: segment.value(2),
                    number: segment.value(3),
                });
            }
        }
        _ => return false,
    }
    true
}

/// First party with the given entity qualifier
pub fn find_party<'a>(parties: &'a [Party], qualifier: &str) -> Option<&'a Party> {
    parties.iter().find(|p| p.qualifier == qualifier)
}

/// W20 lot information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub number: Option<String>,
    pub expiration_date: Option<String>,
    pub manufacture_date: Option<String>,
}

impl Lot {
    pub(crate) fn from_segment(segment: &Segment) -> Self {
        Self {
            number: segment.value(0),
            expiration_date: segment.value(3),
            manufacture_date: segment.value(4),
        }
    }
}

/// Parse an X12 date (CCYYMMDD, or YYMMDD with years below 50 in the 2000s)
pub fn parse_x12_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match value.len() {
        8 => NaiveDate::parse_from_str(value, "%Y%m%d").ok(),
        6 => {
            let yy: i32 = value[0..2].parse().ok()?;
            let month: u32 = value[2..4].parse().ok()?;
            let day: u32 = value[4..6].parse().ok()?;
            let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        _ => None,
    }
}

/// Date and optional time of day read from a caller-supplied value
fn parse_input_datetime(value: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some((dt.date_naive(), Some(dt.time())));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some((dt.date(), Some(dt.time())));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some((date, None));
    }
    parse_x12_date(value).map(|date| (date, None))
}

/// Render a caller date as CCYYMMDD. Values that are not recognisable
/// dates are passed through unchanged.
pub fn format_date(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return String::new();
    };
    match parse_input_datetime(value) {
        Some((date, _)) => date.format("%Y%m%d").to_string(),
        None => value.to_string(),
    }
}

/// Render the time of day of a caller timestamp as HHMM ("0000" for plain dates)
pub fn format_time(value: Option<&str>) -> String {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return String::new();
    };
    match parse_input_datetime(value) {
        Some((_, Some(time))) => format!("{:02}{:02}", time.hour(), time.minute()),
        Some((_, None)) => "0000".to_string(),
        None => String::new(),
    }
}

// ============================================================================
// Builder inputs shared across document types
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// Accept `"12"`, `12` or `12.5` for identifiers that callers send as numbers
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(i) => i.to_string(),
        Scalar::Float(f) => format_number(f),
    }))
}

/// Name, identifier and address of a trading party
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartyInput {
    pub name: Option<String>,
    /// N103, "92" (assigned by buyer) when absent
    pub id_qualifier: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub id: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub zip: Option<String>,
    /// "US" when absent
    pub country: Option<String>,
    pub contact: Option<ContactInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactInput {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Carrier routing details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarrierInput {
    /// Transportation method code, "M" (motor) when absent
    pub method: Option<String>,
    pub scac: Option<String>,
    pub name: Option<String>,
    pub service_level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReferenceInput {
    pub qualifier: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub value: Option<String>,
}

pub(crate) fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

pub(crate) fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(default)
}

/// Number rendered as an element, or "" when absent or zero
pub(crate) fn number_or_empty(value: Option<f64>) -> String {
    value.filter(|v| *v != 0.0).map(format_number).unwrap_or_default()
}

/// Unit price with two decimals
pub(crate) fn price(value: Option<f64>) -> String {
    format!("{:.2}", value.unwrap_or(0.0))
}

/// Product id pairs in UP, SK, VP order, skipping the absent ones
pub(crate) fn product_id_elements(
    upc: &Option<String>,
    sku: &Option<String>,
    vendor_part: &Option<String>,
) -> Vec<String> {
    [("UP", upc), ("SK", sku), ("VP", vendor_part)]
        .into_iter()
        .filter_map(|(qualifier, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| [qualifier.to_string(), v.to_string()])
        })
        .flatten()
        .collect()
}

/// Emit an N1 loop (N1, then N3/N4/G61 when their data is present)
pub(crate) fn push_party(tx: &mut TransactionBuilder, entity: &str, party: &PartyInput) {
    tx.add(
        "N1",
        [
            entity,
            or_empty(&party.name),
            or_default(&party.id_qualifier, "92"),
            or_empty(&party.id),
        ],
    );
    if let Some(address1) = party.address1.as_deref().filter(|v| !v.is_empty()) {
        tx.add("N3", [address1, or_empty(&party.address2)]);
    }
    if let Some(city) = party.city.as_deref().filter(|v| !v.is_empty()) {
        tx.add(
            "N4",
            [
                city,
                or_empty(&party.state),
                or_empty(&party.zip),
                or_default(&party.country, "US"),
            ],
        );
    }
    if let Some(contact) = &party.contact {
        tx.add(
            "G61",
            ["CN", or_empty(&contact.name), "TE", or_empty(&contact.phone)],
        );
    }
}
