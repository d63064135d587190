//! 855 Purchase Order Acknowledgment

use super::common::{
    ProductId, Reference, ReferenceInput, find_product_id, format_date, or_default, or_empty,
    price, product_id_elements, product_ids, text_or_number,
};
use crate::numeric::{format_number, lenient_f64, lenient_u32};
use crate::parser::Segment;
use crate::serializer::TransactionBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoAcknowledgment {
    pub header: AcknowledgmentHeader,
    pub references: Vec<Reference>,
    pub items: Vec<AcknowledgedItem>,
    /// CTT01
    pub line_items: Option<u32>,
}

/// BAK
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgmentHeader {
    pub purpose: Option<String>,
    /// AC = acknowledge with detail and change, AD = acknowledge with detail
    pub ack_type: Option<String>,
    pub po_number: Option<String>,
    pub date: Option<String>,
    pub request_reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcknowledgedItem {
    pub line_number: Option<String>,
    pub quantity: f64,
    pub uom: Option<String>,
    pub unit_price: f64,
    pub product_ids: Vec<ProductId>,
    pub acknowledgment: Option<ItemAcknowledgment>,
}

impl AcknowledgedItem {
    pub fn product_id(&self, qualifier: &str) -> Option<&str> {
        find_product_id(&self.product_ids, qualifier)
    }
}

/// ACK line status
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemAcknowledgment {
    /// IA = accepted, IR = rejected, IQ = accepted with quantity change
    pub status: Option<String>,
    pub quantity: f64,
    pub uom: Option<String>,
    pub scheduled_date: Option<String>,
}

pub fn parse_855(segments: &[Segment]) -> PoAcknowledgment {
    let mut ack = PoAcknowledgment::default();

    for segment in segments {
        match segment.id.as_str() {
            "BAK" => {
                ack.header = AcknowledgmentHeader {
                    purpose: segment.value(0),
                    ack_type: segment.value(1),
                    po_number: segment.value(2),
                    date: segment.value(3),
                    request_reference: segment.value(4),
                }
            }
            "REF" => ack.references.push(Reference::from_segment(segment)),
            "PO1" => ack.items.push(AcknowledgedItem {
                line_number: segment.value(0),
                quantity: lenient_f64(segment.element(1)),
                uom: segment.value(2),
                unit_price: lenient_f64(segment.element(3)),
                product_ids: product_ids(segment, 5),
                acknowledgment: None,
            }),
            "ACK" => {
                if let Some(item) = ack.items.last_mut() {
                    item.acknowledgment = Some(ItemAcknowledgment {
                        status: segment.value(0),
                        quantity: lenient_f64(segment.element(1)),
                        uom: segment.value(2),
                        scheduled_date: segment.value(3),
                    });
                }
            }
            "CTT" => ack.line_items = Some(lenient_u32(segment.element(0))),
            _ => {}
        }
    }

    ack
}

/// Input for an outbound 855
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AcknowledgmentInput {
    pub purpose: Option<String>,
    pub ack_type: Option<String>,
    pub po_number: Option<String>,
    pub date: Option<String>,
    pub request_reference: Option<String>,
    pub references: Vec<ReferenceInput>,
    pub items: Vec<AcknowledgmentItemInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AcknowledgmentItemInput {
    #[serde(deserialize_with = "text_or_number")]
    pub line_number: Option<String>,
    pub quantity: f64,
    pub uom: Option<String>,
    pub unit_price: Option<f64>,
    pub upc: Option<String>,
    pub sku: Option<String>,
    /// IA when absent
    pub status: Option<String>,
    /// Acknowledged quantity; the ordered quantity when absent
    pub ack_quantity: Option<f64>,
    pub scheduled_date: Option<String>,
    /// Sent only with status IR
    pub reject_reason: Option<String>,
}

pub fn build_855(data: &AcknowledgmentInput, control_number: &str) -> Vec<Segment> {
    let mut tx = TransactionBuilder::new("855", control_number);

    tx.add(
        "BAK",
        [
            or_default(&data.purpose, "00").to_string(),
            or_default(&data.ack_type, "AC").to_string(),
            or_empty(&data.po_number).to_string(),
            format_date(data.date.as_deref()),
            or_empty(&data.request_reference).to_string(),
        ],
    );

    for reference in &data.references {
        tx.add("REF", [or_empty(&reference.qualifier), or_empty(&reference.value)]);
    }

    for (index, item) in data.items.iter().enumerate() {
        let uom = or_default(&item.uom, "EA");
        let mut po1 = vec![
            item.line_number
                .clone()
                .unwrap_or_else(|| (index + 1).to_string()),
            format_number(item.quantity),
            uom.to_string(),
            price(item.unit_price),
            String::new(),
        ];
        po1.extend(product_id_elements(&item.upc, &item.sku, &None));
        tx.add("PO1", po1);

        let status = or_default(&item.status, "IA");
        let reject_reason = if status == "IR" {
            or_empty(&item.reject_reason)
        } else {
            ""
        };
        tx.add(
            "ACK",
            [
                status.to_string(),
                format_number(item.ack_quantity.filter(|q| *q != 0.0).unwrap_or(item.quantity)),
                uom.to_string(),
                format_date(item.scheduled_date.as_deref()),
                String::new(),
                String::new(),
                String::new(),
                reject_reason.to_string(),
            ],
        );
    }

    tx.add("CTT", [data.items.len().to_string()]);
    tx.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AcknowledgmentInput {
        AcknowledgmentInput {
            po_number: Some("PO-9".into()),
            date: Some("2024-02-01".into()),
            items: vec![
                AcknowledgmentItemInput {
                    quantity: 10.0,
                    unit_price: Some(4.0),
                    sku: Some("SKU-1".into()),
                    ..Default::default()
                },
                AcknowledgmentItemInput {
                    quantity: 5.0,
                    status: Some("IR".into()),
                    reject_reason: Some("Discontinued".into()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_build_855_segments() {
        let segments = build_855(&sample(), "000000004");
        let ids: Vec<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["ST", "BAK", "PO1", "ACK", "PO1", "ACK", "CTT", "SE"]);
        assert_eq!(segments[1].elements, vec!["00", "AC", "PO-9", "20240201", ""]);
        assert_eq!(
            segments[2].elements,
            vec!["1", "10", "EA", "4.00", "", "SK", "SKU-1"]
        );
        assert_eq!(segments[3].elements[1], "10");
        assert_eq!(segments[3].elements[7], "");
        assert_eq!(segments[5].elements[0], "IR");
        assert_eq!(segments[5].elements[7], "Discontinued");
        assert_eq!(segments[6].elements, vec!["2"]);
    }

    #[test]
    fn test_round_trip_855() {
        let segments = build_855(&sample(), "0001");
        let ack = parse_855(&segments[1..segments.len() - 1]);
        assert_eq!(ack.header.po_number.as_deref(), Some("PO-9"));
        assert_eq!(ack.items.len(), 2);
        assert_eq!(ack.items[0].product_id("SK"), Some("SKU-1"));
        let status = ack.items[1].acknowledgment.as_ref().unwrap();
        assert_eq!(status.status.as_deref(), Some("IR"));
        assert_eq!(status.quantity, 5.0);
        assert_eq!(ack.line_items, Some(2));
    }
}
