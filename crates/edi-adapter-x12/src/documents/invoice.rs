//! 810 Invoice

use super::common::{
    CarrierInput, Party, PartyInput, Reference, ReferenceInput, apply_party_segment, find_party,
    format_date, or_default, or_empty, price, product_id_elements, push_party, text_or_number,
};
use super::purchase_order::LineItem;
use crate::numeric::{format_number, lenient_f64};
use crate::parser::Segment;
use crate::serializer::TransactionBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub header: InvoiceHeader,
    pub references: Vec<Reference>,
    pub parties: Vec<Party>,
    pub items: Vec<LineItem>,
    /// TDS01 converted from cents
    pub total_amount: Option<f64>,
    pub carrier: Option<InvoiceCarrier>,
}

/// BIG plus currency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    pub invoice_date: Option<String>,
    pub invoice_number: Option<String>,
    pub po_date: Option<String>,
    pub po_number: Option<String>,
    pub currency: Option<String>,
}

/// CAD
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceCarrier {
    pub transport_method: Option<String>,
    pub carrier_id: Option<String>,
    pub carrier_name: Option<String>,
}

impl Invoice {
    pub fn party(&self, qualifier: &str) -> Option<&Party> {
        find_party(&self.parties, qualifier)
    }
}

pub fn parse_810(segments: &[Segment]) -> Invoice {
    let mut invoice = Invoice::default();

    for segment in segments {
        if apply_party_segment(&mut invoice.parties, segment) {
            continue;
        }
        match segment.id.as_str() {
            "BIG" => {
                invoice.header.invoice_date = segment.value(0);
                invoice.header.invoice_number = segment.value(1);
                invoice.header.po_date = segment.value(2);
                invoice.header.po_number = segment.value(3);
            }
            "CUR" => invoice.header.currency = segment.value(1),
            "REF" => invoice.references.push(Reference::from_segment(segment)),
            "IT1" => invoice.items.push(LineItem::from_segment(segment)),
            "PID" => {
                if let Some(item) = invoice.items.last_mut() {
                    item.description = segment.value(4);
                }
            }
            "TDS" => invoice.total_amount = Some(lenient_f64(segment.element(0)) / 100.0),
            "CAD" => {
                invoice.carrier = Some(InvoiceCarrier {
                    transport_method: segment.value(0),
                    carrier_id: segment.value(3),
                    carrier_name: segment.value(4),
                })
            }
            _ => {}
        }
    }

    invoice
}

/// Input for an outbound 810
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoiceInput {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub po_number: Option<String>,
    pub po_date: Option<String>,
    pub currency: Option<String>,
    pub references: Vec<ReferenceInput>,
    pub ship_to: Option<PartyInput>,
    pub bill_to: Option<PartyInput>,
    pub items: Vec<InvoiceItemInput>,
    pub carrier: Option<CarrierInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoiceItemInput {
    #[serde(deserialize_with = "text_or_number")]
    pub line_number: Option<String>,
    pub quantity: f64,
    pub uom: Option<String>,
    pub unit_price: Option<f64>,
    pub upc: Option<String>,
    pub sku: Option<String>,
    pub vendor_part: Option<String>,
    pub description: Option<String>,
}

impl InvoiceInput {
    /// Invoice total in cents, as sent in TDS01
    pub fn total_cents(&self) -> i64 {
        let total: f64 = self
            .items
            .iter()
            .map(|item| item.quantity * item.unit_price.unwrap_or(0.0))
            .sum();
        (total * 100.0).round() as i64
    }
}

pub fn build_810(data: &InvoiceInput, control_number: &str) -> Vec<Segment> {
    let mut tx = TransactionBuilder::new("810", control_number);

    tx.add(
        "BIG",
        [
            format_date(data.invoice_date.as_deref()),
            or_empty(&data.invoice_number).to_string(),
            format_date(data.po_date.as_deref()),
            or_empty(&data.po_number).to_string(),
        ],
    );

    if let Some(currency) = data.currency.as_deref().filter(|v| !v.is_empty()) {
        tx.add("CUR", ["BY", currency]);
    }

    for reference in &data.references {
        tx.add("REF", [or_empty(&reference.qualifier), or_empty(&reference.value)]);
    }

    if let Some(ship_to) = &data.ship_to {
        push_party(&mut tx, "ST", ship_to);
    }
    if let Some(bill_to) = &data.bill_to {
        push_party(&mut tx, "BT", bill_to);
    }

    for (index, item) in data.items.iter().enumerate() {
        let mut it1 = vec![
            item.line_number
                .clone()
                .unwrap_or_else(|| (index + 1).to_string()),
            format_number(item.quantity),
            or_default(&item.uom, "EA").to_string(),
            price(item.unit_price),
            String::new(),
        ];
        it1.extend(product_id_elements(&item.upc, &item.sku, &item.vendor_part));
        tx.add("IT1", it1);

        if let Some(description) = item.description.as_deref().filter(|v| !v.is_empty()) {
            tx.add("PID", ["F", "", "", "", description]);
        }
    }

    tx.add("TDS", [data.total_cents().to_string()]);

    if let Some(carrier) = &data.carrier {
        tx.add(
            "CAD",
            [
                or_default(&carrier.method, "M"),
                "",
                "",
                or_empty(&carrier.scac),
                or_empty(&carrier.name),
            ],
        );
    }

    tx.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InvoiceInput {
        InvoiceInput {
            invoice_number: Some("INV-100".into()),
            invoice_date: Some("2024-04-01".into()),
            po_number: Some("PO-100".into()),
            currency: Some("USD".into()),
            bill_to: Some(PartyInput {
                name: Some("Acme".into()),
                id: Some("ACME".into()),
                ..Default::default()
            }),
            items: vec![
                InvoiceItemInput {
                    quantity: 3.0,
                    unit_price: Some(19.99),
                    upc: Some("0123".into()),
                    description: Some("Gadget".into()),
                    ..Default::default()
                },
                InvoiceItemInput {
                    quantity: 2.0,
                    unit_price: Some(0.505),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_tds_is_total_in_cents() {
        let input = sample();
        assert_eq!(input.total_cents(), 6098);
        let segments = build_810(&input, "0001");
        let tds = segments.iter().find(|s| s.id == "TDS").unwrap();
        assert_eq!(tds.elements, vec!["6098"]);
    }

    #[test]
    fn test_build_810_layout() {
        let segments = build_810(&sample(), "0001");
        let ids: Vec<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["ST", "BIG", "CUR", "N1", "IT1", "PID", "IT1", "TDS", "SE"]
        );
        assert_eq!(segments[1].elements, vec!["20240401", "INV-100", "", "PO-100"]);
        assert_eq!(
            segments[4].elements,
            vec!["1", "3", "EA", "19.99", "", "UP", "0123"]
        );
        assert_eq!(segments[6].elements[0], "2");
    }

    #[test]
    fn test_round_trip_810() {
        let mut input = sample();
        input.carrier = Some(CarrierInput {
            scac: Some("FDEG".into()),
            name: Some("FedEx Ground".into()),
            ..Default::default()
        });
        let segments = build_810(&input, "0001");
        let invoice = parse_810(&segments[1..segments.len() - 1]);

        assert_eq!(invoice.header.invoice_number.as_deref(), Some("INV-100"));
        assert_eq!(invoice.header.currency.as_deref(), Some("USD"));
        assert_eq!(invoice.party("BT").unwrap().id.as_deref(), Some("ACME"));
        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[0].unit_price, 19.99);
        assert_eq!(invoice.items[0].description.as_deref(), Some("Gadget"));
        assert_eq!(invoice.total_amount, Some(60.98));
        let carrier = invoice.carrier.unwrap();
        assert_eq!(carrier.transport_method.as_deref(), Some("M"));
        assert_eq!(carrier.carrier_id.as_deref(), Some("FDEG"));
    }
}
