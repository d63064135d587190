//! Typed X12 documents
//!
//! Each supported transaction set has a parser that walks the raw segments
//! between ST and SE, keeping a cursor on the latest party or line so that
//! repeated sub-segments attach to the right parent. Outbound types also
//! have a builder that produces the full ST … SE segment list.

pub mod acknowledgment;
pub mod common;
pub mod inventory;
pub mod invoice;
pub mod purchase_order;
pub mod ship_notice;
pub mod stock_transfer;
pub mod warehouse;

pub use acknowledgment::{AcknowledgmentInput, PoAcknowledgment, build_855, parse_855};
pub use common::{
    CarrierInput, Contact, ContactInput, DateReference, Lot, Party, PartyInput, ProductId,
    Reference, ReferenceInput, find_party, find_product_id, format_date, format_time,
    parse_x12_date,
};
pub use inventory::{InventoryAdjustment, InventoryAdjustmentInput, build_947, parse_947};
pub use invoice::{Invoice, InvoiceInput, build_810, parse_810};
pub use purchase_order::{LineItem, PurchaseOrder, parse_850};
pub use ship_notice::{ShipNotice, ShipNoticeInput, build_856, parse_856};
pub use stock_transfer::{StockTransferReceipt, StockTransferShipment, parse_943, parse_944};
pub use warehouse::{
    ShippingAdviceInput, ShippingOrderInput, WarehouseShippingAdvice, WarehouseShippingOrder,
    build_940, build_945, parse_940, parse_945,
};

use crate::parser::Segment;
use crate::registry::TransactionSetType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A dispatched transaction set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Document {
    PurchaseOrder(PurchaseOrder),
    PoAcknowledgment(PoAcknowledgment),
    ShipNotice(ShipNotice),
    Invoice(Invoice),
    WarehouseShippingOrder(WarehouseShippingOrder),
    WarehouseShippingAdvice(WarehouseShippingAdvice),
    StockTransferShipment(StockTransferShipment),
    StockTransferReceipt(StockTransferReceipt),
    InventoryAdjustment(InventoryAdjustment),
    /// Transaction set with no typed parser; segments are kept verbatim
    Unknown {
        type_code: String,
        segments: Vec<Segment>,
    },
}

impl Document {
    /// Registry entry for this document, `None` for passthrough sets
    pub fn transaction_set_type(&self) -> Option<TransactionSetType> {
        Some(match self {
            Self::PurchaseOrder(_) => TransactionSetType::PurchaseOrder,
            Self::PoAcknowledgment(_) => TransactionSetType::PurchaseOrderAcknowledgment,
            Self::ShipNotice(_) => TransactionSetType::AdvanceShipNotice,
            Self::Invoice(_) => TransactionSetType::Invoice,
            Self::WarehouseShippingOrder(_) => TransactionSetType::WarehouseShippingOrder,
            Self::WarehouseShippingAdvice(_) => TransactionSetType::WarehouseShippingAdvice,
            Self::StockTransferShipment(_) => TransactionSetType::StockTransferShipmentAdvice,
            Self::StockTransferReceipt(_) => TransactionSetType::StockTransferReceiptAdvice,
            Self::InventoryAdjustment(_) => TransactionSetType::InventoryAdjustmentAdvice,
            Self::Unknown { .. } => return None,
        })
    }

    /// ST01 code of the dispatched set
    pub fn type_code(&self) -> &str {
        match self {
            Self::Unknown { type_code, .. } => type_code.as_str(),
            other => other.transaction_set_type().map_or("", TransactionSetType::code),
        }
    }
}

/// Run the typed parser for `code` over the segments between ST and SE
pub fn dispatch(code: &str, segments: &[Segment]) -> Document {
    let Some(kind) = TransactionSetType::from_code(code) else {
        trace!(code, "No parser for transaction set, passing through");
        return unknown(code, segments);
    };

    match kind {
        TransactionSetType::PurchaseOrder => Document::PurchaseOrder(parse_850(segments)),
        TransactionSetType::PurchaseOrderAcknowledgment => {
            Document::PoAcknowledgment(parse_855(segments))
        }
        TransactionSetType::AdvanceShipNotice => Document::ShipNotice(parse_856(segments)),
        TransactionSetType::Invoice => Document::Invoice(parse_810(segments)),
        TransactionSetType::WarehouseShippingOrder => {
            Document::WarehouseShippingOrder(parse_940(segments))
        }
        TransactionSetType::WarehouseShippingAdvice => {
            Document::WarehouseShippingAdvice(parse_945(segments))
        }
        TransactionSetType::StockTransferShipmentAdvice => {
            Document::StockTransferShipment(parse_943(segments))
        }
        TransactionSetType::StockTransferReceiptAdvice => {
            Document::StockTransferReceipt(parse_944(segments))
        }
        TransactionSetType::InventoryAdjustmentAdvice => {
            Document::InventoryAdjustment(parse_947(segments))
        }
        // registered but without a typed schema
        TransactionSetType::PaymentOrder => unknown(code, segments),
    }
}

fn unknown(code: &str, segments: &[Segment]) -> Document {
    Document::Unknown {
        type_code: code.trim().to_string(),
        segments: segments.to_vec(),
    }
}

/// Structured input for one of the outbound document types
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundDocument {
    Invoice(InvoiceInput),
    PoAcknowledgment(AcknowledgmentInput),
    ShipNotice(ShipNoticeInput),
    WarehouseShippingOrder(ShippingOrderInput),
    WarehouseShippingAdvice(ShippingAdviceInput),
    InventoryAdjustment(InventoryAdjustmentInput),
}

impl OutboundDocument {
    pub fn transaction_set_type(&self) -> TransactionSetType {
        match self {
            Self::Invoice(_) => TransactionSetType::Invoice,
            Self::PoAcknowledgment(_) => TransactionSetType::PurchaseOrderAcknowledgment,
            Self::ShipNotice(_) => TransactionSetType::AdvanceShipNotice,
            Self::WarehouseShippingOrder(_) => TransactionSetType::WarehouseShippingOrder,
            Self::WarehouseShippingAdvice(_) => TransactionSetType::WarehouseShippingAdvice,
            Self::InventoryAdjustment(_) => TransactionSetType::InventoryAdjustmentAdvice,
        }
    }

    /// Deserialize caller data for the given transaction set
    pub fn from_value(kind: TransactionSetType, value: serde_json::Value) -> Result<Self> {
        Ok(match kind {
            TransactionSetType::Invoice => Self::Invoice(serde_json::from_value(value)?),
            TransactionSetType::PurchaseOrderAcknowledgment => {
                Self::PoAcknowledgment(serde_json::from_value(value)?)
            }
            TransactionSetType::AdvanceShipNotice => {
                Self::ShipNotice(serde_json::from_value(value)?)
            }
            TransactionSetType::WarehouseShippingOrder => {
                Self::WarehouseShippingOrder(serde_json::from_value(value)?)
            }
            TransactionSetType::WarehouseShippingAdvice => {
                Self::WarehouseShippingAdvice(serde_json::from_value(value)?)
            }
            TransactionSetType::InventoryAdjustmentAdvice => {
                Self::InventoryAdjustment(serde_json::from_value(value)?)
            }
            other => {
                return Err(Error::Serialize(format!(
                    "no outbound builder for {}",
                    other
                )));
            }
        })
    }

    /// ST … SE segments for this document
    pub fn build(&self, control_number: &str) -> Vec<Segment> {
        match self {
            Self::Invoice(data) => build_810(data, control_number),
            Self::PoAcknowledgment(data) => build_855(data, control_number),
            Self::ShipNotice(data) => build_856(data, control_number),
            Self::WarehouseShippingOrder(data) => build_940(data, control_number),
            Self::WarehouseShippingAdvice(data) => build_945(data, control_number),
            Self::InventoryAdjustment(data) => build_947(data, control_number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dispatch_by_code() {
        let segments = vec![Segment::new("W15", ["A", "20240115"])];
        let document = dispatch("947", &segments);
        assert!(matches!(document, Document::InventoryAdjustment(_)));
        assert_eq!(document.type_code(), "947");
    }

    #[test]
    fn test_registered_type_without_schema_passes_through() {
        let document = dispatch("820", &[Segment::new("BPR", ["C", "100"])]);
        assert_eq!(document.transaction_set_type(), None);
        assert_eq!(document.type_code(), "820");
    }

    #[test]
    fn test_document_serializes_with_type_tag() {
        let document = dispatch("999", &[]);
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["type"], "UNKNOWN");
        assert_eq!(value["type_code"], "999");
    }

    #[test]
    fn test_outbound_from_value() {
        let document = OutboundDocument::from_value(
            TransactionSetType::InventoryAdjustmentAdvice,
            json!({
                "referenceId": "ADJ-9",
                "adjustments": [{ "quantity": -2, "sku": "S-1" }]
            }),
        )
        .unwrap();
        match &document {
            OutboundDocument::InventoryAdjustment(input) => {
                assert_eq!(input.reference_id.as_deref(), Some("ADJ-9"));
                assert_eq!(input.adjustments[0].quantity, -2.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(document.build("0001").first().unwrap().elements[0], "947");
    }

    #[test]
    fn test_outbound_rejects_inbound_only_types() {
        let result = OutboundDocument::from_value(TransactionSetType::PurchaseOrder, json!({}));
        assert!(result.is_err());
    }
}
