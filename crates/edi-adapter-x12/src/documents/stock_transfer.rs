//! 943 Stock Transfer Shipment Advice and 944 Stock Transfer Receipt Advice
//!
//! Both are inbound-only here: the warehouse receives them from depositors.

use super::common::{
    Lot, Party, ProductId, apply_party_segment, find_party, find_product_id, product_ids,
};
use super::warehouse::WarehouseShipmentHeader;
use crate::numeric::{lenient_f64, lenient_u32};
use crate::parser::Segment;
use serde::{Deserialize, Serialize};

/// W07 line with its W20 lot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferItem {
    /// Quantity shipped (943) or received (944)
    pub quantity: f64,
    pub uom: Option<String>,
    pub weight: f64,
    pub product_ids: Vec<ProductId>,
    pub lot: Option<Lot>,
}

impl TransferItem {
    fn from_segment(segment: &Segment) -> Self {
        Self {
            quantity: lenient_f64(segment.element(0)),
            uom: segment.value(1),
            weight: lenient_f64(segment.element(4)),
            product_ids: product_ids(segment, 5),
            lot: None,
        }
    }

    pub fn product_id(&self, qualifier: &str) -> Option<&str> {
        find_product_id(&self.product_ids, qualifier)
    }
}

/// Apply the W07/W20 item loop; false for any other segment
fn apply_item_segment(items: &mut Vec<TransferItem>, segment: &Segment) -> bool {
    match segment.id.as_str() {
        "W07" => items.push(TransferItem::from_segment(segment)),
        "W20" => {
            if let Some(item) = items.last_mut() {
                item.lot = Some(Lot::from_segment(segment));
            }
        }
        _ => return false,
    }
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockTransferShipment {
    pub header: WarehouseShipmentHeader,
    pub parties: Vec<Party>,
    pub items: Vec<TransferItem>,
}

impl StockTransferShipment {
    pub fn party(&self, qualifier: &str) -> Option<&Party> {
        find_party(&self.parties, qualifier)
    }
}

pub fn parse_943(segments: &[Segment]) -> StockTransferShipment {
    let mut shipment = StockTransferShipment::default();

    for segment in segments {
        if apply_party_segment(&mut shipment.parties, segment)
            || apply_item_segment(&mut shipment.items, segment)
        {
            continue;
        }
        if segment.id == "W06" {
            shipment.header = WarehouseShipmentHeader::from_segment(segment);
        }
    }

    shipment
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockTransferReceipt {
    pub header: ReceiptHeader,
    pub parties: Vec<Party>,
    pub items: Vec<TransferItem>,
    pub totals: Option<ReceiptTotals>,
}

/// W17
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptHeader {
    pub report_type: Option<String>,
    pub reporting_code: Option<String>,
    pub date: Option<String>,
    pub warehouse_receipt_number: Option<String>,
    pub depositor_order_number: Option<String>,
}

/// W14
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptTotals {
    pub quantity_received: f64,
    pub quantity_damaged: f64,
    pub records: u32,
}

impl StockTransferReceipt {
    pub fn party(&self, qualifier: &str) -> Option<&Party> {
        find_party(&self.parties, qualifier)
    }
}

pub fn parse_944(segments: &[Segment]) -> StockTransferReceipt {
    let mut receipt = StockTransferReceipt::default();

    for segment in segments {
        if apply_party_segment(&mut receipt.parties, segment)
            || apply_item_segment(&mut receipt.items, segment)
        {
            continue;
        }
        match segment.id.as_str() {
            "W17" => {
                receipt.header = ReceiptHeader {
                    report_type: segment.value(0),
                    reporting_code: segment.value(1),
                    date: segment.value(2),
                    warehouse_receipt_number: segment.value(3),
                    depositor_order_number: segment.value(4),
                }
            }
            "W14" => {
                receipt.totals = Some(ReceiptTotals {
                    quantity_received: lenient_f64(segment.element(0)),
                    quantity_damaged: lenient_f64(segment.element(1)),
                    records: lenient_u32(segment.element(2)),
                })
            }
            _ => {}
        }
    }

    receipt
}
