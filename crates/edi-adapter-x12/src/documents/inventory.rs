//! 947 Warehouse Inventory Adjustment Advice

use super::common::{
    Lot, Party, PartyInput, ProductId, Reference, apply_party_segment, find_party,
    find_product_id, format_date, format_time, or_default, or_empty, product_id_elements,
    product_ids, push_party,
};
use crate::numeric::{format_number, lenient_f64, lenient_u32};
use crate::parser::Segment;
use crate::serializer::TransactionBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryAdjustment {
    pub header: AdjustmentHeader,
    pub parties: Vec<Party>,
    pub adjustments: Vec<Adjustment>,
    pub totals: Option<AdjustmentTotals>,
}

/// W15
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentHeader {
    /// A = adjustment
    pub transaction_type: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reference_id: Option<String>,
}

/// W07 adjustment line with its W13/W20/N9 detail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Signed quantity change
    pub quantity: f64,
    pub uom: Option<String>,
    pub product_ids: Vec<ProductId>,
    pub detail: Option<AdjustmentDetail>,
    pub lot: Option<Lot>,
    pub notes: Vec<Reference>,
}

/// W13
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentDetail {
    pub quantity_before: f64,
    pub quantity_after: f64,
    pub uom: Option<String>,
    pub reason: Option<String>,
}

/// W14
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentTotals {
    /// Sum of absolute adjustment quantities
    pub total_quantity: f64,
    pub record_count: u32,
}

impl Adjustment {
    pub fn product_id(&self, qualifier: &str) -> Option<&str> {
        find_product_id(&self.product_ids, qualifier)
    }
}

impl InventoryAdjustment {
    pub fn party(&self, qualifier: &str) -> Option<&Party> {
        find_party(&self.parties, qualifier)
    }
}

pub fn parse_947(segments: &[Segment]) -> InventoryAdjustment {
    let mut result = InventoryAdjustment::default();

    for segment in segments {
        if result.adjustments.is_empty() && apply_party_segment(&mut result.parties, segment) {
            continue;
        }
        match segment.id.as_str() {
            "W15" => {
                result.header = AdjustmentHeader {
                    transaction_type: segment.value(0),
                    date: segment.value(1),
                    time: segment.value(2),
                    reference_id: segment.value(3),
                }
            }
            "W07" => result.adjustments.push(Adjustment {
                quantity: lenient_f64(segment.element(0)),
                uom: segment.value(1),
                product_ids: product_ids(segment, 5),
                ..Default::default()
            }),
            "W13" => {
                if let Some(adjustment) = result.adjustments.last_mut() {
                    adjustment.detail = Some(AdjustmentDetail {
                        quantity_before: lenient_f64(segment.element(0)),
                        quantity_after: lenient_f64(segment.element(1)),
                        uom: segment.value(2),
                        reason: segment.value(3),
                    });
                }
            }
            "W20" => {
                if let Some(adjustment) = result.adjustments.last_mut() {
                    adjustment.lot = Some(Lot::from_segment(segment));
                }
            }
            "N9" => {
                if let Some(adjustment) = result.adjustments.last_mut() {
                    adjustment.notes.push(Reference::from_segment(segment));
                }
            }
            "W14" => {
                result.totals = Some(AdjustmentTotals {
                    total_quantity: lenient_f64(segment.element(0)),
                    record_count: lenient_u32(segment.element(2)),
                })
            }
            _ => {}
        }
    }

    result
}

/// Input for an outbound 947
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InventoryAdjustmentInput {
    pub transaction_type: Option<String>,
    /// Adjustment timestamp; W15 date and time
    pub date: Option<String>,
    pub reference_id: Option<String>,
    pub depositor: Option<PartyInput>,
    pub adjustments: Vec<AdjustmentInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdjustmentInput {
    /// Signed quantity change
    pub quantity: f64,
    pub uom: Option<String>,
    pub upc: Option<String>,
    pub sku: Option<String>,
    pub quantity_before: Option<f64>,
    pub quantity_after: Option<f64>,
    pub reason_code: Option<String>,
    pub lot_number: Option<String>,
    pub expiration_date: Option<String>,
    pub notes: Option<String>,
}

impl InventoryAdjustmentInput {
    /// Sum of absolute quantities, as sent in W14
    pub fn total_quantity(&self) -> f64 {
        self.adjustments.iter().map(|a| a.quantity.abs()).sum()
    }
}

pub fn build_947(data: &InventoryAdjustmentInput, control_number: &str) -> Vec<Segment> {
    let mut tx = TransactionBuilder::new("947", control_number);

    tx.add(
        "W15",
        [
            or_default(&data.transaction_type, "A").to_string(),
            format_date(data.date.as_deref()),
            format_time(data.date.as_deref()),
            or_empty(&data.reference_id).to_string(),
        ],
    );

    if let Some(depositor) = &data.depositor {
        push_party(&mut tx, "DE", depositor);
    }

    for adjustment in &data.adjustments {
        let uom = or_default(&adjustment.uom, "EA");
        let mut w07 = vec![
            format_number(adjustment.quantity),
            uom.to_string(),
            String::new(),
            String::new(),
            String::new(),
        ];
        w07.extend(product_id_elements(&adjustment.upc, &adjustment.sku, &None));
        tx.add("W07", w07);

        tx.add(
            "W13",
            [
                adjustment.quantity_before.map(format_number).unwrap_or_default(),
                adjustment.quantity_after.map(format_number).unwrap_or_default(),
                uom.to_string(),
                or_empty(&adjustment.reason_code).to_string(),
            ],
        );

        if let Some(lot_number) = adjustment.lot_number.as_deref().filter(|v| !v.is_empty()) {
            tx.add(
                "W20",
                [
                    lot_number.to_string(),
                    String::new(),
                    String::new(),
                    format_date(adjustment.expiration_date.as_deref()),
                ],
            );
        }

        if let Some(notes) = adjustment.notes.as_deref().filter(|v| !v.is_empty()) {
            tx.add("N9", ["ZZ", notes]);
        }
    }

    tx.add(
        "W14",
        [
            format_number(data.total_quantity()),
            String::new(),
            data.adjustments.len().to_string(),
        ],
    );

    tx.finish()
}
