//! 940 Warehouse Shipping Order and 945 Warehouse Shipping Advice

use super::common::{
    CarrierInput, Lot, Party, PartyInput, ProductId, Reference, ReferenceInput,
    apply_party_segment, find_party, find_product_id, format_date, number_or_empty, or_default,
    or_empty, product_id_elements, product_ids, push_party,
};
use crate::numeric::{format_number, lenient_f64, lenient_u32};
use crate::parser::Segment;
use crate::serializer::TransactionBuilder;
use serde::{Deserialize, Serialize};

// ============================================================================
// 940
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseShippingOrder {
    pub header: ShippingOrderHeader,
    pub parties: Vec<Party>,
    /// N9 references that precede the first LX
    pub notes: Vec<Reference>,
    pub shipping: Option<WarehouseCarrier>,
    pub items: Vec<WarehouseOrderItem>,
    pub totals: Option<ShippingOrderTotals>,
}

/// W05
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingOrderHeader {
    /// N = new, R = replace, C = cancel
    pub order_status: Option<String>,
    pub depositor_order_number: Option<String>,
    pub purchase_order_number: Option<String>,
    pub link_sequence: Option<String>,
}

/// W66
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseCarrier {
    pub transport_method: Option<String>,
    pub carrier_code: Option<String>,
    pub carrier_name: Option<String>,
    pub service_level: Option<String>,
}

/// LX loop with W01/G69/N9/W20
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseOrderItem {
    pub line_number: Option<String>,
    pub quantity: f64,
    pub uom: Option<String>,
    pub weight: f64,
    pub product_ids: Vec<ProductId>,
    pub description: Option<String>,
    pub references: Vec<Reference>,
    pub lot: Option<Lot>,
}

impl WarehouseOrderItem {
    pub fn product_id(&self, qualifier: &str) -> Option<&str> {
        find_product_id(&self.product_ids, qualifier)
    }

    /// Value of the first N9 with the given qualifier (LT = lot, SE = serial)
    pub fn reference(&self, qualifier: &str) -> Option<&str> {
        self.references
            .iter()
            .find(|r| r.qualifier == qualifier)
            .and_then(|r| r.value.as_deref())
    }
}

/// W76
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingOrderTotals {
    pub line_items: u32,
    pub quantity: f64,
    pub quantity_uom: Option<String>,
    pub weight: f64,
    pub weight_unit: Option<String>,
}

impl WarehouseShippingOrder {
    pub fn party(&self, qualifier: &str) -> Option<&Party> {
        find_party(&self.parties, qualifier)
    }

    pub fn ship_to(&self) -> Option<&Party> {
        self.party("ST")
    }

    pub fn depositor(&self) -> Option<&Party> {
        self.party("DE")
    }
}

pub fn parse_940(segments: &[Segment]) -> WarehouseShippingOrder {
    let mut order = WarehouseShippingOrder::default();

    for segment in segments {
        if order.items.is_empty() && apply_party_segment(&mut order.parties, segment) {
            continue;
        }
        match segment.id.as_str() {
            "W05" => {
                order.header = ShippingOrderHeader {
                    order_status: segment.value(0),
                    depositor_order_number: segment.value(1),
                    purchase_order_number: segment.value(2),
                    link_sequence: segment.value(3),
                }
            }
            "W66" => {
                order.shipping = Some(WarehouseCarrier {
                    transport_method: segment.value(0),
                    carrier_code: segment.value(3),
                    carrier_name: segment.value(4),
                    service_level: segment.value(5),
                })
            }
            "LX" => order.items.push(WarehouseOrderItem {
                line_number: segment.value(0),
                ..Default::default()
            }),
            "W01" => {
                if let Some(item) = order.items.last_mut() {
                    item.quantity = lenient_f64(segment.element(0));
                    item.uom = segment.value(1);
                    item.weight = lenient_f64(segment.element(4));
                    item.product_ids = product_ids(segment, 5);
                }
            }
            "G69" => {
                if let Some(item) = order.items.last_mut() {
                    item.description = segment.value(0);
                }
            }
            "N9" => match order.items.last_mut() {
                Some(item) => item.references.push(Reference::from_segment(segment)),
                None => order.notes.push(Reference::from_segment(segment)),
            },
            "W20" => {
                if let Some(item) = order.items.last_mut() {
                    item.lot = Some(Lot::from_segment(segment));
                }
            }
            "W76" => {
                order.totals = Some(ShippingOrderTotals {
                    line_items: lenient_u32(segment.element(0)),
                    quantity: lenient_f64(segment.element(1)),
                    quantity_uom: segment.value(2),
                    weight: lenient_f64(segment.element(3)),
                    weight_unit: segment.value(4),
                })
            }
            _ => {}
        }
    }

    order
}

/// Input for an outbound 940
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShippingOrderInput {
    pub order_status: Option<String>,
    pub order_number: Option<String>,
    pub po_number: Option<String>,
    pub link_sequence: Option<String>,
    pub depositor: Option<PartyInput>,
    pub ship_to: Option<PartyInput>,
    /// Sent as N9 with qualifier ZZ when none is given
    pub notes: Vec<ReferenceInput>,
    pub carrier: Option<CarrierInput>,
    pub items: Vec<ShippingOrderItemInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShippingOrderItemInput {
    pub quantity: f64,
    pub uom: Option<String>,
    pub weight: Option<f64>,
    pub upc: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub lot_number: Option<String>,
    pub serial_number: Option<String>,
    pub lot: Option<LotInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LotInput {
    pub number: Option<String>,
    pub expiration_date: Option<String>,
    pub manufacture_date: Option<String>,
}

pub fn build_940(data: &ShippingOrderInput, control_number: &str) -> Vec<Segment> {
    let mut tx = TransactionBuilder::new("940", control_number);

    tx.add(
        "W05",
        [
            or_default(&data.order_status, "N"),
            or_empty(&data.order_number),
            or_empty(&data.po_number),
            or_empty(&data.link_sequence),
        ],
    );

    if let Some(depositor) = &data.depositor {
        push_party(&mut tx, "DE", depositor);
    }
    if let Some(ship_to) = &data.ship_to {
        push_party(&mut tx, "ST", ship_to);
    }

    for note in &data.notes {
        tx.add("N9", [or_default(&note.qualifier, "ZZ"), or_empty(&note.value)]);
    }

    if let Some(carrier) = &data.carrier {
        tx.add(
            "W66",
            [
                or_default(&carrier.method, "M"),
                "",
                "",
                or_empty(&carrier.scac),
                or_empty(&carrier.name),
                or_empty(&carrier.service_level),
            ],
        );
    }

    for (index, item) in data.items.iter().enumerate() {
        tx.add("LX", [(index + 1).to_string()]);

        let mut w01 = vec![
            format_number(item.quantity),
            or_default(&item.uom, "EA").to_string(),
            String::new(),
            String::new(),
            number_or_empty(item.weight),
        ];
        w01.extend(product_id_elements(&item.upc, &item.sku, &None));
        tx.add("W01", w01);

        if let Some(description) = item.description.as_deref().filter(|v| !v.is_empty()) {
            tx.add("G69", [description]);
        }
        if let Some(lot_number) = item.lot_number.as_deref().filter(|v| !v.is_empty()) {
            tx.add("N9", ["LT", lot_number]);
        }
        if let Some(serial) = item.serial_number.as_deref().filter(|v| !v.is_empty()) {
            tx.add("N9", ["SE", serial]);
        }
        if let Some(lot) = &item.lot {
            tx.add(
                "W20",
                [
                    or_empty(&lot.number).to_string(),
                    String::new(),
                    String::new(),
                    format_date(lot.expiration_date.as_deref()),
                    format_date(lot.manufacture_date.as_deref()),
                ],
            );
        }
    }

    let total_quantity: f64 = data.items.iter().map(|i| i.quantity).sum();
    let total_weight: f64 = data.items.iter().map(|i| i.weight.unwrap_or(0.0)).sum();
    tx.add(
        "W76",
        [
            data.items.len().to_string(),
            format_number(total_quantity),
            "EA".to_string(),
            format_number(total_weight),
            "LB".to_string(),
        ],
    );

    tx.finish()
}

// ============================================================================
// 945
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseShippingAdvice {
    pub header: WarehouseShipmentHeader,
    /// N9 DO ahead of the item loop
    pub depositor_reference: Option<String>,
    /// Other N9 references ahead of the item loop
    pub references: Vec<Reference>,
    pub shipment: Option<ShipmentDetail>,
    pub consolidation: Option<Consolidation>,
    pub parties: Vec<Party>,
    pub items: Vec<ShippedItem>,
    pub totals: Option<ShippingAdviceTotals>,
}

/// W06, shared by 945 and 943
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseShipmentHeader {
    /// B = original, N = new, R = replace
    pub report_type: Option<String>,
    pub depositor_order_number: Option<String>,
    pub date: Option<String>,
    pub shipment_id: Option<String>,
    pub warehouse_order_number: Option<String>,
}

impl WarehouseShipmentHeader {
    pub(crate) fn from_segment(segment: &Segment) -> Self {
        Self {
            report_type: segment.value(0),
            depositor_order_number: segment.value(1),
            date: segment.value(2),
            shipment_id: segment.value(3),
            warehouse_order_number: segment.value(5),
        }
    }
}

/// W27
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDetail {
    pub transport_method: Option<String>,
    pub carrier_code: Option<String>,
    pub carrier_name: Option<String>,
    pub bol_number: Option<String>,
    pub scac: Option<String>,
}

/// W28
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consolidation {
    pub weight: f64,
    pub weight_qualifier: Option<String>,
    pub lading_quantity: u32,
    pub lading_description: Option<String>,
}

/// LX loop with W12/G69/N9
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippedItem {
    pub line_number: Option<String>,
    /// SH = shipped, NC = not shipped
    pub shipment_type: Option<String>,
    pub quantity_shipped: f64,
    pub uom: Option<String>,
    pub product_ids: Vec<ProductId>,
    pub description: Option<String>,
    pub lot_number: Option<String>,
    pub references: Vec<Reference>,
}

impl ShippedItem {
    pub fn product_id(&self, qualifier: &str) -> Option<&str> {
        find_product_id(&self.product_ids, qualifier)
    }
}

/// W03
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAdviceTotals {
    pub records: u32,
    pub weight: f64,
    pub weight_unit: Option<String>,
    pub volume: f64,
    pub volume_unit: Option<String>,
    pub lading_quantity: u32,
}

impl WarehouseShippingAdvice {
    pub fn party(&self, qualifier: &str) -> Option<&Party> {
        find_party(&self.parties, qualifier)
    }
}

pub fn parse_945(segments: &[Segment]) -> WarehouseShippingAdvice {
    let mut advice = WarehouseShippingAdvice::default();

    for segment in segments {
        if advice.items.is_empty() && apply_party_segment(&mut advice.parties, segment) {
            continue;
        }
        match segment.id.as_str() {
            "W06" => advice.header = WarehouseShipmentHeader::from_segment(segment),
            "N9" => {
                let reference = Reference::from_segment(segment);
                match advice.items.last_mut() {
                    Some(item) if reference.qualifier == "LT" => item.lot_number = reference.value,
                    Some(item) => item.references.push(reference),
                    None if reference.qualifier == "DO" => {
                        advice.depositor_reference = reference.value
                    }
                    None => advice.references.push(reference),
                }
            }
            "W27" => {
                advice.shipment = Some(ShipmentDetail {
                    transport_method: segment.value(0),
                    carrier_code: segment.value(2),
                    carrier_name: segment.value(3),
                    bol_number: segment.value(5),
                    scac: segment.value(7),
                })
            }
            "W28" => {
                advice.consolidation = Some(Consolidation {
                    weight: lenient_f64(segment.element(0)),
                    weight_qualifier: segment.value(1),
                    lading_quantity: lenient_u32(segment.element(2)),
                    lading_description: segment.value(3),
                })
            }
            "LX" => advice.items.push(ShippedItem {
                line_number: segment.value(0),
                ..Default::default()
            }),
            "W12" => {
                if let Some(item) = advice.items.last_mut() {
                    item.shipment_type = segment.value(0);
                    item.quantity_shipped = lenient_f64(segment.element(1));
                    item.uom = segment.value(2);
                    item.product_ids = product_ids(segment, 4);
                }
            }
            "G69" => {
                if let Some(item) = advice.items.last_mut() {
                    item.description = segment.value(0);
                }
            }
            "W03" => {
                advice.totals = Some(ShippingAdviceTotals {
                    records: lenient_u32(segment.element(0)),
                    weight: lenient_f64(segment.element(1)),
                    weight_unit: segment.value(2),
                    volume: lenient_f64(segment.element(3)),
                    volume_unit: segment.value(4),
                    lading_quantity: lenient_u32(segment.element(5)),
                })
            }
            _ => {}
        }
    }

    advice
}

/// Input for an outbound 945
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShippingAdviceInput {
    pub report_type: Option<String>,
    pub order_number: Option<String>,
    pub ship_date: Option<String>,
    pub shipment_id: Option<String>,
    pub warehouse_order_number: Option<String>,
    pub depositor_ref: Option<String>,
    pub carrier: Option<CarrierInput>,
    pub bol_number: Option<String>,
    pub consolidation: Option<ConsolidationInput>,
    pub ship_to: Option<PartyInput>,
    pub items: Vec<ShippedItemInput>,
    pub pallet_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsolidationInput {
    pub weight: Option<f64>,
    /// G (gross) when absent
    pub weight_qualifier: Option<String>,
    pub quantity: Option<u32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShippedItemInput {
    pub shipment_type: Option<String>,
    pub quantity_shipped: f64,
    pub uom: Option<String>,
    pub weight: Option<f64>,
    pub upc: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub lot_number: Option<String>,
}

pub fn build_945(data: &ShippingAdviceInput, control_number: &str) -> Vec<Segment> {
    let mut tx = TransactionBuilder::new("945", control_number);

    tx.add(
        "W06",
        [
            or_default(&data.report_type, "B").to_string(),
            or_empty(&data.order_number).to_string(),
            format_date(data.ship_date.as_deref()),
            or_empty(&data.shipment_id).to_string(),
            String::new(),
            or_empty(&data.warehouse_order_number).to_string(),
        ],
    );

    if let Some(reference) = data.depositor_ref.as_deref().filter(|v| !v.is_empty()) {
        tx.add("N9", ["DO", reference]);
    }

    if let Some(carrier) = &data.carrier {
        tx.add(
            "W27",
            [
                or_default(&carrier.method, "M"),
                "",
                or_empty(&carrier.scac),
                or_empty(&carrier.name),
                "",
                or_empty(&data.bol_number),
                "",
                or_empty(&carrier.scac),
            ],
        );
    }

    if let Some(consolidation) = &data.consolidation {
        tx.add(
            "W28",
            [
                number_or_empty(consolidation.weight),
                or_default(&consolidation.weight_qualifier, "G").to_string(),
                consolidation
                    .quantity
                    .filter(|q| *q != 0)
                    .map(|q| q.to_string())
                    .unwrap_or_default(),
                or_empty(&consolidation.description).to_string(),
            ],
        );
    }

    if let Some(ship_to) = &data.ship_to {
        push_party(&mut tx, "ST", ship_to);
    }

    for (index, item) in data.items.iter().enumerate() {
        tx.add("LX", [(index + 1).to_string()]);

        let mut w12 = vec![
            or_default(&item.shipment_type, "SH").to_string(),
            format_number(item.quantity_shipped),
            or_default(&item.uom, "EA").to_string(),
            String::new(),
        ];
        w12.extend(product_id_elements(&item.upc, &item.sku, &None));
        tx.add("W12", w12);

        if let Some(description) = item.description.as_deref().filter(|v| !v.is_empty()) {
            tx.add("G69", [description]);
        }
        if let Some(lot_number) = item.lot_number.as_deref().filter(|v| !v.is_empty()) {
            tx.add("N9", ["LT", lot_number]);
        }
    }

    let total_weight: f64 = data.items.iter().map(|i| i.weight.unwrap_or(0.0)).sum();
    tx.add(
        "W03",
        [
            data.items.len().to_string(),
            format_number(total_weight),
            "LB".to_string(),
            String::new(),
            String::new(),
            data.pallet_count
                .filter(|p| *p != 0)
                .map(|p| p.to_string())
                .unwrap_or_default(),
        ],
    );

    tx.finish()
}
