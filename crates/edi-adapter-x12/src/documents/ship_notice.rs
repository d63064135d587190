//! 856 Advance Ship Notice
//!
//! The HL loop is flattened into orders and items; each keeps the id of the
//! hierarchical level it appeared under so callers can rebuild the
//! shipment → order → item tree.

use super::common::{
    CarrierInput, Party, PartyInput, ProductId, apply_party_segment, find_party, find_product_id,
    format_date, format_time, number_or_empty, or_default, or_empty, product_id_elements,
    product_ids, push_party, text_or_number,
};
use crate::numeric::{format_number, lenient_f64, lenient_u32};
use crate::parser::Segment;
use crate::serializer::TransactionBuilder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipNotice {
    pub header: ShipNoticeHeader,
    pub shipment: Shipment,
    pub parties: Vec<Party>,
    pub levels: Vec<HierarchicalLevel>,
    pub orders: Vec<ShipmentOrder>,
    pub items: Vec<ShipmentItem>,
    /// CTT01, the number of HL segments
    pub hl_count: Option<u32>,
}

/// BSN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipNoticeHeader {
    pub purpose: Option<String>,
    pub shipment_id: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// HL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchicalLevel {
    pub id: String,
    pub parent_id: Option<String>,
    /// S = shipment, O = order, P = pack, I = item
    pub level_code: String,
}

/// Shipment-level carrier, equipment and reference data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub packaging: Option<Packaging>,
    pub carrier: Option<CarrierRouting>,
    pub equipment: Option<Equipment>,
    pub bol_number: Option<String>,
    pub pro_number: Option<String>,
    pub ship_date: Option<String>,
    pub delivery_date: Option<String>,
}

/// TD1
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Packaging {
    pub packaging_code: Option<String>,
    pub lading_quantity: u32,
    pub weight: f64,
    pub weight_unit: Option<String>,
}

/// TD5
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierRouting {
    pub routing_sequence: Option<String>,
    pub id_qualifier: Option<String>,
    pub carrier_id: Option<String>,
    pub transport_method: Option<String>,
    pub carrier_name: Option<String>,
}

/// TD3
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub equipment_type: Option<String>,
    pub number: Option<String>,
    pub seal_number: Option<String>,
}

/// PRF under an order level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentOrder {
    pub hl_id: Option<String>,
    pub po_number: Option<String>,
    pub release_number: Option<String>,
    pub date: Option<String>,
}

/// LIN under an item level, with SN1/PID/MAN detail
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipmentItem {
    pub hl_id: Option<String>,
    /// Id of the enclosing level (the order for an S/O/I structure)
    pub parent_hl_id: Option<String>,
    pub line_number: Option<String>,
    pub product_ids: Vec<ProductId>,
    pub quantity: f64,
    pub uom: Option<String>,
    pub description: Option<String>,
    pub marks: Vec<Mark>,
}

/// MAN marks and numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    /// GM = SSCC-18, L = lot
    pub qualifier: String,
    pub value: Option<String>,
}

impl ShipmentItem {
    pub fn product_id(&self, qualifier: &str) -> Option<&str> {
        find_product_id(&self.product_ids, qualifier)
    }

    pub fn mark(&self, qualifier: &str) -> Option<&str> {
        self.marks
            .iter()
            .find(|m| m.qualifier == qualifier)
            .and_then(|m| m.value.as_deref())
    }
}

impl ShipNotice {
    pub fn party(&self, qualifier: &str) -> Option<&Party> {
        find_party(&self.parties, qualifier)
    }

    /// Items whose parent level is the given order's level
    pub fn items_for_order<'a>(
        &'a self,
        order: &'a ShipmentOrder,
    ) -> impl Iterator<Item = &'a ShipmentItem> + 'a {
        self.items
            .iter()
            .filter(move |item| order.hl_id.is_some() && item.parent_hl_id == order.hl_id)
    }
}

pub fn parse_856(segments: &[Segment]) -> ShipNotice {
    let mut asn = ShipNotice::default();
    let mut current_level: Option<HierarchicalLevel> = None;

    for segment in segments {
        if apply_party_segment(&mut asn.parties, segment) {
            continue;
        }
        match segment.id.as_str() {
            "BSN" => {
                asn.header = ShipNoticeHeader {
                    purpose: segment.value(0),
                    shipment_id: segment.value(1),
                    date: segment.value(2),
                    time: segment.value(3),
                }
            }
            "HL" => {
                let level = HierarchicalLevel {
                    id: segment.text(0),
                    parent_id: segment.value(1),
                    level_code: segment.text(2),
                };
                asn.levels.push(level.clone());
                current_level = Some(level);
            }
            "TD1" => {
                asn.shipment.packaging = Some(Packaging {
                    packaging_code: segment.value(0),
                    lading_quantity: lenient_u32(segment.element(1)),
                    weight: lenient_f64(segment.element(6)),
                    weight_unit: segment.value(7),
                })
            }
            "TD5" => {
                asn.shipment.carrier = Some(CarrierRouting {
                    routing_sequence: segment.value(0),
                    id_qualifier: segment.value(1),
                    carrier_id: segment.value(2),
                    transport_method: segment.value(3),
                    carrier_name: segment.value(4),
                })
            }
            "TD3" => {
                asn.shipment.equipment = Some(Equipment {
                    equipment_type: segment.value(0),
                    number: segment.value(2),
                    seal_number: segment.value(8),
                })
            }
            "REF" => match segment.text(0).as_str() {
                "BM" => asn.shipment.bol_number = segment.value(1),
                "CN" => asn.shipment.pro_number = segment.value(1),
                _ => {}
            },
            "DTM" => match segment.text(0).as_str() {
                "011" => asn.shipment.ship_date = segment.value(1),
                "017" => asn.shipment.delivery_date = segment.value(1),
                _ => {}
            },
            "PRF" => asn.orders.push(ShipmentOrder {
                hl_id: current_level.as_ref().map(|l| l.id.clone()),
                po_number: segment.value(0),
                release_number: segment.value(1),
                date: segment.value(3),
            }),
            "LIN" => asn.items.push(ShipmentItem {
                hl_id: current_level.as_ref().map(|l| l.id.clone()),
                parent_hl_id: current_level.as_ref().and_then(|l| l.parent_id.clone()),
                line_number: segment.value(0),
                product_ids: product_ids(segment, 1),
                ..Default::default()
            }),
            "SN1" => {
                if let Some(item) = asn.items.last_mut() {
                    item.quantity = lenient_f64(segment.element(1));
                    item.uom = segment.value(2);
                }
            }
            "PID" => {
                if let Some(item) = asn.items.last_mut() {
                    item.description = segment.value(4);
                }
            }
            "MAN" => {
                if let Some(item) = asn.items.last_mut() {
                    item.marks.push(Mark {
                        qualifier: segment.text(0),
                        value: segment.value(1),
                    });
                }
            }
            "CTT" => asn.hl_count = Some(lenient_u32(segment.element(0))),
            _ => {}
        }
    }

    asn
}

/// Input for an outbound 856
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShipNoticeInput {
    pub purpose: Option<String>,
    pub shipment_id: Option<String>,
    /// Ship timestamp; BSN03/BSN04 and DTM 011
    pub ship_date: Option<String>,
    pub delivery_date: Option<String>,
    pub packaging: Option<PackagingInput>,
    pub carrier: Option<CarrierInput>,
    pub equipment: Option<EquipmentInput>,
    pub bol_number: Option<String>,
    pub pro_number: Option<String>,
    pub ship_from: Option<PartyInput>,
    pub ship_to: Option<PartyInput>,
    /// PO number of the implied single order when `orders` is absent
    pub po_number: Option<String>,
    pub orders: Option<Vec<ShipNoticeOrderInput>>,
    /// Items of orders that carry no item list of their own
    pub items: Vec<ShipNoticeItemInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackagingInput {
    /// CTN when absent
    pub code: Option<String>,
    pub quantity: Option<u32>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EquipmentInput {
    /// TL when absent
    #[serde(rename = "type")]
    pub equipment_type: Option<String>,
    pub number: Option<String>,
    pub seal_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShipNoticeOrderInput {
    pub po_number: Option<String>,
    pub release_number: Option<String>,
    pub date: Option<String>,
    pub items: Option<Vec<ShipNoticeItemInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShipNoticeItemInput {
    #[serde(deserialize_with = "text_or_number")]
    pub line_number: Option<String>,
    pub quantity: f64,
    pub uom: Option<String>,
    pub upc: Option<String>,
    pub sku: Option<String>,
    pub vendor_part: Option<String>,
    pub description: Option<String>,
    /// Serial shipping container code, sent as MAN GM
    pub sscc: Option<String>,
    pub lot_number: Option<String>,
}

pub fn build_856(data: &ShipNoticeInput, control_number: &str) -> Vec<Segment> {
    let mut tx = TransactionBuilder::new("856", control_number);
    let mut hl_count = 0usize;

    tx.add(
        "BSN",
        [
            or_default(&data.purpose, "00").to_string(),
            or_empty(&data.shipment_id).to_string(),
            format_date(data.ship_date.as_deref()),
            format_time(data.ship_date.as_deref()),
            "0001".to_string(),
        ],
    );

    hl_count += 1;
    let shipment_hl = hl_count.to_string();
    tx.add("HL", [shipment_hl.as_str(), "", "S"]);

    if let Some(packaging) = &data.packaging {
        tx.add(
            "TD1",
            [
                or_default(&packaging.code, "CTN").to_string(),
                packaging.quantity.filter(|q| *q != 0).unwrap_or(1).to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                number_or_empty(packaging.weight),
                or_default(&packaging.weight_unit, "LB").to_string(),
            ],
        );
    }

    if let Some(carrier) = &data.carrier {
        tx.add(
            "TD5",
            [
                "B",
                "2",
                or_empty(&carrier.scac),
                or_default(&carrier.method, "M"),
                or_empty(&carrier.name),
            ],
        );
    }

    if let Some(equipment) = &data.equipment {
        tx.add(
            "TD3",
            [
                or_default(&equipment.equipment_type, "TL"),
                "",
                or_empty(&equipment.number),
                "",
                "",
                "",
                "",
                "",
                or_empty(&equipment.seal_number),
            ],
        );
    }

    if let Some(bol) = data.bol_number.as_deref().filter(|v| !v.is_empty()) {
        tx.add("REF", ["BM", bol]);
    }
    if let Some(pro) = data.pro_number.as_deref().filter(|v| !v.is_empty()) {
        tx.add("REF", ["CN", pro]);
    }

    tx.add(
        "DTM",
        ["011".to_string(), format_date(data.ship_date.as_deref())],
    );
    if data.delivery_date.is_some() {
        tx.add(
            "DTM",
            ["017".to_string(), format_date(data.delivery_date.as_deref())],
        );
    }

    if let Some(ship_from) = &data.ship_from {
        push_party(&mut tx, "SF", ship_from);
    }
    if let Some(ship_to) = &data.ship_to {
        push_party(&mut tx, "ST", ship_to);
    }

    let implied_order;
    let orders: &[ShipNoticeOrderInput] = match &data.orders {
        Some(orders) => orders,
        None => {
            implied_order = [ShipNoticeOrderInput {
                po_number: data.po_number.clone(),
                ..Default::default()
            }];
            &implied_order
        }
    };

    for order in orders {
        hl_count += 1;
        let order_hl = hl_count.to_string();
        tx.add("HL", [order_hl.as_str(), shipment_hl.as_str(), "O"]);
        tx.add(
            "PRF",
            [
                or_empty(&order.po_number).to_string(),
                or_empty(&order.release_number).to_string(),
                String::new(),
                format_date(order.date.as_deref()),
            ],
        );

        for item in order.items.as_deref().unwrap_or(&data.items) {
            hl_count += 1;
            tx.add("HL", [hl_count.to_string(), order_hl.clone(), "I".to_string()]);

            let mut lin = vec![or_empty(&item.line_number).to_string()];
            lin.extend(product_id_elements(&item.upc, &item.sku, &item.vendor_part));
            tx.add("LIN", lin);

            tx.add(
                "SN1",
                [
                    String::new(),
                    format_number(item.quantity),
                    or_default(&item.uom, "EA").to_string(),
                ],
            );
            if let Some(description) = item.description.as_deref().filter(|v| !v.is_empty()) {
                tx.add("PID", ["F", "", "", "", description]);
            }
            if let Some(sscc) = item.sscc.as_deref().filter(|v| !v.is_empty()) {
                tx.add("MAN", ["GM", sscc]);
            }
            if let Some(lot) = item.lot_number.as_deref().filter(|v| !v.is_empty()) {
                tx.add("MAN", ["L", lot]);
            }
        }
    }

    tx.add("CTT", [hl_count.to_string()]);
    tx.finish()
}
