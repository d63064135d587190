//! 850 Purchase Order

use super::common::{
    DateReference, Party, ProductId, Reference, apply_party_segment, find_party, find_product_id,
    parse_x12_date, product_ids,
};
use crate::numeric::{lenient_f64, lenient_u32};
use crate::parser::Segment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub header: PurchaseOrderHeader,
    pub references: Vec<Reference>,
    pub dates: Vec<DateReference>,
    pub parties: Vec<Party>,
    pub items: Vec<LineItem>,
    pub totals: PurchaseOrderTotals,
}

/// BEG plus currency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderHeader {
    /// 00 = original, 01 = cancel, 05 = replace
    pub purpose: Option<String>,
    /// NE = new order, RO = rush order
    pub order_type: Option<String>,
    pub po_number: Option<String>,
    pub release_number: Option<String>,
    pub date: Option<String>,
    pub currency: Option<String>,
}

/// PO1 / IT1 line with its PID description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_number: Option<String>,
    pub quantity: f64,
    pub uom: Option<String>,
    pub unit_price: f64,
    pub product_ids: Vec<ProductId>,
    pub description: Option<String>,
}

impl LineItem {
    /// Read a PO1 or IT1 segment; product ids start at the sixth element
    pub(crate) fn from_segment(segment: &Segment) -> Self {
        Self {
            line_number: segment.value(0),
            quantity: lenient_f64(segment.element(1)),
            uom: segment.value(2),
            unit_price: lenient_f64(segment.element(3)),
            product_ids: product_ids(segment, 5),
            description: None,
        }
    }

    pub fn product_id(&self, qualifier: &str) -> Option<&str> {
        find_product_id(&self.product_ids, qualifier)
    }

    /// Quantity times unit price
    pub fn extended_amount(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// CTT and AMT
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderTotals {
    pub line_items: Option<u32>,
    pub hash_total: Option<f64>,
    pub amount: Option<f64>,
}

impl PurchaseOrder {
    pub fn party(&self, qualifier: &str) -> Option<&Party> {
        find_party(&self.parties, qualifier)
    }

    /// Date of the first DTM with the given qualifier
    pub fn date(&self, qualifier: &str) -> Option<NaiveDate> {
        self.dates
            .iter()
            .find(|d| d.qualifier == qualifier)
            .and_then(|d| d.date.as_deref())
            .and_then(parse_x12_date)
    }

    /// BEG05 as a calendar date
    pub fn order_date(&self) -> Option<NaiveDate> {
        self.header.date.as_deref().and_then(parse_x12_date)
    }
}

pub fn parse_850(segments: &[Segment]) -> PurchaseOrder {
    let mut po = PurchaseOrder::default();

    for segment in segments {
        if apply_party_segment(&mut po.parties, segment) {
            continue;
        }
        match segment.id.as_str() {
            "BEG" => {
                po.header.purpose = segment.value(0);
                po.header.order_type = segment.value(1);
                po.header.po_number = segment.value(2);
                po.header.release_number = segment.value(3);
                po.header.date = segment.value(4);
            }
            "CUR" => po.header.currency = segment.value(1),
            "REF" => po.references.push(Reference::from_segment(segment)),
            "DTM" => po.dates.push(DateReference {
                qualifier: segment.text(0),
                date: segment.value(1),
            }),
            "PO1" => po.items.push(LineItem::from_segment(segment)),
            "PID" => {
                if let Some(item) = po.items.last_mut() {
                    item.description = segment.value(4);
                }
            }
            "CTT" => {
                po.totals.line_items = Some(lenient_u32(segment.element(0)));
                po.totals.hash_total = Some(lenient_f64(segment.element(1)));
            }
            "AMT" => po.totals.amount = Some(lenient_f64(segment.element(1))),
            _ => {}
        }
    }

    po
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use crate::syntax::Delimiters;

    const BODY: &str = "BEG*00*NE*PO-77**20240115~\
CUR*BY*USD~\
REF*DP*042*Grocery~\
DTM*002*20240120~\
N1*ST*Store 12*92*0012~\
N3*1 Main St~\
N4*Reno*NV*89501*US~\
PO1*1*24*EA*3.50**UP*012345678905*SK*W-1~\
PID*F****Blue widget~\
PO1*2*6*CS*12**SK*W-2~\
CTT*2*30~\
AMT*TT*156~";

    fn parse_body() -> PurchaseOrder {
        parse_850(&tokenize(BODY, &Delimiters::default()))
    }

    #[test]
    fn test_header_and_currency() {
        let po = parse_body();
        assert_eq!(po.header.po_number.as_deref(), Some("PO-77"));
        assert_eq!(po.header.release_number, None);
        assert_eq!(po.header.currency.as_deref(), Some("USD"));
        assert_eq!(po.order_date(), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(po.date("002"), NaiveDate::from_ymd_opt(2024, 1, 20));
        assert_eq!(po.references[0].description.as_deref(), Some("Grocery"));
    }

    #[test]
    fn test_items_and_descriptions() {
        let po = parse_body();
        assert_eq!(po.items.len(), 2);
        assert_eq!(po.items[0].quantity, 24.0);
        assert_eq!(po.items[0].unit_price, 3.5);
        assert_eq!(po.items[0].product_id("UP"), Some("012345678905"));
        assert_eq!(po.items[0].description.as_deref(), Some("Blue widget"));
        assert_eq!(po.items[1].description, None);
        assert_eq!(po.items[1].extended_amount(), 72.0);
    }

    #[test]
    fn test_parties_and_totals() {
        let po = parse_body();
        let ship_to = po.party("ST").unwrap();
        assert_eq!(ship_to.zip.as_deref(), Some("89501"));
        assert_eq!(po.totals.line_items, Some(2));
        assert_eq!(po.totals.hash_total, Some(30.0));
        assert_eq!(po.totals.amount, Some(156.0));
    }

    #[test]
    fn test_bad_numbers_fall_back_to_zero() {
        let po = parse_850(&[Segment::new("PO1", ["1", "lots", "EA", ""])]);
        assert_eq!(po.items[0].quantity, 0.0);
        assert_eq!(po.items[0].unit_price, 0.0);
    }
}
