//! Transaction-set registry
//!
//! Static mapping from the three-digit transaction set code to its name,
//! functional group identifier (GS01) and direction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way a document type travels relative to the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
    Both,
}

/// Supported X12 transaction set types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionSetType {
    #[serde(rename = "810")]
    Invoice,
    #[serde(rename = "820")]
    PaymentOrder,
    #[serde(rename = "850")]
    PurchaseOrder,
    #[serde(rename = "855")]
    PurchaseOrderAcknowledgment,
    #[serde(rename = "856")]
    AdvanceShipNotice,
    #[serde(rename = "940")]
    WarehouseShippingOrder,
    #[serde(rename = "943")]
    StockTransferShipmentAdvice,
    #[serde(rename = "944")]
    StockTransferReceiptAdvice,
    #[serde(rename = "945")]
    WarehouseShippingAdvice,
    #[serde(rename = "947")]
    InventoryAdjustmentAdvice,
}

impl TransactionSetType {
    pub const ALL: [TransactionSetType; 10] = [
        Self::Invoice,
        Self::PaymentOrder,
        Self::PurchaseOrder,
        Self::PurchaseOrderAcknowledgment,
        Self::AdvanceShipNotice,
        Self::WarehouseShippingOrder,
        Self::StockTransferShipmentAdvice,
        Self::StockTransferReceiptAdvice,
        Self::WarehouseShippingAdvice,
        Self::InventoryAdjustmentAdvice,
    ];

    /// Look up a type by its ST01 code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.code() == code.trim())
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Invoice => "810",
            Self::PaymentOrder => "820",
            Self::PurchaseOrder => "850",
            Self::PurchaseOrderAcknowledgment => "855",
            Self::AdvanceShipNotice => "856",
            Self::WarehouseShippingOrder => "940",
            Self::StockTransferShipmentAdvice => "943",
            Self::StockTransferReceiptAdvice => "944",
            Self::WarehouseShippingAdvice => "945",
            Self::InventoryAdjustmentAdvice => "947",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::PaymentOrder => "Payment Order/Remittance Advice",
            Self::PurchaseOrder => "Purchase Order",
            Self::PurchaseOrderAcknowledgment => "Purchase Order Acknowledgment",
            Self::AdvanceShipNotice => "Advance Ship Notice",
            Self::WarehouseShippingOrder => "Warehouse Shipping Order",
            Self::StockTransferShipmentAdvice => "Warehouse Stock Transfer Shipment Advice",
            Self::StockTransferReceiptAdvice => "Warehouse Stock Transfer Receipt Advice",
            Self::WarehouseShippingAdvice => "Warehouse Shipping Advice",
            Self::InventoryAdjustmentAdvice => "Warehouse Inventory Adjustment Advice",
        }
    }

    /// Functional identifier code used in GS01
    pub fn functional_id(self) -> &'static str {
        match self {
            Self::Invoice => "IN",
            Self::PaymentOrder => "RA",
            Self::PurchaseOrder => "PO",
            Self::PurchaseOrderAcknowledgment => "PR",
            Self::AdvanceShipNotice => "SH",
            Self::WarehouseShippingOrder => "OW",
            Self::StockTransferShipmentAdvice => "SW",
            Self::StockTransferReceiptAdvice => "SR",
            Self::WarehouseShippingAdvice => "SW",
            Self::InventoryAdjustmentAdvice => "IJ",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Self::PaymentOrder | Self::AdvanceShipNotice => Direction::Both,
            Self::PurchaseOrder | Self::WarehouseShippingOrder => Direction::Inbound,
            Self::Invoice
            | Self::PurchaseOrderAcknowledgment
            | Self::StockTransferShipmentAdvice
            | Self::StockTransferReceiptAdvice
            | Self::WarehouseShippingAdvice
            | Self::InventoryAdjustmentAdvice => Direction::Outbound,
        }
    }
}

impl fmt::Display for TransactionSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_code() {
        assert_eq!(
            TransactionSetType::from_code("856"),
            Some(TransactionSetType::AdvanceShipNotice)
        );
        assert_eq!(TransactionSetType::from_code("999"), None);
    }

    #[test]
    fn test_functional_ids() {
        assert_eq!(TransactionSetType::AdvanceShipNotice.functional_id(), "SH");
        assert_eq!(TransactionSetType::PurchaseOrder.functional_id(), "PO");
        assert_eq!(TransactionSetType::WarehouseShippingAdvice.functional_id(), "SW");
        assert_eq!(TransactionSetType::InventoryAdjustmentAdvice.functional_id(), "IJ");
    }

    #[test]
    fn test_codes_round_trip() {
        for t in TransactionSetType::ALL {
            assert_eq!(TransactionSetType::from_code(t.code()), Some(t));
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(TransactionSetType::PurchaseOrder.direction(), Direction::Inbound);
        assert_eq!(TransactionSetType::Invoice.direction(), Direction::Outbound);
        assert_eq!(TransactionSetType::AdvanceShipNotice.direction(), Direction::Both);
    }
}
