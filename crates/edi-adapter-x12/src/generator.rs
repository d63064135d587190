//! Enveloped X12 generation
//!
//! A generator wraps exactly one transaction set per interchange:
//! ISA, GS, the ST … SE body, then GE and IEA with counts of 1. Control numbers
//! are drawn from the injected allocator and threaded into the trailers
//! directly.

use crate::control::{ControlNumberAllocator, ControlNumberKind, MemoryControlNumberAllocator};
use crate::documents::{
    AcknowledgmentInput, InventoryAdjustmentInput, InvoiceInput, OutboundDocument,
    ShipNoticeInput, ShippingAdviceInput, ShippingOrderInput, build_810, build_855, build_856,
    build_940, build_945, build_947,
};
use crate::envelopes::{
    EnvelopeOptions, PartyId, check_isa_values, generate_ge, generate_gs, generate_iea, generate_isa,
};
use crate::parser::Segment;
use crate::registry::TransactionSetType;
use crate::serializer::render;
use crate::syntax::Delimiters;
use crate::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

/// X12 generator producing transmission-ready interchanges
#[derive(Clone)]
pub struct X12Generator {
    allocator: Arc<dyn ControlNumberAllocator>,
    delimiters: Delimiters,
    options: EnvelopeOptions,
}

impl std::fmt::Debug for X12Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X12Generator")
            .field("delimiters", &self.delimiters)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for X12Generator {
    fn default() -> Self {
        Self::new(Arc::new(MemoryControlNumberAllocator::new()))
    }
}

impl X12Generator {
    /// Create a generator drawing control numbers from `allocator`
    pub fn new(allocator: Arc<dyn ControlNumberAllocator>) -> Self {
        Self {
            allocator,
            delimiters: Delimiters::default(),
            options: EnvelopeOptions::default(),
        }
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    pub fn with_options(mut self, options: EnvelopeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn allocator(&self) -> &Arc<dyn ControlNumberAllocator> {
        &self.allocator
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Generate any supported outbound document
    pub fn generate(
        &self,
        document: &OutboundDocument,
        sender: &PartyId,
        receiver: &PartyId,
    ) -> Result<String> {
        self.assemble(document.transaction_set_type(), sender, receiver, |control_number| {
            document.build(control_number)
        })
    }

    /// 810 Invoice
    pub fn generate_810(
        &self,
        data: &InvoiceInput,
        sender: &PartyId,
        receiver: &PartyId,
    ) -> Result<String> {
        self.assemble(TransactionSetType::Invoice, sender, receiver, |cn| {
            build_810(data, cn)
        })
    }

    /// 855 Purchase Order Acknowledgment
    pub fn generate_855(
        &self,
        data: &AcknowledgmentInput,
        sender: &PartyId,
        receiver: &PartyId,
    ) -> Result<String> {
        self.assemble(
            TransactionSetType::PurchaseOrderAcknowledgment,
            sender,
            receiver,
            |cn| build_855(data, cn),
        )
    }

    /// 856 Advance Ship Notice
    pub fn generate_856(
        &self,
        data: &ShipNoticeInput,
        sender: &PartyId,
        receiver: &PartyId,
    ) -> Result<String> {
        self.assemble(TransactionSetType::AdvanceShipNotice, sender, receiver, |cn| {
            build_856(data, cn)
        })
    }

    /// 940 Warehouse Shipping Order
    pub fn generate_940(
        &self,
        data: &ShippingOrderInput,
        sender: &PartyId,
        receiver: &PartyId,
    ) -> Result<String> {
        self.assemble(
            TransactionSetType::WarehouseShippingOrder,
            sender,
            receiver,
            |cn| build_940(data, cn),
        )
    }

    /// 945 Warehouse Shipping Advice
    pub fn generate_945(
        &self,
        data: &ShippingAdviceInput,
        sender: &PartyId,
        receiver: &PartyId,
    ) -> Result<String> {
        self.assemble(
            TransactionSetType::WarehouseShippingAdvice,
            sender,
            receiver,
            |cn| build_945(data, cn),
        )
    }

    /// 947 Warehouse Inventory Adjustment Advice
    pub fn generate_947(
        &self,
        data: &InventoryAdjustmentInput,
        sender: &PartyId,
        receiver: &PartyId,
    ) -> Result<String> {
        self.assemble(
            TransactionSetType::InventoryAdjustmentAdvice,
            sender,
            receiver,
            |cn| build_947(data, cn),
        )
    }

    fn assemble<F>(
        &self,
        kind: TransactionSetType,
        sender: &PartyId,
        receiver: &PartyId,
        build: F,
    ) -> Result<String>
    where
        F: FnOnce(&str) -> Vec<Segment>,
    {
        self.delimiters.validate()?;
        check_isa_values(sender, receiver, &self.options, &self.delimiters)?;

        let transaction_number = self.allocator.allocate(ControlNumberKind::Transaction)?;
        let body = build(&transaction_number);

        let interchange_number = self.allocator.allocate(ControlNumberKind::Interchange)?;
        let group_number = self.allocator.allocate(ControlNumberKind::Group)?;
        let timestamp = self.options.timestamp.unwrap_or_else(Utc::now);

        let mut segments = Vec::with_capacity(body.len() + 4);
        segments.push(generate_isa(
            sender,
            receiver,
            &interchange_number,
            &self.options,
            &self.delimiters,
            timestamp,
        ));
        segments.push(generate_gs(
            kind.functional_id(),
            sender,
            receiver,
            &group_number,
            &self.options,
            timestamp,
        ));
        let body_len = body.len();
        segments.extend(body);
        segments.push(generate_ge(1, &group_number));
        segments.push(generate_iea(1, &interchange_number));

        debug!(
            transaction_set = kind.code(),
            segments = body_len,
            "Built transaction set"
        );
        info!(
            transaction_set = kind.code(),
            interchange = %interchange_number,
            group = %group_number,
            transaction = %transaction_number,
            "Generated X12 interchange"
        );

        Ok(render(&segments, &self.delimiters))
    }
}
