//! Integration tests for edi-validation crate
//!
//! Generated interchanges must validate cleanly; hand-edited ones must be
//! caught.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use edi_adapter_x12::documents::inventory::AdjustmentInput;
use edi_adapter_x12::documents::{InventoryAdjustmentInput, ShipNoticeInput};
use edi_adapter_x12::{
    EnvelopeOptions, OutboundDocument, PartyId, TransactionSetType, X12Generator, parse,
};
use edi_validation::{
    StrictnessLevel, ValidationConfig, ValidationEngine, ValidationReporter, codes, validate,
    validate_text,
};
use serde_json::json;

fn generator() -> X12Generator {
    X12Generator::default().with_options(EnvelopeOptions {
        timestamp: Some(Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()),
        ..Default::default()
    })
}

fn generate_947() -> String {
    let input = InventoryAdjustmentInput {
        reference_id: Some("ADJ-4".into()),
        adjustments: vec![
            AdjustmentInput {
                quantity: -1.0,
                sku: Some("S-1".into()),
                ..Default::default()
            },
            AdjustmentInput {
                quantity: 6.0,
                sku: Some("S-2".into()),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    generator()
        .generate_947(&input, &PartyId::new("WHSE"), &PartyId::new("BRAND"))
        .expect("947 generation")
}

#[test]
fn test_every_outbound_type_validates_cleanly() -> Result<()> {
    let generator = generator();
    let inputs = [
        (TransactionSetType::Invoice, json!({ "invoiceNumber": "I-1", "items": [{ "quantity": 1 }] })),
        (TransactionSetType::PurchaseOrderAcknowledgment, json!({ "poNumber": "P-1", "items": [{ "quantity": 2 }] })),
        (TransactionSetType::AdvanceShipNotice, json!({ "shipmentId": "S-1", "items": [{ "quantity": 3, "sku": "X" }] })),
        (TransactionSetType::WarehouseShippingOrder, json!({ "orderNumber": "O-1", "items": [{ "quantity": 4 }] })),
        (TransactionSetType::WarehouseShippingAdvice, json!({ "orderNumber": "O-1", "items": [{ "quantityShipped": 4 }] })),
        (TransactionSetType::InventoryAdjustmentAdvice, json!({ "adjustments": [{ "quantity": -2 }] })),
    ];

    for (kind, value) in inputs {
        let document = OutboundDocument::from_value(kind, value)?;
        let edi = generator.generate(&document, &PartyId::new("WHSE"), &PartyId::new("BRAND"))?;
        let result = validate(&parse(&edi));
        assert!(result.is_valid, "{kind} should validate: {result:?}");
        assert!(result.errors.is_empty(), "{kind} errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "{kind} warnings: {:?}", result.warnings);
    }
    Ok(())
}

#[test]
fn test_generated_output_passes_strict_validation() {
    let result = validate_text(
        &generate_947(),
        ValidationConfig {
            strictness: StrictnessLevel::Strict,
            ..Default::default()
        },
    );
    assert!(result.is_valid, "strict findings: {result:?}");
}

#[test]
fn test_tampered_segment_count_is_flagged() {
    let edi = generate_947();
    let se_start = edi.find("~SE*").expect("SE segment") + 1;
    let se_end = se_start + edi[se_start..].find('~').expect("SE terminator");
    let tampered = format!("{}SE*99*000000001{}", &edi[..se_start], &edi[se_end..]);

    let result = validate(&parse(&tampered));
    assert!(result.is_valid, "count mismatch is only a warning");
    let warning = result
        .warnings
        .iter()
        .find(|w| w.code == codes::SE_COUNT_MISMATCH)
        .expect("SE count warning");
    assert_eq!(warning.path, "ISA[0]/GS[0]/ST[0]");

    let strict = ValidationEngine::with_config(ValidationConfig {
        strictness: StrictnessLevel::Strict,
        ..Default::default()
    })
    .validate(&parse(&tampered));
    assert!(!strict.is_valid);
}

#[test]
fn test_truncated_transmission_reports_unclosed_envelopes() {
    let edi = generate_947();
    let cut = edi.find("~SE*").expect("SE segment") + 1;
    let result = validate(&parse(&edi[..cut]));

    assert!(!result.is_valid);
    assert!(result.has_code(codes::UNCLOSED_TRANSACTION));
    assert!(result.has_code(codes::UNCLOSED_GROUP));
    assert!(result.has_code(codes::UNCLOSED_INTERCHANGE));

    let report = ValidationReporter::new().render(&result);
    assert!(report.starts_with("INVALID: 3 error(s)"), "report was:\n{report}");
    assert!(report.contains("[UNCLOSED_TRANSACTION] ISA[0]/GS[0]/ST[0]"));
}

#[test]
fn test_two_interchanges_in_one_file() {
    let input = ShipNoticeInput {
        shipment_id: Some("SHP-2".into()),
        ..Default::default()
    };
    let generator = generator();
    let first = generator
        .generate_856(&input, &PartyId::new("WHSE"), &PartyId::new("BRAND"))
        .expect("first 856");
    let second = generator
        .generate_856(&input, &PartyId::new("WHSE"), &PartyId::new("BRAND"))
        .expect("second 856");

    let outcome = parse(&format!("{first}\r\n{second}"));
    assert_eq!(outcome.interchanges.len(), 2);
    let result = validate(&outcome);
    assert!(result.is_valid);
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
}
