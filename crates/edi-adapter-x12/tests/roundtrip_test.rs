//! Generate-then-parse tests across the outbound document types

use chrono::{TimeZone, Utc};
use edi_adapter_x12::documents::acknowledgment::AcknowledgmentItemInput;
use edi_adapter_x12::documents::inventory::AdjustmentInput;
use edi_adapter_x12::documents::invoice::InvoiceItemInput;
use edi_adapter_x12::documents::ship_notice::{ShipNoticeItemInput, ShipNoticeOrderInput};
use edi_adapter_x12::documents::warehouse::{ShippedItemInput, ShippingOrderItemInput};
use edi_adapter_x12::documents::{
    AcknowledgmentInput, CarrierInput, InventoryAdjustmentInput, InvoiceInput, PartyInput,
    ShipNoticeInput, ShippingAdviceInput, ShippingOrderInput,
};
use edi_adapter_x12::{
    Document, EnvelopeOptions, OutboundDocument, ParseOutcome, PartyId, TransactionSetType,
    X12Generator, parse,
};
use serde_json::json;

fn generator() -> X12Generator {
    X12Generator::default().with_options(EnvelopeOptions {
        timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 5, 0).unwrap()),
        ..Default::default()
    })
}

fn sender() -> PartyId {
    PartyId::new("WAREHOUSE")
}

fn receiver() -> PartyId {
    PartyId::new("BRAND").with_qualifier("12")
}

/// Parse generated text and check the structure is clean and self-consistent
fn parse_clean(edi: &str) -> ParseOutcome {
    let outcome = parse(edi);
    assert!(outcome.errors.is_empty(), "parse errors: {:?}", outcome.errors);
    assert!(
        outcome.anomalies.is_empty(),
        "envelope anomalies: {:?}",
        outcome.anomalies
    );
    assert_eq!(outcome.interchanges.len(), 1);

    let interchange = &outcome.interchanges[0];
    let iea = interchange.trailer.as_ref().expect("IEA trailer");
    assert_eq!(iea.group_count, 1);
    assert_eq!(iea.control_number, interchange.header.control_number);

    let group = &interchange.groups[0];
    let ge = group.trailer.as_ref().expect("GE trailer");
    assert_eq!(ge.transaction_count, 1);
    assert_eq!(ge.control_number, group.header.control_number);

    let transaction = &group.transactions[0];
    let se = transaction.trailer.as_ref().expect("SE trailer");
    assert_eq!(
        se.segment_count as usize,
        transaction.segments.len() + 2,
        "SE count must include ST and SE"
    );
    assert_eq!(se.control_number, transaction.header.control_number);
    outcome
}

fn parsed(outcome: &ParseOutcome) -> &Document {
    outcome
        .transactions()
        .next()
        .and_then(|t| t.parsed.as_ref())
        .expect("dispatched document")
}

#[test]
fn test_invoice_round_trip() {
    let input = InvoiceInput {
        invoice_number: Some("INV-77".into()),
        invoice_date: Some("2024-03-01".into()),
        po_number: Some("PO-12".into()),
        ship_to: Some(PartyInput {
            name: Some("Store 9".into()),
            id: Some("0009".into()),
            address1: Some("9 Main St".into()),
            city: Some("Dayton".into()),
            state: Some("OH".into()),
            zip: Some("45402".into()),
            ..Default::default()
        }),
        items: vec![
            InvoiceItemInput {
                quantity: 2.0,
                unit_price: Some(10.5),
                upc: Some("0123".into()),
                description: Some("Blue mug".into()),
                ..Default::default()
            },
            InvoiceItemInput {
                quantity: 1.0,
                unit_price: Some(4.0),
                sku: Some("SKU-2".into()),
                ..Default::default()
            },
        ],
        carrier: Some(CarrierInput {
            scac: Some("UPSN".into()),
            name: Some("UPS".into()),
            ..Default::default()
        }),
        ..Default::default()
    };
    let edi = generator().generate_810(&input, &sender(), &receiver()).unwrap();
    assert!(edi.contains("~GS*IN*"), "810 travels in an IN group");

    let outcome = parse_clean(&edi);
    let Document::Invoice(invoice) = parsed(&outcome) else {
        panic!("expected an invoice, got {:?}", parsed(&outcome));
    };
    assert_eq!(invoice.header.invoice_number.as_deref(), Some("INV-77"));
    assert_eq!(invoice.header.invoice_date.as_deref(), Some("20240301"));
    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.items[0].line_number.as_deref(), Some("1"));
    assert_eq!(invoice.items[0].description.as_deref(), Some("Blue mug"));
    assert_eq!(invoice.items[1].product_id("SK"), Some("SKU-2"));
    assert_eq!(invoice.total_amount, Some(25.0));
    let ship_to = invoice.party("ST").expect("ship-to party");
    assert_eq!(ship_to.city.as_deref(), Some("Dayton"));
    assert_eq!(ship_to.country.as_deref(), Some("US"));
    assert_eq!(
        invoice.carrier.as_ref().and_then(|c| c.carrier_id.as_deref()),
        Some("UPSN")
    );
}

#[test]
fn test_acknowledgment_round_trip() {
    let input = AcknowledgmentInput {
        po_number: Some("PO-12".into()),
        date: Some("2024-03-01".into()),
        items: vec![
            AcknowledgmentItemInput {
                quantity: 10.0,
                sku: Some("A".into()),
                ..Default::default()
            },
            AcknowledgmentItemInput {
                quantity: 5.0,
                sku: Some("B".into()),
                status: Some("IR".into()),
                ack_quantity: Some(0.0),
                reject_reason: Some("Discontinued".into()),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let edi = generator().generate_855(&input, &sender(), &receiver()).unwrap();
    assert!(edi.contains("~CTT*2~"));

    let outcome = parse_clean(&edi);
    let Document::PoAcknowledgment(ack) = parsed(&outcome) else {
        panic!("expected an 855, got {:?}", parsed(&outcome));
    };
    assert_eq!(ack.header.po_number.as_deref(), Some("PO-12"));
    assert_eq!(ack.items.len(), 2);
    let first = ack.items[0].acknowledgment.as_ref().expect("ACK on line 1");
    assert_eq!(first.status.as_deref(), Some("IA"));
    assert_eq!(first.quantity, 10.0);
    let second = ack.items[1].acknowledgment.as_ref().expect("ACK on line 2");
    assert_eq!(second.status.as_deref(), Some("IR"));
}

#[test]
fn test_ship_notice_round_trip_links_items_to_orders() {
    let input = ShipNoticeInput {
        shipment_id: Some("SHP-1".into()),
        ship_date: Some("2024-03-01T15:45:00Z".into()),
        bol_number: Some("BOL-5".into()),
        ship_to: Some(PartyInput {
            name: Some("DC East".into()),
            id: Some("DC1".into()),
            ..Default::default()
        }),
        orders: Some(vec![
            ShipNoticeOrderInput {
                po_number: Some("PO-A".into()),
                items: Some(vec![ShipNoticeItemInput {
                    quantity: 3.0,
                    sku: Some("A-1".into()),
                    ..Default::default()
                }]),
                ..Default::default()
            },
            ShipNoticeOrderInput {
                po_number: Some("PO-B".into()),
                items: Some(vec![
                    ShipNoticeItemInput {
                        quantity: 1.0,
                        sku: Some("B-1".into()),
                        ..Default::default()
                    },
                    ShipNoticeItemInput {
                        quantity: 4.0,
                        sku: Some("B-2".into()),
                        sscc: Some("00012345".into()),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            },
        ]),
        ..Default::default()
    };
    let edi = generator().generate_856(&input, &sender(), &receiver()).unwrap();
    assert!(edi.contains("~GS*SH*"));

    let outcome = parse_clean(&edi);
    let Document::ShipNotice(notice) = parsed(&outcome) else {
        panic!("expected an 856, got {:?}", parsed(&outcome));
    };
    assert_eq!(notice.header.shipment_id.as_deref(), Some("SHP-1"));
    assert_eq!(notice.shipment.bol_number.as_deref(), Some("BOL-5"));
    assert_eq!(notice.shipment.ship_date.as_deref(), Some("20240301"));
    assert_eq!(notice.orders.len(), 2);
    // shipment + 2 orders + 3 items
    assert_eq!(notice.hl_count, Some(6));

    let order_b = &notice.orders[1];
    assert_eq!(order_b.po_number.as_deref(), Some("PO-B"));
    let items: Vec<_> = notice.items_for_order(order_b).collect();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].product_id("SK"), Some("B-2"));
    assert_eq!(items[1].mark("GM"), Some("00012345"));
}

#[test]
fn test_warehouse_shipping_order_round_trip() {
    let input = ShippingOrderInput {
        order_number: Some("ORD-1".into()),
        po_number: Some("PO-9".into()),
        depositor: Some(PartyInput {
            name: Some("Brand Co".into()),
            id: Some("BRAND".into()),
            ..Default::default()
        }),
        ship_to: Some(PartyInput {
            name: Some("Jane Doe".into()),
            address1: Some("1 Elm".into()),
            city: Some("Austin".into()),
            state: Some("TX".into()),
            ..Default::default()
        }),
        items: vec![
            ShippingOrderItemInput {
                quantity: 2.0,
                weight: Some(1.5),
                sku: Some("S-1".into()),
                ..Default::default()
            },
            ShippingOrderItemInput {
                quantity: 3.0,
                weight: Some(2.0),
                upc: Some("0777".into()),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let edi = generator().generate_940(&input, &sender(), &receiver()).unwrap();
    assert!(edi.contains("~W76*2*5*EA*3.5*LB~"));

    let outcome = parse_clean(&edi);
    let Document::WarehouseShippingOrder(order) = parsed(&outcome) else {
        panic!("expected a 940, got {:?}", parsed(&outcome));
    };
    assert_eq!(order.header.depositor_order_number.as_deref(), Some("ORD-1"));
    assert_eq!(order.header.purchase_order_number.as_deref(), Some("PO-9"));
    assert_eq!(order.ship_to().and_then(|p| p.city.as_deref()), Some("Austin"));
    assert_eq!(order.depositor().and_then(|p| p.id.as_deref()), Some("BRAND"));
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[1].product_id("UP"), Some("0777"));
}

#[test]
fn test_warehouse_shipping_advice_round_trip() {
    let input = ShippingAdviceInput {
        order_number: Some("ORD-1".into()),
        ship_date: Some("2024-03-01".into()),
        bol_number: Some("BOL-7".into()),
        items: vec![ShippedItemInput {
            quantity_shipped: 6.0,
            weight: Some(4.25),
            sku: Some("S-1".into()),
            lot_number: Some("LOT-3".into()),
            ..Default::default()
        }],
        pallet_count: Some(1),
        ..Default::default()
    };
    let edi = generator().generate_945(&input, &sender(), &receiver()).unwrap();
    assert!(edi.contains("~GS*SW*"));

    let outcome = parse_clean(&edi);
    let Document::WarehouseShippingAdvice(advice) = parsed(&outcome) else {
        panic!("expected a 945, got {:?}", parsed(&outcome));
    };
    assert_eq!(advice.header.depositor_order_number.as_deref(), Some("ORD-1"));
    assert_eq!(advice.items.len(), 1);
    assert_eq!(advice.items[0].quantity_shipped, 6.0);
    assert_eq!(advice.items[0].lot_number.as_deref(), Some("LOT-3"));
}

#[test]
fn test_inventory_adjustment_totals_survive_round_trip() {
    let input = InventoryAdjustmentInput {
        reference_id: Some("ADJ-1".into()),
        adjustments: [5.0, -3.0, 2.0]
            .into_iter()
            .map(|quantity| AdjustmentInput {
                quantity,
                sku: Some("S".into()),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };
    let edi = generator().generate_947(&input, &sender(), &receiver()).unwrap();
    assert!(edi.contains("~W14*10**3~"));

    let outcome = parse_clean(&edi);
    let Document::InventoryAdjustment(adjustment) = parsed(&outcome) else {
        panic!("expected a 947, got {:?}", parsed(&outcome));
    };
    assert_eq!(adjustment.adjustments.len(), 3);
    assert_eq!(adjustment.adjustments[1].quantity, -3.0);
    let totals = adjustment.totals.as_ref().expect("W14 totals");
    assert_eq!(totals.total_quantity, 10.0);
    assert_eq!(totals.record_count, 3);
}

#[test]
fn test_generic_generation_from_json() {
    let document = OutboundDocument::from_value(
        TransactionSetType::Invoice,
        json!({
            "invoiceNumber": "INV-9",
            "items": [{ "lineNumber": 7, "quantity": 1, "unitPrice": 2.5, "sku": "X" }]
        }),
    )
    .unwrap();
    let edi = generator().generate(&document, &sender(), &receiver()).unwrap();
    assert!(edi.contains("~IT1*7*1*EA*2.50**SK*X~"));
    assert!(edi.contains("~TDS*250~"));
    parse_clean(&edi);
}

#[test]
fn test_successive_generations_draw_fresh_control_numbers() {
    let generator = generator();
    let input = InventoryAdjustmentInput::default();

    let first = parse_clean(&generator.generate_947(&input, &sender(), &receiver()).unwrap());
    let second = parse_clean(&generator.generate_947(&input, &sender(), &receiver()).unwrap());

    assert_eq!(first.interchanges[0].header.control_number, "000000001");
    assert_eq!(second.interchanges[0].header.control_number, "000000002");
    assert_eq!(
        second.interchanges[0].groups[0].header.control_number,
        "000000002"
    );
}

#[test]
fn test_isa_is_fixed_width_with_sixteen_elements() {
    let edi = generator()
        .generate_947(&InventoryAdjustmentInput::default(), &sender(), &receiver())
        .unwrap();
    let isa = edi.split('~').next().unwrap();
    assert_eq!(isa.len(), 105);
    assert_eq!(isa.split('*').count(), 17);
    assert_eq!(&edi[3..4], "*");
    assert_eq!(&edi[104..106], ":~");

    let outcome = parse(&edi);
    assert_eq!(outcome.interchanges[0].header.element_count, 16);
    assert_eq!(outcome.interchanges[0].header.receiver_id, "BRAND");
    assert_eq!(outcome.interchanges[0].header.receiver_id_qualifier, "12");
}

#[test]
fn test_hand_written_850_dispatches() {
    let raw = "ISA*00*          *00*          *ZZ*BUYER          *ZZ*WAREHOUSE      *240115*1030*^*00401*000000101*0*P*:~\r\n\
GS*PO*BUYER*WAREHOUSE*20240115*1030*201*X*004010~\r\n\
ST*850*0001~\r\n\
BEG*00*NE*PO-1001**20240115~\r\n\
N1*ST*Store 4*92*0004~\r\n\
N3*4 Oak Ave~\r\n\
N4*Reno*NV*89501~\r\n\
PO1*1*24*EA*3.50**SK*WIDGET-1~\r\n\
PID*F****Widget, large~\r\n\
CTT*1*24~\r\n\
SE*9*0001~\r\n\
GE*1*201~\r\n\
IEA*1*000000101~\r\n";
    let outcome = parse_clean(raw);
    let Document::PurchaseOrder(order) = parsed(&outcome) else {
        panic!("expected an 850, got {:?}", parsed(&outcome));
    };
    assert_eq!(order.header.po_number.as_deref(), Some("PO-1001"));
    assert_eq!(
        order.order_date(),
        chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
    );
    let store = order.party("ST").expect("ship-to");
    assert_eq!(store.address1.as_deref(), Some("4 Oak Ave"));
    assert_eq!(store.zip.as_deref(), Some("89501"));
    let item = &order.items[0];
    assert_eq!(item.quantity, 24.0);
    assert_eq!(item.product_id("SK"), Some("WIDGET-1"));
    assert_eq!(item.description.as_deref(), Some("Widget, large"));
    assert_eq!(item.extended_amount(), 84.0);
}

#[test]
fn test_empty_and_blank_input() {
    for raw in ["", "   \r\n"] {
        let outcome = parse(raw);
        assert!(outcome.interchanges.is_empty());
        assert!(outcome.errors.is_empty());
        assert!(outcome.anomalies.is_empty());
    }
}
