use actix_web::{test, App};
use pakailink::middleware::RequestId;
use pakailink::modules::callbacks::{
    BroadcastEventBus, CallbackController, CallbackResponse, CallbackService, PaymentEvent,
    TransactionStatus,
};
use pakailink::modules::signature::SignatureService;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

const SECRET: &str = "callback-test-secret";
const TS: &str = "2025-01-15T14:30:00+07:00";
const PREFIX: &str = "/api/pakailink/callbacks";

fn signer() -> SignatureService {
    SignatureService::new("/nonexistent/key.pem", SECRET)
}

fn sign(body: &str) -> String {
    signer().generate_callback_signature(body.as_bytes(), TS)
}

fn setup() -> (Arc<CallbackService>, Arc<BroadcastEventBus>) {
    let bus = Arc::new(BroadcastEventBus::default());
    let service = Arc::new(CallbackService::new(Arc::new(signer()), bus.clone()));
    (service, bus)
}

/// Next non-audit event from the bus
fn next_typed_event(events: &mut broadcast::Receiver<PaymentEvent>) -> PaymentEvent {
    loop {
        match events.try_recv().expect("event published") {
            PaymentEvent::CallbackReceived(_) => continue,
            event => return event,
        }
    }
}

macro_rules! post_callback {
    ($service:expr, $segment:expr, $body:expr, $signature:expr, $timestamp:expr) => {{
        let service = $service.clone();
        let app = test::init_service(
            App::new()
                .wrap(RequestId)
                .configure(|cfg| CallbackController::configure(cfg, service, PREFIX)),
        )
        .await;

        let mut req = test::TestRequest::post()
            .uri(&format!("{}/{}", PREFIX, $segment))
            .insert_header(("Content-Type", "application/json"))
            .set_payload($body.to_string());
        if let Some(signature) = $signature {
            req = req.insert_header(("X-SIGNATURE", signature));
        }
        if let Some(timestamp) = $timestamp {
            req = req.insert_header(("X-TIMESTAMP", timestamp));
        }

        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status().as_u16();
        let envelope: Value = test::read_body_json(resp).await;
        (status, envelope)
    }};
}

#[actix_web::test]
async fn test_signed_va_callback_is_acknowledged_and_published() {
    let (service, bus) = setup();
    let mut events = bus.subscribe();

    let body = r#"{"partnerServiceId":"  12345","customerNo":"0001","virtualAccountNo":"  123450001","partnerReferenceNo":"VA-1","amount":{"value":"150000.00","currency":"IDR"},"latestTransactionStatus":"00","additionalInfo":{"bankCd":"BNI"}}"#;
    let (status, envelope) = post_callback!(
        service,
        "virtual-account",
        body,
        Some(sign(body)),
        Some(TS)
    );

    assert_eq!(status, 200);
    assert_eq!(
        envelope,
        json!({
            "responseCode": "2000000",
            "responseMessage": "Success",
            "partnerReferenceNo": "VA-1"
        })
    );

    let PaymentEvent::CallbackReceived(first) = events.try_recv().unwrap() else {
        panic!("expected unverified audit event first");
    };
    assert!(!first.is_valid);
    assert_eq!(first.signature.as_deref(), Some(sign(body).as_str()));

    let PaymentEvent::CallbackReceived(second) = events.try_recv().unwrap() else {
        panic!("expected verified audit event second");
    };
    assert!(second.is_valid);

    match events.try_recv().unwrap() {
        PaymentEvent::VirtualAccountPaid { data, payload } => {
            assert_eq!(data.partner_reference_no, "VA-1");
            assert_eq!(data.amount_value(), dec!(150000.00));
            assert_eq!(data.bank_code(), Some("BNI"));
            assert!(data.status().is_success());
            assert_eq!(payload["customerNo"], "0001");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[actix_web::test]
async fn test_numeric_amount_is_acknowledged() {
    let (service, bus) = setup();
    let mut events = bus.subscribe();

    let body = r#"{"partnerReferenceNo":"VA-N","amount":{"value":150000,"currency":"IDR"},"latestTransactionStatus":"00"}"#;
    let (status, envelope) = post_callback!(
        service,
        "virtual-account",
        body,
        Some(sign(body)),
        Some(TS)
    );

    assert_eq!(status, 200);
    assert_eq!(envelope["partnerReferenceNo"], "VA-N");

    let event = next_typed_event(&mut events);
    assert_eq!(event.record().unwrap().amount_value(), dec!(150000));
}

#[actix_web::test]
async fn test_bad_signature_is_rejected() {
    let (service, bus) = setup();
    let mut events = bus.subscribe();

    let body = r#"{"partnerReferenceNo":"VA-2","latestTransactionStatus":"00"}"#;
    let (status, envelope) = post_callback!(
        service,
        "virtual-account",
        body,
        Some("garbage".to_string()),
        Some(TS)
    );

    assert_eq!(status, 401);
    assert_eq!(envelope["responseCode"], "4010001");
    assert_eq!(envelope["responseMessage"], "Signature verification failed");
    assert_eq!(envelope["partnerReferenceNo"], "VA-2");

    // only the unverified audit record goes out
    let PaymentEvent::CallbackReceived(audit) = events.try_recv().unwrap() else {
        panic!("expected audit event");
    };
    assert!(!audit.is_valid);
    assert!(events.try_recv().is_err());
}

#[actix_web::test]
async fn test_signature_for_other_timestamp_is_rejected() {
    let (service, _bus) = setup();

    let body = r#"{"partnerReferenceNo":"VA-3"}"#;
    let (status, envelope) = post_callback!(
        service,
        "virtual-account",
        body,
        Some(sign(body)),
        Some("2025-01-15T14:30:01+07:00")
    );

    assert_eq!(status, 401);
    assert_eq!(envelope["responseCode"], "4010001");
}

#[actix_web::test]
async fn test_missing_headers_are_rejected() {
    let (service, bus) = setup();
    let mut events = bus.subscribe();
    let body = r#"{"originalPartnerReferenceNo":"QRIS-1"}"#;

    let (status, envelope) = post_callback!(service, "qris", body, None::<String>, Some(TS));
    assert_eq!(status, 401);
    assert_eq!(envelope["responseCode"], "4010000");
    assert_eq!(envelope["responseMessage"], "Invalid signature or timestamp");
    assert_eq!(envelope["partnerReferenceNo"], "QRIS-1");

    let (status, envelope) = post_callback!(service, "qris", body, Some(sign(body)), None::<&str>);
    assert_eq!(status, 401);
    assert_eq!(envelope["responseCode"], "4010000");

    assert!(events.try_recv().is_err());
}

#[actix_web::test]
async fn test_signed_malformed_body_is_bad_request() {
    let (service, _bus) = setup();

    let body = "{not json";
    let (status, envelope) = post_callback!(service, "transfer", body, Some(sign(body)), Some(TS));

    assert_eq!(status, 400);
    assert_eq!(envelope["responseCode"], "4000000");
    assert!(envelope["partnerReferenceNo"].is_null());
}

#[actix_web::test]
async fn test_signed_non_object_body_is_bad_request() {
    let (service, _bus) = setup();

    let body = r#"["not","an","object"]"#;
    let (status, envelope) = post_callback!(service, "emoney", body, Some(sign(body)), Some(TS));

    assert_eq!(status, 400);
    assert_eq!(envelope["responseCode"], "4000000");
}

#[actix_web::test]
async fn test_status_codes_are_classified() {
    let (service, bus) = setup();
    let mut events = bus.subscribe();

    let cases = [
        ("00", TransactionStatus::Success),
        ("01", TransactionStatus::Pending),
        ("05", TransactionStatus::Failed),
    ];

    for (code, expected) in cases {
        let body = format!(
            r#"{{"originalPartnerReferenceNo":"QRIS-{code}","latestTransactionStatus":"{code}","amount":{{"value":"25000.00","currency":"IDR"}}}}"#
        );
        let (status, envelope) = post_callback!(service, "qris", body, Some(sign(&body)), Some(TS));
        assert_eq!(status, 200);
        assert_eq!(envelope["partnerReferenceNo"], format!("QRIS-{}", code));

        let event = next_typed_event(&mut events);
        assert_eq!(event.name(), "qris_payment_received");
        assert_eq!(event.record().unwrap().status(), expected);
    }
}

#[actix_web::test]
async fn test_every_callback_type_has_a_route() {
    let (service, bus) = setup();
    let mut events = bus.subscribe();

    let cases = [
        (
            "virtual-account",
            json!({"partnerReferenceNo": "VA-9", "latestTransactionStatus": "00"}),
            "VA-9",
            "virtual_account_paid",
        ),
        (
            "qris",
            json!({"originalPartnerReferenceNo": "QRIS-9", "latestTransactionStatus": "00"}),
            "QRIS-9",
            "qris_payment_received",
        ),
        (
            "emoney",
            json!({"originalPartnerReferenceNo": "EMY-9", "latestTransactionStatus": "00"}),
            "EMY-9",
            "emoney_payment_received",
        ),
        (
            "transfer",
            json!({"partnerReferenceNo": "TRF-9", "latestTransactionStatus": "00"}),
            "TRF-9",
            "transfer_completed",
        ),
        (
            "retail",
            json!({"transactionData": {"partnerReferenceNo": "RTL-9", "paymentFlagStatus": "00"}}),
            "RTL-9",
            "retail_payment_received",
        ),
        (
            "topup",
            json!({"transactionData": {"partnerReferenceNo": "TOP-9", "paymentFlagStatus": "01"}}),
            "TOP-9",
            "topup_completed",
        ),
    ];

    for (segment, payload, reference, event_name) in cases {
        let body = payload.to_string();
        let (status, envelope) = post_callback!(service, segment, body, Some(sign(&body)), Some(TS));

        assert_eq!(status, 200, "route {}", segment);
        assert_eq!(envelope["responseCode"], "2000000");
        assert_eq!(envelope["partnerReferenceNo"], reference);

        let event = next_typed_event(&mut events);
        assert_eq!(event.name(), event_name);
        assert_eq!(event.record().unwrap().partner_reference_no(), reference);
    }
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let (service, _bus) = setup();
    let body = "{}";

    let (status, envelope) = post_callback!(service, "crypto", body, Some(sign(body)), Some(TS));
    assert_eq!(status, 404);
    assert_eq!(envelope["responseCode"], "4040000");
}

#[actix_web::test]
async fn test_envelope_deserializes() {
    let (service, _bus) = setup();
    let body = r#"{"transactionData":{"partnerReferenceNo":"RTL-1","paymentFlagStatus":"00"}}"#;

    let (_, envelope) = post_callback!(service, "retail", body, Some(sign(body)), Some(TS));
    let envelope: CallbackResponse = serde_json::from_value(envelope).unwrap();
    assert_eq!(envelope, CallbackResponse::success("RTL-1"));
}
