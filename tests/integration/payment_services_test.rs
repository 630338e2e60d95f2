#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::*;
use pakailink::modules::payments::models::{
    CreateEmoneyPayment, CreateRetailPayment, CreateVirtualAccount, GenerateQris, TopupPayment,
    TransferToBank,
};
use pakailink::modules::payments::PaymentServices;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, TestStack, PaymentServices) {
    let server = MockServer::start().await;
    mount_token(&server, "tok-1").await;
    let stack = TestStack::new(&server);
    let services = PaymentServices::new(stack.client.clone(), &stack.config);
    (server, stack, services)
}

async fn respond(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

/// JSON body of the single request sent to `endpoint`
async fn sent_body(server: &MockServer, endpoint: &str) -> Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests
        .iter()
        .find(|r| r.url.path() == endpoint)
        .expect("request sent");
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn test_create_virtual_account_flattens_va_data() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/transfer-va/create-va",
        json!({
            "responseCode": "2002700",
            "responseMessage": "Successful",
            "virtualAccountData": {
                "partnerReferenceNo": "VA-20250115143000-ABCD1234",
                "virtualAccountNo": "8808001234567890",
                "virtualAccountName": "Budi"
            }
        }),
    )
    .await;

    let request = CreateVirtualAccount {
        amount: dec!(150000),
        customer_name: "Budi".to_string(),
        bank_code: "014".to_string(),
        partner_reference_no: Some("VA-20250115143000-ABCD1234".to_string()),
        ..Default::default()
    };
    let response = services.virtual_account.create(&request).await.unwrap();

    assert_eq!(response["responseCode"], "2002700");
    assert_eq!(response["virtualAccountNo"], "8808001234567890");
    assert_eq!(response["virtualAccountData"]["virtualAccountName"], "Budi");

    let sent = sent_body(&server, "/snap/v1.0/transfer-va/create-va").await;
    assert_eq!(sent["partnerReferenceNo"], "VA-20250115143000-ABCD1234");
    assert_eq!(sent["totalAmount"], json!({"value": "150000.00", "currency": "IDR"}));
    assert_eq!(
        sent["additionalInfo"]["callbackUrl"],
        format!("{}/virtual-account", CALLBACK_BASE_URL)
    );
}

#[tokio::test]
async fn test_inquiry_status_sends_original_reference() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/transfer-va/create-va-status",
        json!({"responseCode": "2002600", "latestTransactionStatus": "00"}),
    )
    .await;

    let response = services
        .virtual_account
        .inquiry_status("VA-20250115143000-ABCD1234")
        .await
        .unwrap();
    assert_eq!(response["latestTransactionStatus"], "00");

    let sent = sent_body(&server, "/snap/v1.0/transfer-va/create-va-status").await;
    assert_eq!(
        sent,
        json!({"originalPartnerReferenceNo": "VA-20250115143000-ABCD1234"})
    );
}

#[tokio::test]
async fn test_generate_qris() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/qr/qr-mpm-generate",
        json!({"responseCode": "2004700", "qrContent": "00020101021226..."}),
    )
    .await;

    let request = GenerateQris {
        merchant_id: "M-001".to_string(),
        amount: dec!(25000.5),
        ..Default::default()
    };
    let response = services.qris.generate(&request).await.unwrap();
    assert_eq!(response["qrContent"], "00020101021226...");

    let sent = sent_body(&server, "/snap/v1.0/qr/qr-mpm-generate").await;
    assert_eq!(sent["merchantId"], "M-001");
    assert_eq!(sent["amount"]["value"], "25000.50");
    assert!(sent["partnerReferenceNo"]
        .as_str()
        .unwrap()
        .starts_with("QRIS-"));
}

#[tokio::test]
async fn test_create_emoney_payment() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/payment/emoney",
        json!({"responseCode": "2005400", "webRedirectUrl": "https://pay.example/redirect"}),
    )
    .await;

    let request = CreateEmoneyPayment {
        amount: dec!(50000),
        customer_id: "C-1".to_string(),
        customer_name: "Siti".to_string(),
        customer_phone: "081234567890".to_string(),
        product_code: "OVO".to_string(),
        emoney_phone: "081234567890".to_string(),
        ..Default::default()
    };
    let response = services.emoney.create_payment(&request).await.unwrap();
    assert_eq!(response["webRedirectUrl"], "https://pay.example/redirect");

    let sent = sent_body(&server, "/snap/v1.0/payment/emoney").await;
    assert_eq!(
        sent["additionalInfo"]["callbackUrl"],
        format!("{}/emoney", CALLBACK_BASE_URL)
    );
}

#[tokio::test]
async fn test_create_retail_payment() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/payment/modern-retail",
        json!({"responseCode": "2005400", "paymentData": {"paymentCode": "PK123456"}}),
    )
    .await;

    let request = CreateRetailPayment {
        amount: dec!(75000),
        customer_id: "C-2".to_string(),
        customer_name: "Andi".to_string(),
        product_code: "ALFAMART".to_string(),
        ..Default::default()
    };
    let response = services.retail.create_payment(&request).await.unwrap();
    assert_eq!(response["paymentData"]["paymentCode"], "PK123456");
}

#[tokio::test]
async fn test_transfer_inquiry_then_transfer() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/emoney/bank-account-inquiry",
        json!({"responseCode": "2004200", "beneficiaryAccountName": "RINA", "sessionId": "INQ0000042"}),
    )
    .await;
    respond(
        &server,
        "/snap/v1.0/emoney/transfer-bank",
        json!({"responseCode": "2004300", "referenceNo": "REF-77"}),
    )
    .await;

    let mut request = TransferToBank {
        beneficiary_bank_code: "014".to_string(),
        beneficiary_account_number: "1234567890".to_string(),
        amount: dec!(100000),
        partner_reference_no: Some("TRF-1".to_string()),
        ..Default::default()
    };

    let inquiry = services.transfer.inquiry_account(&request).await.unwrap();
    assert_eq!(inquiry["beneficiaryAccountName"], "RINA");

    request.session_id = inquiry["sessionId"].as_str().map(str::to_string);
    let response = services.transfer.transfer_to_bank(&request).await.unwrap();
    assert_eq!(response["referenceNo"], "REF-77");

    let sent = sent_body(&server, "/snap/v1.0/emoney/transfer-bank").await;
    assert_eq!(sent["sessionId"], "INQ0000042");
    assert_eq!(sent["beneficiaryBankCode"], "014");
    assert_eq!(
        sent["additionalInfo"]["callbackUrl"],
        format!("{}/transfer", CALLBACK_BASE_URL)
    );
}

#[tokio::test]
async fn test_topup_inquiry_then_topup() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/emoney/account-inquiry",
        json!({"responseCode": "2003700", "customerName": "DEWI", "sessionId": "S-1"}),
    )
    .await;
    respond(
        &server,
        "/snap/v1.0/emoney/topup",
        json!({"responseCode": "2003800", "referenceNo": "TOPREF"}),
    )
    .await;

    let inquiry = services
        .topup
        .inquiry_customer("081234567890", "DANA", dec!(20000), Some("TOP-1"))
        .await
        .unwrap();
    assert_eq!(inquiry["customerName"], "DEWI");

    let sent = sent_body(&server, "/snap/v1.0/emoney/account-inquiry").await;
    assert_eq!(sent["partnerReferenceNo"], "TOP-1");
    assert_eq!(sent["additionalInfo"]["productCode"], "DANA");
    assert_eq!(sent["amount"]["value"], "20000.00");

    let request = TopupPayment {
        amount: dec!(20000),
        customer_number: "081234567890".to_string(),
        product_code: "DANA".to_string(),
        session_id: "S-1".to_string(),
        ..Default::default()
    };
    let response = services.topup.create_topup(&request).await.unwrap();
    assert_eq!(response["referenceNo"], "TOPREF");
}

#[tokio::test]
async fn test_balance_inquiry_uses_configured_account() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/balance-inquiry",
        json!({"responseCode": "2001100", "accountInfos": []}),
    )
    .await;

    services.balance.inquiry(&["CASH"], None).await.unwrap();

    let sent = sent_body(&server, "/snap/v1.0/balance-inquiry").await;
    assert_eq!(sent["accountNo"], "1234567890");
    assert_eq!(sent["balanceTypes"], json!(["CASH"]));
    assert_eq!(sent["partnerReferenceNo"].as_str().unwrap().len(), 40);
}

#[tokio::test]
async fn test_balance_history_pages_as_strings() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/balance-history",
        json!({"responseCode": "2001200", "detailData": [{"amount": {"value": "1.00"}}]}),
    )
    .await;

    let response = services
        .balance
        .history("2025-01-01T00:00:00+07:00", "2025-01-31T23:59:59+07:00", 20, 2)
        .await
        .unwrap();
    assert_eq!(response["detailData"].as_array().unwrap().len(), 1);

    let sent = sent_body(&server, "/snap/v1.0/balance-history").await;
    assert_eq!(sent["pageSize"], "20");
    assert_eq!(sent["pageNumber"], "2");
}

#[tokio::test]
async fn test_register_qris_merchant_generates_reference() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/registration/qris",
        json!({"responseCode": "2000000", "detailData": {"merchantName": "Warung Budi"}}),
    )
    .await;

    let merchant = json!({"merchantName": "Warung Budi", "mcc": "5812"});
    let owner = json!({"ownerName": "Budi", "ownerPhone": "081234567890"});
    let response = services
        .merchant
        .register_qris_merchant(&merchant, &owner, None)
        .await
        .unwrap();
    assert_eq!(response["detailData"]["merchantName"], "Warung Budi");

    let sent = sent_body(&server, "/snap/v1.0/registration/qris").await;
    assert_eq!(sent["partnerReferenceNo"].as_str().unwrap().len(), 40);
    assert_eq!(sent["merchantData"], merchant);
    assert_eq!(sent["ownerData"], owner);
}

#[tokio::test]
async fn test_register_dana_merchant_keeps_given_reference() {
    let (server, _stack, services) = setup().await;
    respond(
        &server,
        "/snap/v1.0/registration/dana",
        json!({"responseCode": "2000000"}),
    )
    .await;

    services
        .merchant
        .register_dana_merchant(
            &json!({"merchantName": "Toko Siti"}),
            &json!({"ownerName": "Siti"}),
            Some("REG-DANA-1"),
        )
        .await
        .unwrap();

    let sent = sent_body(&server, "/snap/v1.0/registration/dana").await;
    assert_eq!(sent["partnerReferenceNo"], "REG-DANA-1");
    assert_eq!(sent["merchantData"]["merchantName"], "Toko Siti");
}

#[tokio::test]
async fn test_reference_prefixes() {
    let (_server, _stack, services) = setup().await;

    assert!(services.virtual_account.generate_reference_no().starts_with("VA-"));
    assert!(services.qris.generate_reference_no().starts_with("QRIS-"));
    assert!(services.emoney.generate_reference_no().starts_with("EMY-"));
    assert!(services.retail.generate_reference_no().starts_with("RTL-"));
    assert!(services.transfer.generate_reference_no().starts_with("TRF-"));
    assert!(services.topup.generate_reference_no().starts_with("TOP-"));
}

#[tokio::test]
async fn test_provider_error_surfaces_from_service() {
    let (server, _stack, services) = setup().await;
    Mock::given(method("POST"))
        .and(path("/snap/v1.0/payment/emoney-status"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "responseCode": "4045501",
            "responseMessage": "Transaction Not Found"
        })))
        .mount(&server)
        .await;

    let err = services.emoney.inquiry_status("EMY-X").await.unwrap_err();
    assert_eq!(err.provider_status(), Some(404));
    assert!(err.to_string().contains("4045501"));
}
