// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::Pubkey,
    envelope::{seal_response, Envelope},
    error::GatewayError,
    models::{
        CheckDomainResponse, DomainRecordsResponse, LookupResponse, PurchaseDomainRequest,
        PurchaseDomainResponse, ReverseLookupResponse, UpdateDomainRequest, UpdateDomainResponse,
    },
    state::AppState,
};

pub mod domains;
pub mod health;
pub mod lookup;

pub fn router(state: AppState) -> Router {
    // Every response under /sns is sealed, errors and rejections included.
    let sns_routes = Router::new()
        .route("/check-domain", get(domains::check_domain))
        .route("/purchase-domain", post(domains::purchase_domain))
        .route("/update-domain", post(domains::update_domain))
        .route("/lookup", get(lookup::lookup))
        .route("/domain-records", get(lookup::domain_records))
        .route("/reverse-lookup", get(lookup::reverse_lookup))
        .layer(middleware::from_fn_with_state(
            state.gateway.clone(),
            seal_response,
        ))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/sns", sns_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Treat absent and blank parameters alike.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, GatewayError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GatewayError::InvalidInput(message.to_string()))
}

pub(crate) fn parse_pubkey(raw: &str, field: &str) -> Result<Pubkey, GatewayError> {
    raw.parse()
        .map_err(|_| GatewayError::InvalidInput(format!("Invalid {field}")))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        domains::check_domain,
        domains::purchase_domain,
        domains::update_domain,
        lookup::lookup,
        lookup::domain_records,
        lookup::reverse_lookup
    ),
    components(
        schemas(
            Envelope,
            health::HealthResponse,
            CheckDomainResponse,
            PurchaseDomainRequest,
            PurchaseDomainResponse,
            UpdateDomainRequest,
            UpdateDomainResponse,
            LookupResponse,
            DomainRecordsResponse,
            ReverseLookupResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Domains", description = "Availability, purchase and ownership transfer"),
        (name = "Lookup", description = "Owner and record lookups")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use base64ct::{Base64, Encoding};
    use ed25519_dalek::SigningKey;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::blockchain::token::{associated_token_address, USDC_MINT};
    use crate::blockchain::{RelayerSigner, Transaction, TOKEN_PROGRAM_ID};
    use crate::envelope::EncryptionGateway;
    use crate::sns::derive::ROOT_DOMAIN_ACCOUNT;
    use crate::sns::{KeyDeriver, Record};
    use crate::state::PaymentConfig;
    use crate::test_support::{MockLookup, MockRegistry};

    const BUYER: &str = "HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA";

    fn gateway() -> EncryptionGateway {
        EncryptionGateway::new("test-passphrase", *b"0123456789abcdef")
    }

    fn relayer() -> RelayerSigner {
        RelayerSigner::new(SigningKey::from_bytes(&[7; 32]))
    }

    fn app(registry: MockRegistry, lookup: MockLookup) -> Router {
        let signer = relayer();
        let payment = PaymentConfig {
            mint: USDC_MINT,
            treasury: signer.pubkey(),
            domain_space: 1000,
        };
        router(AppState::from_parts(
            Arc::new(registry),
            Arc::new(lookup),
            signer,
            gateway(),
            KeyDeriver::default(),
            payment,
        ))
    }

    fn register(registry: &MockRegistry, name: &str, owner: Pubkey) {
        let key = KeyDeriver::default().derive(name).unwrap();
        registry.insert_name(key.address, ROOT_DOMAIN_ACCOUNT, owner);
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn sealed_post(uri: &str, body: Value) -> Request<Body> {
        let envelope = gateway().seal(&body).unwrap();
        Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
            .unwrap()
    }

    /// Send a request and open the sealed response.
    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let envelope: Envelope = serde_json::from_slice(&bytes).unwrap();
        (status, gateway().open(&envelope).unwrap())
    }

    fn purchase_body(name: &str, price: f64) -> Value {
        json!({
            "name": name,
            "buyerPubkey": BUYER,
            "domainPriceUSDC": price,
            "serviceFeeUSDC": 0.5,
            "serviceFeeAddress": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
        })
    }

    #[tokio::test]
    async fn check_domain_reports_unregistered_name_available() {
        let (status, body) = call(
            app(MockRegistry::default(), MockLookup::default()),
            get_request("/sns/check-domain?name=abc.sol"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["domain"], "abc.sol");
        assert_eq!(body["available"], true);
        assert_eq!(body["priceUSDC"], 10.0);
    }

    #[tokio::test]
    async fn check_domain_reports_registered_name_taken() {
        let registry = MockRegistry::default();
        register(&registry, "bonfida.sol", Pubkey::new_from_array([4; 32]));

        let (status, body) = call(
            app(registry, MockLookup::default()),
            get_request("/sns/check-domain?name=Bonfida.sol"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["domain"], "bonfida.sol");
        assert_eq!(body["available"], false);
        assert_eq!(body["priceUSDC"], 2.0);
    }

    #[tokio::test]
    async fn check_domain_validates_name() {
        let app = app(MockRegistry::default(), MockLookup::default());

        let (status, body) = call(app.clone(), get_request("/sns/check-domain")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Domain name is required");

        let (status, body) = call(app, get_request("/sns/check-domain?name=abc.com")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Domain must end with .sol");
    }

    #[tokio::test]
    async fn purchase_rejects_price_off_by_two_cents() {
        let (status, body) = call(
            app(MockRegistry::default(), MockLookup::default()),
            sealed_post("/sns/purchase-domain", purchase_body("abc.sol", 10.02)),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid domain price");
    }

    #[tokio::test]
    async fn purchase_rejects_registered_name() {
        let registry = MockRegistry::default();
        register(&registry, "abc.sol", Pubkey::new_from_array([4; 32]));

        let (status, body) = call(
            app(registry, MockLookup::default()),
            sealed_post("/sns/purchase-domain", purchase_body("abc.sol", 10.0)),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Domain is already registered");
    }

    #[tokio::test]
    async fn purchase_returns_relayer_signed_transaction() {
        let (status, body) = call(
            app(MockRegistry::default(), MockLookup::default()),
            sealed_post("/sns/purchase-domain", purchase_body("abc.sol", 10.0)),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["success"], true);

        let bytes = Base64::decode_vec(body["transactionBase64"].as_str().unwrap()).unwrap();
        let base58 = bs58::decode(body["transaction"].as_str().unwrap())
            .into_vec()
            .unwrap();
        assert_eq!(bytes, base58);

        let tx = Transaction::from_bytes(&bytes).unwrap();
        let buyer: Pubkey = BUYER.parse().unwrap();
        assert_eq!(tx.message.account_keys[0], relayer().pubkey());
        assert_eq!(tx.missing_signers(), vec![buyer]);
        tx.verify_present_signatures().unwrap();
    }

    #[tokio::test]
    async fn purchase_transfers_carry_price_and_fee_amounts() {
        let fee_receiver = Pubkey::new_from_array([9; 32]);
        let mut request = purchase_body("abc.sol", 10.0);
        request["serviceFeeUSDC"] = json!(2.01);
        request["serviceFeeAddress"] = json!(fee_receiver.to_string());

        let (status, body) = call(
            app(MockRegistry::default(), MockLookup::default()),
            sealed_post("/sns/purchase-domain", request),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let bytes = Base64::decode_vec(body["transactionBase64"].as_str().unwrap()).unwrap();
        let tx = Transaction::from_bytes(&bytes).unwrap();
        let keys = &tx.message.account_keys;

        let transfers: Vec<_> = tx
            .message
            .instructions
            .iter()
            .filter(|ix| keys[usize::from(ix.program_id_index)] == TOKEN_PROGRAM_ID)
            .collect();
        assert_eq!(transfers.len(), 2);

        let treasury_ata =
            associated_token_address(&relayer().pubkey(), &USDC_MINT.address).unwrap();
        let fee_ata = associated_token_address(&fee_receiver, &USDC_MINT.address).unwrap();
        let expected = [(treasury_ata, 10_000_000u64), (fee_ata, 2_010_000u64)];

        for (ix, (destination, amount)) in transfers.iter().zip(expected) {
            assert_eq!(ix.data[0], 12);
            assert_eq!(ix.data[1..9], amount.to_le_bytes());
            assert_eq!(ix.data[9], 6);
            assert_eq!(keys[usize::from(ix.accounts[2])], destination);
        }
    }

    #[tokio::test]
    async fn update_of_unknown_domain_is_not_found() {
        let (status, body) = call(
            app(MockRegistry::default(), MockLookup::default()),
            sealed_post(
                "/sns/update-domain",
                json!({ "domain": "abc.sol", "newOwner": BUYER }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Domain not found");
    }

    #[tokio::test]
    async fn update_awaits_current_owner_signature() {
        let registry = MockRegistry::default();
        let owner = Pubkey::new_from_array(SigningKey::from_bytes(&[3; 32]).verifying_key().to_bytes());
        register(&registry, "abc.sol", owner);

        let (status, body) = call(
            app(registry, MockLookup::default()),
            sealed_post(
                "/sns/update-domain",
                json!({ "domain": "abc.sol", "newOwner": BUYER }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let bytes = bs58::decode(body["transaction"].as_str().unwrap())
            .into_vec()
            .unwrap();
        let tx = Transaction::from_bytes(&bytes).unwrap();
        assert_eq!(tx.missing_signers(), vec![owner]);
    }

    #[tokio::test]
    async fn undecryptable_body_is_a_client_error() {
        let app = app(MockRegistry::default(), MockLookup::default());

        let garbage = Request::post("/sns/update-domain")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"data":"AAAAAAAAAAAAAAAAAAAAAA=="}"#))
            .unwrap();
        let (status, _) = call(app.clone(), garbage).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let plaintext = Request::post("/sns/purchase-domain")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(purchase_body("abc.sol", 10.0).to_string()))
            .unwrap();
        let (status, _) = call(app, plaintext).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reverse_lookup_without_records_returns_owner_only() {
        let registry = MockRegistry::default();
        let owner = Pubkey::new_from_array([4; 32]);
        register(&registry, "abc.sol", owner);

        let (status, body) = call(
            app(registry, MockLookup::default()),
            get_request("/sns/reverse-lookup?domain=abc.sol"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["connectedWallets"], json!([owner.to_string()]));
        assert_eq!(body["totalConnectedWallets"], 1);
    }

    #[tokio::test]
    async fn domain_records_merge_lookup_results() {
        let registry = MockRegistry::default();
        let owner = Pubkey::new_from_array([4; 32]);
        register(&registry, "abc.sol", owner);
        let lookup = MockLookup::default()
            .with_records(vec![(Record::Twitter, "@abc".to_string())]);

        let (status, body) = call(
            app(registry, lookup),
            get_request("/sns/domain-records?domain=abc.sol"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["owner"], owner.to_string());
        assert_eq!(body["records"], json!({ "twitter": "@abc" }));
        assert_eq!(body["recordCount"], 1);
    }

    #[tokio::test]
    async fn domain_records_of_unknown_domain_is_not_found() {
        let (status, _) = call(
            app(MockRegistry::default(), MockLookup::default()),
            get_request("/sns/domain-records?domain=abc.sol"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lookup_lists_owned_domains() {
        let lookup = MockLookup::default().with_domains(vec!["abc.sol".into(), "xyz.sol".into()]);
        let (status, body) = call(
            app(MockRegistry::default(), lookup),
            get_request(&format!("/sns/lookup?pubkey={BUYER}")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["domains"], json!(["abc.sol", "xyz.sol"]));
        assert_eq!(body["totalDomains"], 2);
    }

    #[tokio::test]
    async fn lookup_surfaces_upstream_status() {
        let (status, body) = call(
            app(MockRegistry::default(), MockLookup::failing_with(503)),
            get_request(&format!("/sns/lookup?pubkey={BUYER}")),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());

        let (status, _) = call(
            app(MockRegistry::default(), MockLookup::default()),
            get_request("/sns/lookup?pubkey=not-a-key"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_is_plaintext() {
        let response = app(MockRegistry::default(), MockLookup::default())
            .oneshot(get_request("/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());
    }
}
