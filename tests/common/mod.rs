//! Shared utilities for relay integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{hex, Address, Bytes as AlloyBytes};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

use cosign_relay::account::{HashAlgorithm, SignatureAlgorithm};
use cosign_relay::config::{AccountConfig, CosignConfig, KeyConfig, KeyMaterialConfig};
use cosign_relay::transaction::{RlpCodec, Transaction, TransactionCodec, TransactionPayload};
use cosign_relay::Accounts;

/// Anvil's first two well-known test keys.
pub const ALICE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const BOB_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

/// How the mock relay answers.
#[derive(Debug, Clone)]
pub struct RelayBehavior {
    pub get_status: u16,
    pub get_body: Vec<u8>,
    pub get_delay: Option<Duration>,
    pub post_status: u16,
    /// Raw request path → Location header.
    pub redirects: HashMap<String, String>,
}

impl RelayBehavior {
    pub fn serving(body: impl Into<Vec<u8>>) -> Self {
        Self {
            get_status: 200,
            get_body: body.into(),
            get_delay: None,
            post_status: 200,
            redirects: HashMap::new(),
        }
    }
}

/// A request as seen by the mock relay.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

pub struct RelayState {
    behavior: RelayBehavior,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockRelay {
    pub base: String,
    state: Arc<RelayState>,
}

impl MockRelay {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::POST)
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<RelayState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    });

    let behavior = &state.behavior;
    if method == Method::POST {
        return StatusCode::from_u16(behavior.post_status)
            .unwrap()
            .into_response();
    }

    if let Some(location) = behavior.redirects.get(&path) {
        return (StatusCode::FOUND, [(header::LOCATION, location.clone())]).into_response();
    }

    if let Some(delay) = behavior.get_delay {
        tokio::time::sleep(delay).await;
    }

    (
        StatusCode::from_u16(behavior.get_status).unwrap(),
        behavior.get_body.clone(),
    )
        .into_response()
}

/// Start a mock relay on an ephemeral port.
pub async fn start_mock_relay(behavior: RelayBehavior) -> MockRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = Arc::new(RelayState {
        behavior,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new().fallback(handle).with_state(state.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockRelay {
        base: format!("http://{}", addr),
        state,
    }
}

/// A URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/tx", addr)
}

pub fn alice_address() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn bob_address() -> Address {
    Address::repeat_byte(0xb0)
}

fn hex_account(name: &str, address: Address, key: &str, index: u32) -> AccountConfig {
    AccountConfig {
        name: name.into(),
        address,
        key: KeyConfig {
            index,
            signature_algorithm: SignatureAlgorithm::EcdsaSecp256k1,
            hash_algorithm: HashAlgorithm::Sha2_256,
            material: KeyMaterialConfig::Hex {
                private_key: key.into(),
            },
        },
    }
}

pub fn test_accounts() -> Accounts {
    let config = CosignConfig {
        accounts: vec![
            hex_account("alice", alice_address(), ALICE_KEY, 0),
            hex_account("bob", bob_address(), BOB_KEY, 0),
        ],
        ..CosignConfig::default()
    };
    Accounts::from_config(&config).unwrap()
}

/// Unsigned transaction paid by alice.
pub fn unsigned_transaction() -> Transaction {
    Transaction::new(TransactionPayload {
        script: AlloyBytes::from_static(b"transaction { prepare(a: AuthAccount, b: AuthAccount) {} }"),
        arguments: vec![AlloyBytes::from_static(b"{\"type\":\"UFix64\",\"value\":\"1.0\"}")],
        reference_block_id: AlloyBytes::from(vec![0x42; 32]),
        gas_limit: 9999,
        payer: alice_address(),
    })
}

/// Unsigned transaction as the hex text a relay serves.
pub fn unsigned_envelope_hex() -> String {
    hex::encode(RlpCodec.encode(&unsigned_transaction()))
}
