use std::{sync::Arc, time::Duration};

use banana_magic::{
    assets::{AssetIndex, GraphQlAssetIndex, NftQuery},
    config::Config,
    core::{address::PublicAddress, balance::Lamports},
    identity::MemoryIdentityProvider,
    ledger::{LedgerClient, RpcLedgerClient},
    session::SessionController,
};
use serde_json::json;


use mock::{ScriptedHttpClient, USDC};

const RPC: &str = "localhost:8899";
const INDEX: &str = "localhost:8080";

fn ledger(http: &Arc<ScriptedHttpClient>) -> RpcLedgerClient {
    RpcLedgerClient::new(http.clone(), format!("http://{RPC}").parse().unwrap())
        .with_confirmation(3, Duration::ZERO)
}

fn index(http: &Arc<ScriptedHttpClient>) -> GraphQlAssetIndex {
    GraphQlAssetIndex::new(http.clone(), format!("http://{INDEX}/v1").parse().unwrap())
}

fn nfts_response() -> serde_json::Value {
    json!({
        "data": {
            "nfts": [
                {
                    "address": "7cZ1rqTHcbFK1FNMe2Bb9wVRTYbdYVHUHeSSeCSj8cZd",
                    "mintAddress": "9ARngHhVaCtH5JFieRdSS5Y8cdZk2TMF4tfGSWFB9iSK",
                    "name": "Banana #12",
                    "description": "A ripe one",
                    "image": "https://arweave.net/banana12.png"
                },
                {
                    "address": "3nyPT1wNRmzb7Uu2RBaJ6pHwv1N3DFPaWcURcNRbwuhP",
                    "mintAddress": "HqJxkX9nM2aR2z6j5EbqcD6YsT1LhJr2tV8eMkfBdEyP",
                    "name": "Banana #13",
                    "image": "https://arweave.net/banana13.png"
                }
            ]
        }
    })
}

#[tokio::test]
async fn get_balance() {
    let http = Arc::new(ScriptedHttpClient::default());
    http.respond(
        RPC,
        json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": 1_500_000_000u64}}),
    );

    let lamports = ledger(&http)
        .get_balance(&PublicAddress::new(USDC))
        .await
        .unwrap();

    assert_eq!(lamports, Lamports(1_500_000_000));
    assert_eq!(
        http.requests_to(RPC),
        vec![json!({"jsonrpc": "2.0", "id": 1, "method": "getBalance", "params": [USDC]})]
    );
}

#[tokio::test]
async fn rpc_errors_are_reported() {
    let http = Arc::new(ScriptedHttpClient::default());
    http.respond(
        RPC,
        json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "Invalid param: WrongSize"}}),
    );

    let err = ledger(&http)
        .get_balance(&PublicAddress::new("abc"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid param: WrongSize"), "{err}");
}

#[tokio::test]
async fn airdrop_is_confirmed_by_polling() {
    let http = Arc::new(ScriptedHttpClient::default());
    let ledger = ledger(&http);
    http.respond(RPC, json!({"jsonrpc": "2.0", "id": 1, "result": "5sig"}));
    http.respond(
        RPC,
        json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": [null]}}),
    );
    http.respond(
        RPC,
        json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 2}, "value": [
            {"slot": 2, "confirmations": 1, "err": null, "confirmationStatus": "confirmed"}
        ]}}),
    );

    let signature = ledger
        .request_airdrop(&PublicAddress::new(USDC), Lamports::ONE_SOL)
        .await
        .unwrap();
    ledger.confirm_transaction(&signature).await.unwrap();

    let requests = http.requests_to(RPC);
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["method"], "requestAirdrop");
    assert_eq!(requests[0]["params"], json!([USDC, 1_000_000_000u64]));
    assert_eq!(requests[1]["method"], "getSignatureStatuses");
    assert_eq!(requests[1]["params"], json!([["5sig"]]));
}

#[tokio::test]
async fn failed_airdrop_is_not_confirmed() {
    let http = Arc::new(ScriptedHttpClient::default());
    http.respond(
        RPC,
        json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 2}, "value": [
            {"slot": 2, "confirmations": null, "err": {"InstructionError": [0, "Custom"]}, "confirmationStatus": "processed"}
        ]}}),
    );

    assert!(ledger(&http).confirm_transaction("5sig").await.is_err());
}

#[tokio::test]
async fn confirmation_gives_up() {
    let http = Arc::new(ScriptedHttpClient::default());
    for _ in 0..3 {
        http.respond(
            RPC,
            json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": [null]}}),
        );
    }

    let err = ledger(&http).confirm_transaction("5sig").await.unwrap_err();

    assert!(err.to_string().contains("after 3 attempts"), "{err}");
    assert_eq!(http.requests_to(RPC).len(), 3);
}

#[tokio::test]
async fn get_nfts() {
    let http = Arc::new(ScriptedHttpClient::default());
    http.respond(INDEX, nfts_response());

    let nfts = index(&http)
        .get_nfts(&NftQuery::owned_by(PublicAddress::new(USDC)))
        .await
        .unwrap();

    assert_eq!(nfts.len(), 2);
    assert_eq!(nfts[0].name, "Banana #12");
    assert_eq!(nfts[1].mint_address, "HqJxkX9nM2aR2z6j5EbqcD6YsT1LhJr2tV8eMkfBdEyP");

    let request = &http.requests_to(INDEX)[0];
    assert_eq!(request["operationName"], "GetNfts");
    assert!(request["query"].as_str().unwrap().contains("mintAddress"));
    assert_eq!(
        request["variables"],
        json!({"owners": [USDC], "limit": 100, "offset": 0})
    );
}

#[tokio::test]
async fn graphql_errors_are_reported() {
    let http = Arc::new(ScriptedHttpClient::default());
    http.respond(
        INDEX,
        json!({"data": null, "errors": [{"message": "invalid owner"}]}),
    );

    let err = index(&http)
        .get_nfts(&NftQuery::owned_by(PublicAddress::new("abc")))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("invalid owner"), "{err}");
}

#[tokio::test]
async fn session_over_http_endpoints() {
    let http = Arc::new(ScriptedHttpClient::default());
    http.respond(
        RPC,
        json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": 250_000_000u64}}),
    );
    http.respond(INDEX, nfts_response());

    let config = Config::from_lookup(|name| match name {
        "RPC_URL" => Some(format!("http://{RPC}")),
        "MAGIC_PUBLISHABLE_KEY" => Some("pk_test_banana".to_owned()),
        "ASSET_INDEX_URL" => Some(format!("http://{INDEX}/v1")),
        _ => None,
    })
    .unwrap();

    let identity = Arc::new(MemoryIdentityProvider::default());
    identity
        .register("banana@example.com", Some(USDC))
        .await;

    let controller = SessionController::builder()
        .with_identity_provider(identity)
        .with_endpoints(&config, http.clone())
        .build()
        .unwrap();

    controller.login("banana@example.com").await.unwrap();

    let dashboard = controller.dashboard().await;
    assert_eq!(dashboard.balance, Some(0.25));
    assert_eq!(dashboard.nfts.len(), 2);
    assert_eq!(http.requests_to(RPC).len(), 1);
    assert_eq!(http.requests_to(INDEX).len(), 1);
}

#[tokio::test]
async fn builder_requires_collaborators() {
    let err = SessionController::builder()
        .with_identity_provider(Arc::new(MemoryIdentityProvider::default()))
        .build()
        .unwrap_err();

    assert!(err.to_string().contains("ledger client is required"));
}
