use std::{fmt::Debug, sync::Arc, time::Duration};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value as Json};
use tracing::debug;
use url::Url;

use crate::core::{
    address::PublicAddress,
    balance::Lamports,
    util::{post_json, AsyncHttpClient},
};

/// Read access to the ledger, plus devnet airdrops.
#[async_trait]
pub trait LedgerClient: Debug {
    /// Balance of `address` in lamports.
    async fn get_balance(&self, address: &PublicAddress) -> Result<Lamports>;

    /// Ask the cluster faucet for `lamports`, returning the transaction signature.
    async fn request_airdrop(
        &self,
        address: &PublicAddress,
        lamports: Lamports,
    ) -> Result<String>;

    /// Resolve once the transaction `signature` is confirmed.
    async fn confirm_transaction(&self, signature: &str) -> Result<()>;
}

/// A [LedgerClient] speaking JSON-RPC 2.0 to a Solana RPC node.
#[derive(Debug, Clone)]
pub struct RpcLedgerClient {
    http_client: Arc<dyn AsyncHttpClient + Send + Sync>,
    rpc_url: Url,
    confirm_attempts: u32,
    confirm_interval: Duration,
}

impl RpcLedgerClient {
    pub fn new(http_client: Arc<dyn AsyncHttpClient + Send + Sync>, rpc_url: Url) -> Self {
        Self {
            http_client,
            rpc_url,
            confirm_attempts: 30,
            confirm_interval: Duration::from_secs(1),
        }
    }

    /// Set how many times, and how often, signature statuses are polled while confirming.
    pub fn with_confirmation(mut self, attempts: u32, interval: Duration) -> Self {
        self.confirm_attempts = attempts;
        self.confirm_interval = interval;
        self
    }

    async fn call<T: DeserializeOwned>(&self, method: &'static str, params: Json) -> Result<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let response: RpcResponse<T> =
            post_json(self.http_client.as_ref(), &self.rpc_url, &request)
                .await
                .with_context(|| format!("{method} request failed"))?;

        match response {
            RpcResponse {
                error: Some(RpcError { code, message }),
                ..
            } => bail!("{method} failed ({code}): {message}"),
            RpcResponse {
                result: Some(result),
                ..
            } => Ok(result),
            _ => bail!("{method} response has neither result nor error"),
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn get_balance(&self, address: &PublicAddress) -> Result<Lamports> {
        let balance: WithContext<u64> = self.call("getBalance", json!([address])).await?;
        Ok(Lamports(balance.value))
    }

    async fn request_airdrop(
        &self,
        address: &PublicAddress,
        lamports: Lamports,
    ) -> Result<String> {
        self.call("requestAirdrop", json!([address, lamports])).await
    }

    async fn confirm_transaction(&self, signature: &str) -> Result<()> {
        for attempt in 0..self.confirm_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.confirm_interval).await;
            }

            let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
                .call("getSignatureStatuses", json!([[signature]]))
                .await?;

            match statuses.value.into_iter().next().flatten() {
                Some(SignatureStatus { err: Some(err), .. }) => {
                    bail!("transaction {signature} failed: {err}")
                }
                Some(SignatureStatus {
                    confirmation_status:
                        Some(ConfirmationStatus::Confirmed | ConfirmationStatus::Finalized),
                    ..
                }) => return Ok(()),
                status => debug!("transaction {signature} not confirmed yet: {status:?}"),
            }
        }

        bail!(
            "transaction {signature} was not confirmed after {} attempts",
            self.confirm_attempts
        )
    }
}

#[derive(Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: Json,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureStatus {
    #[serde(default)]
    err: Option<Json>,
    #[serde(default)]
    confirmation_status: Option<ConfirmationStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
}
