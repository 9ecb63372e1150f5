//! Ethereum JSON-RPC client for the ledger runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use primitive_types::U256;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{Address, TxHash};
use tracing::trace;

use crate::domain::{RpcError, TransactionInfo, TransactionReceipt, TransactionRequest};
use crate::ports::LedgerRpc;

/// HTTP settings for [`JsonRpcLedger`].
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Runtime endpoint.
    pub url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7545".to_string(),
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    block_number: String,
    gas_used: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    contract_address: Option<Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    hash: String,
    from: Address,
    #[serde(default)]
    block_number: Option<String>,
    gas: String,
}

/// Parses a JSON-RPC hex quantity.
fn quantity_u64(value: &str) -> Result<u64, RpcError> {
    let digits = value.trim_start_matches("0x");
    u64::from_str_radix(if digits.is_empty() { "0" } else { digits }, 16)
        .map_err(|e| RpcError::Parse(format!("bad quantity {value:?}: {e}")))
}

fn quantity_u256(value: &str) -> Result<U256, RpcError> {
    let digits = value.trim_start_matches("0x");
    U256::from_str_radix(if digits.is_empty() { "0" } else { digits }, 16)
        .map_err(|e| RpcError::Parse(format!("bad quantity {value:?}: {e}")))
}

fn hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Ledger transport over HTTP JSON-RPC.
pub struct JsonRpcLedger {
    client: Client,
    url: String,
    request_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Create a new JSON-RPC client.
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| RpcError::Http(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url,
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this client talks to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC method. A `null` result is returned as `None`.
    async fn call_optional<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<R>, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id(),
        };
        trace!(method, id = request.id, "JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Connection(format!("cannot connect to {}", self.url))
                } else {
                    RpcError::Http(e.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcError::Parse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(rpc_response.result)
    }

    async fn call_required<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<R, RpcError> {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| RpcError::Parse(format!("missing result for {method}")))
    }
}

#[async_trait]
impl LedgerRpc for JsonRpcLedger {
    async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.call_required("eth_accounts", json!([])).await
    }

    async fn balance(&self, account: Address) -> Result<U256, RpcError> {
        let raw: String = self
            .call_required("eth_getBalance", json!([account, "latest"]))
            .await?;
        quantity_u256(&raw)
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, RpcError> {
        let mut tx = json!({
            "from": request.from,
            "gas": format!("0x{:x}", request.gas),
            "data": hex_data(&request.data),
        });
        if let Some(to) = request.to {
            tx["to"] = json!(to);
        }
        let hash: String = self.call_required("eth_sendTransaction", json!([tx])).await?;
        Ok(TxHash::new(hash))
    }

    async fn receipt(&self, tx: &TxHash) -> Result<Option<TransactionReceipt>, RpcError> {
        let raw: Option<RawReceipt> = self
            .call_optional("eth_getTransactionReceipt", json!([tx.as_str()]))
            .await?;
        raw.map(|r| -> Result<TransactionReceipt, RpcError> {
            Ok(TransactionReceipt {
                transaction_hash: TxHash::new(r.transaction_hash),
                block_number: quantity_u64(&r.block_number)?,
                gas_used: quantity_u64(&r.gas_used)?,
                // Pre-Byzantium receipts carry no status; treat them as success.
                succeeded: match r.status {
                    Some(status) => quantity_u64(&status)? == 1,
                    None => true,
                },
                contract_address: r.contract_address,
            })
        })
        .transpose()
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        let raw: String = self
            .call_required(
                "eth_call",
                json!([{ "to": to, "data": hex_data(&data) }, "latest"]),
            )
            .await?;
        hex::decode(raw.trim_start_matches("0x")).map_err(|e| RpcError::Parse(e.to_string()))
    }

    async fn transaction(&self, tx: &TxHash) -> Result<Option<TransactionInfo>, RpcError> {
        let raw: Option<RawTransaction> = self
            .call_optional("eth_getTransactionByHash", json!([tx.as_str()]))
            .await?;
        raw.map(|t| -> Result<TransactionInfo, RpcError> {
            Ok(TransactionInfo {
                hash: TxHash::new(t.hash),
                from: t.from,
                block_number: t.block_number.as_deref().map(quantity_u64).transpose()?,
                gas: quantity_u64(&t.gas)?,
            })
        })
        .transpose()
    }
}
