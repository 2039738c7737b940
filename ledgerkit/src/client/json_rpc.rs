use super::{ClockControl, ContractCallClient, LedgerStateClient};
use anyhow::anyhow;
use async_trait::async_trait;
use ledgerkit_common::{
    abi,
    amount::{parse_amount, u256_quantity_hex, Amount},
    crypto::Address,
    error::LedgerError,
    slot::StorageSlot,
    token::TokenDescriptor,
};
use log::{debug, warn};
use primitive_types::U256;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use url::Url;

/// Which administrative namespace the node exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RpcDialect {
    /// `hardhat_setBalance` / `hardhat_setStorageAt`
    #[default]
    Hardhat,
    /// `anvil_setBalance` / `anvil_setStorageAt`
    Anvil,
}

impl RpcDialect {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Hardhat => "hardhat",
            Self::Anvil => "anvil",
        }
    }

    pub fn set_balance_method(&self) -> String {
        format!("{}_setBalance", self.prefix())
    }

    pub fn set_storage_at_method(&self) -> String {
        format!("{}_setStorageAt", self.prefix())
    }
}

/// Timeouts and dialect for the JSON-RPC transport
#[derive(Debug, Clone)]
pub struct JsonRpcClientConfig {
    pub request_timeout: Duration,
    pub connection_timeout: Duration,
    pub dialect: RpcDialect,
}

impl Default for JsonRpcClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            dialect: RpcDialect::default(),
        }
    }
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    // `null` is a legitimate result (pending receipts), so keep it as a Value
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Client for a simulated ledger's HTTP JSON-RPC endpoint.
///
/// Every call is a single request; failures are never retried since the
/// administrative writes are not known to be idempotent.
pub struct JsonRpcClient {
    client: Client,
    endpoint: Url,
    config: JsonRpcClientConfig,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a new client with default configuration
    pub fn new(endpoint: &str) -> Result<Self, LedgerError> {
        Self::with_config(endpoint, JsonRpcClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(endpoint: &str, config: JsonRpcClientConfig) -> Result<Self, LedgerError> {
        let endpoint = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            Url::parse(endpoint)
        } else {
            Url::parse(&format!("http://{}", endpoint))
        }
        .map_err(|e| LedgerError::InvalidConfig(format!("invalid RPC url '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connection_timeout)
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn dialect(&self) -> RpcDialect {
        self.config.dialect
    }

    /// Send one JSON-RPC request and return its `result`
    pub async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        if log::log_enabled!(log::Level::Debug) {
            debug!("JSON-RPC {} -> {}: {}", request.id, method, request.params);
        }

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow!("{} timed out after {:?}", method, self.config.request_timeout)
                } else if e.is_connect() {
                    anyhow!("Connection to {} failed: {}", self.endpoint, e)
                } else {
                    anyhow!("Network error during {}: {}", method, e)
                }
            })?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error {}: {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown error")
            )
            .into());
        }

        let rpc_response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse JSON response to {}: {}", method, e))?;

        if let Some(error) = rpc_response.error {
            return Err(match error.data {
                Some(data) => anyhow!(
                    "RPC error {} in {}: {} ({})",
                    error.code,
                    method,
                    error.message,
                    data
                ),
                None => anyhow!("RPC error {} in {}: {}", error.code, method, error.message),
            }
            .into());
        }

        Ok(rpc_response.result)
    }

    /// `eth_call` against the latest block, returning the raw return data
    async fn call(&self, from: Option<&Address>, to: &Address, data: &[u8]) -> Result<Vec<u8>, LedgerError> {
        let mut call = json!({
            "to": to.to_hex(),
            "data": format!("0x{}", hex::encode(data)),
        });
        if let Some(from) = from {
            call["from"] = json!(from.to_hex());
        }

        let result = self.request("eth_call", json!([call, "latest"])).await?;
        Ok(decode_hex_result("eth_call", &result)?)
    }
}

fn decode_hex_result(method: &str, result: &Value) -> anyhow::Result<Vec<u8>> {
    let text = result
        .as_str()
        .ok_or_else(|| anyhow!("Expected hex string from {}, got {}", method, result))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| anyhow!("Malformed hex from {}: {}", method, e))
}

#[async_trait]
impl LedgerStateClient for JsonRpcClient {
    async fn set_native_balance(&self, account: &Address, amount: &U256) -> Result<(), LedgerError> {
        let method = self.config.dialect.set_balance_method();
        self.request(&method, json!([account.to_hex(), u256_quantity_hex(amount)]))
            .await?;
        Ok(())
    }

    async fn set_storage_at(
        &self,
        contract: &Address,
        slot: &StorageSlot,
        value: &[u8; 32],
    ) -> Result<(), LedgerError> {
        let method = self.config.dialect.set_storage_at_method();
        let params = json!([
            contract.to_hex(),
            slot.to_quantity_hex(),
            format!("0x{}", hex::encode(value)),
        ]);
        self.request(&method, params).await?;
        Ok(())
    }
}

#[async_trait]
impl ContractCallClient for JsonRpcClient {
    async fn read_balance(
        &self,
        token: &TokenDescriptor,
        account: &Address,
    ) -> Result<Amount, LedgerError> {
        if token.is_native() {
            let result = self
                .request("eth_getBalance", json!([account.to_hex(), "latest"]))
                .await?;
            let text = result
                .as_str()
                .ok_or_else(|| anyhow!("Expected balance quantity, got {}", result))?;
            return parse_amount(text)
                .map_err(|e| anyhow!("Malformed balance from eth_getBalance: {}", e).into());
        }

        let data = abi::encode_balance_of(account);
        let output = self.call(None, &token.address(), &data).await?;
        Ok(abi::decode_uint256(&output)?)
    }

    async fn grant_max_allowance(
        &self,
        token: &TokenDescriptor,
        holder: &Address,
        spender: &Address,
    ) -> Result<(), LedgerError> {
        if token.is_native() {
            debug!("{} has no allowances, nothing to approve", token.symbol());
            return Ok(());
        }

        let contract = token.address();
        let data = abi::encode_approve(spender, &U256::MAX);

        // Tokens that return nothing from approve are accepted as-is
        let output = self.call(Some(holder), &contract, &data).await?;
        if !output.is_empty() && !abi::decode_bool(&output)? {
            return Err(anyhow!("{}.approve returned false for holder {}", token.symbol(), holder).into());
        }

        let transaction = json!({
            "from": holder.to_hex(),
            "to": contract.to_hex(),
            "data": format!("0x{}", hex::encode(&data)),
        });
        let tx_hash = self
            .request("eth_sendTransaction", json!([transaction]))
            .await?;

        let receipt = self
            .request("eth_getTransactionReceipt", json!([tx_hash.clone()]))
            .await?;
        match receipt.get("status").and_then(Value::as_str) {
            Some("0x0") => {
                warn!("Approval {} from {} reverted", tx_hash, holder);
                Err(anyhow!("{}.approve reverted in transaction {}", token.symbol(), tx_hash).into())
            }
            Some(_) => Ok(()),
            None => {
                debug!("Approval {} not mined yet", tx_hash);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ClockControl for JsonRpcClient {
    async fn increase_time(&self, seconds: u64) -> Result<(), LedgerError> {
        self.request("evm_increaseTime", json!([seconds])).await?;
        self.request("evm_mine", json!([])).await?;
        Ok(())
    }

    async fn set_next_block_timestamp(&self, timestamp: u64) -> Result<u64, LedgerError> {
        self.request("evm_setNextBlockTimestamp", json!([timestamp]))
            .await?;
        Ok(timestamp)
    }
}
