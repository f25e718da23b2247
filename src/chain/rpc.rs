use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ChainError;

#[derive(Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: Vec<Value>,
}

#[derive(Deserialize, Debug)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Deserialize, Debug)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// One JSON-RPC call against a given endpoint. The connection manager is
/// generic over this so tests can substitute a scripted transport.
pub trait RpcTransport {
    async fn call(
        &self,
        endpoint: &str,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<Value, ChainError>;
}

/// Production transport: JSON-RPC POSTs over HTTP.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        endpoint: &str,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<Value, ChainError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        let rpc_response: RpcResponse<Value> = response
            .json()
            .await
            .map_err(|e| ChainError::BadResponse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(ChainError::Rpc(format!(
                "{} ({})",
                error.message, error.code
            )));
        }

        rpc_response
            .result
            .ok_or_else(|| ChainError::BadResponse(format!("{method} returned no result")))
    }
}
