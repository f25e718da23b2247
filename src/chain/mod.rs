//! Chain client: a connection-resilient JSON-RPC adapter over a prioritized
//! list of Paseo endpoints, block-hash randomness with a local fallback, and
//! signed `system.remark` submission.

pub mod connection;
pub mod extrinsic;
pub mod randomness;
pub mod rpc;
pub mod submit;

use std::future::Future;

use futures::future::{select, Either};
use thiserror::Error;

use crate::time::sleep_ms;

#[derive(Debug, Clone, Error)]
pub enum ChainError {
    #[error("failed to connect to any RPC endpoint. Last error: {last}")]
    AllEndpointsFailed { last: String },
    #[error("{what} timeout after {ms}ms")]
    Timeout { what: String, ms: u32 },
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("unexpected response: {0}")]
    BadResponse(String),
}

/// Race a future against a deadline. Every chain operation is bounded; a
/// timeout is a hard failure, never a retry-forever.
pub async fn with_timeout<T>(
    fut: impl Future<Output = T>,
    ms: u32,
    what: &str,
) -> Result<T, ChainError> {
    futures::pin_mut!(fut);
    match select(fut, Box::pin(sleep_ms(ms))).await {
        Either::Left((value, _)) => Ok(value),
        Either::Right(_) => Err(ChainError::Timeout {
            what: what.to_string(),
            ms,
        }),
    }
}
