//! Spin seeds from finalized block hashes.
//!
//! [`block_randomness`] never fails: any connection or RPC problem degrades
//! to locally generated entropy so the roulette keeps working with no
//! network at all.

use serde_json::json;

use super::connection::ConnectionManager;
use super::rpc::RpcTransport;
use super::{with_timeout, ChainError};
use crate::time::now_ms;
use crate::FALLBACK_SEED_RANGE;

const CONNECT_BUDGET_MS: u32 = 6_000;
const RECONNECT_BUDGET_MS: u32 = 5_000;
const HEALTH_TIMEOUT_MS: u32 = 3_000;
const CHAIN_CALL_TIMEOUT_MS: u32 = 4_000;

pub async fn block_randomness<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
) -> u64 {
    match finalized_block_seed(manager).await {
        Ok(seed) => {
            tracing::info!("block randomness: {}", seed);
            seed
        }
        Err(e) => {
            tracing::warn!("block randomness unavailable ({}), using local fallback", e);
            local_fallback_seed()
        }
    }
}

async fn finalized_block_seed<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
) -> Result<u64, ChainError> {
    let mut conn = with_timeout(manager.connect(false), CONNECT_BUDGET_MS, "connect").await??;

    // The cached handle was probed by connect; this guards the window in
    // between. One forced reconnect, then give up to the fallback.
    let health = manager
        .call(&conn, "system_chain", vec![], HEALTH_TIMEOUT_MS, "health check")
        .await;
    if health.is_err() {
        tracing::warn!("connection lost, attempting reconnect");
        conn = with_timeout(manager.connect(true), RECONNECT_BUDGET_MS, "reconnect").await??;
    }

    let head = manager
        .call(
            &conn,
            "chain_getFinalizedHead",
            vec![],
            CHAIN_CALL_TIMEOUT_MS,
            "finalized head",
        )
        .await?;
    let head = head
        .as_str()
        .ok_or_else(|| ChainError::BadResponse("finalized head is not a string".into()))?
        .to_string();

    let block = manager
        .call(
            &conn,
            "chain_getBlock",
            vec![json!(head)],
            CHAIN_CALL_TIMEOUT_MS,
            "get block",
        )
        .await?;
    let parent = block["block"]["header"]["parentHash"]
        .as_str()
        .ok_or_else(|| ChainError::BadResponse("block has no parent hash".into()))?;

    // Parent hash of the finalized head: stable, and already final.
    seed_from_hash(parent)
}

/// Low 64 bits of a block hash (the trailing 16 hex characters).
pub fn seed_from_hash(hash: &str) -> Result<u64, ChainError> {
    let digits = hash.trim_start_matches("0x");
    if digits.len() < 16 {
        return Err(ChainError::BadResponse(format!("block hash too short: {hash}")));
    }
    let tail = &digits[digits.len() - 16..];
    u64::from_str_radix(tail, 16)
        .map_err(|e| ChainError::BadResponse(format!("bad block hash {hash}: {e}")))
}

/// Wall clock + uniform draw + OS entropy, reduced into the fallback range.
pub fn local_fallback_seed() -> u64 {
    let timestamp = now_ms() % 1_000_000;
    let uniform = (rand::random::<f64>() * 1_000_000.0) as u64;
    let crypto = rand::random::<u32>() as u64 % 1_000_000;
    (timestamp + uniform + crypto) % FALLBACK_SEED_RANGE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::connection::tests::FakeTransport;
    use crate::chain::rpc::RpcTransport;
    use serde_json::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn seed_uses_trailing_sixteen_hex_chars() {
        let hash = "0x8f1b1fb8d0f4e03c05a543e2a0bd50cd00000000000003e8";
        assert_eq!(seed_from_hash(hash).unwrap(), 1000);
    }

    #[test]
    fn seed_rejects_short_hashes() {
        assert!(seed_from_hash("0xabcd").is_err());
    }

    #[test]
    fn fallback_seed_stays_in_range() {
        for _ in 0..1_000 {
            assert!(local_fallback_seed() < crate::FALLBACK_SEED_RANGE);
        }
    }

    #[tokio::test]
    async fn all_endpoints_down_still_yields_a_seed() {
        let transport = FakeTransport::default();
        transport.mark_down("http://one");
        transport.mark_down("http://two");
        let manager = ConnectionManager::new(
            transport,
            vec!["http://one".to_string(), "http://two".to_string()],
        );

        let seed = block_randomness(&manager).await;
        assert!(seed < crate::FALLBACK_SEED_RANGE);
    }

    /// Transport that answers the full randomness call sequence.
    #[derive(Clone, Default)]
    struct ChainedTransport {
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl RpcTransport for ChainedTransport {
        async fn call(
            &self,
            _endpoint: &str,
            method: &'static str,
            _params: Vec<Value>,
        ) -> Result<Value, ChainError> {
            self.calls.borrow_mut().push(method);
            match method {
                "chain_getBlockHash" => Ok(serde_json::json!(
                    "0x77afd6190f1554ad45fd0d31aee62aacc33c6db0ea801129acb813f913e0764f"
                )),
                "system_chain" => Ok(serde_json::json!("Paseo Testnet")),
                "chain_getFinalizedHead" => Ok(serde_json::json!(
                    "0x4d9b2c7f2a01e8a19c1d6a3f9b0c5e2d7f8a9b0c1d2e3f405162738495a6b7c8"
                )),
                "chain_getBlock" => Ok(serde_json::json!({
                    "block": {
                        "header": {
                            "parentHash":
                                "0x9c2d7f2a01e8a19c1d6a3f9b0c5e2d7f8a9b0c1d2e3f4051000000000000002a",
                            "number": "0x12345"
                        },
                        "extrinsics": []
                    }
                })),
                other => Err(ChainError::BadResponse(format!("unscripted {other}"))),
            }
        }
    }

    #[tokio::test]
    async fn derives_seed_from_parent_hash_of_finalized_head() {
        let manager =
            ConnectionManager::new(ChainedTransport::default(), vec!["http://one".to_string()]);
        let seed = block_randomness(&manager).await;
        assert_eq!(seed, 0x2a);
    }
}
