//! Submission of the `roulette_spin` remark.
//!
//! Connection establishment is retried (not the submission itself), the
//! whole operation runs under a 90s ceiling, and a separate 30s timer only
//! warns when the wallet has not produced a signature yet. Failures are
//! classified into a small taxonomy the UI can phrase for the user.

use futures::future::{select, Either};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::connection::{Connection, ConnectionManager};
use super::extrinsic::{
    extrinsic_hash, remark_call, signed_extrinsic, signer_payload_json, ss58_decode, to_hex,
    SignContext,
};
use super::rpc::RpcTransport;
use super::{with_timeout, ChainError};
use crate::time::{now_ms, sleep_ms};
use crate::wallet;

const MAX_CONNECT_ATTEMPTS: u32 = 2;
const CONNECT_TIMEOUT_MS: u32 = 6_000;
const HEALTH_TIMEOUT_MS: u32 = 2_000;
const CALL_TIMEOUT_MS: u32 = 4_000;
const OVERALL_TIMEOUT_MS: u32 = 90_000;
const SIGN_PROMPT_WARN_MS: u32 = 30_000;
const FINALITY_POLL_MS: u32 = 3_000;

#[derive(Debug, Clone, Error)]
pub enum TxError {
    #[error("Transaction rejected by user")]
    UserRejected,
    #[error("Lost connection to the blockchain during submission. Check your internet connection")]
    ConnectionLost,
    #[error("Timeout: the transaction was not finalized in time")]
    Timeout,
    #[error("Wallet signer unavailable. Make sure the wallet is unlocked")]
    SignerUnavailable,
    #[error("{0}")]
    Unknown(String),
}

/// Map an underlying failure message onto the taxonomy by substring, the
/// same way the UI distinguishes a user clicking "cancel" from a dead node.
pub fn classify(message: &str) -> TxError {
    let lower = message.to_lowercase();
    if lower.contains("rejected") || lower.contains("cancelled") || lower.contains("canceled") {
        TxError::UserRejected
    } else if lower.contains("not connected")
        || lower.contains("disconnected")
        || lower.contains("connection")
    {
        TxError::ConnectionLost
    } else if lower.contains("timeout") {
        TxError::Timeout
    } else if lower.contains("signer") || lower.contains("injector") || lower.contains("wallet") {
        TxError::SignerUnavailable
    } else {
        TxError::Unknown(message.to_string())
    }
}

#[derive(Serialize)]
struct RemarkPayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "projectId")]
    project_id: &'a str,
    #[serde(rename = "randomSeed")]
    random_seed: u64,
    timestamp: u64,
}

/// Record a spin on-chain. Resolves with the extrinsic hash once the remark
/// lands in a finalized block.
pub async fn record_spin_on_chain<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
    address: &str,
    project_id: &str,
    seed: u64,
) -> Result<String, TxError> {
    with_timeout(
        submit_remark(manager, address, project_id, seed),
        OVERALL_TIMEOUT_MS,
        "transaction",
    )
    .await
    .map_err(|_| TxError::Timeout)?
}

async fn submit_remark<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
    address: &str,
    project_id: &str,
    seed: u64,
) -> Result<String, TxError> {
    let conn = establish_connection(manager).await?;

    let account = ss58_decode(address).map_err(|e| TxError::Unknown(e.to_string()))?;
    let nonce = fetch_nonce(manager, &conn, address).await?;
    let (spec_version, transaction_version) = fetch_runtime_version(manager, &conn).await?;

    let remark = serde_json::to_vec(&RemarkPayload {
        kind: "roulette_spin",
        project_id,
        random_seed: seed,
        timestamp: now_ms(),
    })
    .map_err(|e| TxError::Unknown(e.to_string()))?;
    let call = remark_call(&remark);

    let payload = signer_payload_json(
        &call,
        &SignContext {
            address: address.to_string(),
            nonce,
            spec_version,
            transaction_version,
            genesis_hash: conn.genesis_hash.clone(),
        },
    );

    tracing::info!(
        "requesting signature for spin record (project {}, seed {})",
        project_id,
        seed
    );
    let signature = sign_with_prompt_warning(address, &payload).await?;

    let extrinsic = signed_extrinsic(&account, &signature, nonce, &call);
    let tx_hash = extrinsic_hash(&extrinsic);

    manager
        .call(
            &conn,
            "author_submitExtrinsic",
            vec![json!(to_hex(&extrinsic))],
            CALL_TIMEOUT_MS,
            "submit extrinsic",
        )
        .await
        .map_err(|e| classify(&e.to_string()))?;
    tracing::info!("extrinsic {} submitted, awaiting finalization", tx_hash);

    wait_for_finalization(manager, &conn, &tx_hash).await?;
    tracing::info!("extrinsic {} finalized", tx_hash);
    Ok(tx_hash)
}

/// Retry the connection step (never the submission) before giving up.
async fn establish_connection<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
) -> Result<Connection, TxError> {
    for attempt in 0..MAX_CONNECT_ATTEMPTS {
        // Second attempt forces a fresh endpoint walk.
        let connected =
            with_timeout(manager.connect(attempt > 0), CONNECT_TIMEOUT_MS, "connect").await;
        if let Ok(Ok(conn)) = connected {
            let health = manager
                .call(&conn, "system_chain", vec![], HEALTH_TIMEOUT_MS, "health check")
                .await;
            if health.is_ok() {
                return Ok(conn);
            }
            tracing::warn!(
                "health check failed on attempt {}/{}",
                attempt + 1,
                MAX_CONNECT_ATTEMPTS
            );
        } else {
            tracing::warn!(
                "connection attempt {}/{} failed",
                attempt + 1,
                MAX_CONNECT_ATTEMPTS
            );
        }
        if attempt + 1 < MAX_CONNECT_ATTEMPTS {
            sleep_ms(1_000).await;
        }
    }
    Err(TxError::ConnectionLost)
}

async fn fetch_nonce<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
    conn: &Connection,
    address: &str,
) -> Result<u64, TxError> {
    let nonce = manager
        .call(
            conn,
            "system_accountNextIndex",
            vec![json!(address)],
            CALL_TIMEOUT_MS,
            "account nonce",
        )
        .await
        .map_err(|e| classify(&e.to_string()))?;
    nonce
        .as_u64()
        .ok_or_else(|| TxError::Unknown("nonce is not an integer".into()))
}

async fn fetch_runtime_version<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
    conn: &Connection,
) -> Result<(u32, u32), TxError> {
    let version = manager
        .call(
            conn,
            "state_getRuntimeVersion",
            vec![],
            CALL_TIMEOUT_MS,
            "runtime version",
        )
        .await
        .map_err(|e| classify(&e.to_string()))?;
    let spec = version["specVersion"]
        .as_u64()
        .ok_or_else(|| TxError::Unknown("runtime version has no specVersion".into()))?;
    let tx = version["transactionVersion"]
        .as_u64()
        .ok_or_else(|| TxError::Unknown("runtime version has no transactionVersion".into()))?;
    Ok((spec as u32, tx as u32))
}

/// Ask the extension to sign. The 30s timer only logs a warning; the user
/// may still be looking for the popup.
async fn sign_with_prompt_warning(
    address: &str,
    payload: &Value,
) -> Result<Vec<u8>, TxError> {
    let sign = wallet::sign_payload(address, payload);
    futures::pin_mut!(sign);
    let result = match select(sign, Box::pin(sleep_ms(SIGN_PROMPT_WARN_MS))).await {
        Either::Left((result, _)) => result,
        Either::Right((_, sign)) => {
            tracing::warn!(
                "no signature after {}s - the wallet may not be showing a prompt",
                SIGN_PROMPT_WARN_MS / 1000
            );
            sign.await
        }
    };
    result.map_err(|e| classify(&e.to_string()))
}

/// Poll finalized blocks until one contains our extrinsic. Transient RPC
/// failures are skipped; the overall transaction timeout bounds the loop.
pub(crate) async fn wait_for_finalization<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
    conn: &Connection,
    tx_hash: &str,
) -> Result<(), TxError> {
    let mut next_to_check: Option<u64> = None;
    loop {
        match scan_finalized(manager, conn, tx_hash, next_to_check).await {
            Ok((found, resume_at)) => {
                if found {
                    return Ok(());
                }
                next_to_check = Some(resume_at);
            }
            Err(e) => tracing::warn!("finality poll failed, retrying: {}", e),
        }
        sleep_ms(FINALITY_POLL_MS).await;
    }
}

async fn scan_finalized<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
    conn: &Connection,
    tx_hash: &str,
    next_to_check: Option<u64>,
) -> Result<(bool, u64), ChainError> {
    let head = manager
        .call(
            conn,
            "chain_getFinalizedHead",
            vec![],
            CALL_TIMEOUT_MS,
            "finalized head",
        )
        .await?;
    let head = head
        .as_str()
        .ok_or_else(|| ChainError::BadResponse("finalized head is not a string".into()))?
        .to_string();

    let header = manager
        .call(
            conn,
            "chain_getHeader",
            vec![json!(head)],
            CALL_TIMEOUT_MS,
            "finalized header",
        )
        .await?;
    let number = parse_hex_u64(&header["number"])?;

    // First pass starts at the current head; the remark cannot already be
    // in an older finalized block.
    let start = next_to_check.unwrap_or(number);
    for n in start..=number {
        let block_hash = if n == number {
            head.clone()
        } else {
            let hash = manager
                .call(
                    conn,
                    "chain_getBlockHash",
                    vec![json!(n)],
                    CALL_TIMEOUT_MS,
                    "block hash",
                )
                .await?;
            hash.as_str()
                .ok_or_else(|| ChainError::BadResponse("block hash is not a string".into()))?
                .to_string()
        };

        if block_contains(manager, conn, &block_hash, tx_hash).await? {
            return Ok((true, number + 1));
        }
    }

    Ok((false, number + 1))
}

async fn block_contains<T: RpcTransport + Clone + 'static>(
    manager: &ConnectionManager<T>,
    conn: &Connection,
    block_hash: &str,
    tx_hash: &str,
) -> Result<bool, ChainError> {
    let block = manager
        .call(
            conn,
            "chain_getBlock",
            vec![json!(block_hash)],
            CALL_TIMEOUT_MS,
            "get block",
        )
        .await?;
    let extrinsics = block["block"]["extrinsics"]
        .as_array()
        .ok_or_else(|| ChainError::BadResponse("block has no extrinsics".into()))?;

    for ext in extrinsics {
        let Some(hex_str) = ext.as_str() else { continue };
        let Ok(bytes) = hex::decode(hex_str.trim_start_matches("0x")) else {
            continue;
        };
        if extrinsic_hash(&bytes) == tx_hash {
            return Ok(true);
        }
    }
    Ok(false)
}

fn parse_hex_u64(value: &Value) -> Result<u64, ChainError> {
    let s = value
        .as_str()
        .ok_or_else(|| ChainError::BadResponse("expected hex number".into()))?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::BadResponse(format!("bad hex number {s}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::rpc::RpcTransport;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn classifies_user_rejection() {
        assert!(matches!(classify("Request Rejected by the user"), TxError::UserRejected));
        assert!(matches!(classify("signing was cancelled"), TxError::UserRejected));
    }

    #[test]
    fn classifies_connection_loss() {
        assert!(matches!(classify("transport disconnected"), TxError::ConnectionLost));
        assert!(matches!(classify("connection refused"), TxError::ConnectionLost));
    }

    #[test]
    fn classifies_timeout_and_signer() {
        assert!(matches!(classify("submit timeout after 4000ms"), TxError::Timeout));
        assert!(matches!(classify("no signer for address"), TxError::SignerUnavailable));
    }

    #[test]
    fn unknown_messages_pass_through() {
        match classify("1010: Invalid Transaction") {
            TxError::Unknown(msg) => assert!(msg.contains("1010")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn remark_payload_field_names() {
        let payload = RemarkPayload {
            kind: "roulette_spin",
            project_id: "acala",
            random_seed: 99,
            timestamp: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "roulette_spin");
        assert_eq!(value["projectId"], "acala");
        assert_eq!(value["randomSeed"], 99);
        assert_eq!(value["timestamp"], 1_700_000_000_000u64);
    }

    /// Transport scripting a finalized chain whose head block carries one
    /// extrinsic.
    #[derive(Clone)]
    struct FinalityTransport {
        extrinsic_hex: String,
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl RpcTransport for FinalityTransport {
        async fn call(
            &self,
            _endpoint: &str,
            method: &'static str,
            _params: Vec<Value>,
        ) -> Result<Value, ChainError> {
            self.calls.borrow_mut().push(method);
            match method {
                "chain_getFinalizedHead" => Ok(json!(
                    "0x4d9b2c7f2a01e8a19c1d6a3f9b0c5e2d7f8a9b0c1d2e3f405162738495a6b7c8"
                )),
                "chain_getHeader" => Ok(json!({ "number": "0x64" })),
                "chain_getBlock" => Ok(json!({
                    "block": {
                        "header": { "number": "0x64" },
                        "extrinsics": [self.extrinsic_hex.clone()]
                    }
                })),
                other => Err(ChainError::BadResponse(format!("unscripted {other}"))),
            }
        }
    }

    #[tokio::test]
    async fn finality_watch_finds_extrinsic_in_head_block() {
        let extrinsic = vec![0x84, 1, 2, 3];
        let transport = FinalityTransport {
            extrinsic_hex: to_hex(&extrinsic),
            calls: Rc::new(RefCell::new(Vec::new())),
        };
        let manager =
            ConnectionManager::new(transport.clone(), vec!["http://one".to_string()]);
        let conn = Connection {
            endpoint: "http://one".into(),
            chain_name: "Paseo Testnet".into(),
            genesis_hash: "0x00".into(),
        };

        let result = wait_for_finalization(&manager, &conn, &extrinsic_hash(&extrinsic)).await;
        assert!(result.is_ok());
        // Head block is inspected without walking older history.
        let calls = transport.calls.borrow();
        assert!(calls.contains(&"chain_getBlock"));
        assert!(!calls.contains(&"chain_getBlockHash"));
    }

    #[test]
    fn parses_hex_block_numbers() {
        assert_eq!(parse_hex_u64(&json!("0x64")).unwrap(), 100);
        assert!(parse_hex_u64(&json!(12)).is_err());
    }
}
