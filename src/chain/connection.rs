//! Connection management over a prioritized endpoint list.
//!
//! The manager presents one logical connection. Callers always go through
//! [`ConnectionManager::connect`]; a cached endpoint is health-probed before
//! reuse, a failed probe triggers failover, and concurrent callers while an
//! attempt is in flight all await the same shared future instead of starting
//! parallel connection storms.

use std::cell::RefCell;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use serde_json::{json, Value};

use super::rpc::RpcTransport;
use super::{with_timeout, ChainError};

/// Budget for the first call against a fresh endpoint.
pub const ENDPOINT_TIMEOUT_MS: u32 = 8_000;
/// Budget for the verification call once the endpoint answered.
pub const VERIFY_TIMEOUT_MS: u32 = 4_000;
/// Budget for the liveness probe of a cached connection.
pub const PROBE_TIMEOUT_MS: u32 = 3_000;

/// Handle to a verified endpoint. The genesis hash is fetched once during
/// connect and reused when building extrinsics.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub endpoint: String,
    pub chain_name: String,
    pub genesis_hash: String,
}

/// Cloneable failure carried through the shared attempt future.
#[derive(Clone, Debug)]
struct ConnectFailure(String);

type SharedAttempt = Shared<LocalBoxFuture<'static, Result<Connection, ConnectFailure>>>;

enum ConnState {
    Disconnected,
    Connecting(SharedAttempt),
    Connected(Connection),
}

pub struct ConnectionManager<T: RpcTransport> {
    transport: T,
    endpoints: Vec<String>,
    state: RefCell<ConnState>,
}

impl<T: RpcTransport + Clone + 'static> ConnectionManager<T> {
    pub fn new(transport: T, endpoints: Vec<String>) -> Self {
        Self {
            transport,
            endpoints,
            state: RefCell::new(ConnState::Disconnected),
        }
    }

    /// Establish (or reuse) a connection.
    ///
    /// With `force_reconnect` the cached endpoint and any in-flight attempt
    /// are abandoned and the endpoint list is walked from the top.
    pub async fn connect(&self, force_reconnect: bool) -> Result<Connection, ChainError> {
        if !force_reconnect {
            let cached = match &*self.state.borrow() {
                ConnState::Connected(conn) => Some(conn.clone()),
                _ => None,
            };
            if let Some(conn) = cached {
                let probe = with_timeout(
                    self.transport.call(&conn.endpoint, "system_chain", vec![]),
                    PROBE_TIMEOUT_MS,
                    "health probe",
                )
                .await;
                match probe {
                    Ok(Ok(_)) => return Ok(conn),
                    _ => {
                        tracing::warn!("stale connection to {}, reconnecting", conn.endpoint);
                        *self.state.borrow_mut() = ConnState::Disconnected;
                    }
                }
            }

            let pending = match &*self.state.borrow() {
                ConnState::Connecting(attempt) => Some(attempt.clone()),
                _ => None,
            };
            if let Some(attempt) = pending {
                return attempt
                    .await
                    .map_err(|e| ChainError::AllEndpointsFailed { last: e.0 });
            }
        }

        let attempt: SharedAttempt =
            Self::connect_any(self.transport.clone(), self.endpoints.clone())
                .boxed_local()
                .shared();
        *self.state.borrow_mut() = ConnState::Connecting(attempt.clone());

        let result = attempt.await;
        {
            let mut state = self.state.borrow_mut();
            match &result {
                Ok(conn) => *state = ConnState::Connected(conn.clone()),
                Err(_) => {
                    if matches!(&*state, ConnState::Connecting(_)) {
                        *state = ConnState::Disconnected;
                    }
                }
            }
        }
        result.map_err(|e| ChainError::AllEndpointsFailed { last: e.0 })
    }

    /// Drop the cached connection. The next `connect` starts from scratch.
    pub fn disconnect(&self) {
        *self.state.borrow_mut() = ConnState::Disconnected;
    }

    /// One bounded RPC call against an established connection.
    pub async fn call(
        &self,
        conn: &Connection,
        method: &'static str,
        params: Vec<Value>,
        timeout_ms: u32,
        what: &str,
    ) -> Result<Value, ChainError> {
        with_timeout(
            self.transport.call(&conn.endpoint, method, params),
            timeout_ms,
            what,
        )
        .await?
    }

    async fn connect_any(
        transport: T,
        endpoints: Vec<String>,
    ) -> Result<Connection, ConnectFailure> {
        let total = endpoints.len();
        let mut last_error = String::from("no endpoints configured");

        for (i, endpoint) in endpoints.iter().enumerate() {
            tracing::info!("[{}/{}] connecting to {}", i + 1, total, endpoint);
            match Self::open_endpoint(&transport, endpoint).await {
                Ok(conn) => {
                    tracing::info!("connected to {} via {}", conn.chain_name, endpoint);
                    return Ok(conn);
                }
                Err(e) => {
                    tracing::warn!("failed to connect to {}: {}", endpoint, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(ConnectFailure(last_error))
    }

    async fn open_endpoint(transport: &T, endpoint: &str) -> Result<Connection, ChainError> {
        let genesis = with_timeout(
            transport.call(endpoint, "chain_getBlockHash", vec![json!(0)]),
            ENDPOINT_TIMEOUT_MS,
            "genesis hash",
        )
        .await??;
        let genesis_hash = genesis
            .as_str()
            .ok_or_else(|| ChainError::BadResponse("genesis hash is not a string".into()))?
            .to_string();

        let chain = with_timeout(
            transport.call(endpoint, "system_chain", vec![]),
            VERIFY_TIMEOUT_MS,
            "chain name",
        )
        .await??;
        let chain_name = chain.as_str().unwrap_or("unknown").to_string();

        let lower = chain_name.to_lowercase();
        if !lower.contains("paseo") && !lower.contains("testnet") {
            tracing::warn!("connected to {}, expected Paseo testnet", chain_name);
        }

        Ok(Connection {
            endpoint: endpoint.to_string(),
            chain_name,
            genesis_hash,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::time::sleep_ms;
    use std::collections::HashSet;
    use std::rc::Rc;

    pub const GENESIS: &str = "0x77afd6190f1554ad45fd0d31aee62aacc33c6db0ea801129acb813f913e0764f";

    /// Scripted transport: records every call, optionally delays, and fails
    /// for endpoints marked down.
    #[derive(Clone, Default)]
    pub struct FakeTransport {
        pub calls: Rc<RefCell<Vec<(String, &'static str)>>>,
        pub down: Rc<RefCell<HashSet<String>>>,
        pub delay_ms: u32,
    }

    impl FakeTransport {
        pub fn with_delay(delay_ms: u32) -> Self {
            Self {
                delay_ms,
                ..Self::default()
            }
        }

        pub fn mark_down(&self, endpoint: &str) {
            self.down.borrow_mut().insert(endpoint.to_string());
        }

        pub fn count(&self, method: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|(_, m)| *m == method)
                .count()
        }
    }

    impl RpcTransport for FakeTransport {
        async fn call(
            &self,
            endpoint: &str,
            method: &'static str,
            _params: Vec<Value>,
        ) -> Result<Value, ChainError> {
            self.calls.borrow_mut().push((endpoint.to_string(), method));
            if self.delay_ms > 0 {
                sleep_ms(self.delay_ms).await;
            }
            if self.down.borrow().contains(endpoint) {
                return Err(ChainError::Rpc("connection refused".into()));
            }
            match method {
                "chain_getBlockHash" => Ok(json!(GENESIS)),
                "system_chain" => Ok(json!("Paseo Testnet")),
                other => Err(ChainError::BadResponse(format!("unscripted method {other}"))),
            }
        }
    }

    fn manager(transport: &FakeTransport, endpoints: &[&str]) -> ConnectionManager<FakeTransport> {
        ConnectionManager::new(
            transport.clone(),
            endpoints.iter().map(|e| e.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn connects_to_first_healthy_endpoint() {
        let transport = FakeTransport::default();
        let mgr = manager(&transport, &["http://one", "http://two"]);

        let conn = mgr.connect(false).await.unwrap();
        assert_eq!(conn.endpoint, "http://one");
        assert_eq!(conn.chain_name, "Paseo Testnet");
        assert_eq!(conn.genesis_hash, GENESIS);
    }

    #[tokio::test]
    async fn fails_over_to_next_endpoint() {
        let transport = FakeTransport::default();
        transport.mark_down("http://one");
        let mgr = manager(&transport, &["http://one", "http://two"]);

        let conn = mgr.connect(false).await.unwrap();
        assert_eq!(conn.endpoint, "http://two");
    }

    #[tokio::test]
    async fn reports_last_cause_when_all_endpoints_fail() {
        let transport = FakeTransport::default();
        transport.mark_down("http://one");
        transport.mark_down("http://two");
        let mgr = manager(&transport, &["http://one", "http://two"]);

        let err = mgr.connect(false).await.unwrap_err();
        match err {
            ChainError::AllEndpointsFailed { last } => {
                assert!(last.contains("connection refused"), "got: {last}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reuses_cached_connection_after_probe() {
        let transport = FakeTransport::default();
        let mgr = manager(&transport, &["http://one"]);

        mgr.connect(false).await.unwrap();
        mgr.connect(false).await.unwrap();

        // Second call probes but does not redo the endpoint handshake.
        assert_eq!(transport.count("chain_getBlockHash"), 1);
    }

    #[tokio::test]
    async fn failed_probe_triggers_reconnect() {
        let transport = FakeTransport::default();
        let mgr = manager(&transport, &["http://one", "http://two"]);

        let first = mgr.connect(false).await.unwrap();
        assert_eq!(first.endpoint, "http://one");

        transport.mark_down("http://one");
        let second = mgr.connect(false).await.unwrap();
        assert_eq!(second.endpoint, "http://two");
    }

    #[tokio::test]
    async fn concurrent_connects_share_one_attempt() {
        let transport = FakeTransport::with_delay(10);
        let mgr = manager(&transport, &["http://one"]);

        let (a, b) = futures::join!(mgr.connect(false), mgr.connect(false));
        assert_eq!(a.unwrap().endpoint, "http://one");
        assert_eq!(b.unwrap().endpoint, "http://one");

        // Exactly one underlying handshake despite two callers.
        assert_eq!(transport.count("chain_getBlockHash"), 1);
        assert_eq!(transport.count("system_chain"), 1);
    }

    #[tokio::test]
    async fn disconnect_drops_cached_handle() {
        let transport = FakeTransport::default();
        let mgr = manager(&transport, &["http://one"]);

        mgr.connect(false).await.unwrap();
        mgr.disconnect();
        mgr.connect(false).await.unwrap();

        assert_eq!(transport.count("chain_getBlockHash"), 2);
    }
}
