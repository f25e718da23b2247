//! Polkadot browser-extension wallet interop.
//!
//! Talks to the `window.injectedWeb3` registry directly through `js_sys`
//! reflection so the app has no JS-side glue to ship. Each installed
//! extension is enabled once per session and its accounts pooled; signing
//! routes back to whichever extension owns the address.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub address: String,
    pub name: Option<String>,
    /// Extension that injected this account ("polkadot-js", "talisman", ...).
    pub source: String,
}

#[derive(Debug, Clone, Error)]
pub enum WalletError {
    #[error("No Polkadot wallet extension found. Install Polkadot.js, Talisman or SubWallet")]
    ExtensionNotFound,
    #[error("The wallet extension did not respond. Try unlocking it and reloading the page")]
    ExtensionUnresponsive,
    #[error("No accounts in the wallet. Create or import an account first")]
    NoAccounts,
    #[error("{0}")]
    Other(String),
}

impl Account {
    /// "5Grwva...utQY" style label for tight UI spots.
    pub fn short_address(&self) -> String {
        if self.address.len() <= 12 {
            return self.address.clone();
        }
        format!(
            "{}...{}",
            &self.address[..6],
            &self.address[self.address.len() - 4..]
        )
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.short_address())
    }
}

#[cfg(target_arch = "wasm32")]
mod platform {
    use super::{Account, WalletError};
    use serde_json::Value;
    use std::cell::RefCell;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    struct EnabledExtension {
        name: String,
        injected: JsValue,
        addresses: Vec<String>,
    }

    thread_local! {
        static ENABLED: RefCell<Vec<EnabledExtension>> = RefCell::new(Vec::new());
    }

    fn injected_web3() -> Option<js_sys::Object> {
        let window = web_sys::window()?;
        let registry = js_sys::Reflect::get(&window, &JsValue::from_str("injectedWeb3")).ok()?;
        registry.dyn_into::<js_sys::Object>().ok()
    }

    pub fn is_extension_available() -> bool {
        injected_web3()
            .map(|registry| js_sys::Object::keys(&registry).length() > 0)
            .unwrap_or(false)
    }

    fn js_error_message(err: &JsValue) -> String {
        err.dyn_ref::<js_sys::Error>()
            .map(|e| String::from(e.message()))
            .or_else(|| err.as_string())
            .unwrap_or_else(|| "unknown wallet error".to_string())
    }

    async fn enable_extension(
        registry: &js_sys::Object,
        name: &str,
        app_name: &str,
    ) -> Result<JsValue, String> {
        let entry = js_sys::Reflect::get(registry, &JsValue::from_str(name))
            .map_err(|e| js_error_message(&e))?;
        let enable = js_sys::Reflect::get(&entry, &JsValue::from_str("enable"))
            .map_err(|e| js_error_message(&e))?;
        let enable: js_sys::Function =
            enable.dyn_into().map_err(|_| "enable is not a function".to_string())?;
        let promise = enable
            .call1(&entry, &JsValue::from_str(app_name))
            .map_err(|e| js_error_message(&e))?;
        let promise: js_sys::Promise =
            promise.dyn_into().map_err(|_| "enable did not return a promise".to_string())?;
        JsFuture::from(promise).await.map_err(|e| js_error_message(&e))
    }

    async fn fetch_accounts(injected: &JsValue, source: &str) -> Result<Vec<Account>, String> {
        let accounts_api = js_sys::Reflect::get(injected, &JsValue::from_str("accounts"))
            .map_err(|e| js_error_message(&e))?;
        let get = js_sys::Reflect::get(&accounts_api, &JsValue::from_str("get"))
            .map_err(|e| js_error_message(&e))?;
        let get: js_sys::Function =
            get.dyn_into().map_err(|_| "accounts.get is not a function".to_string())?;
        let promise = get
            .call0(&accounts_api)
            .map_err(|e| js_error_message(&e))?;
        let promise: js_sys::Promise = promise
            .dyn_into()
            .map_err(|_| "accounts.get did not return a promise".to_string())?;
        let list = JsFuture::from(promise).await.map_err(|e| js_error_message(&e))?;

        let array: js_sys::Array = list
            .dyn_into()
            .map_err(|_| "accounts.get did not return an array".to_string())?;
        let mut accounts = Vec::with_capacity(array.length() as usize);
        for item in array.iter() {
            let address = js_sys::Reflect::get(&item, &JsValue::from_str("address"))
                .ok()
                .and_then(|v| v.as_string());
            let Some(address) = address else { continue };
            let name = js_sys::Reflect::get(&item, &JsValue::from_str("name"))
                .ok()
                .and_then(|v| v.as_string());
            accounts.push(Account {
                address,
                name,
                source: source.to_string(),
            });
        }
        Ok(accounts)
    }

    /// Enable every installed extension and return all of their accounts.
    pub async fn connect_wallet(app_name: &str) -> Result<Vec<Account>, WalletError> {
        let Some(registry) = injected_web3() else {
            return Err(WalletError::ExtensionNotFound);
        };
        let names: Vec<String> = js_sys::Object::keys(&registry)
            .iter()
            .filter_map(|k| k.as_string())
            .collect();
        if names.is_empty() {
            return Err(WalletError::ExtensionNotFound);
        }

        let mut all_accounts = Vec::new();
        let mut enabled = Vec::new();
        let mut last_error = None;

        for name in &names {
            match enable_extension(&registry, name, app_name).await {
                Ok(injected) => match fetch_accounts(&injected, name).await {
                    Ok(accounts) => {
                        all_accounts.extend(accounts.iter().cloned());
                        enabled.push(EnabledExtension {
                            name: name.clone(),
                            injected,
                            addresses: accounts.into_iter().map(|a| a.address).collect(),
                        });
                    }
                    Err(e) => {
                        tracing::warn!("failed to list accounts from {}: {}", name, e);
                        last_error = Some(e);
                    }
                },
                Err(e) => {
                    tracing::warn!("failed to enable {}: {}", name, e);
                    last_error = Some(e);
                }
            }
        }

        if enabled.is_empty() {
            let message = last_error.unwrap_or_default().to_lowercase();
            return if message.contains("rejected") || message.contains("cancelled") {
                Err(WalletError::Other(
                    "Connection rejected. Approve access in the wallet popup".to_string(),
                ))
            } else {
                Err(WalletError::ExtensionUnresponsive)
            };
        }
        ENABLED.with(|slot| *slot.borrow_mut() = enabled);

        if all_accounts.is_empty() {
            return Err(WalletError::NoAccounts);
        }
        tracing::info!(
            "wallet connected: {} account(s) from {} extension(s)",
            all_accounts.len(),
            names.len()
        );
        Ok(all_accounts)
    }

    pub fn disconnect_wallet() {
        ENABLED.with(|slot| slot.borrow_mut().clear());
    }

    /// Sign a payload with the extension that owns `address`. Returns the
    /// raw multi-signature bytes (type byte included).
    pub async fn sign_payload(address: &str, payload: &Value) -> Result<Vec<u8>, WalletError> {
        let injected = ENABLED.with(|slot| {
            slot.borrow()
                .iter()
                .find(|ext| ext.addresses.iter().any(|a| a == address))
                .map(|ext| (ext.name.clone(), ext.injected.clone()))
        });
        let Some((name, injected)) = injected else {
            return Err(WalletError::Other(format!(
                "no signer for {address}, reconnect the wallet"
            )));
        };

        let signer = js_sys::Reflect::get(&injected, &JsValue::from_str("signer"))
            .map_err(|e| WalletError::Other(js_error_message(&e)))?;
        let sign_fn = js_sys::Reflect::get(&signer, &JsValue::from_str("signPayload"))
            .map_err(|e| WalletError::Other(js_error_message(&e)))?;
        let sign_fn: js_sys::Function = sign_fn
            .dyn_into()
            .map_err(|_| WalletError::Other(format!("{name} has no signPayload")))?;

        let payload_js = js_sys::JSON::parse(&payload.to_string())
            .map_err(|e| WalletError::Other(js_error_message(&e)))?;
        let promise = sign_fn
            .call1(&signer, &payload_js)
            .map_err(|e| WalletError::Other(js_error_message(&e)))?;
        let promise: js_sys::Promise = promise
            .dyn_into()
            .map_err(|_| WalletError::Other("signPayload did not return a promise".to_string()))?;
        let result = JsFuture::from(promise)
            .await
            .map_err(|e| WalletError::Other(js_error_message(&e)))?;

        let signature = js_sys::Reflect::get(&result, &JsValue::from_str("signature"))
            .ok()
            .and_then(|v| v.as_string())
            .ok_or_else(|| WalletError::Other("signPayload returned no signature".to_string()))?;
        hex::decode(signature.trim_start_matches("0x"))
            .map_err(|e| WalletError::Other(format!("bad signature hex: {e}")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod platform {
    use super::{Account, WalletError};
    use serde_json::Value;

    pub fn is_extension_available() -> bool {
        false
    }

    pub async fn connect_wallet(_app_name: &str) -> Result<Vec<Account>, WalletError> {
        Err(WalletError::ExtensionNotFound)
    }

    pub fn disconnect_wallet() {}

    pub async fn sign_payload(_address: &str, _payload: &Value) -> Result<Vec<u8>, WalletError> {
        Err(WalletError::ExtensionNotFound)
    }
}

pub use platform::{connect_wallet, disconnect_wallet, is_extension_available};

pub async fn sign_payload(address: &str, payload: &Value) -> Result<Vec<u8>, WalletError> {
    platform::sign_payload(address, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_address_elides_middle() {
        let account = Account {
            address: "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".into(),
            name: None,
            source: "polkadot-js".into(),
        };
        assert_eq!(account.short_address(), "5Grwva...utQY");
    }

    #[test]
    fn short_addresses_pass_through() {
        let account = Account {
            address: "5Grwva".into(),
            name: None,
            source: "polkadot-js".into(),
        };
        assert_eq!(account.short_address(), "5Grwva");
    }

    #[test]
    fn display_name_prefers_wallet_label() {
        let account = Account {
            address: "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY".into(),
            name: Some("Alice".into()),
            source: "talisman".into(),
        };
        assert_eq!(account.display_name(), "Alice");
    }
}
