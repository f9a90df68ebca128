//! Explicit client registry keyed by API key.
//!
//! Owned by application startup code and passed to whatever needs a client.
//! There is no process-wide instance; two registries never share clients.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::client::WeatherClient;
use crate::config::ClientConfig;
use crate::{Result, VedrfolnirError};

/// Map of API key to a shared [`WeatherClient`].
#[derive(Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, Arc<WeatherClient>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the client for the config's API key, building it on first use.
    ///
    /// A client already registered under the key is returned as is, even if
    /// the rest of `config` differs from the one it was built with.
    pub fn get_or_create(&self, config: &ClientConfig) -> Result<Arc<WeatherClient>> {
        let api_key = config.resolved_api_key()?;

        {
            let clients = self.clients.read().map_err(lock_error)?;
            if let Some(client) = clients.get(&api_key) {
                return Ok(Arc::clone(client));
            }
        }

        let mut clients = self.clients.write().map_err(lock_error)?;
        if let Some(client) = clients.get(&api_key) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(config.clone().into_builder()?.build()?);
        clients.insert(api_key, Arc::clone(&client));
        info!(clients = clients.len(), "registered weather client");
        Ok(client)
    }

    pub fn get(&self, api_key: &str) -> Option<Arc<WeatherClient>> {
        self.clients.read().ok()?.get(api_key).cloned()
    }

    /// Unregister and shut down the client for `api_key`.
    ///
    /// Returns `false` if no client was registered. Other holders of the
    /// `Arc` keep a client that has been shut down.
    pub async fn remove(&self, api_key: &str) -> bool {
        let removed = match self.clients.write() {
            Ok(mut clients) => clients.remove(api_key),
            Err(_) => None,
        };
        match removed {
            Some(client) => {
                client.shutdown().await;
                true
            }
            None => false,
        }
    }

    /// Shut down and unregister every client.
    pub async fn shutdown_all(&self) {
        let drained: Vec<_> = match self.clients.write() {
            Ok(mut clients) => clients.drain().map(|(_, c)| c).collect(),
            Err(_) => Vec::new(),
        };
        info!(clients = drained.len(), "shutting down all weather clients");
        for client in drained {
            client.shutdown().await;
        }
    }

    pub fn len(&self) -> usize {
        self.clients.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> VedrfolnirError {
    VedrfolnirError::Configuration(format!("client registry lock poisoned: {e}"))
}
