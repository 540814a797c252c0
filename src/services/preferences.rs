//! Preferences service: typed access to persisted user settings.
//!
//! DESIGN
//! ======
//! Loaded once at startup into an in-memory cache, then injected into the
//! editor. Reads come from the cache; saves write through to the store
//! first and update the cache only on success.
//!
//! Keys: `active_provider`, `credential:<provider>`, `tips_seen`.
//! Credentials are never logged and never leave this service except inside
//! a generation request.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use tracing::{info, warn};

use crate::db::store::{KeyValueStore, PrefsError};
use crate::llm::ProviderId;

pub const KEY_ACTIVE_PROVIDER: &str = "active_provider";
pub const KEY_TIPS_SEEN: &str = "tips_seen";
const CREDENTIAL_PREFIX: &str = "credential:";

#[must_use]
pub fn credential_key(provider: ProviderId) -> String {
    format!("{CREDENTIAL_PREFIX}{provider}")
}

#[derive(Debug, Clone, Default)]
struct Cache {
    active_provider: ProviderId,
    credentials: HashMap<ProviderId, String>,
    tips_seen: bool,
}

/// Per-provider status reported to the front end. Never carries the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub label: &'static str,
    pub has_credential: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferencesSummary {
    pub active_provider: ProviderId,
    pub providers: Vec<ProviderStatus>,
    pub tips_seen: bool,
}

pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
    cache: RwLock<Cache>,
}

impl Preferences {
    /// Read every stored key into the cache.
    ///
    /// Unknown providers and unrecognized keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the store cannot be read.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, PrefsError> {
        let mut cache = Cache::default();
        for (key, value) in store.all().await? {
            if key == KEY_ACTIVE_PROVIDER {
                match value.parse() {
                    Ok(provider) => cache.active_provider = provider,
                    Err(_) => warn!(%value, "prefs: ignoring unknown active provider"),
                }
            } else if key == KEY_TIPS_SEEN {
                cache.tips_seen = value == "true";
            } else if let Some(name) = key.strip_prefix(CREDENTIAL_PREFIX) {
                match name.parse::<ProviderId>() {
                    Ok(provider) if !value.is_empty() => {
                        cache.credentials.insert(provider, value);
                    }
                    Ok(_) => {}
                    Err(_) => warn!(provider = %name, "prefs: ignoring credential for unknown provider"),
                }
            }
        }
        info!(
            active_provider = %cache.active_provider,
            credentials = cache.credentials.len(),
            tips_seen = cache.tips_seen,
            "prefs: loaded"
        );
        Ok(Self { store, cache: RwLock::new(cache) })
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Cache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Cache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn active_provider(&self) -> ProviderId {
        self.read().active_provider
    }

    /// The saved credential for `provider`, or an empty string.
    #[must_use]
    pub fn credential(&self, provider: ProviderId) -> String {
        self.read().credentials.get(&provider).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn tips_seen(&self) -> bool {
        self.read().tips_seen
    }

    #[must_use]
    pub fn summary(&self) -> PreferencesSummary {
        let cache = self.read();
        PreferencesSummary {
            active_provider: cache.active_provider,
            providers: ProviderId::ALL
                .into_iter()
                .map(|id| ProviderStatus { id, label: id.label(), has_credential: cache.credentials.contains_key(&id) })
                .collect(),
            tips_seen: cache.tips_seen,
        }
    }

    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the store write fails; the cache is unchanged.
    pub async fn set_active_provider(&self, provider: ProviderId) -> Result<(), PrefsError> {
        self.store.set(KEY_ACTIVE_PROVIDER, provider.as_str()).await?;
        self.write().active_provider = provider;
        info!(%provider, "prefs: active provider saved");
        Ok(())
    }

    /// Save a trimmed credential. A blank credential removes the saved one.
    ///
    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the store write fails; the cache is unchanged.
    pub async fn save_credential(&self, provider: ProviderId, credential: &str) -> Result<(), PrefsError> {
        let credential = credential.trim();
        let key = credential_key(provider);
        if credential.is_empty() {
            self.store.remove(&key).await?;
            self.write().credentials.remove(&provider);
            info!(%provider, "prefs: credential cleared");
        } else {
            self.store.set(&key, credential).await?;
            self.write().credentials.insert(provider, credential.to_string());
            info!(%provider, "prefs: credential saved");
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`PrefsError`] if the store write fails.
    pub async fn mark_tips_seen(&self) -> Result<(), PrefsError> {
        self.store.set(KEY_TIPS_SEEN, "true").await?;
        self.write().tips_seen = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;
