//! Registration records kept in the local store.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    page::thanks_url,
    registration::TeamRegistrationInput,
    store::{KeyValueStore, StoreError},
};

/// Key of the confirmed registration. Its presence locks the registration form.
pub const REGISTRATION_KEY: &str = "plfc_registration";
/// Key of a checkout that left the page for a provider redirect.
pub const PENDING_CHECKOUT_KEY: &str = "plfc_pending_checkout";

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A registration confirmed by the backend after payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedRegistration {
    pub team_name: String,
    pub code: String,
    /// Milliseconds since the Unix epoch.
    pub at: i64,
}

impl ConfirmedRegistration {
    pub fn new(team_name: String, code: String) -> Self {
        Self {
            team_name,
            code,
            at: now_millis(),
        }
    }

    pub fn thanks_url(&self) -> String {
        thanks_url(&self.team_name, &self.code)
    }
}

/// Validated team data parked while the user pays on the provider's own page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCheckout {
    pub team: TeamRegistrationInput,
    pub order_id: String,
    pub provider: String,
    pub at: i64,
}

impl PendingCheckout {
    pub fn new(team: TeamRegistrationInput, order_id: String, provider: String) -> Self {
        Self {
            team,
            order_id,
            provider,
            at: now_millis(),
        }
    }
}

fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let raw = match store.get(key)? {
        Some(raw) => raw,
        None => return Ok(None),
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!("Ignoring unreadable '{}' record: {}", key, e);
            Ok(None)
        }
    }
}

fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.set(key, raw)
}

/// The stored confirmed registration. Unreadable records and records without a
/// team name count as absent.
pub fn load_registration(
    store: &dyn KeyValueStore,
) -> Result<Option<ConfirmedRegistration>, StoreError> {
    Ok(load_json::<ConfirmedRegistration>(store, REGISTRATION_KEY)?
        .filter(|registration| !registration.team_name.is_empty()))
}

pub fn save_registration(
    store: &dyn KeyValueStore,
    registration: &ConfirmedRegistration,
) -> Result<(), StoreError> {
    save_json(store, REGISTRATION_KEY, registration)
}

pub fn load_pending_checkout(
    store: &dyn KeyValueStore,
) -> Result<Option<PendingCheckout>, StoreError> {
    load_json(store, PENDING_CHECKOUT_KEY)
}

pub fn save_pending_checkout(
    store: &dyn KeyValueStore,
    pending: &PendingCheckout,
) -> Result<(), StoreError> {
    save_json(store, PENDING_CHECKOUT_KEY, pending)
}

pub fn clear_pending_checkout(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(PENDING_CHECKOUT_KEY)
}
