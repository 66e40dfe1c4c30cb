//! Save/load of the economy.
//!
//! ## Versioning
//!
//! `SAVE_VERSION` is bumped whenever fields are added. Loading never migrates:
//! the payload is merged field by field over the defaults, so an older payload
//! falls back to defaults for what it lacks, a field holding null or a value of
//! the wrong type keeps its default, and unknown fields from a newer version
//! are ignored. Only text that is not a JSON object counts as corrupt.
//!
//! The derived-stat cache is never written; it is rebuilt from the upgrade
//! levels on restore.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StorageError;

use super::state::{clamp01, EconomyState, UpgradeLevel, UpgradeOwnership};

/// Current save format version.
pub const SAVE_VERSION: u32 = 1;

/// Key-value transport for save payloads.
pub trait SaveStorage {
    /// Read the payload stored under `key`, `None` if there is none.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Serialized form of `EconomyState`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub version: u32,
    pub currency: f64,
    pub total_actions: u64,
    pub best_single_action_yield: f64,
    pub total_bonus_yield: f64,
    pub care: f64,
    pub last_action_at: f64,
    pub upgrades: UpgradeOwnership,
    pub last_persisted_at: Option<f64>,
    pub last_tick_at: Option<f64>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            currency: 0.0,
            total_actions: 0,
            best_single_action_yield: 0.0,
            total_bonus_yield: 0.0,
            care: 1.0,
            last_action_at: 0.0,
            upgrades: UpgradeOwnership::new(),
            last_persisted_at: None,
            last_tick_at: None,
        }
    }
}

/// A finite, non-negative amount, or `fallback`.
fn amount_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

/// Overwrite `slot` with `obj[key]` when it is present and has the right type.
fn merge_field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = obj.get(key) else {
        return;
    };
    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => *slot = parsed,
        Err(e) => log::warn!("ignoring save field `{key}`: {e}"),
    }
}

/// Upgrade levels, keeping every well-formed entry.
fn merge_upgrades(obj: &Map<String, Value>) -> UpgradeOwnership {
    let mut upgrades = UpgradeOwnership::new();
    match obj.get("upgrades") {
        Some(Value::Object(entries)) => {
            for (id, entry) in entries {
                match serde_json::from_value::<UpgradeLevel>(entry.clone()) {
                    Ok(owned) => upgrades.set_level(id, owned.level),
                    Err(e) => log::warn!("ignoring saved upgrade `{id}`: {e}"),
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(other) => log::warn!("ignoring save field `upgrades`: not an object: {other}"),
    }
    upgrades
}

impl Snapshot {
    /// Parse a stored payload, merging it over `Snapshot::default()`.
    ///
    /// Fails only when `json` is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(obj) = value else {
            return Err(<serde_json::Error as serde::de::Error>::custom(
                "save payload is not a JSON object",
            ));
        };

        let mut snapshot = Self::default();
        merge_field(&obj, "version", &mut snapshot.version);
        merge_field(&obj, "currency", &mut snapshot.currency);
        merge_field(&obj, "total_actions", &mut snapshot.total_actions);
        merge_field(
            &obj,
            "best_single_action_yield",
            &mut snapshot.best_single_action_yield,
        );
        merge_field(&obj, "total_bonus_yield", &mut snapshot.total_bonus_yield);
        merge_field(&obj, "care", &mut snapshot.care);
        merge_field(&obj, "last_action_at", &mut snapshot.last_action_at);
        merge_field(&obj, "last_persisted_at", &mut snapshot.last_persisted_at);
        merge_field(&obj, "last_tick_at", &mut snapshot.last_tick_at);
        snapshot.upgrades = merge_upgrades(&obj);
        Ok(snapshot)
    }

    /// Capture `state` as it would be written at wall time `now_wall_ms`.
    pub fn capture(state: &EconomyState, now_wall_ms: f64) -> Self {
        Self {
            version: SAVE_VERSION,
            currency: state.currency,
            total_actions: state.total_actions,
            best_single_action_yield: state.best_single_action_yield,
            total_bonus_yield: state.total_bonus_yield,
            care: state.care,
            last_action_at: state.last_action_at,
            upgrades: state.upgrades().clone(),
            last_persisted_at: Some(now_wall_ms),
            last_tick_at: Some(state.last_tick_at),
        }
    }

    /// Rebuild a state from this snapshot, merged over fresh defaults.
    ///
    /// Invalid numbers fall back to defaults, care is clamped, and upgrade ids
    /// unknown to the catalog are dropped.
    pub fn restore(self, now_wall_ms: f64) -> EconomyState {
        let mut state = EconomyState::new(now_wall_ms);

        state.currency = amount_or(self.currency, state.currency);
        state.total_actions = self.total_actions;
        state.best_single_action_yield =
            amount_or(self.best_single_action_yield, state.best_single_action_yield);
        state.total_bonus_yield = amount_or(self.total_bonus_yield, state.total_bonus_yield);
        state.care = if self.care.is_finite() {
            clamp01(self.care)
        } else {
            state.care
        };
        state.last_action_at = amount_or(self.last_action_at, state.last_action_at);
        state.last_persisted_at = self.last_persisted_at.filter(|t| t.is_finite());
        if let Some(t) = self.last_tick_at.filter(|t| t.is_finite()) {
            state.last_tick_at = t;
        }

        let mut upgrades = self.upgrades;
        upgrades.retain_known();
        state.replace_upgrades(upgrades);

        state
    }
}

/// Serialize and write `state` under `key`.
pub fn save_snapshot<S: SaveStorage + ?Sized>(
    storage: &mut S,
    key: &str,
    state: &EconomyState,
    now_wall_ms: f64,
) -> Result<(), StorageError> {
    let snapshot = Snapshot::capture(state, now_wall_ms);
    let json = serde_json::to_string(&snapshot).map_err(StorageError::Encode)?;
    storage.write(key, &json)
}

/// Read and parse the snapshot under `key`.
///
/// Bad fields fall back to their defaults. A payload that is not a JSON
/// object at all is removed so the next launch starts clean, and reported as
/// `StorageError::Corrupt`.
pub fn load_snapshot<S: SaveStorage + ?Sized>(
    storage: &mut S,
    key: &str,
) -> Result<Option<Snapshot>, StorageError> {
    let Some(json) = storage.read(key)? else {
        return Ok(None);
    };

    match Snapshot::from_json(&json) {
        Ok(snapshot) => {
            if snapshot.version > SAVE_VERSION {
                log::info!(
                    "save written by a newer version (saved={}, current={}), loading known fields",
                    snapshot.version,
                    SAVE_VERSION
                );
            }
            Ok(Some(snapshot))
        }
        Err(e) => {
            if let Err(remove_err) = storage.remove(key) {
                log::warn!("could not remove corrupt save: {remove_err}");
            }
            Err(StorageError::Corrupt(e))
        }
    }
}

// ── In-memory storage ───────────────────────────────────────────

/// Shared in-memory storage. Clones see the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw payload under `key`, for inspection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: &str, payload: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), payload.to_string());
    }
}

impl SaveStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        self.insert(key, payload);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

// ── Browser storage ─────────────────────────────────────────────

/// `window.localStorage`. WASM only.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn get_storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .map_err(|e| StorageError::Backend(format!("{e:?}")))?
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl SaveStorage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::get_storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn write(&mut self, key: &str, payload: &str) -> Result<(), StorageError> {
        Self::get_storage()?
            .set_item(key, payload)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Self::get_storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}
