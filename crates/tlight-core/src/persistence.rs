// ── Persisted effects and preferences ──
//
// Configured effects and card preferences survive restarts as one JSON
// blob stored under a fixed key. Gateway data (nodes, values, effect
// assignments) is never persisted: it is reloaded on connect.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{CardPreferences, ConfiguredEffect};
use crate::store::{Action, DataStore, StoreState};

/// Key the state blob is stored under.
pub const STATE_KEY: &str = "tlightState";

/// Layout version of the state blob.
pub const STATE_VERSION: u32 = 1;

// ── Sinks ────────────────────────────────────────────────────────────

/// Key-value storage for persisted blobs.
pub trait PersistenceSink: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn save(&self, key: &str, blob: &str) -> Result<(), CoreError>;
}

/// Stores every key in one JSON object file.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(io_error(&self.path, &e)),
        };
        serde_json::from_str(&raw).map_err(|e| CoreError::Persistence {
            message: format!("{} is not a JSON object: {e}", self.path.display()),
        })
    }
}

impl PersistenceSink for FileSink {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        let document = self.read_document()?;
        Ok(document.get(key).map(|blob| match blob {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }))
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), CoreError> {
        // A corrupt document is replaced rather than blocking every save.
        let mut document = self.read_document().unwrap_or_default();
        document.insert(key.to_owned(), Value::String(blob.to_owned()));

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }
        let raw = serde_json::to_string_pretty(&document)
            .map_err(|e| CoreError::Internal(format!("encode error: {e}")))?;
        std::fs::write(&self.path, raw).map_err(|e| io_error(&self.path, &e))
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> CoreError {
    CoreError::Persistence {
        message: format!("{}: {err}", path.display()),
    }
}

/// In-process sink, used when no state file is configured.
#[derive(Debug, Default)]
pub struct MemorySink {
    blobs: Mutex<HashMap<String, String>>,
    saves: Mutex<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistenceSink for MemorySink {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), CoreError> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), blob.to_owned());
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

// ── Persisted state ──────────────────────────────────────────────────

/// The persisted slice of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub effects: Vec<ConfiguredEffect>,
    #[serde(default)]
    pub preferences: IndexMap<String, CardPreferences>,
}

impl PersistedState {
    pub fn capture(state: &StoreState) -> Self {
        Self {
            version: STATE_VERSION,
            effects: state.effects.configured_effects.clone(),
            preferences: state.preferences.clone(),
        }
    }

    /// The store action that reinstates this state.
    pub fn into_action(self) -> Action {
        Action::StateRestored {
            effects: self.effects,
            preferences: self.preferences,
        }
    }
}

/// Read the persisted state from `sink`.
///
/// Blobs of another version, or that fail to parse, are discarded with a
/// warning. Only version 1 exists, so there is nothing to migrate.
pub fn restore(sink: &dyn PersistenceSink) -> Option<PersistedState> {
    let blob = match sink.load(STATE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "cannot read persisted state");
            return None;
        }
    };

    let raw: Value = match serde_json::from_str(&blob) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "discarding unreadable persisted state");
            return None;
        }
    };

    let version = raw.get("version").and_then(Value::as_u64);
    if version != Some(u64::from(STATE_VERSION)) {
        warn!(
            ?version,
            expected = STATE_VERSION,
            "discarding persisted state of unknown version"
        );
        return None;
    }

    match serde_json::from_value::<PersistedState>(raw) {
        Ok(state) => {
            debug!(effects = state.effects.len(), "restored persisted state");
            Some(state)
        }
        Err(e) => {
            warn!(error = %e, "discarding malformed persisted state");
            None
        }
    }
}

// ── Persister ────────────────────────────────────────────────────────

/// Writes the persisted slice to a sink, skipping unchanged state.
pub struct Persister {
    sink: Arc<dyn PersistenceSink>,
    last_saved: Mutex<Option<PersistedState>>,
}

impl Persister {
    pub fn new(sink: Arc<dyn PersistenceSink>) -> Self {
        Self {
            sink,
            last_saved: Mutex::new(None),
        }
    }

    /// Remember `state` as already stored, e.g. right after a restore.
    pub fn mark_saved(&self, state: PersistedState) {
        *self.last_saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(state);
    }

    pub fn restore(&self) -> Option<PersistedState> {
        restore(self.sink.as_ref())
    }

    /// Save the persisted slice of `state` if it differs from the last
    /// save. Returns whether anything was written.
    pub fn flush(&self, state: &StoreState) -> Result<bool, CoreError> {
        let current = PersistedState::capture(state);
        let mut last = self.last_saved.lock().unwrap_or_else(PoisonError::into_inner);
        if last.as_ref() == Some(&current) {
            return Ok(false);
        }

        let blob = serde_json::to_string(&current)
            .map_err(|e| CoreError::Internal(format!("encode error: {e}")))?;
        self.sink.save(STATE_KEY, &blob)?;
        debug!(effects = current.effects.len(), "persisted state");
        *last = Some(current);
        Ok(true)
    }
}

/// Flush store changes after `debounce` of quiet. Each change restarts
/// the delay.
pub(crate) async fn persistence_task(
    store: Arc<DataStore>,
    persister: Arc<Persister>,
    debounce: Duration,
    cancel: CancellationToken,
) {
    let mut changes = store.subscribe();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = changes.changed() => {
                if changed.is_none() {
                    break;
                }
            }
        }

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                changed = changes.changed() => {
                    if changed.is_none() {
                        return;
                    }
                }
                () = tokio::time::sleep(debounce) => break,
            }
        }

        if let Err(e) = persister.flush(&changes.latest()) {
            warn!(error = %e, "persisting state failed");
        }
    }
}
