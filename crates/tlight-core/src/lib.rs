// tlight-core: Reactive state layer between tlight-api and consumers (CLI).

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod fence;
pub mod model;
pub mod overlay;
pub mod persistence;
pub mod schema;
pub mod store;
pub mod stream;
pub mod throttle;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{ApiAction, ApiResponse, Intent, Middleware};
pub use config::{ControllerConfig, DEFAULT_GATEWAY_URL};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use persistence::{FileSink, MemorySink, PersistedState, PersistenceSink};
pub use schema::{CatalogEntry, FormNode, PropertyDescriptor, PropertyKind};
pub use store::{Action, DataStore, StoreState};
pub use stream::StateStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Gateway entities
    Light, Mode, Node, NodeFeatures, ReportedState,
    // Editable values
    LightValue, NodeValue, ValueField, ValuesPatch,
    // Effects
    ConfiguredEffect, EffectAssignment, EffectType,
    // Identifiers
    EffectId, LightKey, NodeId,
    // Preferences
    CardPreference, CardPreferences, ColorEditMode,
};
