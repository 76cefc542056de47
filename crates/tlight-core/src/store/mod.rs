// ── Reactive data store ──
//
// Normalized entity state with push-based change notification.

mod action;
mod data_store;
mod effects;
mod reducer;
mod state;

pub use action::Action;
pub use data_store::DataStore;
pub use state::{EffectsState, StoreState};
