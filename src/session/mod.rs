// ABOUTME: Session module — state store, output signal scanning, and durable storage.
// ABOUTME: Store transitions in store, marker literals in signals, file layout in persistence.

pub mod persistence;
pub mod signals;
pub mod store;

pub use persistence::Storage;
pub use store::{AppState, MoodFilter, SessionStore, TurnOutcome};
