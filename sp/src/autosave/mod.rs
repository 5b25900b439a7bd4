//! Debounced, offline-tolerant autosave
//!
//! The controller is a tokio task owning the debounce timer and the
//! last-saved marker. Producers push state changes through a channel; a
//! single save-consumer task drives the injected [`SaveSink`], preserving
//! the trailing-edge-debounce and last-write-wins contracts.

mod config;
mod controller;

pub use config::AutosaveConfig;
pub use controller::{
    AutosaveController, AutosaveHandle, AutosaveStatus, PendingStore, SaveSink, SinkError, PENDING_KEY,
};
