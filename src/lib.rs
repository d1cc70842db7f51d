//! GateLink firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod actuator;
pub mod app;
pub mod config;
pub mod debounce;
pub mod gateway;
pub mod link;
pub mod relay;

pub mod error;
pub mod pins;

// ESPidf-only paths are guarded by cfg attributes inside each adapter.
pub mod adapters;
