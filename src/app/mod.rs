//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the GateLink system:
//! link supervision, read debouncing, backend submission, status relay,
//! and the fail-safe actuator state machine, orchestrated by a single
//! cooperative tick.  All interaction with hardware and the network
//! happens through **port traits** defined in [`ports`], keeping this
//! layer fully testable without real peripherals or a live broker.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
