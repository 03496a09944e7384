//! Bluetooth Module
//!
//! Provides BLE communication with Govee smart lights.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                      LightService                        │
//! │  (Main coordinator - public API for the worker thread)   │
//! └─────────────────────┬───────────────────────────────────┘
//!                       │
//!         ┌─────────────┼─────────────┐
//!         │             │             │
//!         ▼             ▼             ▼
//! ┌───────────┐  ┌────────────┐  ┌──────────┐
//! │  Scanner  │  │ Connection │  │ Protocol │
//! │           │  │            │  │          │
//! │ - BLE     │  │ - Connect  │  │ - UUIDs  │
//! │   discovery│ │   retries  │  │ - Frames  │
//! │ - Name    │  │ - GATT     │  │ - Check-  │
//! │   filter  │  │   lookup   │  │   sums   │
//! └───────────┘  └────────────┘  └──────────┘
//! ```
//!
//! ## Modules
//!
//! - [`protocol`] - Govee frame encoding, opcodes, and well-known UUIDs
//! - [`scanner`] - BLE device discovery with name-prefix filtering
//! - [`connection`] - Device connection and control characteristic access
//! - [`service`] - Main service coordinator

pub mod connection;
pub mod protocol;
pub mod scanner;
pub mod service;

// Re-export main service for convenience
pub use service::LightService;
