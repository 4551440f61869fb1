//! Builder patterns for complex object construction.
//!
//! Startup wiring goes through these builders so that every fatal check
//! (duplicate or dangling registry keys, out-of-range thresholds) happens in
//! one place, before any subscription is opened.
//!
//! # Available Builders
//!
//! - **`RegistryBuilder`**: Populates the token and pool registries, from code or a market file
//! - **`EngineBuilder`**: Constructs the arbitrage engine over populated registries
//!
//! All builders consume themselves and return `Result<T>` from `build`.

pub mod engine;
pub mod registry;

// Re-export builders for convenience
pub use engine::EngineBuilder;
pub use registry::{Registries, RegistryBuilder};
