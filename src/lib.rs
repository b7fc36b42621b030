//! This crate implements a small teacher/student registration service.
//! It includes modules for data types, input validation, the SQLite-backed
//! registration store, the HTTP API, and configuration.

pub mod types; // Row types and HTTP request/response bodies.
pub mod error; // Error taxonomy shared by the store and the API.
pub mod validation; // Email shape checks and mention extraction.
pub mod registry; // The registration store and its four operations.
pub mod api; // HTTP routing and error mapping.
pub mod config; // Defines and loads service configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use error::RegistryError;
pub use registry::Registry;
