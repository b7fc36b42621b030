//! API Module
//!
//! This module exposes the registration store over HTTP under `/api`.

mod server;
pub use server::{AppState, Server, router};
