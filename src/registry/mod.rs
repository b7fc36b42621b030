//! Registration Store Module
//!
//! This module owns all persistent state: teachers, students and the
//! registrations between them, kept in SQLite through a sqlx pool.

mod database;
pub use database::Registry;
