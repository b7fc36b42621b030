//! Input Validation Module
//!
//! Email shape checks run before any storage access, and `@mention`
//! extraction for notification text.

mod validator;
pub use validator::{extract_mentions, is_valid_email, validate_email, validate_emails};
