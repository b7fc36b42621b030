use crate::error::{RegistryError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern")
});

// An "@" immediately followed by an address; the capture is the address.
static MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})").expect("mention pattern")
});

/// Returns true if `email` has the `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Validate a single email
pub fn validate_email(email: &str) -> Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        debug!("Rejected malformed email {:?}", email);
        Err(RegistryError::Validation(format!("invalid email: {:?}", email)))
    }
}

/// Validate a non-empty list of emails
pub fn validate_emails(emails: &[String]) -> Result<()> {
    if emails.is_empty() {
        return Err(RegistryError::Validation(
            "at least one email is required".to_string(),
        ));
    }
    emails.iter().try_for_each(|email| validate_email(email))
}

/// Extract every `@email` mention from `text`, in order, duplicates kept
pub fn extract_mentions(text: &str) -> Vec<String> {
    MENTION
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}
