//! Nickname validation.
//!
//! Display names are length-bounded and restricted to ASCII
//! alphanumeric characters. The rejection messages are part of the
//! wire protocol: they are sent verbatim after `ERROR `.

use thiserror::Error;

/// Why a submitted nickname was rejected.
///
/// The `Display` text of each variant is the exact description the
/// client receives in the `ERROR` reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameReject {
    /// `NEW` was sent without an argument.
    #[error("No username given")]
    Missing,

    /// The name exceeds the configured maximum length.
    #[error("Name too long - maximum allowed: {max}")]
    TooLong { max: usize },

    /// The name contains something other than ASCII alphanumerics.
    #[error("Whitespace and special characters are prohibited")]
    Forbidden,
}

/// Validates a nickname against the configured maximum length.
///
/// Returns the validated name on success so callers never have to
/// unwrap the option again.
pub fn validate(name: Option<&str>, max_len: usize) -> Result<&str, NameReject> {
    let name = name.ok_or(NameReject::Missing)?;

    if name.is_empty() {
        return Err(NameReject::Missing);
    }

    if name.chars().count() > max_len {
        return Err(NameReject::TooLong { max: max_len });
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(NameReject::Forbidden);
    }

    Ok(name)
}
