//! Shared helpers for command handlers.

use crate::error::CliError;

/// Fail with `NotFound` unless `id` is one of the account's `known` ids.
///
/// Checked before a handle is built, so an unknown id is never synced.
pub fn require_listed(kind: &str, id: &str, known: &[String]) -> Result<(), CliError> {
    if known.iter().any(|k| k == id) {
        return Ok(());
    }
    Err(CliError::NotFound {
        resource_type: kind.into(),
        identifier: id.into(),
    })
}

/// `"-"` for absent values in detail views.
pub fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}
