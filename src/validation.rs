//! Input validation for user-supplied names, notes, ids and weights.
//!
//! Record ids end up in file names, so they are restricted to a safe
//! character set before they reach the file store.

use crate::error::{Error, Result};

/// Maximum allowed length for ids and scan codes.
pub const MAX_ID_LENGTH: usize = 128;

/// Maximum allowed length for batch and stage names.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum allowed length for batch notes.
pub const MAX_NOTES_LENGTH: usize = 4000;

/// Longest planned stage, in hours (ten years).
pub const MAX_STAGE_HOURS: u32 = 24 * 365 * 10;

/// Reserved names that cannot be used as ids (case-insensitive).
const RESERVED_NAMES: &[&str] = &[
    ".", "..", "con", "prn", "aux", "nul", "com1", "com2", "com3", "com4", "com5", "com6", "com7",
    "com8", "com9", "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

fn invalid(message: String) -> Error {
    Error::InvalidOperation(message)
}

/// Validates that an id (or scan code) is safe for use in file paths.
///
/// An id is valid if it is non-empty, at most [`MAX_ID_LENGTH`] characters,
/// made of ASCII alphanumerics, dashes and underscores, and not a reserved
/// system name.
///
/// ```
/// use ferment::validation::validate_id;
///
/// assert!(validate_id("6f1c2a9e-0b7d-4a51-9a43-3f0f3c1e2b77").is_ok());
/// assert!(validate_id("../etc/passwd").is_err());
/// ```
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(invalid("ID cannot be empty".to_string()));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(invalid(format!(
            "ID too long: {} characters (max {MAX_ID_LENGTH})",
            id.len()
        )));
    }

    let valid_chars = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid_chars {
        return Err(invalid(format!(
            "ID '{id}' contains invalid characters. Use only alphanumeric characters, dashes (-), and underscores (_)"
        )));
    }

    if RESERVED_NAMES.contains(&id.to_lowercase().as_str()) {
        return Err(invalid(format!("ID '{id}' uses a reserved name")));
    }

    Ok(())
}

/// Validates a batch or stage name: non-blank and within [`MAX_NAME_LENGTH`].
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid("Name cannot be empty".to_string()));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(invalid(format!(
            "Name too long: {} characters (max {MAX_NAME_LENGTH})",
            name.chars().count()
        )));
    }

    Ok(())
}

pub fn validate_notes(notes: &str) -> Result<()> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err(invalid(format!(
            "Notes too long: {} characters (max {MAX_NOTES_LENGTH})",
            notes.chars().count()
        )));
    }

    Ok(())
}

/// Weights are grams and must be a positive finite number.
pub fn validate_weight(grams: f64) -> Result<()> {
    if !grams.is_finite() || grams <= 0.0 {
        return Err(invalid(format!(
            "Weight must be a positive number of grams, got {grams}"
        )));
    }

    Ok(())
}

/// Stage durations are whole hours, at most [`MAX_STAGE_HOURS`].
pub fn validate_duration(hours: u32) -> Result<()> {
    if hours > MAX_STAGE_HOURS {
        return Err(invalid(format!(
            "Stage duration too long: {hours}h (max {MAX_STAGE_HOURS}h)"
        )));
    }

    Ok(())
}

/// Clap value parser for id arguments.
pub fn clap_id_validator(s: &str) -> std::result::Result<String, String> {
    validate_id(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// Clap value parser for name arguments.
pub fn clap_name_validator(s: &str) -> std::result::Result<String, String> {
    validate_name(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// Clap value parser for weight arguments.
pub fn clap_weight_validator(s: &str) -> std::result::Result<f64, String> {
    let grams: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number of grams"))?;
    validate_weight(grams).map_err(|e| e.to_string())?;
    Ok(grams)
}

/// Clap value parser for stage durations in hours.
pub fn clap_hours_validator(s: &str) -> std::result::Result<u32, String> {
    let hours: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a whole number of hours"))?;
    validate_duration(hours).map_err(|e| e.to_string())?;
    Ok(hours)
}
