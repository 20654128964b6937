//! Error types for availability calculation.
//!
//! All failures a calculation request can surface are represented by the
//! `CalcError` enum. Every failure is local to one request; no shared state
//! is corrupted by a failing evaluation.

use crate::field::Field;
use thiserror::Error;

/// Format a dependency cycle path as a readable string.
fn format_cycle_path(path: &[Field]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors that can occur while building a registry or evaluating a request.
///
/// # Examples
///
/// ```rust
/// use atscalc::CalcError;
///
/// let err = CalcError::UnknownField("FOO".to_string());
/// assert!(err.to_string().contains("FOO"));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    /// A lookup or conversion used a field name outside the closed catalog.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A formula step's function failed. Aborts the entire evaluation;
    /// no partial-result recovery is attempted.
    #[error("Calculation failed for field {field}: {reason}")]
    CalculationFailure { field: Field, reason: String },

    /// A dependency cycle was detected in the field graph.
    ///
    /// Contains the path of fields involved in the cycle.
    #[error("Cycle detected: {}", format_cycle_path(.path))]
    Cycle { path: Vec<Field> },

    /// Strict mode only: a step read a field no step or seed had set.
    #[error("Read of unset field {0} in strict mode")]
    UnsetRead(Field),

    /// Two default steps (or two overrides for one flow) target the same
    /// field. Caught at registry build time.
    #[error("Duplicate step registered for field {0}")]
    DuplicateStep(Field),

    /// An override or context condition references a field with no default
    /// step. Caught at registry build time.
    #[error("No default step registered for field {0}")]
    MissingStep(Field),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CalcError::CalculationFailure {
            field: Field::InitialAfs,
            reason: "modifier JEI_OFFSET is not numeric".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("INITIAL_AFS"));
        assert!(display.contains("JEI_OFFSET"));
    }

    #[test]
    fn test_cycle_error_display() {
        let err = CalcError::Cycle {
            path: vec![Field::InitialAfs, Field::UncommittedAfs, Field::InitialAfs],
        };
        let display = err.to_string();
        assert!(display.contains("Cycle detected"));
        assert!(display.contains("INITIAL_AFS -> UNCOMMITTED_AFS -> INITIAL_AFS"));
    }
}
