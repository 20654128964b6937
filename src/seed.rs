//! Seed-value normalization.
//!
//! The initial-value supplier is an external collaborator that produces a
//! name-to-decimal mapping for the raw input fields. `SeedValues` is the
//! boundary type: it validates names against the closed catalog, normalizes
//! missing inputs to zero, and seeds a fresh calculation context.

use crate::context::CalcContext;
use crate::error::CalcError;
use crate::field::{Field, FieldCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Validated raw input values for one calculation request.
///
/// # Examples
///
/// ```rust
/// use atscalc::{Field, SeedValues};
/// use rust_decimal::Decimal;
/// use std::collections::HashMap;
///
/// let mut raw = HashMap::new();
/// raw.insert("ONHAND".to_string(), Decimal::from(100));
/// raw.insert("LOST".to_string(), Decimal::from(5));
///
/// let seed = SeedValues::from_named(raw).unwrap();
/// let ctx = seed.into_context();
/// assert_eq!(ctx.get(Field::OnHand), Decimal::from(100));
/// // Missing inputs normalize to zero.
/// assert_eq!(ctx.get(Field::Damaged), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedValues {
    values: HashMap<Field, Decimal>,
}

impl SeedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a supplier's name-keyed mapping.
    ///
    /// Fails with [`CalcError::UnknownField`] for any name outside the
    /// catalog. Absent input fields are treated as zero when applied.
    pub fn from_named(raw: HashMap<String, Decimal>) -> Result<Self, CalcError> {
        let mut values = HashMap::new();
        for (name, value) in raw {
            values.insert(Field::from_name(&name)?, value);
        }
        Ok(Self { values })
    }

    /// Set one input value.
    pub fn set(&mut self, field: Field, value: Decimal) {
        self.values.insert(field, value);
    }

    /// Seed a context: every catalog input field is written, supplied values
    /// as-is and missing ones as zero, so downstream history and strict-mode
    /// reads see a fully initialized input layer.
    pub fn apply(&self, ctx: &mut CalcContext) {
        for field in Field::ALL {
            if field.category() == FieldCategory::Input {
                let value = self.values.get(field).copied().unwrap_or(Decimal::ZERO);
                ctx.put(*field, value);
            }
        }
    }

    /// Convenience: a fresh lenient context seeded from these values.
    pub fn into_context(self) -> CalcContext {
        let mut ctx = CalcContext::new();
        self.apply(&mut ctx);
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unknown_name_rejected() {
        let mut raw = HashMap::new();
        raw.insert("NOT_A_FIELD".to_string(), dec!(1));

        let err = SeedValues::from_named(raw).unwrap_err();
        assert!(matches!(err, CalcError::UnknownField(name) if name == "NOT_A_FIELD"));
    }

    #[test]
    fn test_missing_inputs_normalize_to_zero() {
        let mut seed = SeedValues::new();
        seed.set(Field::OnHand, dec!(42));

        let mut ctx = CalcContext::strict();
        seed.apply(&mut ctx);

        assert_eq!(ctx.get(Field::OnHand), dec!(42));
        // Every input field is initialized, so strict reads succeed.
        assert_eq!(ctx.read(Field::Need).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_only_input_fields_are_seeded() {
        let seed = SeedValues::new();
        let ctx = seed.into_context();
        assert!(!ctx.is_set(Field::InitialAfs));
        assert!(!ctx.is_set(Field::AtsPool));
    }
}
