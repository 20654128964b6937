//! Channel modifier parameters.
//!
//! A `ModifierSet` scopes one channel's non-standard behavior: a named bag
//! of auxiliary parameters consulted by formula steps. It is constructed
//! once per calculation request and never mutated mid-evaluation.
//!
//! Values are a closed tagged variant rather than an open "any" type, so
//! formulas can match exhaustively instead of runtime-casting.

use crate::flow::Flow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One auxiliary parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModifierValue {
    Number(Decimal),
    Text(String),
    Flag(bool),
}

/// A named bag of auxiliary parameters scoping one channel's behavior.
///
/// Immutable once constructed; additions only happen through the builder
/// methods during the construction phase.
///
/// # Examples
///
/// ```rust
/// use atscalc::{Flow, ModifierSet};
/// use rust_decimal::Decimal;
///
/// let modifiers = ModifierSet::for_flow(Flow::Jei)
///     .with_number("JEI_OFFSET", Decimal::from(3))
///     .with_flag("SKIP_DAMAGED", true);
///
/// assert_eq!(modifiers.flow(), Flow::Jei);
/// assert_eq!(modifiers.number("JEI_OFFSET"), Some(Decimal::from(3)));
/// assert_eq!(modifiers.flag("SKIP_DAMAGED"), Some(true));
/// assert_eq!(modifiers.number("MISSING"), None);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierSet {
    flow: Flow,
    values: HashMap<String, ModifierValue>,
}

impl ModifierSet {
    /// Create an empty modifier set for a channel.
    pub fn for_flow(flow: Flow) -> Self {
        Self {
            flow,
            values: HashMap::new(),
        }
    }

    /// The channel this set scopes.
    pub fn flow(&self) -> Flow {
        self.flow
    }

    /// Add a numeric parameter (builder style).
    pub fn with_number(mut self, key: impl Into<String>, value: Decimal) -> Self {
        self.values.insert(key.into(), ModifierValue::Number(value));
        self
    }

    /// Add a text parameter (builder style).
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(key.into(), ModifierValue::Text(value.into()));
        self
    }

    /// Add a boolean parameter (builder style).
    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.values.insert(key.into(), ModifierValue::Flag(value));
        self
    }

    /// Get a parameter, whatever its variant.
    pub fn get(&self, key: &str) -> Option<&ModifierValue> {
        self.values.get(key)
    }

    /// Get a numeric parameter. `None` when absent or not numeric.
    pub fn number(&self, key: &str) -> Option<Decimal> {
        match self.values.get(key) {
            Some(ModifierValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Get a text parameter. `None` when absent or not text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ModifierValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Get a boolean parameter. `None` when absent or not a flag.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ModifierValue::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// Check if a parameter exists under any variant.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_typed_accessors() {
        let modifiers = ModifierSet::for_flow(Flow::Jei)
            .with_number("OFFSET", dec!(2.5))
            .with_text("REGION", "EU")
            .with_flag("ACTIVE", true);

        assert_eq!(modifiers.number("OFFSET"), Some(dec!(2.5)));
        assert_eq!(modifiers.text("REGION"), Some("EU"));
        assert_eq!(modifiers.flag("ACTIVE"), Some(true));
    }

    #[test]
    fn test_variant_mismatch_returns_none() {
        let modifiers = ModifierSet::for_flow(Flow::Dotcom).with_text("OFFSET", "not a number");
        assert_eq!(modifiers.number("OFFSET"), None);
        assert!(modifiers.contains_key("OFFSET"));
    }

    #[test]
    fn test_missing_key() {
        let modifiers = ModifierSet::for_flow(Flow::Retail);
        assert_eq!(modifiers.get("MISSING"), None);
        assert!(!modifiers.contains_key("MISSING"));
    }
}
