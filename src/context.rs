//! Calculation context module.
//!
//! The `CalcContext` is the per-request mutable store mapping fields to
//! decimal values. It is created once per calculation request, mutated only
//! by steps during evaluation, and read by the caller after completion.
//!
//! Lookups of unset fields return zero, never absence. An append-only
//! history per field records every value it held, including each flow's
//! intermediate write, for post-hoc inspection by diagnostics.

use crate::error::CalcError;
use crate::field::Field;
use crate::flow::Flow;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// One recorded write to a field.
///
/// `flow` is `None` for seed and canonical writes, `Some` for a flow's
/// intermediate value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub flow: Option<Flow>,
    pub value: Decimal,
}

/// Per-request mutable field store with default-zero lookup.
///
/// # Examples
///
/// ```rust
/// use atscalc::{CalcContext, Field};
/// use rust_decimal::Decimal;
///
/// let mut ctx = CalcContext::new();
/// assert_eq!(ctx.get(Field::OnHand), Decimal::ZERO);
///
/// ctx.put(Field::OnHand, Decimal::from(100));
/// assert_eq!(ctx.get(Field::OnHand), Decimal::from(100));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CalcContext {
    values: HashMap<Field, Decimal>,
    flow_values: HashMap<(Field, Flow), Decimal>,
    history: HashMap<Field, Vec<HistoryEntry>>,
    strict: bool,
}

impl CalcContext {
    /// Create a new empty context with the lenient (default-zero) read
    /// contract.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context in strict mode: [`CalcContext::read`] fails on the
    /// first read of a field nothing has set, instead of defaulting to zero.
    /// Useful for catching registration-order bugs in tests.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Whether this context was built in strict mode.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Get a field's canonical value, or zero when unset.
    ///
    /// Never fails; absent values are a normal state, not an error.
    pub fn get(&self, field: Field) -> Decimal {
        self.values.get(&field).copied().unwrap_or(Decimal::ZERO)
    }

    /// Strict-aware read used by the engine when collecting step
    /// dependencies. In lenient mode this is [`CalcContext::get`]; in strict
    /// mode an unset field is a [`CalcError::UnsetRead`].
    pub fn read(&self, field: Field) -> Result<Decimal, CalcError> {
        match self.values.get(&field) {
            Some(value) => Ok(*value),
            None if self.strict => Err(CalcError::UnsetRead(field)),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Get the value a specific flow computed for a field, falling back to
    /// the canonical value (and then zero) when that flow never wrote it.
    pub fn get_for_flow(&self, field: Field, flow: Flow) -> Decimal {
        self.flow_values
            .get(&(field, flow))
            .copied()
            .unwrap_or_else(|| self.get(field))
    }

    /// Store a field's canonical value, overwriting any prior value and
    /// appending to the field's history.
    pub fn put(&mut self, field: Field, value: Decimal) {
        self.values.insert(field, value);
        self.history
            .entry(field)
            .or_default()
            .push(HistoryEntry { flow: None, value });
    }

    /// Record the value one flow computed for a field. Does not change the
    /// canonical value; the engine reconciles that separately.
    pub fn put_for_flow(&mut self, field: Field, flow: Flow, value: Decimal) {
        self.flow_values.insert((field, flow), value);
        self.history.entry(field).or_default().push(HistoryEntry {
            flow: Some(flow),
            value,
        });
    }

    /// Whether any write (seed, flow, or canonical) has touched a field.
    pub fn is_set(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// Snapshot of the final canonical state. Used after evaluation
    /// completes.
    pub fn snapshot(&self) -> HashMap<Field, Decimal> {
        self.values.clone()
    }

    /// Full write history of a field, oldest first. Empty for unset fields.
    pub fn history(&self, field: Field) -> &[HistoryEntry] {
        self.history.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unset_field_reads_zero() {
        let ctx = CalcContext::new();
        assert_eq!(ctx.get(Field::OnHand), Decimal::ZERO);
        assert_eq!(ctx.read(Field::OnHand).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_put_overwrites_and_appends_history() {
        let mut ctx = CalcContext::new();
        ctx.put(Field::OnHand, dec!(100));
        ctx.put(Field::OnHand, dec!(80));

        assert_eq!(ctx.get(Field::OnHand), dec!(80));
        let history = ctx.history(Field::OnHand);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].value, dec!(100));
        assert_eq!(history[1].value, dec!(80));
    }

    #[test]
    fn test_flow_value_falls_back_to_canonical() {
        let mut ctx = CalcContext::new();
        ctx.put(Field::InitialAfs, dec!(83));
        ctx.put_for_flow(Field::InitialAfs, Flow::Jei, dec!(95));

        assert_eq!(ctx.get_for_flow(Field::InitialAfs, Flow::Jei), dec!(95));
        assert_eq!(ctx.get_for_flow(Field::InitialAfs, Flow::Retail), dec!(83));
        // Canonical value is untouched by flow writes.
        assert_eq!(ctx.get(Field::InitialAfs), dec!(83));
    }

    #[test]
    fn test_strict_mode_fails_on_unset_read() {
        let ctx = CalcContext::strict();
        let err = ctx.read(Field::Lost).unwrap_err();
        assert_eq!(err, CalcError::UnsetRead(Field::Lost));
    }

    #[test]
    fn test_strict_mode_get_stays_lenient() {
        let ctx = CalcContext::strict();
        assert_eq!(ctx.get(Field::Lost), Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_reflects_final_state() {
        let mut ctx = CalcContext::new();
        ctx.put(Field::OnHand, dec!(100));
        ctx.put(Field::Lost, dec!(5));

        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[&Field::OnHand], dec!(100));
        assert_eq!(snapshot[&Field::Lost], dec!(5));
    }
}
