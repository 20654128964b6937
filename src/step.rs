//! Calculation step module.
//!
//! A step is the unit of computation: a target field, its declared
//! dependency fields, and a pure rule producing the field's value from the
//! resolved dependencies and the active modifier set. The engine ensures
//! dependencies are resolved before a step runs.
//!
//! Variants: constant, pass-through (value already seeded externally), and
//! formula-derived. Flow overrides are ordinary steps registered against a
//! `(field, flow)` pair in the registry, not a separate type.

use crate::error::CalcError;
use crate::field::Field;
use crate::modifier::ModifierSet;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Inputs handed to a step's compute rule.
///
/// `current` is the target field's value at the moment the step runs (zero
/// when unset); `deps` holds the resolved value of every declared
/// dependency; `modifiers` is the request's channel parameter bag.
pub struct StepInputs<'a> {
    pub current: Decimal,
    pub deps: &'a HashMap<Field, Decimal>,
    pub modifiers: &'a ModifierSet,
}

impl StepInputs<'_> {
    /// Resolved value of one declared dependency, zero when the engine
    /// collected nothing for it.
    pub fn dep(&self, field: Field) -> Decimal {
        self.deps.get(&field).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Trait for steps that compute one field's value.
///
/// Compute rules are pure: the same inputs always produce the same output,
/// and inputs are never mutated. Dependencies must be declared explicitly;
/// the registry uses them to build the field dependency graph.
pub trait Step: Send + Sync {
    /// The field this step writes.
    fn target(&self) -> Field;

    /// Fields that must be resolved before this step runs.
    fn depends_on(&self) -> Vec<Field>;

    /// Compute the target field's value.
    fn compute(&self, inputs: &StepInputs<'_>) -> Result<Decimal, CalcError>;

    /// Human-readable description for diagnostics.
    fn description(&self) -> String {
        format!("step for {}", self.target())
    }
}

/// A step that always writes a fixed literal, ignoring context and
/// modifiers.
///
/// # Examples
///
/// ```rust
/// use atscalc::{ConstantStep, Field, Step};
/// use rust_decimal::Decimal;
///
/// let step = ConstantStep::new(Field::Need, Decimal::from(10));
/// assert_eq!(step.target(), Field::Need);
/// assert!(step.depends_on().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ConstantStep {
    field: Field,
    value: Decimal,
}

impl ConstantStep {
    pub fn new(field: Field, value: Decimal) -> Self {
        Self { field, value }
    }
}

impl Step for ConstantStep {
    fn target(&self) -> Field {
        self.field
    }

    fn depends_on(&self) -> Vec<Field> {
        Vec::new()
    }

    fn compute(&self, _inputs: &StepInputs<'_>) -> Result<Decimal, CalcError> {
        Ok(self.value)
    }

    fn description(&self) -> String {
        format!("constant {} = {}", self.field, self.value)
    }
}

/// A step for fields whose value the caller seeded into the context.
///
/// Writes the already-present value back unchanged, which guards against
/// uninitialized reads downstream and puts seeded inputs on the history
/// trail. Declares its own field as a dependency so strict-mode contexts
/// flag a missing seed; the registry skips the self-edge when building the
/// graph.
#[derive(Debug, Clone)]
pub struct PassThroughStep {
    field: Field,
}

impl PassThroughStep {
    pub fn new(field: Field) -> Self {
        Self { field }
    }
}

impl Step for PassThroughStep {
    fn target(&self) -> Field {
        self.field
    }

    fn depends_on(&self) -> Vec<Field> {
        vec![self.field]
    }

    fn compute(&self, inputs: &StepInputs<'_>) -> Result<Decimal, CalcError> {
        Ok(inputs.current)
    }

    fn description(&self) -> String {
        format!("pass-through {}", self.field)
    }
}

type FormulaFn =
    dyn Fn(&StepInputs<'_>) -> Result<Decimal, String> + Send + Sync;

/// A step computing its field from a pure function of the dependency map
/// and the modifier set.
///
/// Any error the function reports is surfaced as
/// [`CalcError::CalculationFailure`] naming the target field; the engine
/// aborts the whole evaluation on it.
///
/// # Examples
///
/// ```rust
/// use atscalc::{Field, FormulaStep, Step};
///
/// let step = FormulaStep::new(
///     Field::InitialAfs,
///     vec![Field::OnHand, Field::Lost],
///     "ONHAND - LOST",
///     |inputs| Ok(inputs.dep(Field::OnHand) - inputs.dep(Field::Lost)),
/// );
/// assert_eq!(step.depends_on(), vec![Field::OnHand, Field::Lost]);
/// ```
pub struct FormulaStep {
    field: Field,
    deps: Vec<Field>,
    description: String,
    func: Box<FormulaFn>,
}

impl FormulaStep {
    pub fn new<F>(field: Field, deps: Vec<Field>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&StepInputs<'_>) -> Result<Decimal, String> + Send + Sync + 'static,
    {
        Self {
            field,
            deps,
            description: description.into(),
            func: Box::new(func),
        }
    }
}

impl Step for FormulaStep {
    fn target(&self) -> Field {
        self.field
    }

    fn depends_on(&self) -> Vec<Field> {
        self.deps.clone()
    }

    fn compute(&self, inputs: &StepInputs<'_>) -> Result<Decimal, CalcError> {
        (self.func)(inputs).map_err(|reason| CalcError::CalculationFailure {
            field: self.field,
            reason,
        })
    }

    fn description(&self) -> String {
        format!("formula {} = {}", self.field, self.description)
    }
}

impl std::fmt::Debug for FormulaStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaStep")
            .field("field", &self.field)
            .field("deps", &self.deps)
            .field("description", &self.description)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Flow;
    use rust_decimal_macros::dec;

    fn inputs<'a>(
        current: Decimal,
        deps: &'a HashMap<Field, Decimal>,
        modifiers: &'a ModifierSet,
    ) -> StepInputs<'a> {
        StepInputs {
            current,
            deps,
            modifiers,
        }
    }

    #[test]
    fn test_constant_step() {
        let step = ConstantStep::new(Field::Need, dec!(7));
        let deps = HashMap::new();
        let modifiers = ModifierSet::for_flow(Flow::Dotcom);

        let value = step
            .compute(&inputs(dec!(999), &deps, &modifiers))
            .unwrap();
        assert_eq!(value, dec!(7));
    }

    #[test]
    fn test_pass_through_returns_current() {
        let step = PassThroughStep::new(Field::OnHand);
        let deps = HashMap::new();
        let modifiers = ModifierSet::for_flow(Flow::Dotcom);

        let value = step.compute(&inputs(dec!(100), &deps, &modifiers)).unwrap();
        assert_eq!(value, dec!(100));
    }

    #[test]
    fn test_formula_step_reads_deps_and_modifiers() {
        let step = FormulaStep::new(
            Field::InitialAfs,
            vec![Field::OnHand, Field::Lost],
            "ONHAND - LOST - JEI_OFFSET",
            |inputs| {
                let offset = inputs.modifiers.number("JEI_OFFSET").unwrap_or(Decimal::ZERO);
                Ok(inputs.dep(Field::OnHand) - inputs.dep(Field::Lost) - offset)
            },
        );

        let mut deps = HashMap::new();
        deps.insert(Field::OnHand, dec!(100));
        deps.insert(Field::Lost, dec!(5));
        let modifiers = ModifierSet::for_flow(Flow::Jei).with_number("JEI_OFFSET", dec!(3));

        let value = step
            .compute(&inputs(Decimal::ZERO, &deps, &modifiers))
            .unwrap();
        assert_eq!(value, dec!(92));
    }

    #[test]
    fn test_formula_failure_names_the_field() {
        let step = FormulaStep::new(Field::UncommittedAfs, vec![], "always fails", |_| {
            Err("bad modifier type".to_string())
        });

        let deps = HashMap::new();
        let modifiers = ModifierSet::for_flow(Flow::Dotcom);
        let err = step
            .compute(&inputs(Decimal::ZERO, &deps, &modifiers))
            .unwrap_err();

        assert_eq!(
            err,
            CalcError::CalculationFailure {
                field: Field::UncommittedAfs,
                reason: "bad modifier type".to_string(),
            }
        );
    }
}
