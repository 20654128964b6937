//! Evaluation engine module.
//!
//! The engine drives one calculation request to completion: it walks the
//! registry's dependency-ordered batches, runs each field's step once per
//! flow (override steps taking precedence for their flow), reconciles
//! multi-flow values through context conditions, and delegates
//! constraint/actual fields to the constraint resolver.
//!
//! Evaluation is synchronous and single-threaded. The context and modifier
//! set are private to the request; the registry is the only shared state
//! and is read-only.

use crate::constraint::ConstraintResolver;
use crate::context::CalcContext;
use crate::error::CalcError;
use crate::field::Field;
use crate::flow::Flow;
use crate::modifier::ModifierSet;
use crate::registry::{FlowValues, StepRegistry};
use crate::step::{Step, StepInputs};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Drives step evaluation against an immutable registry.
///
/// # Examples
///
/// ```rust
/// use atscalc::{CalcContext, Engine, Field, Flow, ModifierSet, StepRegistry};
/// use rust_decimal::Decimal;
///
/// let registry = StepRegistry::standard().unwrap();
/// let engine = Engine::new(&registry);
///
/// let mut ctx = CalcContext::new();
/// ctx.put(Field::OnHand, Decimal::from(100));
/// ctx.put(Field::MerchandiseReserve, Decimal::from(10));
/// ctx.put(Field::Lost, Decimal::from(5));
/// ctx.put(Field::Damaged, Decimal::from(2));
///
/// let modifiers = ModifierSet::for_flow(Flow::Dotcom);
/// engine.run(&mut ctx, &modifiers).unwrap();
///
/// // Default-channel figure; the canonical value may differ when an
/// // alternate channel's override wins the context condition.
/// assert_eq!(ctx.get_for_flow(Field::InitialAfs, Flow::Dotcom), Decimal::from(83));
/// ```
pub struct Engine<'a> {
    registry: &'a StepRegistry,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a StepRegistry) -> Self {
        Self { registry }
    }

    /// Evaluate every batch to completion.
    ///
    /// Any step failure aborts the whole request; the context must not be
    /// reused after an error. Re-running on a fresh context built from the
    /// same seed and modifier set produces identical output.
    pub fn run(&self, ctx: &mut CalcContext, modifiers: &ModifierSet) -> Result<(), CalcError> {
        let mut resolver_ran = false;

        for (batch_index, batch) in self.registry.batches().iter().enumerate() {
            trace!(batch_index, fields = batch.len(), "executing batch");

            for field in batch {
                if self.registry.is_resolver_field(*field) {
                    // The resolver processes its whole schedule in one pass
                    // the first time any of its fields is reached.
                    if !resolver_ran {
                        ConstraintResolver::new(self.registry.schedule()).resolve(ctx)?;
                        resolver_ran = true;
                    }
                    continue;
                }
                self.run_field(*field, ctx, modifiers)?;
            }
        }

        Ok(())
    }

    /// Run one field's step for every flow and store the canonical value.
    fn run_field(
        &self,
        field: Field,
        ctx: &mut CalcContext,
        modifiers: &ModifierSet,
    ) -> Result<(), CalcError> {
        // Fields that appear in the graph only as dependencies (seeded
        // inputs without a registered step) keep their context value.
        if self.registry.step_for(field, Flow::default_flow()).is_none() {
            return Ok(());
        }

        let mut flow_values = FlowValues::new();
        for flow in Flow::ALL {
            let step = match self.registry.step_for(field, *flow) {
                Some(step) => step,
                None => continue,
            };
            let value = self.run_step(step, *flow, ctx, modifiers)?;
            ctx.put_for_flow(field, *flow, value);
            flow_values.insert(*flow, value);
        }

        let canonical = match self.registry.condition(field) {
            Some(rule) => rule(&flow_values),
            None => flow_values.default_flow_value(),
        };
        debug!(%field, value = %canonical, "field resolved");
        ctx.put(field, canonical);

        Ok(())
    }

    fn run_step(
        &self,
        step: &dyn Step,
        flow: Flow,
        ctx: &CalcContext,
        modifiers: &ModifierSet,
    ) -> Result<Decimal, CalcError> {
        let mut deps = HashMap::new();
        for dep in step.depends_on() {
            // Strict-mode unset check runs against the canonical store; the
            // collected value prefers the flow's own upstream result.
            ctx.read(dep)?;
            deps.insert(dep, ctx.get_for_flow(dep, flow));
        }

        let inputs = StepInputs {
            current: ctx.get_for_flow(step.target(), flow),
            deps: &deps,
            modifiers,
        };
        step.compute(&inputs)
    }
}
