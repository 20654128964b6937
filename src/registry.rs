//! Step registry module.
//!
//! The registry owns every registered step: one default step per field,
//! optional per-flow override steps (the flow variant table), optional
//! context-condition rules reconciling multi-flow values, and the
//! reservation schedule. It is assembled once at startup through
//! `RegistryBuilder`, validated and frozen by `build()`, and shared
//! read-only by every concurrent calculation request afterwards.
//!
//! The field dependency graph is constructed at build time from declared
//! dependencies; evaluation order comes from its batches, never from
//! registration order.

use crate::constraint::Reservation;
use crate::error::CalcError;
use crate::field::Field;
use crate::flow::Flow;
use crate::graph::FieldGraph;
use crate::step::Step;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Per-flow values of one field, handed to a context-condition rule.
#[derive(Debug, Clone, Default)]
pub struct FlowValues {
    values: HashMap<Flow, Decimal>,
}

impl FlowValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, flow: Flow, value: Decimal) {
        self.values.insert(flow, value);
    }

    /// The value one flow computed, if it ran a step for the field.
    pub fn get(&self, flow: Flow) -> Option<Decimal> {
        self.values.get(&flow).copied()
    }

    /// The default flow's value, zero when it computed nothing.
    pub fn default_flow_value(&self) -> Decimal {
        self.get(Flow::default_flow()).unwrap_or(Decimal::ZERO)
    }
}

/// A context-condition rule: reconciles per-flow values of one field into
/// the canonical context value.
pub type ConditionFn = dyn Fn(&FlowValues) -> Decimal + Send + Sync;

/// Builder for a [`StepRegistry`].
///
/// # Examples
///
/// ```rust
/// use atscalc::registry::RegistryBuilder;
/// use atscalc::{Field, Flow, FormulaStep, PassThroughStep};
///
/// let registry = RegistryBuilder::new()
///     .default_step(Box::new(PassThroughStep::new(Field::OnHand)))
///     .default_step(Box::new(FormulaStep::new(
///         Field::InitialAfs,
///         vec![Field::OnHand],
///         "ONHAND",
///         |inputs| Ok(inputs.dep(Field::OnHand)),
///     )))
///     .build()
///     .unwrap();
///
/// assert!(registry.step_for(Field::InitialAfs, Flow::Dotcom).is_some());
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    defaults: Vec<Box<dyn Step>>,
    overrides: Vec<(Flow, Box<dyn Step>)>,
    conditions: HashMap<Field, Box<ConditionFn>>,
    schedule: Vec<Reservation>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field's default step, used by every flow without an
    /// override.
    pub fn default_step(mut self, step: Box<dyn Step>) -> Self {
        self.defaults.push(step);
        self
    }

    /// Register an override step for one flow. Takes precedence over the
    /// field's default step when that flow is active.
    pub fn override_step(mut self, flow: Flow, step: Box<dyn Step>) -> Self {
        self.overrides.push((flow, step));
        self
    }

    /// Register a context-condition rule reconciling the per-flow values of
    /// one field into its canonical context value.
    pub fn context_condition<F>(mut self, field: Field, rule: F) -> Self
    where
        F: Fn(&FlowValues) -> Decimal + Send + Sync + 'static,
    {
        self.conditions.insert(field, Box::new(rule));
        self
    }

    /// Set the reservation schedule the constraint resolver processes, in
    /// priority order.
    pub fn reservation_schedule(mut self, schedule: Vec<Reservation>) -> Self {
        self.schedule = schedule;
        self
    }

    /// Validate the registration set, build the field graph, and freeze the
    /// registry.
    ///
    /// Fails with [`CalcError::DuplicateStep`] on two steps targeting the
    /// same field for the same flow, [`CalcError::MissingStep`] on an
    /// override or condition for a field with no default step, and
    /// [`CalcError::Cycle`] on circular declared dependencies.
    pub fn build(self) -> Result<StepRegistry, CalcError> {
        let mut defaults: HashMap<Field, Box<dyn Step>> = HashMap::new();
        for step in self.defaults {
            let target = step.target();
            if defaults.insert(target, step).is_some() {
                return Err(CalcError::DuplicateStep(target));
            }
        }

        // Fields owned by the constraint resolver must not also carry steps.
        let mut resolver_fields: HashSet<Field> = HashSet::new();
        for reservation in &self.schedule {
            resolver_fields.insert(reservation.actual);
            resolver_fields.insert(reservation.constraint);
        }
        if !self.schedule.is_empty() {
            resolver_fields.insert(Field::AtsPool);
        }
        for field in &resolver_fields {
            if defaults.contains_key(field) {
                return Err(CalcError::DuplicateStep(*field));
            }
        }

        let mut overrides: HashMap<(Field, Flow), Box<dyn Step>> = HashMap::new();
        for (flow, step) in self.overrides {
            let target = step.target();
            if !defaults.contains_key(&target) {
                return Err(CalcError::MissingStep(target));
            }
            if overrides.insert((target, flow), step).is_some() {
                return Err(CalcError::DuplicateStep(target));
            }
        }

        for field in self.conditions.keys() {
            if !defaults.contains_key(field) {
                return Err(CalcError::MissingStep(*field));
            }
        }

        let batches = Self::build_graph(&defaults, &overrides, &self.schedule)?.batches()?;

        Ok(StepRegistry {
            defaults,
            overrides,
            conditions: self.conditions,
            schedule: self.schedule,
            resolver_fields,
            batches,
        })
    }

    fn build_graph(
        defaults: &HashMap<Field, Box<dyn Step>>,
        overrides: &HashMap<(Field, Flow), Box<dyn Step>>,
        schedule: &[Reservation],
    ) -> Result<FieldGraph, CalcError> {
        let mut graph = FieldGraph::new();

        // A self-dependency (pass-through steps reading their own seeded
        // value) is not a graph edge.
        for (field, step) in defaults {
            graph.add_node(*field);
            for dep in step.depends_on() {
                if dep != *field {
                    graph.add_edge(*field, dep);
                }
            }
        }
        // An override's dependency set may differ from the default's; the
        // field must wait for the union of both.
        for ((field, _flow), step) in overrides {
            for dep in step.depends_on() {
                if dep != *field {
                    graph.add_edge(*field, dep);
                }
            }
        }

        // Resolver-owned nodes: each pair waits on its request and the pool
        // seed; the chain edges pin the total priority order; the pool node
        // completes after the last reservation type.
        let mut previous_actual: Option<Field> = None;
        for reservation in schedule {
            graph.add_edge(reservation.actual, reservation.request);
            graph.add_edge(reservation.actual, Field::UncommittedAfs);
            graph.add_edge(reservation.constraint, reservation.request);
            graph.add_edge(reservation.constraint, Field::UncommittedAfs);
            if let Some(prev) = previous_actual {
                graph.add_edge(reservation.actual, prev);
            }
            graph.add_edge(Field::AtsPool, reservation.actual);
            previous_actual = Some(reservation.actual);
        }

        Ok(graph)
    }
}

/// Immutable step registry shared by all calculation requests.
///
/// Fully built before the first request, never mutated afterwards; safe for
/// concurrent reads.
pub struct StepRegistry {
    defaults: HashMap<Field, Box<dyn Step>>,
    overrides: HashMap<(Field, Flow), Box<dyn Step>>,
    conditions: HashMap<Field, Box<ConditionFn>>,
    schedule: Vec<Reservation>,
    resolver_fields: HashSet<Field>,
    batches: Vec<Vec<Field>>,
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("defaults", &self.defaults.keys().collect::<Vec<_>>())
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .field("schedule", &self.schedule)
            .field("resolver_fields", &self.resolver_fields)
            .field("batches", &self.batches)
            .finish()
    }
}

impl StepRegistry {
    /// Dependency-ordered field batches. Fields within one batch are
    /// mutually independent.
    pub fn batches(&self) -> &[Vec<Field>] {
        &self.batches
    }

    /// The step a flow runs for a field: the flow's override when
    /// registered, otherwise the default step. Exactly one per flow per
    /// field.
    pub fn step_for(&self, field: Field, flow: Flow) -> Option<&dyn Step> {
        self.overrides
            .get(&(field, flow))
            .or_else(|| self.defaults.get(&field))
            .map(|b| b.as_ref())
    }

    /// Whether a flow has its own override step for a field.
    pub fn has_override(&self, field: Field, flow: Flow) -> bool {
        self.overrides.contains_key(&(field, flow))
    }

    /// The context-condition rule for a field, if one is registered.
    pub fn condition(&self, field: Field) -> Option<&ConditionFn> {
        self.conditions.get(&field).map(|b| b.as_ref())
    }

    /// The reservation schedule in priority order.
    pub fn schedule(&self) -> &[Reservation] {
        &self.schedule
    }

    /// Whether the constraint resolver (not a step) produces this field.
    pub fn is_resolver_field(&self, field: Field) -> bool {
        self.resolver_fields.contains(&field)
    }
}
