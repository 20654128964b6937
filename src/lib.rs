//! # atscalc - Deterministic Available-To-Sell Calculation Engine
//!
//! A calculation engine that derives inventory-allocation figures for one
//! SKU/location record from a small set of raw input quantities:
//! - **Deterministic** evaluation (same seed and modifiers → same output)
//! - **Dependency-ordered** (fields are batched by a topologically sorted
//!   dependency graph, never by registration order)
//! - **Flow-aware** (a field may carry a channel-specific override formula)
//! - **Shortfall-aware** (every reservation request resolves into a
//!   constrained "actual" and a "constraint" shortfall against one running
//!   pool)
//!
//! ## Core Concepts
//!
//! ### Calculation Pipeline
//!
//! ```text
//! [SeedValues] → [CalcContext] → [Engine over StepRegistry] → snapshot
//! ```
//!
//! 1. **Seeds** place the raw input quantities in a fresh context
//! 2. **Steps** compute each field once per flow, overrides taking
//!    precedence for their flow
//! 3. **Context conditions** reconcile multi-flow values into one canonical
//!    value per field
//! 4. **The constraint resolver** depletes the running pool across
//!    reservation types in a fixed priority order
//!
//! ## Example
//!
//! ```rust
//! use atscalc::*;
//! use rust_decimal::Decimal;
//!
//! let registry = StepRegistry::standard().unwrap();
//! let engine = Engine::new(&registry);
//!
//! let mut seed = SeedValues::new();
//! seed.set(Field::OnHand, Decimal::from(100));
//! seed.set(Field::MerchandiseReserve, Decimal::from(10));
//! seed.set(Field::Lost, Decimal::from(5));
//! seed.set(Field::Damaged, Decimal::from(2));
//!
//! let mut ctx = seed.into_context();
//! engine.run(&mut ctx, &ModifierSet::for_flow(Flow::Dotcom)).unwrap();
//!
//! // 100 - 10 - 5 - 2 for the default channel
//! assert_eq!(ctx.get_for_flow(Field::InitialAfs, Flow::Dotcom), Decimal::from(83));
//! // The JEI channel override (100 - 5) wins the context condition.
//! assert_eq!(ctx.get(Field::InitialAfs), Decimal::from(95));
//! ```
//!
//! ## Modules
//!
//! - [`field`] - Closed field catalog with categories and suffix pairing
//! - [`flow`] - Order-intake channel identifiers
//! - [`context`] - Per-request field store with history
//! - [`modifier`] - Channel modifier parameters
//! - [`step`] - Step variants (constant, pass-through, formula)
//! - [`registry`] - Step registry, flow variant table, context conditions
//! - [`constraint`] - Constraint resolver and running pool
//! - [`engine`] - Batch-driven evaluation engine
//! - [`seed`] - Raw input normalization
//! - [`graph`] - Field dependency graph
//! - [`error`] - Error types

pub mod constraint;
pub mod context;
pub mod engine;
pub mod error;
pub mod field;
pub mod flow;
pub mod graph;
pub mod modifier;
pub mod registry;
pub mod seed;
pub mod standard;
pub mod step;

// Re-export main types for convenience
pub use context::{CalcContext, HistoryEntry};
pub use engine::Engine;
pub use error::CalcError;
pub use field::{Field, FieldCategory};
pub use flow::Flow;
pub use modifier::{ModifierSet, ModifierValue};
pub use registry::{FlowValues, RegistryBuilder, StepRegistry};
pub use seed::SeedValues;
pub use step::{ConstantStep, FormulaStep, PassThroughStep, Step, StepInputs};

// Re-export constraint types
pub use constraint::{standard_schedule, ConstraintResolver, Reservation};
