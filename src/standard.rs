//! Standard production registry wiring.
//!
//! One static table, assembled at startup: pass-through steps for every raw
//! input, the available-for-sale formulas with the JEI channel override and
//! its reconciliation rule, the reservation schedule, channel aggregates,
//! and the per-channel output quantities.

use crate::constraint::standard_schedule;
use crate::error::CalcError;
use crate::field::{Field, FieldCategory};
use crate::flow::Flow;
use crate::registry::{FlowValues, RegistryBuilder, StepRegistry};
use crate::step::{FormulaStep, PassThroughStep};
use rust_decimal::Decimal;

/// Modifier key for the JEI channel's carve-out quantity, subtracted from
/// its initial available-for-sale figure when present.
pub const JEI_CARVE_OUT: &str = "JEI_CARVE_OUT";

/// Prefer an alternate channel's value over the default flow's when the
/// alternate is positive and actually differs.
fn prefer_alternate(flow: Flow) -> impl Fn(&FlowValues) -> Decimal + Send + Sync + 'static {
    move |values: &FlowValues| {
        let default = values.default_flow_value();
        match values.get(flow) {
            Some(alternate) if alternate > Decimal::ZERO && alternate != default => alternate,
            _ => default,
        }
    }
}

impl StepRegistry {
    /// The full production step table.
    ///
    /// Built once at startup and shared read-only by every request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atscalc::StepRegistry;
    ///
    /// let registry = StepRegistry::standard().unwrap();
    /// assert_eq!(registry.schedule().len(), 12);
    /// ```
    pub fn standard() -> Result<StepRegistry, CalcError> {
        let mut builder = RegistryBuilder::new();

        // Seeded raw inputs pass through unchanged.
        for field in Field::ALL {
            if field.category() == FieldCategory::Input {
                builder = builder.default_step(Box::new(PassThroughStep::new(*field)));
            }
        }

        builder = builder
            .default_step(Box::new(FormulaStep::new(
                Field::InitialAfs,
                vec![
                    Field::OnHand,
                    Field::MerchandiseReserve,
                    Field::Lost,
                    Field::Damaged,
                ],
                "ONHAND - MERCH_RESERVE - LOST - DAMAGED",
                |inputs| {
                    Ok(inputs.dep(Field::OnHand)
                        - inputs.dep(Field::MerchandiseReserve)
                        - inputs.dep(Field::Lost)
                        - inputs.dep(Field::Damaged))
                },
            )))
            // JEI sells from the merchandise reserve and ignores damage
            // write-offs; an optional carve-out quantity comes in as a
            // channel modifier.
            .override_step(
                Flow::Jei,
                Box::new(FormulaStep::new(
                    Field::InitialAfs,
                    vec![Field::OnHand, Field::Lost],
                    "ONHAND - LOST - JEI_CARVE_OUT",
                    |inputs| {
                        let carve_out = inputs
                            .modifiers
                            .number(JEI_CARVE_OUT)
                            .unwrap_or(Decimal::ZERO);
                        Ok(inputs.dep(Field::OnHand) - inputs.dep(Field::Lost) - carve_out)
                    },
                )),
            )
            .context_condition(Field::InitialAfs, prefer_alternate(Flow::Jei))
            .default_step(Box::new(FormulaStep::new(
                Field::UncommittedAfs,
                vec![Field::InitialAfs],
                "INITIAL_AFS",
                |inputs| Ok(inputs.dep(Field::InitialAfs)),
            )))
            .context_condition(Field::UncommittedAfs, prefer_alternate(Flow::Jei))
            .reservation_schedule(standard_schedule())
            .default_step(Box::new(FormulaStep::new(
                Field::DotcomReserveTotal,
                vec![
                    Field::DotcomHardReserveAtsYesActual,
                    Field::DotcomHardReserveAtsNoActual,
                    Field::DotcomSoftReserveActual,
                ],
                "sum of dotcom reserve actuals",
                |inputs| {
                    Ok(inputs.dep(Field::DotcomHardReserveAtsYesActual)
                        + inputs.dep(Field::DotcomHardReserveAtsNoActual)
                        + inputs.dep(Field::DotcomSoftReserveActual))
                },
            )))
            .default_step(Box::new(FormulaStep::new(
                Field::RetailReserveTotal,
                vec![
                    Field::RetailPickReserveActual,
                    Field::RetailHardReserveAtsYesActual,
                    Field::RetailHardReserveAtsNoActual,
                    Field::RetailSoftReserveActual,
                ],
                "sum of retail reserve actuals",
                |inputs| {
                    Ok(inputs.dep(Field::RetailPickReserveActual)
                        + inputs.dep(Field::RetailHardReserveAtsYesActual)
                        + inputs.dep(Field::RetailHardReserveAtsNoActual)
                        + inputs.dep(Field::RetailSoftReserveActual))
                },
            )))
            // A channel may sell the free pool plus its own sellable
            // reserves: hard reserves flagged ATS-yes and its soft reserve.
            .default_step(Box::new(FormulaStep::new(
                Field::DotcomAts,
                vec![
                    Field::AtsPool,
                    Field::DotcomHardReserveAtsYesActual,
                    Field::DotcomSoftReserveActual,
                ],
                "ATS_POOL + dotcom sellable reserves",
                |inputs| {
                    Ok(inputs.dep(Field::AtsPool)
                        + inputs.dep(Field::DotcomHardReserveAtsYesActual)
                        + inputs.dep(Field::DotcomSoftReserveActual))
                },
            )))
            .default_step(Box::new(FormulaStep::new(
                Field::RetailAts,
                vec![
                    Field::AtsPool,
                    Field::RetailHardReserveAtsYesActual,
                    Field::RetailSoftReserveActual,
                ],
                "ATS_POOL + retail sellable reserves",
                |inputs| {
                    Ok(inputs.dep(Field::AtsPool)
                        + inputs.dep(Field::RetailHardReserveAtsYesActual)
                        + inputs.dep(Field::RetailSoftReserveActual))
                },
            )));

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_builds() {
        let registry = StepRegistry::standard().unwrap();
        assert!(registry.has_override(Field::InitialAfs, Flow::Jei));
        assert!(registry.condition(Field::InitialAfs).is_some());
        assert!(registry.is_resolver_field(Field::NeedActual));
        assert!(registry.is_resolver_field(Field::AtsPool));
    }

    #[test]
    fn test_outputs_batch_after_resolver_fields() {
        let registry = StepRegistry::standard().unwrap();
        let batch_of = |field: Field| {
            registry
                .batches()
                .iter()
                .position(|batch| batch.contains(&field))
                .unwrap()
        };

        assert!(batch_of(Field::UncommittedAfs) < batch_of(Field::ShipNotBilledActual));
        assert!(batch_of(Field::NeedActual) < batch_of(Field::AtsPool));
        assert!(batch_of(Field::AtsPool) < batch_of(Field::DotcomAts));
        assert!(batch_of(Field::DotcomSoftReserveActual) < batch_of(Field::DotcomReserveTotal));
    }
}
