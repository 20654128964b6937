//! Constraint resolution and running-pool bookkeeping.
//!
//! Every reservation-type field has a paired constraint field (the
//! shortfall between the requested amount and what the pool could cover)
//! and a paired actual field (the amount truly consumable). Reservation
//! types are processed in one fixed total priority order, greedily
//! depleting a running pool seeded from the uncommitted available-for-sale
//! quantity. This is greedy-sequential allocation, not max-flow: order
//! matters.

use crate::context::CalcContext;
use crate::error::CalcError;
use crate::field::Field;
use rust_decimal::Decimal;
use tracing::debug;

/// One reservation type: the requested field and its derived pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub request: Field,
    pub actual: Field,
    pub constraint: Field,
}

impl Reservation {
    /// Build the pair for a request field from the suffix convention.
    ///
    /// `None` when the catalog has no registered actual or constraint
    /// counterpart for the field.
    pub fn for_request(request: Field) -> Option<Reservation> {
        Some(Reservation {
            request,
            actual: request.actual_field()?,
            constraint: request.constraint_field()?,
        })
    }
}

/// The production reservation priority order.
///
/// Shipped-not-billed first, channel need last. Changing this order changes
/// which requests starve when the pool runs dry.
pub fn standard_schedule() -> Vec<Reservation> {
    [
        Field::ShipNotBilled,
        Field::OpenCustomerOrder,
        Field::RetailPickReserve,
        Field::DotcomHardReserveAtsYes,
        Field::DotcomHardReserveAtsNo,
        Field::RetailHardReserveAtsYes,
        Field::RetailHardReserveAtsNo,
        Field::HeldHardReserve,
        Field::DotcomSoftReserve,
        Field::RetailSoftReserve,
        Field::OutboundAdjustment,
        Field::Need,
    ]
    .iter()
    .filter_map(|request| Reservation::for_request(*request))
    .collect()
}

/// Resolves constraint/actual pairs against the running pool.
///
/// # Examples
///
/// ```rust
/// use atscalc::constraint::{standard_schedule, ConstraintResolver};
/// use atscalc::{CalcContext, Field};
/// use rust_decimal::Decimal;
///
/// let mut ctx = CalcContext::new();
/// ctx.put(Field::UncommittedAfs, Decimal::from(50));
/// ctx.put(Field::ShipNotBilled, Decimal::from(30));
/// ctx.put(Field::OpenCustomerOrder, Decimal::from(40));
///
/// let schedule = standard_schedule();
/// ConstraintResolver::new(&schedule).resolve(&mut ctx).unwrap();
///
/// assert_eq!(ctx.get(Field::ShipNotBilledActual), Decimal::from(30));
/// assert_eq!(ctx.get(Field::OpenCustomerOrderActual), Decimal::from(20));
/// assert_eq!(ctx.get(Field::OpenCustomerOrderConstraint), Decimal::from(20));
/// assert_eq!(ctx.get(Field::AtsPool), Decimal::ZERO);
/// ```
pub struct ConstraintResolver<'a> {
    schedule: &'a [Reservation],
}

impl<'a> ConstraintResolver<'a> {
    pub fn new(schedule: &'a [Reservation]) -> Self {
        Self { schedule }
    }

    /// Process every reservation type in priority order.
    ///
    /// Seeds the pool from [`Field::UncommittedAfs`], then for each type:
    /// `actual = min(requested, max(pool, 0))`,
    /// `constraint = max(requested - actual, 0)`, `pool -= actual`.
    /// Writes the actual and constraint fields and the pool after each type;
    /// the pool's history is the full depletion trace.
    pub fn resolve(&self, ctx: &mut CalcContext) -> Result<(), CalcError> {
        let mut pool = ctx.read(Field::UncommittedAfs)?;
        ctx.put(Field::AtsPool, pool);

        for reservation in self.schedule {
            let requested = ctx.read(reservation.request)?;
            let actual = requested.min(pool.max(Decimal::ZERO));
            let constraint = (requested - actual).max(Decimal::ZERO);
            pool -= actual;

            debug!(
                request = %reservation.request,
                %requested,
                %actual,
                %constraint,
                pool_after = %pool,
                "reservation resolved"
            );

            ctx.put(reservation.actual, actual);
            ctx.put(reservation.constraint, constraint);
            ctx.put(Field::AtsPool, pool);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn seeded(pairs: &[(Field, Decimal)]) -> CalcContext {
        let mut ctx = CalcContext::new();
        for (field, value) in pairs {
            ctx.put(*field, *value);
        }
        ctx
    }

    #[test]
    fn test_standard_schedule_covers_twelve_types() {
        let schedule = standard_schedule();
        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule[0].request, Field::ShipNotBilled);
        assert_eq!(schedule[11].request, Field::Need);
    }

    #[test]
    fn test_actual_plus_constraint_equals_requested() {
        let mut ctx = seeded(&[
            (Field::UncommittedAfs, dec!(50)),
            (Field::ShipNotBilled, dec!(30)),
            (Field::OpenCustomerOrder, dec!(40)),
            (Field::RetailPickReserve, dec!(15)),
        ]);

        let schedule = standard_schedule();
        ConstraintResolver::new(&schedule).resolve(&mut ctx).unwrap();

        for reservation in &schedule {
            let requested = ctx.get(reservation.request);
            let actual = ctx.get(reservation.actual);
            let constraint = ctx.get(reservation.constraint);
            assert_eq!(actual + constraint, requested, "{}", reservation.request);
            assert!(constraint >= Decimal::ZERO);
            assert!(actual >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_greedy_priority_order() {
        // Scenario C from the product rules: the pool covers ship-not-billed
        // fully, then open customer orders take what is left.
        let mut ctx = seeded(&[
            (Field::UncommittedAfs, dec!(50)),
            (Field::ShipNotBilled, dec!(30)),
            (Field::OpenCustomerOrder, dec!(40)),
        ]);

        let schedule = standard_schedule();
        ConstraintResolver::new(&schedule).resolve(&mut ctx).unwrap();

        assert_eq!(ctx.get(Field::ShipNotBilledActual), dec!(30));
        assert_eq!(ctx.get(Field::ShipNotBilledConstraint), dec!(0));
        assert_eq!(ctx.get(Field::OpenCustomerOrderActual), dec!(20));
        assert_eq!(ctx.get(Field::OpenCustomerOrderConstraint), dec!(20));
        assert_eq!(ctx.get(Field::AtsPool), dec!(0));
    }

    #[test]
    fn test_pool_never_goes_negative() {
        let mut ctx = seeded(&[
            (Field::UncommittedAfs, dec!(10)),
            (Field::ShipNotBilled, dec!(25)),
            (Field::Need, dec!(5)),
        ]);

        let schedule = standard_schedule();
        ConstraintResolver::new(&schedule).resolve(&mut ctx).unwrap();

        assert_eq!(ctx.get(Field::ShipNotBilledActual), dec!(10));
        assert_eq!(ctx.get(Field::ShipNotBilledConstraint), dec!(15));
        assert_eq!(ctx.get(Field::NeedActual), dec!(0));
        assert_eq!(ctx.get(Field::NeedConstraint), dec!(5));
        assert!(ctx.get(Field::AtsPool) >= Decimal::ZERO);
    }

    #[test]
    fn test_actuals_never_exceed_seed() {
        let seed = dec!(37);
        let mut ctx = seeded(&[
            (Field::UncommittedAfs, seed),
            (Field::ShipNotBilled, dec!(12)),
            (Field::OpenCustomerOrder, dec!(12)),
            (Field::RetailPickReserve, dec!(12)),
            (Field::DotcomSoftReserve, dec!(12)),
        ]);

        let schedule = standard_schedule();
        ConstraintResolver::new(&schedule).resolve(&mut ctx).unwrap();

        let total: Decimal = schedule.iter().map(|r| ctx.get(r.actual)).sum();
        assert!(total <= seed);
    }

    #[test]
    fn test_pool_history_is_full_trace() {
        let mut ctx = seeded(&[
            (Field::UncommittedAfs, dec!(50)),
            (Field::ShipNotBilled, dec!(30)),
        ]);

        let schedule = standard_schedule();
        ConstraintResolver::new(&schedule).resolve(&mut ctx).unwrap();

        // Seed write plus one write per reservation type.
        let trace = ctx.history(Field::AtsPool);
        assert_eq!(trace.len(), 1 + schedule.len());
        assert_eq!(trace[0].value, dec!(50));
        assert_eq!(trace[1].value, dec!(20));
    }
}
