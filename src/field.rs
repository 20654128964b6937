//! Field catalog module.
//!
//! Provides the closed [`Field`] enum identifying every quantity the engine
//! can read or write, together with its [`FieldCategory`] and human
//! description. Constraint and actual counterparts are derived from the
//! `_CONSTRAINT` / `_ACTUAL` wire-name suffix convention.

use crate::error::CalcError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category a field belongs to. Fixed at catalog registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Raw quantity seeded from the external record.
    Input,
    /// Derived by a formula step.
    Calculated,
    /// Shortfall between a requested reservation and the pool.
    Constraint,
    /// Sum over a group of actual fields.
    Aggregate,
    /// Portion of a requested reservation the pool could satisfy.
    Actual,
    /// Final per-channel output quantity.
    Output,
    /// Engine bookkeeping (running pool).
    System,
}

const CONSTRAINT_SUFFIX: &str = "_CONSTRAINT";
const ACTUAL_SUFFIX: &str = "_ACTUAL";

macro_rules! catalog {
    ($( $variant:ident => ($name:literal, $category:ident, $desc:literal), )+) => {
        /// One named quantity in the closed calculation catalog.
        ///
        /// Fields are process-wide constants: identity is the enum variant,
        /// the wire name is stable, and the category never changes after
        /// registration.
        ///
        /// # Examples
        ///
        /// ```rust
        /// use atscalc::{Field, FieldCategory};
        ///
        /// let field = Field::from_name("ONHAND").unwrap();
        /// assert_eq!(field, Field::OnHand);
        /// assert_eq!(field.category(), FieldCategory::Input);
        /// assert!(Field::from_name("NO_SUCH_FIELD").is_err());
        /// ```
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Field {
            $($variant),+
        }

        impl Field {
            /// Every field in the catalog, in registration order.
            pub const ALL: &'static [Field] = &[$(Field::$variant),+];

            /// Stable wire name for this field.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Field::$variant => $name),+
                }
            }

            /// Category assigned at registration.
            pub fn category(&self) -> FieldCategory {
                match self {
                    $(Field::$variant => FieldCategory::$category),+
                }
            }

            /// Human description of the quantity.
            pub fn description(&self) -> &'static str {
                match self {
                    $(Field::$variant => $desc),+
                }
            }

            /// Look a field up by wire name.
            ///
            /// Fails with [`CalcError::UnknownField`] when the name is not in
            /// the closed catalog.
            pub fn from_name(name: &str) -> Result<Field, CalcError> {
                match name {
                    $($name => Ok(Field::$variant),)+
                    other => Err(CalcError::UnknownField(other.to_string())),
                }
            }
        }
    };
}

catalog! {
    // Raw inputs
    OnHand => ("ONHAND", Input, "Units physically on hand at the location"),
    MerchandiseReserve => ("MERCH_RESERVE", Input, "Reserved-on-hand merchandise units"),
    Lost => ("LOST", Input, "Units recorded as lost"),
    Damaged => ("DAMAGED", Input, "Units recorded as damaged"),
    ShipNotBilled => ("SHIP_NOT_BILLED", Input, "Shipped-not-billed requested units"),
    OpenCustomerOrder => ("OPEN_CUSTOMER_ORDER", Input, "Open customer order requested units"),
    RetailPickReserve => ("RETAIL_PICK_RESERVE", Input, "Retail pick reserve requested units"),
    DotcomHardReserveAtsYes => ("DOTCOM_HARD_RESERVE_ATS_YES", Input, "Dotcom hard reserve, sellable while reserved"),
    DotcomHardReserveAtsNo => ("DOTCOM_HARD_RESERVE_ATS_NO", Input, "Dotcom hard reserve, withheld from sale"),
    RetailHardReserveAtsYes => ("RETAIL_HARD_RESERVE_ATS_YES", Input, "Retail hard reserve, sellable while reserved"),
    RetailHardReserveAtsNo => ("RETAIL_HARD_RESERVE_ATS_NO", Input, "Retail hard reserve, withheld from sale"),
    HeldHardReserve => ("HELD_HARD_RESERVE", Input, "Held hard reserve requested units"),
    DotcomSoftReserve => ("DOTCOM_SOFT_RESERVE", Input, "Dotcom soft reserve requested units"),
    RetailSoftReserve => ("RETAIL_SOFT_RESERVE", Input, "Retail soft reserve requested units"),
    OutboundAdjustment => ("OUTBOUND_ADJUSTMENT", Input, "Outbound adjustment requested units"),
    Need => ("NEED", Input, "Channel need requested units"),

    // Calculated
    InitialAfs => ("INITIAL_AFS", Calculated, "Initial available-for-sale quantity"),
    UncommittedAfs => ("UNCOMMITTED_AFS", Calculated, "Uncommitted available-for-sale quantity"),

    // Constraint / actual pairs, one per reservation type
    ShipNotBilledConstraint => ("SHIP_NOT_BILLED_CONSTRAINT", Constraint, "Ship-not-billed shortfall"),
    ShipNotBilledActual => ("SHIP_NOT_BILLED_ACTUAL", Actual, "Ship-not-billed satisfiable units"),
    OpenCustomerOrderConstraint => ("OPEN_CUSTOMER_ORDER_CONSTRAINT", Constraint, "Open customer order shortfall"),
    OpenCustomerOrderActual => ("OPEN_CUSTOMER_ORDER_ACTUAL", Actual, "Open customer order satisfiable units"),
    RetailPickReserveConstraint => ("RETAIL_PICK_RESERVE_CONSTRAINT", Constraint, "Retail pick reserve shortfall"),
    RetailPickReserveActual => ("RETAIL_PICK_RESERVE_ACTUAL", Actual, "Retail pick reserve satisfiable units"),
    DotcomHardReserveAtsYesConstraint => ("DOTCOM_HARD_RESERVE_ATS_YES_CONSTRAINT", Constraint, "Dotcom hard reserve (ATS yes) shortfall"),
    DotcomHardReserveAtsYesActual => ("DOTCOM_HARD_RESERVE_ATS_YES_ACTUAL", Actual, "Dotcom hard reserve (ATS yes) satisfiable units"),
    DotcomHardReserveAtsNoConstraint => ("DOTCOM_HARD_RESERVE_ATS_NO_CONSTRAINT", Constraint, "Dotcom hard reserve (ATS no) shortfall"),
    DotcomHardReserveAtsNoActual => ("DOTCOM_HARD_RESERVE_ATS_NO_ACTUAL", Actual, "Dotcom hard reserve (ATS no) satisfiable units"),
    RetailHardReserveAtsYesConstraint => ("RETAIL_HARD_RESERVE_ATS_YES_CONSTRAINT", Constraint, "Retail hard reserve (ATS yes) shortfall"),
    RetailHardReserveAtsYesActual => ("RETAIL_HARD_RESERVE_ATS_YES_ACTUAL", Actual, "Retail hard reserve (ATS yes) satisfiable units"),
    RetailHardReserveAtsNoConstraint => ("RETAIL_HARD_RESERVE_ATS_NO_CONSTRAINT", Constraint, "Retail hard reserve (ATS no) shortfall"),
    RetailHardReserveAtsNoActual => ("RETAIL_HARD_RESERVE_ATS_NO_ACTUAL", Actual, "Retail hard reserve (ATS no) satisfiable units"),
    HeldHardReserveConstraint => ("HELD_HARD_RESERVE_CONSTRAINT", Constraint, "Held hard reserve shortfall"),
    HeldHardReserveActual => ("HELD_HARD_RESERVE_ACTUAL", Actual, "Held hard reserve satisfiable units"),
    DotcomSoftReserveConstraint => ("DOTCOM_SOFT_RESERVE_CONSTRAINT", Constraint, "Dotcom soft reserve shortfall"),
    DotcomSoftReserveActual => ("DOTCOM_SOFT_RESERVE_ACTUAL", Actual, "Dotcom soft reserve satisfiable units"),
    RetailSoftReserveConstraint => ("RETAIL_SOFT_RESERVE_CONSTRAINT", Constraint, "Retail soft reserve shortfall"),
    RetailSoftReserveActual => ("RETAIL_SOFT_RESERVE_ACTUAL", Actual, "Retail soft reserve satisfiable units"),
    OutboundAdjustmentConstraint => ("OUTBOUND_ADJUSTMENT_CONSTRAINT", Constraint, "Outbound adjustment shortfall"),
    OutboundAdjustmentActual => ("OUTBOUND_ADJUSTMENT_ACTUAL", Actual, "Outbound adjustment satisfiable units"),
    NeedConstraint => ("NEED_CONSTRAINT", Constraint, "Channel need shortfall"),
    NeedActual => ("NEED_ACTUAL", Actual, "Channel need satisfiable units"),

    // Channel aggregates
    DotcomReserveTotal => ("DOTCOM_RESERVE_TOTAL", Aggregate, "Total dotcom reserve units actually held"),
    RetailReserveTotal => ("RETAIL_RESERVE_TOTAL", Aggregate, "Total retail reserve units actually held"),

    // Per-channel outputs
    DotcomAts => ("DOTCOM_ATS", Output, "Final dotcom available-to-sell quantity"),
    RetailAts => ("RETAIL_ATS", Output, "Final retail available-to-sell quantity"),

    // System
    AtsPool => ("ATS_POOL", System, "Running uncommitted pool during constraint resolution"),
}

impl Field {
    /// Derive the paired constraint field by suffix convention.
    ///
    /// Returns `None` when the derived name is not registered; the convention
    /// is a naming heuristic, not a guarantee.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use atscalc::Field;
    ///
    /// assert_eq!(
    ///     Field::ShipNotBilled.constraint_field(),
    ///     Some(Field::ShipNotBilledConstraint)
    /// );
    /// assert_eq!(Field::OnHand.constraint_field(), None);
    /// ```
    pub fn constraint_field(&self) -> Option<Field> {
        Field::from_name(&format!("{}{}", self.name(), CONSTRAINT_SUFFIX)).ok()
    }

    /// Derive the paired actual field by suffix convention.
    pub fn actual_field(&self) -> Option<Field> {
        Field::from_name(&format!("{}{}", self.name(), ACTUAL_SUFFIX)).ok()
    }

    /// Derive the base field of a constraint or actual field by stripping
    /// the suffix. `None` for any other field.
    pub fn base_field(&self) -> Option<Field> {
        let stripped = self
            .name()
            .strip_suffix(CONSTRAINT_SUFFIX)
            .or_else(|| self.name().strip_suffix(ACTUAL_SUFFIX))?;
        Field::from_name(stripped).ok()
    }
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Field::from_name(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()).unwrap(), *field);
        }
    }

    #[test]
    fn test_from_name_unknown() {
        let err = Field::from_name("BOGUS").unwrap_err();
        assert!(matches!(err, CalcError::UnknownField(name) if name == "BOGUS"));
    }

    #[test]
    fn test_constraint_actual_pairing() {
        assert_eq!(
            Field::OpenCustomerOrder.constraint_field(),
            Some(Field::OpenCustomerOrderConstraint)
        );
        assert_eq!(
            Field::OpenCustomerOrder.actual_field(),
            Some(Field::OpenCustomerOrderActual)
        );
        assert_eq!(
            Field::OpenCustomerOrderConstraint.base_field(),
            Some(Field::OpenCustomerOrder)
        );
        assert_eq!(
            Field::OpenCustomerOrderActual.base_field(),
            Some(Field::OpenCustomerOrder)
        );
    }

    #[test]
    fn test_derivation_is_heuristic_not_guarantee() {
        // Calculated fields have no registered constraint counterpart.
        assert_eq!(Field::InitialAfs.constraint_field(), None);
        assert_eq!(Field::AtsPool.actual_field(), None);
        // Fields without a suffix have no base.
        assert_eq!(Field::OnHand.base_field(), None);
    }

    #[test]
    fn test_every_constraint_and_actual_has_a_base() {
        for field in Field::ALL {
            match field.category() {
                FieldCategory::Constraint | FieldCategory::Actual => {
                    assert!(field.base_field().is_some(), "{field} has no base");
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_wire_names_unique() {
        let mut names: Vec<_> = Field::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Field::ALL.len());
    }

    #[test]
    fn test_serializes_as_wire_name() {
        let json = serde_json::to_string(&Field::AtsPool).unwrap();
        assert_eq!(json, "\"ATS_POOL\"");
        let back: Field = serde_json::from_str("\"DOTCOM_RESERVE_TOTAL\"").unwrap();
        assert_eq!(back, Field::DotcomReserveTotal);
        assert!(serde_json::from_str::<Field>("\"BOGUS\"").is_err());
    }
}
