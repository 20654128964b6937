//! Order-intake flow identifiers.
//!
//! A flow is one order-intake channel. The set is closed: the dotcom/online
//! channel is the default, retail and the JEI partner channel are the
//! alternates. A field may be computed once per flow; alternate flows may
//! register override steps in the registry.

use serde::{Deserialize, Serialize};

/// One order-intake channel.
///
/// # Examples
///
/// ```rust
/// use atscalc::Flow;
///
/// assert_eq!(Flow::default_flow(), Flow::Dotcom);
/// assert_eq!(Flow::from_name("JEI"), Some(Flow::Jei));
/// assert_eq!(Flow::from_name("NOPE"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Flow {
    /// Default online channel.
    Dotcom,
    /// Retail store channel.
    Retail,
    /// JEI partner channel; carries non-standard formulas via overrides
    /// and modifier parameters.
    Jei,
}

impl Flow {
    /// All flows, default first. Evaluation visits flows in this order.
    pub const ALL: &'static [Flow] = &[Flow::Dotcom, Flow::Retail, Flow::Jei];

    /// The default flow whose value is canonical when no context condition
    /// is registered for a field.
    pub fn default_flow() -> Flow {
        Flow::Dotcom
    }

    /// Stable wire name for this flow.
    pub fn name(&self) -> &'static str {
        match self {
            Flow::Dotcom => "DOTCOM",
            Flow::Retail => "RETAIL",
            Flow::Jei => "JEI",
        }
    }

    /// Look a flow up by wire name. `None` for names outside the closed set.
    pub fn from_name(name: &str) -> Option<Flow> {
        Flow::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
