use serde::{Deserialize, Serialize};

use crate::Module;

/// Summed cpu and powergrid of a set of modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceTotals {
    pub cpu: f64,
    pub powergrid: f64,
}

impl ResourceTotals {
    pub fn of<'a>(modules: impl IntoIterator<Item = &'a Module>) -> Self {
        modules
            .into_iter()
            .fold(Self::default(), |acc, module| ResourceTotals {
                cpu: acc.cpu + module.cpu,
                powergrid: acc.powergrid + module.powergrid,
            })
    }
}

/// Fitting resources available to a loadout. Limits are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub cpu: f64,
    pub powergrid: f64,
}

impl Budget {
    pub fn new(cpu: f64, powergrid: f64) -> Self {
        Self { cpu, powergrid }
    }

    /// Both limits finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [self.cpu, self.powergrid]
            .iter()
            .all(|limit| limit.is_finite() && *limit > 0.0)
    }

    pub fn admits(&self, totals: ResourceTotals) -> bool {
        totals.cpu <= self.cpu && totals.powergrid <= self.powergrid
    }
}
