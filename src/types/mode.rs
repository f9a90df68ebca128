//! Operating mode selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Client operating posture.
///
/// Both modes resolve requests the same way (cache first, then fetch and
/// store). `Polling` additionally runs a background refresh loop that keeps
/// every cached request warm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    #[default]
    OnDemand,
    Polling,
}

impl OperatingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnDemand => "on_demand",
            Self::Polling => "polling",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
