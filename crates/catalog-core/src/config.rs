use serde::{Deserialize, Serialize};

/// Behavior switches for the catalog engines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Submit each cascade as one all-or-nothing batch. The engines refuse
    /// to run against a store that cannot honor this.
    pub atomic_cascades: bool,
    /// Also re-point parts when their category is renamed. When off, only
    /// child categories follow a rename and parts keep the old name.
    pub rename_cascades_to_parts: bool,
}

impl EngineConfig {
    /// Atomic cascades, and renames carry parts along.
    pub fn strict() -> Self {
        Self {
            atomic_cascades: true,
            rename_cascades_to_parts: true,
        }
    }
}
