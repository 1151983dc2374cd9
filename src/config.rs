//! Engine-wide tunables that are not part of the layout file itself. Kept
//! as plain `serde`-derived data, the way the original config layer shapes
//! host-adjustable settings, so a host can load overrides from its own
//! config file if it wants to.

use serde::{Deserialize, Serialize};

use crate::state::COMPOSING_CAP;

/// The default bound on the bounded re-match loop.
pub const DEFAULT_REMATCH_BUDGET: u32 = 16;

/// Caps the engine enforces independently of anything a layout file can
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Hard cap on the composing buffer, in UTF-16 code units.
    pub composing_cap: usize,
    /// Maximum iterations of the `eat`/switch-only re-match pass before
    /// treating budget exhaustion as a soft failure.
    pub rematch_budget: u32,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            composing_cap: COMPOSING_CAP,
            rematch_budget: DEFAULT_REMATCH_BUDGET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let limits = EngineLimits::default();
        assert_eq!(limits.composing_cap, 1024);
        assert_eq!(limits.rematch_budget, 16);
    }

    #[test]
    fn toml_round_trips_with_defaults_for_missing_fields() {
        let limits: EngineLimits = toml::from_str("composing_cap = 256").unwrap();
        assert_eq!(limits.composing_cap, 256);
        assert_eq!(limits.rematch_budget, 16);
    }
}
