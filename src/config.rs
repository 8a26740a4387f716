/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

/// Mount-time configuration accepted by [`crate::Context::init`].
///
/// None of these knobs are interpreted by any operation today: `init`'s
/// `config` parameter is accepted but not interpreted, per the contract this
/// core is built against. They exist as the ambient configuration surface a
/// RAMFS mount plausibly exposes, and round-trip through TOML the way
/// `diffuzzer`'s `Config` does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RamFsConfig {
    /// Soft ceiling on total bytes this mount may hold. `0` means unbounded.
    pub max_total_bytes: u64,
    /// Soft ceiling on simultaneously open file handles. `0` means unbounded.
    pub max_open_handles: u32,
    /// Cosmetic label surfaced in log lines; not otherwise load-bearing.
    pub label: String,
}

impl Default for RamFsConfig {
    fn default() -> Self {
        RamFsConfig {
            max_total_bytes: 0,
            max_open_handles: 0,
            label: "ramfs".to_owned(),
        }
    }
}

impl RamFsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unbounded() {
        let cfg = RamFsConfig::default();
        assert_eq!(cfg.max_total_bytes, 0);
        assert_eq!(cfg.max_open_handles, 0);
        assert_eq!(cfg.label, "ramfs");
    }

    #[test]
    fn round_trips_through_toml() {
        let toml_text = r#"
            max_total_bytes = 1048576
            max_open_handles = 64
            label = "scratch"
        "#;
        let cfg = RamFsConfig::from_toml_str(toml_text).unwrap();
        assert_eq!(cfg.max_total_bytes, 1_048_576);
        assert_eq!(cfg.max_open_handles, 64);
        assert_eq!(cfg.label, "scratch");
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = RamFsConfig::from_toml_str("label = \"only-this\"").unwrap();
        assert_eq!(cfg.label, "only-this");
        assert_eq!(cfg.max_total_bytes, 0);
    }
}
