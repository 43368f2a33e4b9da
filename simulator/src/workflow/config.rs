use crate::generator::profile::ScenarioConfig;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trafficcore::prelude::TrafficConfig;

/// Where the HTTP display bridge listens.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub host: [u8; 4],
    pub port: u16,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: [127, 0, 0, 1],
            port: 9000,
        }
    }
}

/// Top-level simulator settings, as read from YAML.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub traffic: TrafficConfig,
    pub scenario: ScenarioConfig,
    pub bridge: BridgeConfig,
}

impl SimConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulator config {}", path_ref.display()))?;
        let config: SimConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulator config {}", path_ref.display()))?;
        Ok(config)
    }

    /// CLI flags win over the file.
    pub fn with_overrides(
        mut self,
        seed: Option<u64>,
        targets: Option<usize>,
        tick_ms: Option<u64>,
        port: Option<u16>,
    ) -> Self {
        if let Some(seed) = seed {
            self.scenario.seed = seed;
        }
        if let Some(targets) = targets {
            self.scenario.targets = targets;
        }
        if let Some(tick_ms) = tick_ms {
            self.traffic.tick_period_ms = tick_ms;
        }
        if let Some(port) = port {
            self.bridge.port = port;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use trafficcore::prelude::{DisplayMode, UnitSystem, WarnDistance};

    #[test]
    fn overrides_replace_file_values() {
        let cfg = SimConfig::default().with_overrides(Some(42), Some(3), Some(20), None);
        assert_eq!(cfg.scenario.seed, 42);
        assert_eq!(cfg.scenario.targets, 3);
        assert_eq!(cfg.traffic.tick_period_ms, 20);
        assert_eq!(cfg.bridge.port, 9000);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"traffic:\n  display_mode: simple\n  warn_distance: m500\n  units: nautical\nscenario:\n  seed: 9\n  targets: 12\nbridge:\n  port: 9100\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = SimConfig::load(&path).unwrap();
        assert_eq!(cfg.traffic.display_mode, DisplayMode::Simple);
        assert_eq!(cfg.traffic.warn_distance, WarnDistance::M500);
        assert_eq!(cfg.traffic.units, UnitSystem::Nautical);
        assert!(cfg.traffic.hide_non_moving);
        assert_eq!(cfg.scenario.targets, 12);
        assert_eq!(cfg.bridge.port, 9100);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SimConfig::load("/nonexistent/traffic.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/traffic.yaml"));
    }
}
