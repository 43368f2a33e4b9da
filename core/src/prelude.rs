use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// How many targets the display shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Only the nearest (or alarming) target is shown.
    Simple,
    /// Every live target is shown as a marker; manual cycling is enabled.
    #[default]
    Multi,
}

/// Close-proximity warning radius.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WarnDistance {
    #[default]
    Off,
    M100,
    M200,
    M500,
    M1000,
}

impl WarnDistance {
    /// Radius in meters, `None` when the warning is disabled.
    pub fn meters(self) -> Option<f32> {
        match self {
            WarnDistance::Off => None,
            WarnDistance::M100 => Some(100.0),
            WarnDistance::M200 => Some(200.0),
            WarnDistance::M500 => Some(500.0),
            WarnDistance::M1000 => Some(1000.0),
        }
    }
}

/// Unit system used for the detail readout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
    Nautical,
}

/// User settings consumed by the registry and the arbitration engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrafficConfig {
    pub display_mode: DisplayMode,
    pub hide_non_moving: bool,
    /// Reports slower than this (m/s) are dropped when `hide_non_moving` is set.
    pub moving_speed_floor: f32,
    pub warn_distance: WarnDistance,
    /// 0..=100
    pub master_volume: u8,
    pub units: UnitSystem,
    pub tick_period_ms: u64,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Multi,
            hide_non_moving: true,
            moving_speed_floor: 10.0,
            warn_distance: WarnDistance::Off,
            master_volume: 80,
            units: UnitSystem::Metric,
            tick_period_ms: 50,
        }
    }
}

/// Read-only, polled view of the configuration collaborator.
pub trait ConfigSource: Send + Sync {
    fn display_mode(&self) -> DisplayMode;
    fn hide_non_moving(&self) -> bool;
    fn moving_speed_floor(&self) -> f32;
    fn warn_distance(&self) -> WarnDistance;
    fn master_volume(&self) -> u8;
    fn units(&self) -> UnitSystem;
    fn tick_period_ms(&self) -> u64;

    /// True while the setup menu owns the device; ticks become no-ops.
    fn setup_active(&self) -> bool {
        false
    }
}

impl ConfigSource for TrafficConfig {
    fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    fn hide_non_moving(&self) -> bool {
        self.hide_non_moving
    }

    fn moving_speed_floor(&self) -> f32 {
        self.moving_speed_floor
    }

    fn warn_distance(&self) -> WarnDistance {
        self.warn_distance
    }

    fn master_volume(&self) -> u8 {
        self.master_volume.min(100)
    }

    fn units(&self) -> UnitSystem {
        self.units
    }

    fn tick_period_ms(&self) -> u64 {
        self.tick_period_ms.max(1)
    }
}

/// Settings that can be edited at run time. A poisoned lock falls back to defaults.
impl ConfigSource for RwLock<TrafficConfig> {
    fn display_mode(&self) -> DisplayMode {
        self.read()
            .map(|cfg| cfg.display_mode())
            .unwrap_or_default()
    }

    fn hide_non_moving(&self) -> bool {
        self.read()
            .map(|cfg| cfg.hide_non_moving())
            .unwrap_or(true)
    }

    fn moving_speed_floor(&self) -> f32 {
        self.read()
            .map(|cfg| cfg.moving_speed_floor())
            .unwrap_or(10.0)
    }

    fn warn_distance(&self) -> WarnDistance {
        self.read()
            .map(|cfg| cfg.warn_distance())
            .unwrap_or_default()
    }

    fn master_volume(&self) -> u8 {
        self.read().map(|cfg| cfg.master_volume()).unwrap_or(0)
    }

    fn units(&self) -> UnitSystem {
        self.read().map(|cfg| cfg.units()).unwrap_or_default()
    }

    fn tick_period_ms(&self) -> u64 {
        self.read().map(|cfg| cfg.tick_period_ms()).unwrap_or(50)
    }
}

/// Common error type for the traffic core.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TrafficError {
    #[error("invalid target identifier {0:#08X}")]
    InvalidIdentifier(u32),
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
}

pub type TrafficResult<T> = Result<T, TrafficError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_distance_tiers_map_to_meters() {
        assert_eq!(WarnDistance::Off.meters(), None);
        assert_eq!(WarnDistance::M500.meters(), Some(500.0));
    }

    #[test]
    fn rwlock_config_reflects_edits() {
        let cfg = RwLock::new(TrafficConfig::default());
        assert_eq!(ConfigSource::display_mode(&cfg), DisplayMode::Multi);
        cfg.write().unwrap().display_mode = DisplayMode::Simple;
        assert_eq!(ConfigSource::display_mode(&cfg), DisplayMode::Simple);
    }

    #[test]
    fn master_volume_is_clamped() {
        let cfg = TrafficConfig {
            master_volume: 250,
            ..Default::default()
        };
        assert_eq!(cfg.master_volume(), 100);
    }
}
