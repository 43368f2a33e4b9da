use crate::prelude::UnitSystem;

const METERS_PER_FOOT: f32 = 0.3048;
const METERS_PER_NM: f32 = 1852.0;
const METERS_PER_MILE: f32 = 1609.344;
const MPS_PER_KNOT: f32 = 0.514_444;

/// Converts core values (meters, m/s) into the configured display units.
pub struct UnitConverter {
    system: UnitSystem,
}

impl UnitConverter {
    pub fn new(system: UnitSystem) -> Self {
        Self { system }
    }

    /// Horizontal distance: km, nm or statute miles.
    pub fn distance(&self, meters: f32) -> (f32, &'static str) {
        match self.system {
            UnitSystem::Metric => (meters / 1000.0, "km"),
            UnitSystem::Nautical => (meters / METERS_PER_NM, "nm"),
            UnitSystem::Imperial => (meters / METERS_PER_MILE, "mi"),
        }
    }

    pub fn vertical(&self, meters: f32) -> (f32, &'static str) {
        match self.system {
            UnitSystem::Metric => (meters, "m"),
            UnitSystem::Nautical | UnitSystem::Imperial => (meters / METERS_PER_FOOT, "ft"),
        }
    }

    pub fn climb(&self, mps: f32) -> (f32, &'static str) {
        match self.system {
            UnitSystem::Metric => (mps, "m/s"),
            UnitSystem::Nautical => (mps / MPS_PER_KNOT, "kt"),
            UnitSystem::Imperial => (mps / METERS_PER_FOOT * 60.0, "fpm"),
        }
    }
}
