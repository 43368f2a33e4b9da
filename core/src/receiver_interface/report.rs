use serde::{Deserialize, Serialize};

/// Identifier the decoder uses for "no object"; never a valid key.
pub const NO_OBJECT: u32 = 0;

/// Alarm level as reported by the receiver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AlarmLevel {
    #[default]
    None,
    Low,
    Important,
    Urgent,
}

impl AlarmLevel {
    /// Levels above 3 are treated as urgent.
    pub fn from_raw(level: u8) -> Self {
        match level {
            0 => AlarmLevel::None,
            1 => AlarmLevel::Low,
            2 => AlarmLevel::Important,
            _ => AlarmLevel::Urgent,
        }
    }

    pub fn is_alarm(self) -> bool {
        self != AlarmLevel::None
    }
}

/// One decoded traffic report, relative to own ship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TargetReport {
    /// 24-bit object identifier.
    pub id: u32,
    /// Meters north of own ship.
    pub rel_north: f32,
    /// Meters east of own ship.
    pub rel_east: f32,
    /// Meters above own ship.
    pub rel_vertical: f32,
    /// Ground track in degrees.
    pub heading: f32,
    /// m/s
    pub ground_speed: f32,
    /// m/s
    pub climb_rate: f32,
    #[serde(default)]
    pub alarm_level: u8,
}

impl TargetReport {
    pub fn new(id: u32, rel_north: f32, rel_east: f32, rel_vertical: f32) -> Self {
        Self {
            id,
            rel_north,
            rel_east,
            rel_vertical,
            heading: 0.0,
            ground_speed: 0.0,
            climb_rate: 0.0,
            alarm_level: 0,
        }
    }

    pub fn with_motion(mut self, heading: f32, ground_speed: f32, climb_rate: f32) -> Self {
        self.heading = heading;
        self.ground_speed = ground_speed;
        self.climb_rate = climb_rate;
        self
    }

    pub fn with_alarm(mut self, alarm_level: u8) -> Self {
        self.alarm_level = alarm_level;
        self
    }

    pub fn alarm(&self) -> AlarmLevel {
        AlarmLevel::from_raw(self.alarm_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_alarm_levels_saturate_at_urgent() {
        assert_eq!(AlarmLevel::from_raw(0), AlarmLevel::None);
        assert_eq!(AlarmLevel::from_raw(2), AlarmLevel::Important);
        assert_eq!(AlarmLevel::from_raw(9), AlarmLevel::Urgent);
        assert!(!AlarmLevel::None.is_alarm());
    }

    #[test]
    fn report_builder_sets_motion_and_alarm() {
        let report = TargetReport::new(0xABCDEF, 100.0, -50.0, 20.0)
            .with_motion(270.0, 30.0, 1.5)
            .with_alarm(2);
        assert_eq!(report.ground_speed, 30.0);
        assert_eq!(report.alarm(), AlarmLevel::Important);
    }
}
