use crate::math::geometry::Geometry;
use crate::prelude::{TrafficError, TrafficResult};
use crate::receiver_interface::{AlarmLevel, TargetReport, NO_OBJECT};

/// Passes without a report after which a record is stale.
pub const AGEOUT: u32 = 30;
/// Age saturates here.
pub const AGE_LIMIT: u32 = 1000;
/// Passes an alarm stays active after the last alarming report.
pub const ALARM_HOLD_PASSES: u32 = 8;
/// Passes before the close-proximity cue can fire again for the same record.
pub const CLOSE_ALERT_COOLDOWN: u32 = 480;

const CLIMB_FILTER_GAIN: f32 = 0.2;
const CLIMB_FILTER_MIN_SPEED: f32 = 12.0;
const CLIMB_FILTER_MAX_SPEED_DELTA: f32 = 5.0;
const CLIMB_FILTER_MAX_ELAPSED: u64 = 9;
const GRAVITY: f32 = 9.81;

/// Position of a report on the full-pass time base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleClock {
    pub pass: u64,
    pub pass_seconds: f32,
}

/// One tracked object: the latest raw report plus geometry and alarm state
/// derived from it.
#[derive(Debug, Clone)]
pub struct TargetRecord {
    report: TargetReport,
    received_at: u64,
    age: u32,
    distance: f32,
    proximity: f32,
    relative_bearing: f32,
    screen_angle: f32,
    offset_ahead: f32,
    offset_right: f32,
    climb_correction: f32,
    nearest: bool,
    best: bool,
    has_alarm: bool,
    alarm_hold: u32,
    close_cooldown: u32,
}

impl TargetRecord {
    pub fn create(report: TargetReport, clock: SampleClock, own_heading: f32) -> TrafficResult<Self> {
        if report.id == NO_OBJECT {
            return Err(TrafficError::InvalidIdentifier(report.id));
        }

        let mut record = Self {
            report,
            received_at: clock.pass,
            age: 0,
            distance: 0.0,
            proximity: 0.0,
            relative_bearing: 0.0,
            screen_angle: 0.0,
            offset_ahead: 0.0,
            offset_right: 0.0,
            climb_correction: 0.0,
            nearest: false,
            best: false,
            has_alarm: false,
            alarm_hold: 0,
            close_cooldown: 0,
        };
        record.apply_alarm();
        record.recalc(own_heading);
        Ok(record)
    }

    /// Replaces the raw report and refreshes everything derived from it.
    pub fn update(&mut self, report: TargetReport, clock: SampleClock, own_heading: f32) {
        let elapsed = clock.pass.saturating_sub(self.received_at);
        let speed_delta = report.ground_speed - self.report.ground_speed;
        let plausible = (1..=CLIMB_FILTER_MAX_ELAPSED).contains(&elapsed)
            && report.ground_speed > CLIMB_FILTER_MIN_SPEED
            && speed_delta.abs() < CLIMB_FILTER_MAX_SPEED_DELTA;

        if plausible {
            let dt = elapsed as f32 * clock.pass_seconds;
            if dt > 0.0 {
                let instant = (report.ground_speed * speed_delta) / (GRAVITY * dt);
                self.climb_correction += (instant - self.climb_correction) * CLIMB_FILTER_GAIN;
            }
        }

        self.report = report;
        self.received_at = clock.pass;
        self.age = 0;
        self.apply_alarm();
        self.recalc(own_heading);
    }

    /// One aging step. Geometry is re-derived against the current own heading so
    /// the marker follows own rotation even without new reports.
    pub fn age_tick(&mut self, own_heading: f32) {
        if self.age < AGE_LIMIT {
            self.age += 1;
        }
        self.recalc(own_heading);

        if self.close_cooldown > 0 {
            self.close_cooldown -= 1;
        }
        if self.alarm_hold > 0 {
            self.alarm_hold -= 1;
        }
        if self.alarm_hold == 0 && !self.report.alarm().is_alarm() {
            self.has_alarm = false;
        }
    }

    /// Returns true when a close-proximity cue should be requested now.
    pub fn check_close(&mut self, warn_distance: Option<f32>) -> bool {
        let Some(warn) = warn_distance else {
            return false;
        };

        if self.distance > 2.0 * warn {
            self.close_cooldown = 0;
            return false;
        }

        if self.distance < warn && self.close_cooldown == 0 {
            self.close_cooldown = CLOSE_ALERT_COOLDOWN;
            return true;
        }
        false
    }

    fn apply_alarm(&mut self) {
        if self.report.alarm().is_alarm() {
            self.has_alarm = true;
            self.alarm_hold = ALARM_HOLD_PASSES;
        } else if self.alarm_hold == 0 {
            self.has_alarm = false;
        }
    }

    fn recalc(&mut self, own_heading: f32) {
        let TargetReport {
            rel_north,
            rel_east,
            rel_vertical,
            heading,
            ..
        } = self.report;

        self.distance = Geometry::horizontal_distance(rel_north, rel_east);
        self.proximity = Geometry::proximity(self.distance, rel_vertical);
        self.relative_bearing =
            Geometry::relative_angle(Geometry::true_bearing(rel_north, rel_east), own_heading);
        self.screen_angle = Geometry::relative_angle(heading, own_heading);
        let (ahead, right) = Geometry::heading_up_offset(rel_north, rel_east, own_heading);
        self.offset_ahead = ahead;
        self.offset_right = right;
    }

    pub fn id(&self) -> u32 {
        self.report.id
    }

    pub fn report(&self) -> &TargetReport {
        &self.report
    }

    pub fn received_at(&self) -> u64 {
        self.received_at
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn is_live(&self) -> bool {
        self.age < AGEOUT
    }

    /// Horizontal distance in meters.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn proximity(&self) -> f32 {
        self.proximity
    }

    pub fn relative_bearing(&self) -> f32 {
        self.relative_bearing
    }

    pub fn screen_angle(&self) -> f32 {
        self.screen_angle
    }

    /// (ahead, right) in meters on a heading-up display.
    pub fn heading_up_offset(&self) -> (f32, f32) {
        (self.offset_ahead, self.offset_right)
    }

    /// Energy-compensation term of the climb filter.
    pub fn climb_correction(&self) -> f32 {
        self.climb_correction
    }

    /// Reported climb plus the filtered energy term.
    pub fn climb(&self) -> f32 {
        self.report.climb_rate + self.climb_correction
    }

    pub fn alarm_level(&self) -> AlarmLevel {
        self.report.alarm()
    }

    pub fn has_alarm(&self) -> bool {
        self.has_alarm
    }

    pub fn close_cooldown(&self) -> u32 {
        self.close_cooldown
    }

    pub fn is_nearest(&self) -> bool {
        self.nearest
    }

    pub fn is_best(&self) -> bool {
        self.best
    }

    pub(crate) fn set_nearest(&mut self, nearest: bool) {
        self.nearest = nearest;
    }

    pub(crate) fn set_best(&mut self, best: bool) {
        self.best = best;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASS: f32 = 0.25;

    fn at(pass: u64) -> SampleClock {
        SampleClock {
            pass,
            pass_seconds: PASS,
        }
    }

    fn moving(id: u32, speed: f32) -> TargetReport {
        TargetReport::new(id, 300.0, 400.0, 50.0).with_motion(90.0, speed, 1.0)
    }

    #[test]
    fn create_computes_geometry_immediately() {
        let record = TargetRecord::create(moving(0xA, 30.0), at(0), 0.0).unwrap();
        assert!((record.distance() - 500.0).abs() < 1e-3);
        assert!((record.proximity() - (500.0f32.powi(2) + 100.0f32.powi(2)).sqrt()).abs() < 1e-3);
        assert!((record.screen_angle() - 90.0).abs() < 1e-4);
        assert_eq!(record.age(), 0);
    }

    #[test]
    fn create_rejects_sentinel_identifier() {
        let err = TargetRecord::create(moving(NO_OBJECT, 30.0), at(0), 0.0).unwrap_err();
        assert_eq!(err, TrafficError::InvalidIdentifier(NO_OBJECT));
    }

    #[test]
    fn age_tick_counts_exactly_and_update_resets() {
        let mut record = TargetRecord::create(moving(0xA, 30.0), at(0), 0.0).unwrap();
        let distance = record.distance();
        for _ in 0..7 {
            record.age_tick(0.0);
        }
        assert_eq!(record.age(), 7);
        assert_eq!(record.distance(), distance);

        record.update(moving(0xA, 30.0), at(7), 0.0);
        assert_eq!(record.age(), 0);
        assert_eq!(record.received_at(), 7);
    }

    #[test]
    fn age_saturates_at_limit() {
        let mut record = TargetRecord::create(moving(0xA, 30.0), at(0), 0.0).unwrap();
        for _ in 0..(AGE_LIMIT + 5) {
            record.age_tick(0.0);
        }
        assert_eq!(record.age(), AGE_LIMIT);
        assert!(!record.is_live());
    }

    #[test]
    fn aging_tracks_own_heading_changes() {
        let report = TargetReport::new(0xA, 1000.0, 0.0, 0.0).with_motion(0.0, 30.0, 0.0);
        let mut record = TargetRecord::create(report, at(0), 0.0).unwrap();
        assert!(record.relative_bearing().abs() < 1e-3);

        record.age_tick(90.0);
        assert!((record.relative_bearing() - 270.0).abs() < 1e-3);
        assert!((record.screen_angle() - 270.0).abs() < 1e-3);
        assert_eq!(record.distance(), 1000.0);
    }

    #[test]
    fn climb_filter_moves_toward_estimate_on_plausible_samples() {
        let mut record = TargetRecord::create(moving(0xA, 20.0), at(0), 0.0).unwrap();
        assert_eq!(record.climb_correction(), 0.0);

        record.update(moving(0xA, 21.0), at(1), 0.0);
        let estimate = 21.0 * 1.0 / (GRAVITY * PASS);
        let first = record.climb_correction();
        assert!(first > 0.0 && first < estimate);

        record.update(moving(0xA, 22.0), at(2), 0.0);
        let estimate = 22.0 * 1.0 / (GRAVITY * PASS);
        let second = record.climb_correction();
        assert!(second > first && second < estimate);
        assert!((record.climb() - (1.0 + second)).abs() < 1e-5);
    }

    #[test]
    fn climb_filter_ignores_implausible_samples() {
        let mut record = TargetRecord::create(moving(0xA, 20.0), at(0), 0.0).unwrap();
        record.update(moving(0xA, 21.0), at(1), 0.0);
        let before = record.climb_correction();

        record.update(moving(0xA, 71.0), at(2), 0.0);
        assert_eq!(record.climb_correction(), before);

        // too slow
        record.update(moving(0xA, 10.0), at(3), 0.0);
        assert_eq!(record.climb_correction(), before);

        // too long since the previous sample
        record.update(moving(0xA, 20.0), at(4), 0.0);
        record.update(moving(0xA, 21.0), at(14), 0.0);
        assert_eq!(record.climb_correction(), before);
    }

    #[test]
    fn alarm_hold_debounces_flicker() {
        let quiet = moving(0xA, 30.0);
        let mut record = TargetRecord::create(quiet, at(0), 0.0).unwrap();
        assert!(!record.has_alarm());

        record.update(quiet.with_alarm(1), at(1), 0.0);
        assert!(record.has_alarm());
        record.update(quiet, at(2), 0.0);
        assert!(record.has_alarm());

        for _ in 0..(ALARM_HOLD_PASSES - 1) {
            record.age_tick(0.0);
            assert!(record.has_alarm());
        }
        record.age_tick(0.0);
        assert!(!record.has_alarm());
    }

    #[test]
    fn close_cue_fires_once_and_rearms_past_hysteresis() {
        let near = TargetReport::new(0xA, 80.0, 0.0, 0.0).with_motion(0.0, 30.0, 0.0);
        let mut record = TargetRecord::create(near, at(0), 0.0).unwrap();

        assert!(!record.check_close(None));
        assert!(record.check_close(Some(100.0)));
        assert_eq!(record.close_cooldown(), CLOSE_ALERT_COOLDOWN);
        assert!(!record.check_close(Some(100.0)));

        // between warn and 2x warn: cooldown kept
        let mid = TargetReport::new(0xA, 150.0, 0.0, 0.0).with_motion(0.0, 30.0, 0.0);
        record.update(mid, at(1), 0.0);
        assert!(!record.check_close(Some(100.0)));
        assert_eq!(record.close_cooldown(), CLOSE_ALERT_COOLDOWN);

        let far = TargetReport::new(0xA, 250.0, 0.0, 0.0).with_motion(0.0, 30.0, 0.0);
        record.update(far, at(2), 0.0);
        assert!(!record.check_close(Some(100.0)));
        assert_eq!(record.close_cooldown(), 0);

        record.update(near, at(3), 0.0);
        assert!(record.check_close(Some(100.0)));
    }
}
