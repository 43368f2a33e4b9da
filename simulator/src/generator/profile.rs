use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use trafficcore::math::Geometry;
use trafficcore::receiver_interface::{ReceiverStatus, StatusProvider, TargetReport};

/// First identifier handed out to generated gliders.
const DEMO_ID_BASE: u32 = 0xDD_0000;

/// Settings for the synthetic traffic around own ship.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub targets: usize,
    /// Gliders are placed within this radius (m) of own ship.
    pub spread_m: f32,
    /// Fraction of gliders that circle in a thermal; the rest cruise.
    pub circling_share: f32,
    /// Chance that a glider misses one report.
    pub dropout: f32,
    /// Upper bound of the random delay before each 1 Hz report burst.
    pub burst_jitter_ms: u64,
    pub own_heading: f32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            targets: 6,
            spread_m: 3000.0,
            circling_share: 0.5,
            dropout: 0.05,
            burst_jitter_ms: 300,
            own_heading: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
enum Flight {
    Circling {
        center: (f32, f32),
        radius: f32,
        phase: f32,
        /// rad/s, sign gives the turn direction
        turn_rate: f32,
    },
    Cruising {
        north: f32,
        east: f32,
        track: f32,
        speed: f32,
    },
}

#[derive(Debug, Clone)]
struct Glider {
    id: u32,
    flight: Flight,
    rel_vertical: f32,
    climb: f32,
}

impl Glider {
    fn step(&mut self, dt: f32, spread: f32) {
        self.rel_vertical += self.climb * dt;
        match &mut self.flight {
            Flight::Circling {
                phase, turn_rate, ..
            } => {
                *phase = (*phase + *turn_rate * dt).rem_euclid(TAU);
            }
            Flight::Cruising {
                north,
                east,
                track,
                speed,
            } => {
                let track_rad = track.to_radians();
                *north += *speed * track_rad.cos() * dt;
                *east += *speed * track_rad.sin() * dt;
                // gliders leaving the area re-enter from the opposite side
                if Geometry::horizontal_distance(*north, *east) > 2.0 * spread {
                    *north = -*north;
                    *east = -*east;
                }
            }
        }
    }

    fn report(&self) -> TargetReport {
        let (north, east, track, speed) = match self.flight {
            Flight::Circling {
                center,
                radius,
                phase,
                turn_rate,
            } => {
                let north = center.0 + radius * phase.cos();
                let east = center.1 + radius * phase.sin();
                let tangent = phase.to_degrees() + if turn_rate >= 0.0 { 90.0 } else { -90.0 };
                (
                    north,
                    east,
                    Geometry::normalize_degrees(tangent),
                    radius * turn_rate.abs(),
                )
            }
            Flight::Cruising {
                north,
                east,
                track,
                speed,
            } => (north, east, track, speed),
        };
        let distance = Geometry::horizontal_distance(north, east);
        let proximity = Geometry::proximity(distance, self.rel_vertical);
        TargetReport::new(self.id, north, east, self.rel_vertical)
            .with_motion(track, speed, self.climb)
            .with_alarm(alarm_level_for(proximity))
    }
}

/// Alarm level the demo receiver would raise at this proximity.
pub fn alarm_level_for(proximity: f32) -> u8 {
    match proximity {
        p if p < 150.0 => 3,
        p if p < 300.0 => 2,
        p if p < 500.0 => 1,
        _ => 0,
    }
}

/// Seeded traffic of circling and cruising gliders, standing in for the
/// receiver's built-in demo.
pub struct TrafficScenario {
    gliders: Vec<Glider>,
    rng: StdRng,
    spread: f32,
    dropout: f32,
}

impl TrafficScenario {
    pub fn new(config: &ScenarioConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let spread = config.spread_m.max(100.0);
        let gliders = (0..config.targets)
            .map(|index| {
                let id = DEMO_ID_BASE + index as u32 + 1;
                let circling = rng.gen_bool(f64::from(config.circling_share.clamp(0.0, 1.0)));
                let bearing = rng.gen_range(0.0..TAU);
                let range = rng.gen_range(0.1..1.0) * spread;
                let (north, east) = (range * bearing.cos(), range * bearing.sin());
                let rel_vertical = rng.gen_range(-300.0..300.0);
                if circling {
                    let turn = rng.gen_range(0.2..0.35);
                    Glider {
                        id,
                        flight: Flight::Circling {
                            center: (north, east),
                            radius: rng.gen_range(80.0..150.0),
                            phase: rng.gen_range(0.0..TAU),
                            turn_rate: if rng.gen_bool(0.5) { turn } else { -turn },
                        },
                        rel_vertical,
                        climb: rng.gen_range(0.5..3.5),
                    }
                } else {
                    Glider {
                        id,
                        flight: Flight::Cruising {
                            north,
                            east,
                            track: rng.gen_range(0.0..360.0),
                            speed: rng.gen_range(22.0..45.0),
                        },
                        rel_vertical,
                        climb: rng.gen_range(-1.5..-0.5),
                    }
                }
            })
            .collect();

        Self {
            gliders,
            rng,
            spread,
            dropout: config.dropout.clamp(0.0, 1.0),
        }
    }

    pub fn len(&self) -> usize {
        self.gliders.len()
    }

    /// Moves every glider `dt` seconds ahead and returns this burst's reports.
    pub fn advance(&mut self, dt: f32) -> Vec<TargetReport> {
        let mut reports = Vec::with_capacity(self.gliders.len());
        for glider in &mut self.gliders {
            glider.step(dt, self.spread);
            if self.rng.gen::<f32>() >= self.dropout {
                reports.push(glider.report());
            }
        }
        reports
    }
}

/// Fixed housekeeping flags of the demo receiver.
pub struct DemoReceiver {
    status: ReceiverStatus,
}

impl DemoReceiver {
    pub fn new() -> Self {
        Self {
            status: ReceiverStatus {
                sw_version: Some(format!("demo-{}", env!("CARGO_PKG_VERSION"))),
                hw_version: Some("sim".into()),
                ..Default::default()
            },
        }
    }
}

impl Default for DemoReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusProvider for DemoReceiver {
    fn status(&self) -> ReceiverStatus {
        self.status.clone()
    }
}
