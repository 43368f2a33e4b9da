use crate::math::units::UnitConverter;
use crate::prelude::UnitSystem;
use crate::receiver_interface::{AlarmLevel, Severity};
use crate::tracking::target::TargetRecord;
use serde::{Deserialize, Serialize};

/// Lightweight marker for one visible record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarkerSnapshot {
    pub id: u32,
    pub age: u32,
    pub distance: f32,
    pub proximity: f32,
    pub relative_bearing: f32,
    pub screen_angle: f32,
    pub offset_ahead: f32,
    pub offset_right: f32,
    pub rel_vertical: f32,
    pub climb: f32,
    pub alarm_level: AlarmLevel,
    pub is_nearest: bool,
    pub is_best: bool,
    pub is_team: bool,
    pub has_alarm: bool,
}

impl MarkerSnapshot {
    pub fn from_record(record: &TargetRecord, is_team: bool) -> Self {
        let (offset_ahead, offset_right) = record.heading_up_offset();
        Self {
            id: record.id(),
            age: record.age(),
            distance: record.distance(),
            proximity: record.proximity(),
            relative_bearing: record.relative_bearing(),
            screen_angle: record.screen_angle(),
            offset_ahead,
            offset_right,
            rel_vertical: record.report().rel_vertical,
            climb: record.climb(),
            alarm_level: record.alarm_level(),
            is_nearest: record.is_nearest(),
            is_best: record.is_best(),
            is_team,
            has_alarm: record.has_alarm(),
        }
    }
}

/// Detail values of the priority record in display units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetailReadout {
    pub id: u32,
    /// Identifier as six hex digits.
    pub label: String,
    pub distance: f32,
    pub distance_unit: String,
    pub vertical: f32,
    pub vertical_unit: String,
    pub climb: f32,
    pub climb_unit: String,
    pub alarm_level: AlarmLevel,
}

impl DetailReadout {
    pub fn from_record(record: &TargetRecord, units: UnitSystem) -> Self {
        let converter = UnitConverter::new(units);
        let (distance, distance_unit) = converter.distance(record.distance());
        let (vertical, vertical_unit) = converter.vertical(record.report().rel_vertical);
        let (climb, climb_unit) = converter.climb(record.climb());
        Self {
            id: record.id(),
            label: format!("{:06X}", record.id()),
            distance,
            distance_unit: distance_unit.to_string(),
            vertical,
            vertical_unit: vertical_unit.to_string(),
            climb,
            climb_unit: climb_unit.to_string(),
            alarm_level: record.alarm_level(),
        }
    }
}

/// Instructions for the detail area, applied in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DetailCommand {
    /// Clear the detail of a record that lost priority.
    Erase { id: u32 },
    /// Full draw: priority changed or a redraw was requested.
    Draw { readout: DetailReadout },
    /// Same priority as last pass; only values changed.
    Refresh { readout: DetailReadout },
}

/// Status overlay text produced from receiver housekeeping flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub severity: Severity,
    /// False means the line should be cleared.
    pub shown: bool,
}

/// Everything the renderer needs for one full pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderFrame {
    pub tick: u64,
    pub pass: u64,
    pub own_heading: f32,
    /// Visible markers in draw order, priority last.
    pub markers: Vec<MarkerSnapshot>,
    pub priority: Option<u32>,
    pub team: Option<u32>,
    pub detail: Vec<DetailCommand>,
    /// Records removed by this pass; their markers should be erased.
    pub evicted: Vec<u32>,
    pub full_redraw: bool,
    pub status_lines: Vec<StatusLine>,
    pub info_active: bool,
}

impl RenderFrame {
    pub fn marker(&self, id: u32) -> Option<&MarkerSnapshot> {
        self.markers.iter().find(|marker| marker.id == id)
    }
}
