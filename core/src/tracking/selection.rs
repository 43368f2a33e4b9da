use crate::prelude::DisplayMode;
use crate::tracking::registry::RegistryState;
use log::info;

/// Ticks a manual selection suppresses automatic nearest-tracking (10 s at 50 ms).
pub const MANUAL_HOLD_TICKS: u32 = 200;
/// Ticks after a press during which further presses are ignored.
pub const PRESS_HOLDDOWN_TICKS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// Arbitration picks the nearest record.
    Auto,
    /// A manual cycle owns the nearest flag until `remaining` reaches zero.
    ManualHold { remaining: u32 },
}

/// Manual cycle/lock state driven by button events.
pub struct SelectionController {
    state: SelectionState,
    holddown: u32,
    hold_ticks: u32,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::with_hold_ticks(MANUAL_HOLD_TICKS)
    }

    pub fn with_hold_ticks(hold_ticks: u32) -> Self {
        Self {
            state: SelectionState::Auto,
            holddown: 0,
            hold_ticks: hold_ticks.max(1),
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.state, SelectionState::ManualHold { .. })
    }

    #[cfg(test)]
    pub(crate) fn holding_down(&self) -> bool {
        self.holddown > 0
    }

    /// Per-tick countdown. Expiry falls back to `Auto` without any event.
    pub fn tick(&mut self) {
        if self.holddown > 0 {
            self.holddown -= 1;
        }
        if let SelectionState::ManualHold { remaining } = self.state {
            self.state = if remaining > 1 {
                SelectionState::ManualHold {
                    remaining: remaining - 1,
                }
            } else {
                SelectionState::Auto
            };
        }
    }

    /// An active alarm always hands control back to automatic arbitration.
    pub fn release(&mut self) {
        if self.is_manual() {
            info!("alarm active, manual selection released");
        }
        self.state = SelectionState::Auto;
    }

    /// Cycles the cursor to the next record and (re)starts the manual window.
    /// The first advance steps over the automatic nearest so a press always
    /// moves away from what is already shown.
    pub fn press(
        &mut self,
        registry: &mut RegistryState,
        mode: DisplayMode,
        auto_nearest: Option<u32>,
    ) -> Option<u32> {
        if mode != DisplayMode::Multi || self.holddown > 0 {
            return None;
        }

        let first = !self.is_manual();
        self.state = SelectionState::ManualHold {
            remaining: self.hold_ticks,
        };
        self.holddown = PRESS_HOLDDOWN_TICKS;

        let skip = if first { auto_nearest } else { None };
        let next = registry.advance_cursor(skip);
        if let Some(id) = next {
            info!("next target: {:06X}", id);
        }
        next
    }

    /// Pins the team identifier to the cursor, or to the priority record when
    /// nothing has been cycled to. Independent of the manual window.
    pub fn long_long_press(&mut self, registry: &mut RegistryState) -> Option<u32> {
        let target = registry.cursor().or(registry.priority());
        match target {
            Some(id) => {
                registry.set_locked(id);
                info!("long long press: target ID locked: {:06X}", id);
            }
            None => info!("long long press: nothing to lock"),
        }
        target
    }
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::TrafficConfig;
    use crate::receiver_interface::TargetReport;
    use crate::tracking::registry::TargetRegistry;
    use std::sync::Arc;

    fn populated(ids: &[u32]) -> TargetRegistry {
        let registry = TargetRegistry::new(Arc::new(TrafficConfig::default()));
        for &id in ids {
            let report = TargetReport::new(id, 100.0 * id as f32, 0.0, 0.0).with_motion(0.0, 30.0, 0.0);
            registry.ingest(report).unwrap();
        }
        registry
    }

    #[test]
    fn press_is_ignored_in_simple_mode() {
        let registry = populated(&[0x1, 0x2]);
        let mut state = registry.lock().unwrap();
        let mut selection = SelectionController::new();
        assert_eq!(selection.press(&mut state, DisplayMode::Simple, Some(0x1)), None);
        assert_eq!(selection.state(), SelectionState::Auto);
        assert_eq!(state.cursor(), None);
    }

    #[test]
    fn first_press_moves_away_from_nearest() {
        let registry = populated(&[0x1, 0x2, 0x3]);
        let mut state = registry.lock().unwrap();
        let mut selection = SelectionController::new();
        assert_eq!(selection.press(&mut state, DisplayMode::Multi, Some(0x1)), Some(0x2));
        assert!(selection.is_manual());
    }

    #[test]
    fn holddown_suppresses_retrigger_then_cycles() {
        let registry = populated(&[0x1, 0x2, 0x3]);
        let mut state = registry.lock().unwrap();
        let mut selection = SelectionController::new();
        selection.press(&mut state, DisplayMode::Multi, Some(0x1));
        assert_eq!(selection.press(&mut state, DisplayMode::Multi, Some(0x1)), None);

        for _ in 0..PRESS_HOLDDOWN_TICKS {
            selection.tick();
        }
        assert!(!selection.holding_down());
        // not the first advance: nearest is not skipped
        assert_eq!(selection.press(&mut state, DisplayMode::Multi, Some(0x3)), Some(0x3));
    }

    #[test]
    fn manual_window_expires_back_to_auto() {
        let registry = populated(&[0x1, 0x2]);
        let mut state = registry.lock().unwrap();
        let mut selection = SelectionController::with_hold_ticks(3);
        selection.press(&mut state, DisplayMode::Multi, None);
        selection.tick();
        selection.tick();
        assert_eq!(selection.state(), SelectionState::ManualHold { remaining: 1 });
        selection.tick();
        assert_eq!(selection.state(), SelectionState::Auto);
    }

    #[test]
    fn long_long_press_locks_cursor_or_priority() {
        let registry = populated(&[0x1, 0x2]);
        let mut state = registry.lock().unwrap();
        let mut selection = SelectionController::new();

        assert_eq!(selection.long_long_press(&mut state), None);
        assert_eq!(state.locked(), None);

        state.set_priority(Some(0x2));
        assert_eq!(selection.long_long_press(&mut state), Some(0x2));
        assert_eq!(state.locked(), Some(0x2));

        selection.press(&mut state, DisplayMode::Multi, Some(0x2));
        assert_eq!(selection.long_long_press(&mut state), Some(0x1));
        assert_eq!(state.locked(), Some(0x1));
    }
}
