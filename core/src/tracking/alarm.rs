use crate::receiver_interface::AlarmLevel;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};

pub const BUZZ_C: u16 = 2093;
pub const BUZZ_DH: u16 = 2489;
pub const BUZZ_E: u16 = 2637;
pub const BUZZ_G: u16 = 3136;
pub const BUZZ_H: u16 = 3951;

/// Depth of the audio queue between the tick unit and the tone player.
pub const CUE_QUEUE_DEPTH: usize = 40;

/// A two-tone cue for the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    /// Hz
    pub tones: (u16, u16),
    pub durations_ms: (u16, u16),
    pub repeat: u8,
    /// 0..=100
    pub volume: u8,
}

/// Maps alarm state to cues. Stateless.
pub struct AlarmArbiter;

impl AlarmArbiter {
    /// Cue for a protocol alarm level. The tone order follows the parity of
    /// `phase`, which the tick unit advances once per cue pass, so consecutive
    /// cues sound like a two-tone siren.
    pub fn alarm_cue(level: AlarmLevel, phase: u64, master_volume: u8) -> Option<Cue> {
        let (tones, durations_ms, repeat, percent) = match level {
            AlarmLevel::None => return None,
            AlarmLevel::Low => ((BUZZ_DH, BUZZ_E), (150, 150), 1, 60),
            AlarmLevel::Important => ((BUZZ_E, BUZZ_G), (100, 100), 2, 80),
            AlarmLevel::Urgent => ((BUZZ_G, BUZZ_H), (70, 70), 3, 100),
        };
        let tones = if phase % 2 == 1 {
            (tones.1, tones.0)
        } else {
            tones
        };
        Some(Cue {
            tones,
            durations_ms,
            repeat,
            volume: scale_volume(master_volume, percent),
        })
    }

    /// Cue for a record that came inside the warn distance.
    pub fn proximity_cue(master_volume: u8) -> Cue {
        Cue {
            tones: (BUZZ_C, BUZZ_E),
            durations_ms: (200, 200),
            repeat: 1,
            volume: scale_volume(master_volume, 100),
        }
    }
}

fn scale_volume(master_volume: u8, percent: u16) -> u8 {
    let scaled = u16::from(master_volume.min(100)) * percent / 100;
    scaled as u8
}

/// Non-blocking handle onto the audio queue. A full queue drops the cue.
#[derive(Debug, Clone)]
pub struct CueQueue {
    sender: mpsc::Sender<Cue>,
}

impl CueQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Cue>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Returns false when the cue was dropped.
    pub fn push(&self, cue: Cue) -> bool {
        match self.sender.try_send(cue) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("cue queue full, cue dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("audio sink gone, cue dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_escalate_in_repeat_and_volume() {
        assert_eq!(AlarmArbiter::alarm_cue(AlarmLevel::None, 0, 100), None);
        let low = AlarmArbiter::alarm_cue(AlarmLevel::Low, 0, 100).unwrap();
        let important = AlarmArbiter::alarm_cue(AlarmLevel::Important, 0, 100).unwrap();
        let urgent = AlarmArbiter::alarm_cue(AlarmLevel::Urgent, 0, 100).unwrap();
        assert!(low.repeat < important.repeat && important.repeat < urgent.repeat);
        assert!(low.volume < important.volume && important.volume < urgent.volume);
        assert_eq!(urgent.volume, 100);
    }

    #[test]
    fn odd_phase_swaps_tone_order() {
        let even = AlarmArbiter::alarm_cue(AlarmLevel::Urgent, 4, 50).unwrap();
        let odd = AlarmArbiter::alarm_cue(AlarmLevel::Urgent, 5, 50).unwrap();
        assert_eq!(even.tones, (odd.tones.1, odd.tones.0));
        assert_eq!(even.volume, 50);
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (queue, mut receiver) = CueQueue::new(1);
        let cue = AlarmArbiter::proximity_cue(80);
        assert!(queue.push(cue));
        assert!(!queue.push(cue));
        assert_eq!(receiver.try_recv().unwrap(), cue);
        assert!(queue.push(cue));
    }

    #[test]
    fn closed_queue_is_not_an_error() {
        let (queue, receiver) = CueQueue::new(2);
        drop(receiver);
        assert!(!queue.push(AlarmArbiter::proximity_cue(10)));
    }
}
