use serde::{Deserialize, Serialize};

/// Debounced button events delivered by the button collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "count", rename_all = "camelCase")]
pub enum ButtonEvent {
    Press,
    LongPress,
    LongLongPress,
    Up(u32),
    Down(u32),
}
