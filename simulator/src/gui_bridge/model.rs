use serde::{Deserialize, Serialize};
use trafficcore::display_interface::RenderFrame;

/// What the HTTP bridge serves: the last frame plus the overlay lines it
/// accumulated, since frames only carry changed lines.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DisplayModel {
    pub frame: RenderFrame,
    pub frames_seen: u64,
    pub overlay: Vec<String>,
}

impl DisplayModel {
    pub fn apply(&mut self, frame: &RenderFrame) {
        for line in &frame.status_lines {
            let present = self.overlay.iter().position(|text| *text == line.text);
            match (line.shown, present) {
                (true, None) => self.overlay.push(line.text.clone()),
                (false, Some(index)) => {
                    self.overlay.remove(index);
                }
                _ => {}
            }
        }
        self.frame = frame.clone();
        self.frames_seen += 1;
    }
}
