use crate::display_interface::frame::RenderFrame;

/// Display collaborator. Called once per full pass, after the registry
/// section has been released; implementations must not block.
pub trait Renderer: Send {
    fn present(&mut self, frame: &RenderFrame);
}

/// Discards every frame.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn present(&mut self, _frame: &RenderFrame) {}
}
