pub mod frame;
pub mod renderer;

pub use frame::{DetailCommand, DetailReadout, MarkerSnapshot, RenderFrame, StatusLine};
pub use renderer::{NullRenderer, Renderer};
