mod renderer;

pub use renderer::{RenderError, Renderer};

pub const PLACEHOLDER_HALF_SIZE_PX: i32 = 5;
