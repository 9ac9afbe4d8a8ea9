pub mod dom;
pub mod renderer;
pub mod surface;

pub use dom::{DomTree, ElementIdx};
pub use renderer::render;
pub use surface::OutputSurface;
