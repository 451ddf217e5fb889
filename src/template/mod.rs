//! Template handling: placeholder tag extraction and rendering.

mod render;
mod tags;

pub use render::{render, Rendered};
pub use tags::extract_tags;
