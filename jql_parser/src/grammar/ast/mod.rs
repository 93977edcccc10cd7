//! Query syntax tree and its canonical text form

pub mod nodes;
mod render;

pub use nodes::*;
pub use render::quote_if_needed;
