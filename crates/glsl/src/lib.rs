//! GLSL 4.50 backend of `shadergraph`.

mod compiler;
pub mod library;

pub use compiler::*;
