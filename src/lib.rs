//! A graph based shader compiler.
//!
//! Shaders are authored as a [`Graph`] of typed [`Function`] nodes whose results are routed
//! through an [`OutputNode`] into stage outputs. Resources the nodes need (vertex inputs,
//! camera uniforms, textures) are expressed as [`Capability`] requirements and bound to
//! concrete declarations by a backend provided [`CapabilityConfig`].

pub use shadergraph_core::*;

#[cfg(feature = "glsl")]
pub use shadergraph_glsl as glsl;

#[cfg(feature = "glsl")]
pub use shadergraph_glsl::{CompiledShader, Compiler, CompilerOptions, library};
