//! Authoring side of `shadergraph`: types, functions, the node graph, the output node
//! and the capability configuration consumed by a backend compiler.

mod capability;
mod config;
mod error;
mod function;
pub mod graph;
mod output;
mod types;

pub use capability::*;
pub use config::*;
pub use error::{Error, Result};
pub use function::*;
pub use graph::{Graph, Node, NodeId};
pub use output::*;
pub use types::*;
