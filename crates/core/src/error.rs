use crate::{Builtin, Capability, OutputHandle, ParameterHandle, ScalarKind, TypeDescriptor, graph::NodeId};
use thiserror::Error;

/// Errors reported while authoring or compiling a shader graph.
///
/// Wiring errors ([`Error::TypeMismatch`], [`Error::CyclicGraph`], [`Error::OutputConflict`])
/// are raised eagerly when the edge or link is created. The rest are raised by the compiler
/// and abort the whole compile.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unsupported type: {kind:?} with {channels} channels")]
    InvalidType { kind: ScalarKind, channels: u32 },

    #[error("type mismatch at {target} input {slot}: expected {expected} channels, found {found}")]
    TypeMismatch {
        target: String,
        slot: usize,
        expected: u32,
        found: u32,
    },

    #[error("wiring {source_node} into {target} would create a cycle")]
    CyclicGraph { target: String, source_node: String },

    #[error("parameter `{parameter}` has no source node")]
    UnboundParameter { parameter: String },

    #[error("{node} input {slot} is not wired")]
    UnboundInput { node: String, slot: usize },

    #[error("capability {capability:?} is not linked to any resource")]
    UnresolvedCapability { capability: Capability },

    #[error("no accessor expression recorded for builtin {builtin:?}")]
    MissingAccessor { builtin: Builtin },

    #[error("output `{output}` channels {channels:#b} are already written by another parameter")]
    OutputConflict { output: String, channels: u16 },

    #[error("capability {capability:?} is linked to `{resource}`, which cannot provide it")]
    IncompatibleResource { capability: Capability, resource: String },

    #[error("texture sampler array `{binding}` has only {capacity} slots")]
    TextureSlotsExhausted { binding: String, capacity: u32 },

    #[error("node {0:?} does not belong to this graph")]
    UnknownNode(NodeId),

    #[error("output {0:?} does not belong to this output node")]
    UnknownOutput(OutputHandle),

    #[error("parameter {0:?} does not belong to this output node")]
    UnknownParameter(ParameterHandle),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn mismatch(target: impl Into<String>, slot: usize, expected: TypeDescriptor, found: TypeDescriptor) -> Self {
        Self::TypeMismatch {
            target: target.into(),
            slot,
            expected: expected.channels(),
            found: found.channels(),
        }
    }
}
