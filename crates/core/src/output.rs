use crate::{Error, Graph, NodeId, Result, TypeDescriptor};

/// A shader execution stage. Every stage with at least one output gets its own source text.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    Vertex,
    Fragment,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct OutputHandle(u32);

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParameterHandle(u32);

/// Which part of an output a linked parameter writes to.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Selector {
    Whole,
    /// A single channel; matrices are addressed column-major.
    Channel(u32),
}

#[derive(Clone, Debug)]
pub struct Output {
    pub name: String,
    pub stage: Stage,
    /// The output location.
    pub index: u32,
    pub ty: TypeDescriptor,
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeDescriptor,
    pub source: Option<NodeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    pub parameter: ParameterHandle,
    pub output: OutputHandle,
    pub selector: Selector,
}

/// The sink of a shader graph.
///
/// Parameters are named, typed entry points into the graph. The linking table routes each
/// parameter value into an output (or a single channel of it).
#[derive(Clone, Debug, Default)]
pub struct OutputNode {
    outputs: Vec<Output>,
    parameters: Vec<Parameter>,
    links: Vec<Link>,
}

impl Selector {
    /// Bitmask of the channels addressed in an output of type `ty`.
    pub fn mask(self, ty: TypeDescriptor) -> u16 {
        match self {
            Self::Whole => ((1u32 << ty.channels()) - 1) as u16,
            Self::Channel(channel) => 1 << channel,
        }
    }
}

impl OutputHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ParameterHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl OutputNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_output(&mut self, name: impl Into<String>, stage: Stage, index: u32, ty: TypeDescriptor) -> OutputHandle {
        self.outputs.push(Output {
            name: name.into(),
            stage,
            index,
            ty,
        });

        OutputHandle(self.outputs.len() as u32 - 1)
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, ty: TypeDescriptor) -> ParameterHandle {
        self.parameters.push(Parameter {
            name: name.into(),
            ty,
            source: None,
        });

        ParameterHandle(self.parameters.len() as u32 - 1)
    }

    /// Wires a computation into a parameter.
    pub fn set_parameter(&mut self, graph: &Graph, handle: ParameterHandle, node: NodeId) -> Result<()> {
        let found = graph.output_type(node).ok_or(Error::UnknownNode(node))?;
        let parameter = self
            .parameters
            .get_mut(handle.index())
            .ok_or(Error::UnknownParameter(handle))?;

        if parameter.ty.channels() != found.channels() {
            return Err(Error::TypeMismatch {
                target: format!("parameter `{}`", parameter.name),
                slot: 0,
                expected: parameter.ty.channels(),
                found: found.channels(),
            });
        }

        parameter.source = Some(node);
        Ok(())
    }

    /// Routes the value of `parameter` into `output` at `selector`.
    ///
    /// #### Error Conditions
    /// - [`Error::TypeMismatch`] if a [`Selector::Whole`] link joins types of different channel counts,
    ///   or a [`Selector::Channel`] link uses a non scalar parameter or an out of range channel.
    /// - [`Error::OutputConflict`] if the selected channels are already written by another link.
    /// - [`Error::UnknownParameter`] and [`Error::UnknownOutput`] for handles of another output node.
    pub fn link_output(&mut self, parameter: ParameterHandle, output: OutputHandle, selector: Selector) -> Result<()> {
        let param = self.parameter(parameter).ok_or(Error::UnknownParameter(parameter))?;
        let out = self.output(output).ok_or(Error::UnknownOutput(output))?;

        let (expected, valid) = match selector {
            Selector::Whole => (out.ty.channels(), param.ty.channels() == out.ty.channels()),
            Selector::Channel(channel) => (1, param.ty.is_scalar() && channel < out.ty.channels()),
        };

        if !valid {
            return Err(Error::TypeMismatch {
                target: format!("output `{}`", out.name),
                slot: match selector {
                    Selector::Whole => 0,
                    Selector::Channel(channel) => channel as usize,
                },
                expected,
                found: param.ty.channels(),
            });
        }

        let mask = selector.mask(out.ty);
        let taken = self
            .links
            .iter()
            .filter(|link| link.output == output)
            .fold(0u16, |acc, link| acc | link.selector.mask(out.ty));

        if taken & mask != 0 {
            return Err(Error::OutputConflict {
                output: out.name.clone(),
                channels: taken & mask,
            });
        }

        self.links.push(Link {
            parameter,
            output,
            selector,
        });

        Ok(())
    }

    pub fn output(&self, handle: OutputHandle) -> Option<&Output> {
        self.outputs.get(handle.index())
    }

    pub fn parameter(&self, handle: ParameterHandle) -> Option<&Parameter> {
        self.parameters.get(handle.index())
    }

    pub fn outputs(&self) -> impl Iterator<Item = (OutputHandle, &Output)> + '_ {
        self.outputs
            .iter()
            .enumerate()
            .map(|(i, output)| (OutputHandle(i as u32), output))
    }

    pub fn parameters(&self) -> impl Iterator<Item = (ParameterHandle, &Parameter)> + '_ {
        self.parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| (ParameterHandle(i as u32), parameter))
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Stages with at least one declared output, in pipeline order.
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages: Vec<Stage> = self.outputs.iter().map(|output| output.stage).collect();
        stages.sort();
        stages.dedup();
        stages
    }
}
