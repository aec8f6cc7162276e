use super::CompilerOptions;
use log::trace;
use shadergraph_core::{
    BindingType, Capability, CapabilityConfig, CodeBuilder, Error, Graph, NodeId, Output, Requirement,
    ResourceDescriptor, ResourceHandle, Result, Selector, TextureRef, Value,
};
use slotmap::SecondaryMap;
use std::collections::{BTreeSet, HashSet};
use std::fmt::Write;

/// Dependency order of the nodes reachable from a set of roots.
pub struct Schedule {
    pub order: Vec<NodeId>,
    pub consumers: SecondaryMap<NodeId, u32>,
}

impl Schedule {
    /// Post-order walk from `roots`. Every root counts as one consumer of itself, in addition
    /// to one per input slot referencing a node.
    pub fn new(graph: &Graph, roots: &[NodeId]) -> Result<Self> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut consumers = SecondaryMap::new();

        for &root in roots {
            *consumers.entry(root).ok_or(Error::UnknownNode(root))?.or_insert(0) += 1;

            let mut stack = vec![(root, false)];
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    order.push(id);
                    continue;
                }

                if !visited.insert(id) {
                    continue;
                }

                let node = graph.node(id).ok_or(Error::UnknownNode(id))?;
                stack.push((id, true));

                for (slot, input) in node.inputs().iter().enumerate().rev() {
                    let source = input.ok_or_else(|| Error::UnboundInput {
                        node: graph.label(id),
                        slot,
                    })?;

                    *consumers.entry(source).ok_or(Error::UnknownNode(source))?.or_insert(0) += 1;
                    stack.push((source, false));
                }
            }
        }

        Ok(Self { order, consumers })
    }
}

/// Resolves the requirement of every scheduled node without emitting code or assigning
/// texture slots.
pub fn check_requirements(graph: &Graph, config: &CapabilityConfig, schedule: &Schedule) -> Result<()> {
    for &id in &schedule.order {
        let node = graph.node(id).ok_or(Error::UnknownNode(id))?;
        let Some(requirement) = node.function().requirement() else {
            continue;
        };

        let resolution = config.resolve(requirement.capability())?;
        match requirement {
            Requirement::Capability(_) => {}
            Requirement::Builtin(builtin) => {
                config.accessor(builtin)?;
            }
            Requirement::Texture(_) => {
                sampler_capacity(config, resolution.handle)?;
            }
        }
    }

    Ok(())
}

/// Number of slots of the sampler array behind `handle`.
fn sampler_capacity(config: &CapabilityConfig, handle: ResourceHandle) -> Result<u32> {
    if let Some(ResourceDescriptor::Binding(binding)) = config.resource(handle) {
        if let BindingType::SampledTextures { count } = binding.ty {
            return Ok(count);
        }
    }

    Err(Error::IncompatibleResource {
        capability: Capability::TextureSample,
        resource: config
            .resource(handle)
            .map(|resource| resource.name().to_string())
            .unwrap_or_default(),
    })
}

/// Texture to sampler array slot assignment, shared by every stage of a compile.
#[derive(Default)]
pub struct TextureSlots {
    pub textures: Vec<TextureRef>,
}

impl TextureSlots {
    pub fn slot(&mut self, texture: TextureRef, binding: &str, capacity: u32) -> Result<u32> {
        if let Some(slot) = self.textures.iter().position(|t| *t == texture) {
            return Ok(slot as u32);
        }

        if self.textures.len() as u32 >= capacity {
            return Err(Error::TextureSlotsExhausted {
                binding: binding.to_string(),
                capacity,
            });
        }

        self.textures.push(texture);
        Ok(self.textures.len() as u32 - 1)
    }
}

/// Emits the source text of a single stage.
pub struct StageCodegen<'a> {
    options: &'a CompilerOptions,
    graph: &'a Graph,
    config: &'a CapabilityConfig,
    textures: &'a mut TextureSlots,

    body: String,
    temporaries: u32,
    values: SecondaryMap<NodeId, Value>,
    resources: BTreeSet<ResourceHandle>,
}

impl<'a> StageCodegen<'a> {
    pub fn new(
        options: &'a CompilerOptions,
        graph: &'a Graph,
        config: &'a CapabilityConfig,
        textures: &'a mut TextureSlots,
    ) -> Self {
        Self {
            options,
            graph,
            config,
            textures,
            body: String::new(),
            temporaries: 0,
            values: SecondaryMap::new(),
            resources: BTreeSet::new(),
        }
    }

    pub fn emit_schedule(&mut self, schedule: &Schedule) -> Result<()> {
        for &id in &schedule.order {
            let shared = schedule.consumers.get(id).copied().unwrap_or(0) > 1;
            self.emit_node(id, shared)?;
        }

        Ok(())
    }

    fn emit_node(&mut self, id: NodeId, shared: bool) -> Result<()> {
        let graph = self.graph;
        let node = graph.node(id).ok_or(Error::UnknownNode(id))?;
        let function = node.function();

        let mut args = Vec::with_capacity(node.inputs().len());
        for (slot, input) in node.inputs().iter().enumerate() {
            let value = input
                .and_then(|source| self.values.get(source))
                .ok_or_else(|| Error::UnboundInput {
                    node: graph.label(id),
                    slot,
                })?;
            args.push(value.clone());
        }

        debug_assert!(function.signature().accepts(&args), "codegen error");

        let access = match function.requirement() {
            Some(requirement) => Some(self.emit_requirement(requirement)?),
            None => None,
        };

        let mut cx = CodeBuilder::new(
            &mut self.body,
            &mut self.temporaries,
            &self.options.temporary_prefix,
            access.as_deref(),
        );

        let mut value = function.build(&mut cx, &args);
        if shared && !value.is_temporary() && !function.is_trivial() {
            let ty = value.ty();
            value = cx.temporary(ty, &value);
        }

        trace!("{} = {}", graph.label(id), value);
        self.values.insert(id, value);
        Ok(())
    }

    /// Resolves a requirement to its access expression and records the resource as used.
    fn emit_requirement(&mut self, requirement: Requirement) -> Result<String> {
        let resolution = self.config.resolve(requirement.capability())?;
        self.resources.insert(resolution.handle);

        match requirement {
            Requirement::Capability(_) => Ok(resolution.path),
            Requirement::Builtin(builtin) => {
                let accessor = self.config.accessor(builtin)?;
                Ok(format!("{}{}", resolution.path, accessor))
            }
            Requirement::Texture(texture) => {
                let capacity = sampler_capacity(self.config, resolution.handle)?;
                let slot = self.textures.slot(texture, &resolution.path, capacity)?;
                trace!("texture {:?} -> {}[{}]", texture, resolution.path, slot);
                Ok(format!("{}[{}]", resolution.path, slot))
            }
        }
    }

    /// Assigns the value of `source` to `output` at `selector`.
    pub fn emit_link(&mut self, output: &Output, selector: Selector, source: NodeId) -> Result<()> {
        let value = self.values.get(source).ok_or(Error::UnknownNode(source))?;

        match selector {
            Selector::Whole => writeln!(self.body, "    {} = {};", output.name, value).ok(),
            Selector::Channel(channel) if output.ty.is_matrix() => {
                let rows = output.ty.rows();
                writeln!(
                    self.body,
                    "    {}[{}][{}] = {};",
                    output.name,
                    channel / rows,
                    channel % rows,
                    value
                )
                .ok()
            }
            Selector::Channel(channel) => {
                writeln!(self.body, "    {}.{} = {};", output.name, component(channel), value).ok()
            }
        };

        Ok(())
    }

    /// Resources referenced by this stage so far.
    pub fn resources(&self) -> &BTreeSet<ResourceHandle> {
        &self.resources
    }

    pub fn finish<'o>(self, outputs: impl IntoIterator<Item = &'o Output>) -> String {
        let mut buffer = String::new();
        emit_version_header(&mut buffer, self.options.glsl_version);

        for &handle in &self.resources {
            if let Some(declaration) = self.config.declaration(handle) {
                buffer.push_str(&declaration);
            }
        }

        for output in outputs {
            if !output.name.starts_with("gl_") {
                writeln!(
                    buffer,
                    "layout(location = {}) out {} {};",
                    output.index, output.ty, output.name
                )
                .ok();
            }
        }

        buffer.push_str("\nvoid main() {\n");
        buffer.push_str(&self.body);
        buffer.push_str("}\n");
        buffer
    }
}

pub fn component(channel: u32) -> char {
    match channel {
        0 => 'x',
        1 => 'y',
        2 => 'z',
        _ => 'w',
    }
}

fn emit_version_header(buffer: &mut String, version: u32) {
    writeln!(buffer, "#version {}", version).ok();
    if version < 450 {
        buffer.push_str("#extension GL_ARB_separate_shader_objects : require\n");
        buffer.push_str("#extension GL_ARB_shading_language_420pack : require\n");
    }
    buffer.push('\n');
}
