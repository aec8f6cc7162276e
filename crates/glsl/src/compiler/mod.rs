pub mod codegen;

use codegen::{Schedule, StageCodegen, TextureSlots, check_requirements};
use log::{debug, warn};
use shadergraph_core::{CapabilityConfig, Error, Graph, OutputNode, ResourceHandle, Result, Stage, TextureRef};
use std::collections::{BTreeMap, BTreeSet};

pub struct Compiler {
    options: CompilerOptions,
}

#[derive(Clone, Debug)]
pub struct CompilerOptions {
    pub glsl_version: u32,
    /// Prefix of generated temporaries, followed by a per-stage counter.
    pub temporary_prefix: String,
}

/// The result of a successful compile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledShader {
    /// Source text per stage; only stages that declare outputs are present.
    pub stages: BTreeMap<Stage, String>,
    /// Every resource referenced by any stage.
    pub used_resources: BTreeSet<ResourceHandle>,
    /// Sampled textures by sampler array slot.
    pub textures: Vec<TextureRef>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            glsl_version: 450,
            temporary_prefix: "_".to_string(),
        }
    }
}

impl CompiledShader {
    pub fn stage(&self, stage: Stage) -> Option<&str> {
        self.stages.get(&stage).map(String::as_str)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compiles `outputs` and everything reachable from its parameters.
    ///
    /// #### Error Conditions
    /// - [`Error::UnboundParameter`] if a parameter has no source, checked before any traversal.
    /// - [`Error::UnboundInput`] if a reachable node has an unwired input.
    /// - [`Error::UnresolvedCapability`], [`Error::MissingAccessor`] and
    ///   [`Error::IncompatibleResource`] if `config` cannot satisfy a reachable node. Nodes
    ///   behind parameters that are not linked to any output are checked too.
    /// - [`Error::TextureSlotsExhausted`] if more distinct textures are sampled than the sampler
    ///   array holds.
    ///
    /// Any error aborts the whole compile.
    pub fn compile(&self, graph: &Graph, outputs: &OutputNode, config: &CapabilityConfig) -> Result<CompiledShader> {
        let mut unlinked = Vec::new();
        for (handle, parameter) in outputs.parameters() {
            let source = parameter.source.ok_or_else(|| Error::UnboundParameter {
                parameter: parameter.name.clone(),
            })?;

            if !outputs.links().iter().any(|link| link.parameter == handle) {
                warn!("parameter `{}` is not linked to any output", parameter.name);
                unlinked.push(source);
            }
        }

        for (handle, output) in outputs.outputs() {
            if !outputs.links().iter().any(|link| link.output == handle) {
                warn!("output `{}` is declared but never written", output.name);
            }
        }

        if !unlinked.is_empty() {
            let schedule = Schedule::new(graph, &unlinked)?;
            check_requirements(graph, config, &schedule)?;
        }

        let mut textures = TextureSlots::default();
        let mut used_resources = BTreeSet::new();
        let mut stages = BTreeMap::new();

        for stage in outputs.stages() {
            let mut links = Vec::new();
            for link in outputs.links() {
                let output = outputs.output(link.output).ok_or(Error::UnknownOutput(link.output))?;
                if output.stage != stage {
                    continue;
                }

                let parameter = outputs
                    .parameter(link.parameter)
                    .ok_or(Error::UnknownParameter(link.parameter))?;
                let source = parameter.source.ok_or_else(|| Error::UnboundParameter {
                    parameter: parameter.name.clone(),
                })?;
                links.push((link.selector, output, source));
            }

            let roots: Vec<_> = links.iter().map(|(_, _, source)| *source).collect();
            let schedule = Schedule::new(graph, &roots)?;
            debug!("compiling {:?} stage: {} nodes, {} links", stage, schedule.order.len(), links.len());

            let mut codegen = StageCodegen::new(&self.options, graph, config, &mut textures);
            codegen.emit_schedule(&schedule)?;
            for &(selector, output, source) in &links {
                codegen.emit_link(output, selector, source)?;
            }

            used_resources.extend(codegen.resources().iter().copied());
            let source = codegen.finish(
                outputs
                    .outputs()
                    .map(|(_, output)| output)
                    .filter(|output| output.stage == stage),
            );

            debug!("{:?} stage compiled to {} bytes", stage, source.len());
            stages.insert(stage, source);
        }

        Ok(CompiledShader {
            stages,
            used_resources,
            textures: textures.textures,
        })
    }

    /// Compiles independent materials in parallel against a shared config.
    ///
    /// Results are returned in input order.
    #[cfg(feature = "parallel")]
    pub fn compile_many(
        &self,
        materials: &[(&Graph, &OutputNode)],
        config: &CapabilityConfig,
    ) -> Vec<Result<CompiledShader>> {
        use rayon::prelude::*;

        materials
            .par_iter()
            .map(|(graph, outputs)| self.compile(graph, outputs, config))
            .collect()
    }
}
