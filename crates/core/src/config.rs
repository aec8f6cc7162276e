use crate::{Builtin, Capability, Error, Result, TypeDescriptor};
use log::trace;
use std::collections::BTreeMap;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
    UniformBlock,
    SampledTextures,
    InputBlock,
}

/// Stable identifier of a resource registered in a [`CapabilityConfig`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceHandle {
    pub kind: ResourceKind,
    pub index: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockField {
    pub name: String,
    pub ty: TypeDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BindingType {
    /// A uniform block; `block` is the block type name, the binding name is the instance name.
    UniformBlock { block: String, fields: Vec<BlockField> },
    /// An array of `count` combined image samplers.
    SampledTextures { count: u32 },
}

/// A descriptor set binding. Binding numbers are assigned in registration order within a set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorBinding {
    pub set: u32,
    pub name: String,
    pub ty: BindingType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceDescriptor {
    Binding(DescriptorBinding),
    /// Per-vertex (or interpolated) stage inputs; every field is its own variable.
    InputBlock { name: String, fields: Vec<BlockField> },
}

/// The outcome of resolving a capability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub handle: ResourceHandle,
    /// Access expression of the resource itself: the instance name of a uniform block or
    /// sampler array, empty for input blocks.
    pub path: String,
}

#[derive(Clone, Debug)]
struct Resource {
    descriptor: ResourceDescriptor,
    handle: ResourceHandle,
    /// Binding number for descriptor bindings, first location for input blocks.
    slot: u32,
}

/// Maps abstract capabilities to concrete backend resources.
///
/// Built once per backend and only read while compiling.
#[derive(Clone, Debug, Default)]
pub struct CapabilityConfig {
    resources: Vec<Resource>,
    capabilities: BTreeMap<Capability, ResourceHandle>,
    accessors: BTreeMap<Builtin, String>,
}

impl ResourceDescriptor {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Binding(DescriptorBinding {
                ty: BindingType::UniformBlock { .. },
                ..
            }) => ResourceKind::UniformBlock,
            Self::Binding(DescriptorBinding {
                ty: BindingType::SampledTextures { .. },
                ..
            }) => ResourceKind::SampledTextures,
            Self::InputBlock { .. } => ResourceKind::InputBlock,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Binding(binding) => &binding.name,
            Self::InputBlock { name, .. } => name,
        }
    }
}

impl CapabilityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource and returns its handle. Indices are sequential within a kind.
    pub fn add_resource(&mut self, descriptor: ResourceDescriptor) -> ResourceHandle {
        let kind = descriptor.kind();
        let handle = ResourceHandle {
            kind,
            index: self.resources.iter().filter(|r| r.handle.kind == kind).count() as u32,
        };

        let slot = match &descriptor {
            ResourceDescriptor::Binding(binding) => self
                .resources
                .iter()
                .filter(|r| matches!(&r.descriptor, ResourceDescriptor::Binding(b) if b.set == binding.set))
                .count() as u32,
            ResourceDescriptor::InputBlock { .. } => self
                .resources
                .iter()
                .filter_map(|r| match &r.descriptor {
                    ResourceDescriptor::InputBlock { fields, .. } => {
                        Some(fields.iter().map(|f| f.ty.locations()).sum::<u32>())
                    }
                    _ => None,
                })
                .sum(),
        };

        self.resources.push(Resource {
            descriptor,
            handle,
            slot,
        });

        handle
    }

    /// Declares that `capability` is served by `handle`. Many capabilities may share a resource.
    pub fn link_capability(&mut self, capability: Capability, handle: ResourceHandle) -> &mut Self {
        self.capabilities.insert(capability, handle);
        self
    }

    /// Records the expression appended to the resource path to read `builtin`,
    /// e.g. `.view` for a field of a uniform block, or `inUv` for an input.
    pub fn set_constant_accessor(&mut self, builtin: Builtin, accessor: impl Into<String>) -> &mut Self {
        self.accessors.insert(builtin, accessor.into());
        self
    }

    pub fn resolve(&self, capability: Capability) -> Result<Resolution> {
        let handle = *self
            .capabilities
            .get(&capability)
            .ok_or(Error::UnresolvedCapability { capability })?;
        let resource = self.entry(handle).ok_or(Error::UnresolvedCapability { capability })?;

        let path = match &resource.descriptor {
            ResourceDescriptor::Binding(binding) => binding.name.clone(),
            ResourceDescriptor::InputBlock { .. } => String::new(),
        };

        trace!("resolved {:?} to {:?} `{}`", capability, handle, path);
        Ok(Resolution { handle, path })
    }

    pub fn accessor(&self, builtin: Builtin) -> Result<&str> {
        self.accessors
            .get(&builtin)
            .map(String::as_str)
            .ok_or(Error::MissingAccessor { builtin })
    }

    pub fn resource(&self, handle: ResourceHandle) -> Option<&ResourceDescriptor> {
        self.entry(handle).map(|r| &r.descriptor)
    }

    pub fn resources(&self) -> impl Iterator<Item = (ResourceHandle, &ResourceDescriptor)> + '_ {
        self.resources.iter().map(|r| (r.handle, &r.descriptor))
    }

    /// GLSL declaration of a resource, one or more lines each terminated by a newline.
    pub fn declaration(&self, handle: ResourceHandle) -> Option<String> {
        let resource = self.entry(handle)?;
        let mut out = String::new();

        match &resource.descriptor {
            ResourceDescriptor::Binding(binding) => match &binding.ty {
                BindingType::UniformBlock { block, fields } => {
                    writeln!(
                        out,
                        "layout(set = {}, binding = {}) uniform {} {{",
                        binding.set, resource.slot, block
                    )
                    .ok();
                    for field in fields {
                        writeln!(out, "    {} {};", field.ty, field.name).ok();
                    }
                    writeln!(out, "}} {};", binding.name).ok();
                }
                BindingType::SampledTextures { count } => {
                    writeln!(
                        out,
                        "layout(set = {}, binding = {}) uniform sampler2D {}[{}];",
                        binding.set, resource.slot, binding.name, count
                    )
                    .ok();
                }
            },
            ResourceDescriptor::InputBlock { fields, .. } => {
                let mut location = resource.slot;
                for field in fields {
                    writeln!(out, "layout(location = {}) in {} {};", location, field.ty, field.name).ok();
                    location += field.ty.locations();
                }
            }
        }

        Some(out)
    }

    fn entry(&self, handle: ResourceHandle) -> Option<&Resource> {
        self.resources.iter().find(|r| r.handle == handle)
    }
}

#[cfg(feature = "serde")]
pub use desc::*;

#[cfg(feature = "serde")]
mod desc {
    use super::*;
    use serde::{Deserialize, Serialize};

    /// Declarative form of a [`CapabilityConfig`], loadable with any serde format.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct CapabilityConfigDesc {
        #[serde(default)]
        pub resources: Vec<ResourceDesc>,
        #[serde(default)]
        pub accessors: Vec<AccessorDesc>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ResourceDesc {
        pub resource: ResourceDescriptor,
        /// Capabilities served by the resource.
        #[serde(default)]
        pub capabilities: Vec<Capability>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct AccessorDesc {
        pub builtin: Builtin,
        pub accessor: String,
    }

    impl CapabilityConfigDesc {
        pub fn build(&self) -> CapabilityConfig {
            let mut config = CapabilityConfig::new();
            for desc in &self.resources {
                let handle = config.add_resource(desc.resource.clone());
                for &capability in &desc.capabilities {
                    config.link_capability(capability, handle);
                }
            }

            for desc in &self.accessors {
                config.set_constant_accessor(desc.builtin, desc.accessor.clone());
            }

            config
        }
    }

    impl From<CapabilityConfigDesc> for CapabilityConfig {
        fn from(desc: CapabilityConfigDesc) -> Self {
            desc.build()
        }
    }
}
