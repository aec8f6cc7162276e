use crate::TypeDescriptor;

/// An abstract requirement a node imposes on its execution context.
///
/// Capabilities are resolved to concrete resources by a [`CapabilityConfig`](crate::CapabilityConfig).
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    VertexPosition,
    VertexNormal,
    VertexTangent,
    VertexUv,
    VertexColor,
    Transform,
    Camera,
    FrameTime,
    TextureSample,
}

/// A backend provided value that can be used as a graph leaf.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Builtin {
    Position,
    Normal,
    Tangent,
    Uv,
    Color,
    ModelMatrix,
    ViewMatrix,
    ProjectionMatrix,
    CameraPosition,
    Time,
}

/// Reference to an externally owned texture asset.
///
/// The compiler assigns every distinct texture a slot in the sampler array bound to
/// [`Capability::TextureSample`] in first-use order.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextureRef(pub u64);

/// The concrete form of the capability a function depends on.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Requirement {
    /// Only the resource access path of the capability.
    Capability(Capability),
    /// The access path of the builtin's capability followed by the builtin's accessor.
    Builtin(Builtin),
    /// An element of the texture sampler array.
    Texture(TextureRef),
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Position,
        Builtin::Normal,
        Builtin::Tangent,
        Builtin::Uv,
        Builtin::Color,
        Builtin::ModelMatrix,
        Builtin::ViewMatrix,
        Builtin::ProjectionMatrix,
        Builtin::CameraPosition,
        Builtin::Time,
    ];

    /// The value type the builtin evaluates to.
    pub fn ty(self) -> TypeDescriptor {
        match self {
            Self::Position | Self::Normal | Self::CameraPosition => TypeDescriptor::VEC3,
            Self::Tangent | Self::Color => TypeDescriptor::VEC4,
            Self::Uv => TypeDescriptor::VEC2,
            Self::ModelMatrix | Self::ViewMatrix | Self::ProjectionMatrix => TypeDescriptor::MAT4,
            Self::Time => TypeDescriptor::FLOAT,
        }
    }

    /// The capability whose resource provides the builtin.
    pub fn capability(self) -> Capability {
        match self {
            Self::Position => Capability::VertexPosition,
            Self::Normal => Capability::VertexNormal,
            Self::Tangent => Capability::VertexTangent,
            Self::Uv => Capability::VertexUv,
            Self::Color => Capability::VertexColor,
            Self::ModelMatrix => Capability::Transform,
            Self::ViewMatrix | Self::ProjectionMatrix | Self::CameraPosition => Capability::Camera,
            Self::Time => Capability::FrameTime,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Normal => "normal",
            Self::Tangent => "tangent",
            Self::Uv => "uv",
            Self::Color => "color",
            Self::ModelMatrix => "model_matrix",
            Self::ViewMatrix => "view_matrix",
            Self::ProjectionMatrix => "projection_matrix",
            Self::CameraPosition => "camera_position",
            Self::Time => "time",
        }
    }
}

impl Requirement {
    pub fn capability(self) -> Capability {
        match self {
            Self::Capability(capability) => capability,
            Self::Builtin(builtin) => builtin.capability(),
            Self::Texture(_) => Capability::TextureSample,
        }
    }
}
