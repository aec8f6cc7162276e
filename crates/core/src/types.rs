use crate::{Error, Result};
use std::fmt::{self, Debug, Display, Write};

/// Scalar component type of a [`TypeDescriptor`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalarKind {
    Bool,
    Int,
    Uint,
    Float,
    Double,
}

/// A scalar, vector or square matrix numeric type.
///
/// Supported channel counts are 1 (scalar), 2-4 (vectors), 9 (3x3 matrix) and 16 (4x4 matrix).
/// Matrices only exist for [`ScalarKind::Float`] and [`ScalarKind::Double`].
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TypeDescriptorRepr", into = "TypeDescriptorRepr"))]
pub struct TypeDescriptor {
    kind: ScalarKind,
    channels: u8,
}

impl ScalarKind {
    /// Size of a single channel in bytes.
    pub fn size(self) -> u32 {
        match self {
            Self::Bool | Self::Int | Self::Uint | Self::Float => 4,
            Self::Double => 8,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Bool => "b",
            Self::Int => "i",
            Self::Uint => "u",
            Self::Float => "",
            Self::Double => "d",
        }
    }

    fn scalar_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl TypeDescriptor {
    pub const BOOL: Self = Self::raw(ScalarKind::Bool, 1);
    pub const BVEC2: Self = Self::raw(ScalarKind::Bool, 2);
    pub const BVEC3: Self = Self::raw(ScalarKind::Bool, 3);
    pub const BVEC4: Self = Self::raw(ScalarKind::Bool, 4);

    pub const INT: Self = Self::raw(ScalarKind::Int, 1);
    pub const IVEC2: Self = Self::raw(ScalarKind::Int, 2);
    pub const IVEC3: Self = Self::raw(ScalarKind::Int, 3);
    pub const IVEC4: Self = Self::raw(ScalarKind::Int, 4);

    pub const UINT: Self = Self::raw(ScalarKind::Uint, 1);
    pub const UVEC2: Self = Self::raw(ScalarKind::Uint, 2);
    pub const UVEC3: Self = Self::raw(ScalarKind::Uint, 3);
    pub const UVEC4: Self = Self::raw(ScalarKind::Uint, 4);

    pub const FLOAT: Self = Self::raw(ScalarKind::Float, 1);
    pub const VEC2: Self = Self::raw(ScalarKind::Float, 2);
    pub const VEC3: Self = Self::raw(ScalarKind::Float, 3);
    pub const VEC4: Self = Self::raw(ScalarKind::Float, 4);
    pub const MAT3: Self = Self::raw(ScalarKind::Float, 9);
    pub const MAT4: Self = Self::raw(ScalarKind::Float, 16);

    pub const DOUBLE: Self = Self::raw(ScalarKind::Double, 1);
    pub const DVEC2: Self = Self::raw(ScalarKind::Double, 2);
    pub const DVEC3: Self = Self::raw(ScalarKind::Double, 3);
    pub const DVEC4: Self = Self::raw(ScalarKind::Double, 4);
    pub const DMAT3: Self = Self::raw(ScalarKind::Double, 9);
    pub const DMAT4: Self = Self::raw(ScalarKind::Double, 16);

    const fn raw(kind: ScalarKind, channels: u8) -> Self {
        Self { kind, channels }
    }

    /// Creates a type descriptor, failing with [`Error::InvalidType`] for unsupported arities.
    pub fn new(kind: ScalarKind, channels: u32) -> Result<Self> {
        let valid = match channels {
            1..=4 => true,
            9 | 16 => matches!(kind, ScalarKind::Float | ScalarKind::Double),
            _ => false,
        };

        if valid {
            Ok(Self::raw(kind, channels as u8))
        } else {
            Err(Error::InvalidType { kind, channels })
        }
    }

    /// The descriptor of a native Rust value type.
    pub fn of<T: NativeType>() -> Self {
        T::TYPE
    }

    /// The vector type with the same scalar kind and `channels` components.
    pub fn with_channels(self, channels: u32) -> Result<Self> {
        Self::new(self.kind, channels)
    }

    pub fn kind(self) -> ScalarKind {
        self.kind
    }

    pub fn channels(self) -> u32 {
        self.channels as u32
    }

    pub fn is_scalar(self) -> bool {
        self.channels == 1
    }

    pub fn is_matrix(self) -> bool {
        self.channels > 4
    }

    /// Number of columns (1 for scalars and vectors).
    pub fn columns(self) -> u32 {
        match self.channels {
            9 => 3,
            16 => 4,
            _ => 1,
        }
    }

    /// Number of rows in a column (the vector width for scalars and vectors).
    pub fn rows(self) -> u32 {
        self.channels() / self.columns()
    }

    /// Size in bytes, tightly packed.
    pub fn size(self) -> u32 {
        self.channels() * self.kind.size()
    }

    /// Number of input/output locations consumed.
    ///
    /// A location holds up to four 32-bit channels; 3 and 4 wide double vectors take two.
    /// Matrices consume one column vector's worth of locations per column.
    pub fn locations(self) -> u32 {
        let column = match (self.kind, self.rows()) {
            (ScalarKind::Double, 3 | 4) => 2,
            _ => 1,
        };

        column * self.columns()
    }

    /// The canonical GLSL spelling of the type.
    pub fn name(self) -> String {
        let prefix = self.kind.prefix();
        match self.channels {
            1 => self.kind.scalar_name().to_string(),
            9 => format!("{}mat3", prefix),
            16 => format!("{}mat4", prefix),
            n => format!("{}vec{}", prefix, n),
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct TypeDescriptorRepr {
    kind: ScalarKind,
    channels: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<TypeDescriptorRepr> for TypeDescriptor {
    type Error = Error;

    fn try_from(value: TypeDescriptorRepr) -> Result<Self> {
        Self::new(value.kind, value.channels)
    }
}

#[cfg(feature = "serde")]
impl From<TypeDescriptor> for TypeDescriptorRepr {
    fn from(value: TypeDescriptor) -> Self {
        Self {
            kind: value.kind,
            channels: value.channels(),
        }
    }
}

/// A Rust value type with a shader-side counterpart.
pub trait NativeType {
    const TYPE: TypeDescriptor;
}

macro_rules! impl_native {
    ($scalar:ty, $s:ident, $v2:ident, $v3:ident, $v4:ident) => {
        impl NativeType for $scalar {
            const TYPE: TypeDescriptor = TypeDescriptor::$s;
        }

        impl NativeType for [$scalar; 2] {
            const TYPE: TypeDescriptor = TypeDescriptor::$v2;
        }

        impl NativeType for [$scalar; 3] {
            const TYPE: TypeDescriptor = TypeDescriptor::$v3;
        }

        impl NativeType for [$scalar; 4] {
            const TYPE: TypeDescriptor = TypeDescriptor::$v4;
        }
    };
}

impl_native!(bool, BOOL, BVEC2, BVEC3, BVEC4);
impl_native!(i32, INT, IVEC2, IVEC3, IVEC4);
impl_native!(u32, UINT, UVEC2, UVEC3, UVEC4);
impl_native!(f32, FLOAT, VEC2, VEC3, VEC4);
impl_native!(f64, DOUBLE, DVEC2, DVEC3, DVEC4);

impl NativeType for [[f32; 3]; 3] {
    const TYPE: TypeDescriptor = TypeDescriptor::MAT3;
}

impl NativeType for [[f32; 4]; 4] {
    const TYPE: TypeDescriptor = TypeDescriptor::MAT4;
}

impl NativeType for [[f64; 3]; 3] {
    const TYPE: TypeDescriptor = TypeDescriptor::DMAT3;
}

impl NativeType for [[f64; 4]; 4] {
    const TYPE: TypeDescriptor = TypeDescriptor::DMAT4;
}

/// Per-channel scalars of a [`ConstantValue`]. Matrices are stored column-major.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantData {
    Bool(Vec<bool>),
    Int(Vec<i32>),
    Uint(Vec<u32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

/// A typed literal used by constant nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantValue {
    ty: TypeDescriptor,
    data: ConstantData,
}

impl ConstantData {
    fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Int(_) => ScalarKind::Int,
            Self::Uint(_) => ScalarKind::Uint,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Bool(x) => x.len(),
            Self::Int(x) => x.len(),
            Self::Uint(x) => x.len(),
            Self::Float(x) => x.len(),
            Self::Double(x) => x.len(),
        }
    }

    fn write_channel(&self, buffer: &mut String, index: usize) {
        match self {
            Self::Bool(x) => write!(buffer, "{}", x[index]).ok(),
            Self::Int(x) if x[index] >= 0 => write!(buffer, "{}", x[index]).ok(),
            Self::Int(x) => write!(buffer, "({})", x[index]).ok(),
            Self::Uint(x) => write!(buffer, "{}u", x[index]).ok(),
            Self::Float(x) => match x[index] {
                f32::INFINITY => write!(buffer, "4e+100").ok(),
                f32::NEG_INFINITY => write!(buffer, "(-4e+100)").ok(),
                x if x.is_nan() => write!(buffer, "(0.0/0.0)").ok(),
                x if x.is_sign_positive() => write!(buffer, "{:?}", x).ok(),
                x => write!(buffer, "({:?})", x).ok(),
            },
            Self::Double(x) => match x[index] {
                f64::INFINITY => write!(buffer, "4e+400lf").ok(),
                f64::NEG_INFINITY => write!(buffer, "(-4e+400lf)").ok(),
                x if x.is_nan() => write!(buffer, "(0.0lf/0.0lf)").ok(),
                x if x.is_sign_positive() => write!(buffer, "{:?}lf", x).ok(),
                x => write!(buffer, "({:?}lf)", x).ok(),
            },
        };
    }
}

impl ConstantValue {
    /// Creates a constant, checking that `data` matches the kind and channel count of `ty`.
    pub fn new(ty: TypeDescriptor, data: ConstantData) -> Result<Self> {
        if data.kind() != ty.kind() || data.len() != ty.channels() as usize {
            return Err(Error::InvalidType {
                kind: data.kind(),
                channels: data.len() as u32,
            });
        }

        Ok(Self { ty, data })
    }

    pub fn ty(&self) -> TypeDescriptor {
        self.ty
    }

    pub fn data(&self) -> &ConstantData {
        &self.data
    }

    /// Renders the constant as a GLSL literal or constructor call.
    pub fn to_glsl(&self) -> String {
        let mut buffer = String::new();
        if self.ty.is_scalar() {
            self.data.write_channel(&mut buffer, 0);
            return buffer;
        }

        write!(buffer, "{}(", self.ty).ok();
        for i in 0..self.data.len() {
            if i > 0 {
                buffer.push_str(", ");
            }
            self.data.write_channel(&mut buffer, i);
        }
        buffer.push(')');
        buffer
    }
}

impl Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_glsl())
    }
}

macro_rules! impl_constant {
    ($scalar:ty, $variant:ident) => {
        impl From<$scalar> for ConstantValue {
            fn from(value: $scalar) -> Self {
                Self {
                    ty: <$scalar>::TYPE,
                    data: ConstantData::$variant(vec![value]),
                }
            }
        }

        impl<const N: usize> From<[$scalar; N]> for ConstantValue
        where
            [$scalar; N]: NativeType,
        {
            fn from(value: [$scalar; N]) -> Self {
                Self {
                    ty: <[$scalar; N]>::TYPE,
                    data: ConstantData::$variant(value.to_vec()),
                }
            }
        }

        impl<const N: usize> From<[[$scalar; N]; N]> for ConstantValue
        where
            [[$scalar; N]; N]: NativeType,
        {
            fn from(value: [[$scalar; N]; N]) -> Self {
                Self {
                    ty: <[[$scalar; N]; N]>::TYPE,
                    data: ConstantData::$variant(value.iter().flatten().copied().collect()),
                }
            }
        }
    };
}

impl_constant!(bool, Bool);
impl_constant!(i32, Int);
impl_constant!(u32, Uint);
impl_constant!(f32, Float);
impl_constant!(f64, Double);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TypeDescriptor::BOOL, "bool", 1, 4, 1)]
    #[case(TypeDescriptor::BVEC2, "bvec2", 2, 8, 1)]
    #[case(TypeDescriptor::BVEC3, "bvec3", 3, 12, 1)]
    #[case(TypeDescriptor::BVEC4, "bvec4", 4, 16, 1)]
    #[case(TypeDescriptor::INT, "int", 1, 4, 1)]
    #[case(TypeDescriptor::IVEC2, "ivec2", 2, 8, 1)]
    #[case(TypeDescriptor::IVEC3, "ivec3", 3, 12, 1)]
    #[case(TypeDescriptor::IVEC4, "ivec4", 4, 16, 1)]
    #[case(TypeDescriptor::UINT, "uint", 1, 4, 1)]
    #[case(TypeDescriptor::UVEC2, "uvec2", 2, 8, 1)]
    #[case(TypeDescriptor::UVEC3, "uvec3", 3, 12, 1)]
    #[case(TypeDescriptor::UVEC4, "uvec4", 4, 16, 1)]
    #[case(TypeDescriptor::FLOAT, "float", 1, 4, 1)]
    #[case(TypeDescriptor::VEC2, "vec2", 2, 8, 1)]
    #[case(TypeDescriptor::VEC3, "vec3", 3, 12, 1)]
    #[case(TypeDescriptor::VEC4, "vec4", 4, 16, 1)]
    #[case(TypeDescriptor::MAT3, "mat3", 9, 36, 3)]
    #[case(TypeDescriptor::MAT4, "mat4", 16, 64, 4)]
    #[case(TypeDescriptor::DOUBLE, "double", 1, 8, 1)]
    #[case(TypeDescriptor::DVEC2, "dvec2", 2, 16, 1)]
    #[case(TypeDescriptor::DVEC3, "dvec3", 3, 24, 2)]
    #[case(TypeDescriptor::DVEC4, "dvec4", 4, 32, 2)]
    #[case(TypeDescriptor::DMAT3, "dmat3", 9, 72, 6)]
    #[case(TypeDescriptor::DMAT4, "dmat4", 16, 128, 8)]
    fn layout(
        #[case] ty: TypeDescriptor,
        #[case] name: &str,
        #[case] channels: u32,
        #[case] size: u32,
        #[case] locations: u32,
    ) {
        assert_eq!(ty.name(), name);
        assert_eq!(ty.channels(), channels);
        assert_eq!(ty.size(), size);
        assert_eq!(ty.locations(), locations);
        assert_eq!(TypeDescriptor::new(ty.kind(), channels), Ok(ty));
    }

    #[test]
    fn rejects_unsupported_arities() {
        assert!(TypeDescriptor::new(ScalarKind::Float, 0).is_err());
        assert!(TypeDescriptor::new(ScalarKind::Float, 5).is_err());
        assert!(TypeDescriptor::new(ScalarKind::Float, 8).is_err());
        assert!(TypeDescriptor::new(ScalarKind::Int, 16).is_err());
        assert!(TypeDescriptor::new(ScalarKind::Bool, 9).is_err());
        assert_eq!(TypeDescriptor::new(ScalarKind::Double, 9), Ok(TypeDescriptor::DMAT3));
        assert_eq!(
            TypeDescriptor::new(ScalarKind::Uint, 7),
            Err(Error::InvalidType {
                kind: ScalarKind::Uint,
                channels: 7
            })
        );
    }

    #[test]
    fn native_types() {
        assert_eq!(TypeDescriptor::of::<f32>(), TypeDescriptor::FLOAT);
        assert_eq!(TypeDescriptor::of::<[u32; 3]>(), TypeDescriptor::UVEC3);
        assert_eq!(TypeDescriptor::of::<[[f32; 4]; 4]>(), TypeDescriptor::MAT4);
        assert_eq!(TypeDescriptor::of::<[[f64; 3]; 3]>().locations(), 6);
    }

    #[test]
    fn constant_literals() {
        assert_eq!(ConstantValue::from(0.5f32).to_glsl(), "0.5");
        assert_eq!(ConstantValue::from(1.0f32).to_glsl(), "1.0");
        assert_eq!(ConstantValue::from(-2i32).to_glsl(), "(-2)");
        assert_eq!(ConstantValue::from(3u32).to_glsl(), "3u");
        assert_eq!(ConstantValue::from(0.25f64).to_glsl(), "0.25lf");
        assert_eq!(ConstantValue::from(f32::NAN).to_glsl(), "(0.0/0.0)");
        assert_eq!(
            ConstantValue::from([1.0f32, 0.0, 0.5, 1.0]).to_glsl(),
            "vec4(1.0, 0.0, 0.5, 1.0)"
        );
        assert_eq!(ConstantValue::from([true, false]).to_glsl(), "bvec2(true, false)");

        let identity = ConstantValue::from([[1.0f32, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(identity.ty(), TypeDescriptor::MAT3);
        assert_eq!(
            identity.to_glsl(),
            "mat3(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)"
        );
    }

    #[test]
    fn constant_shape_is_checked() {
        let err = ConstantValue::new(TypeDescriptor::VEC3, ConstantData::Float(vec![1.0, 2.0]));
        assert!(matches!(err, Err(Error::InvalidType { channels: 2, .. })));

        let err = ConstantValue::new(TypeDescriptor::VEC2, ConstantData::Int(vec![1, 2]));
        assert!(err.is_err());

        let ok = ConstantValue::new(TypeDescriptor::IVEC2, ConstantData::Int(vec![1, -2])).unwrap();
        assert_eq!(ok.to_glsl(), "ivec2(1, (-2))");
    }
}
