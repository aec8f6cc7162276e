//! Reusable functions for building shader graphs.
//!
//! Every function here is expressed with [`Function::build`] and the [`CodeBuilder`]
//! primitives only; none of them needs anything from the compiler beyond that.

use crate::compiler::codegen::component;
use shadergraph_core::{CodeBuilder, Error, Function, Result, ScalarKind, Signature, TypeDescriptor, Value};

macro_rules! impl_function {
    ($ty:ident, $name:literal, |$self:ident, $cx:ident, $args:ident| $build:expr) => {
        impl Function for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn signature(&self) -> &Signature {
                &self.signature
            }

            #[allow(unused_variables)]
            fn build(&$self, $cx: &mut CodeBuilder<'_>, $args: &[Value]) -> Value {
                $build
            }
        }
    };
}

/// Makes `value` safe to reference more than once without re-evaluating it.
fn bind(cx: &mut CodeBuilder<'_>, value: &Value) -> Value {
    let plain = value
        .expr()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');

    if value.is_temporary() || plain {
        value.clone()
    } else {
        cx.temporary(value.ty(), value)
    }
}

/// Fails unless `ty` is a float or double scalar or vector.
fn require_floating(ty: TypeDescriptor) -> Result<()> {
    match ty.kind() {
        ScalarKind::Float | ScalarKind::Double if !ty.is_matrix() => Ok(()),
        kind => Err(Error::InvalidType {
            kind,
            channels: ty.channels(),
        }),
    }
}

fn scalar_of(ty: TypeDescriptor) -> TypeDescriptor {
    match ty.kind() {
        ScalarKind::Double => TypeDescriptor::DOUBLE,
        ScalarKind::Int => TypeDescriptor::INT,
        ScalarKind::Uint => TypeDescriptor::UINT,
        ScalarKind::Bool => TypeDescriptor::BOOL,
        ScalarKind::Float => TypeDescriptor::FLOAT,
    }
}

/// `a + b`, componentwise.
#[derive(Debug)]
pub struct Add {
    signature: Signature,
}

/// `a - b`, componentwise.
#[derive(Debug)]
pub struct Subtract {
    signature: Signature,
}

/// `a * b`, componentwise (`matrixCompMult` for matrices). See [`MatrixMultiply`] for the
/// linear algebra product.
#[derive(Debug)]
pub struct Multiply {
    signature: Signature,
}

/// A value scaled by a scalar of the same kind.
#[derive(Debug)]
pub struct Scale {
    signature: Signature,
}

#[derive(Debug)]
pub struct Dot {
    signature: Signature,
}

#[derive(Debug)]
pub struct Cross {
    signature: Signature,
}

#[derive(Debug)]
pub struct Normalize {
    signature: Signature,
}

#[derive(Debug)]
pub struct Length {
    signature: Signature,
}

/// Linear blend `mix(a, b, t)` with a scalar factor.
#[derive(Debug)]
pub struct Mix {
    signature: Signature,
}

#[derive(Debug)]
pub struct Clamp {
    signature: Signature,
}

/// Clamps to `[0, 1]`.
#[derive(Debug)]
pub struct Saturate {
    signature: Signature,
}

/// Reorders or selects vector components, e.g. `.zyx` or `.xxy`.
#[derive(Debug)]
pub struct Swizzle {
    pattern: String,
    signature: Signature,
}

/// Extracts a single channel. Matrix channels are numbered column-major.
#[derive(Debug)]
pub struct Split {
    channel: u32,
    signature: Signature,
}

/// Builds a vector out of scalars.
#[derive(Debug)]
pub struct Combine {
    signature: Signature,
}

/// `(m * vec4(p, 1.0)).xyz`
#[derive(Debug)]
pub struct TransformPoint {
    signature: Signature,
}

/// `(m * vec4(d, 0.0)).xyz`
#[derive(Debug)]
pub struct TransformDirection {
    signature: Signature,
}

/// Matrix by matrix or matrix by column vector product.
#[derive(Debug)]
pub struct MatrixMultiply {
    signature: Signature,
}

/// Multiplies the color channels of an rgba value by its alpha.
#[derive(Debug)]
pub struct Premultiply {
    signature: Signature,
}

/// Relative luminance of a linear rgb color (Rec. 709 weights).
#[derive(Debug)]
pub struct Luminance {
    signature: Signature,
}

/// Schlick's approximation of the Fresnel factor.
#[derive(Debug)]
pub struct Fresnel {
    signature: Signature,
}

/// Any GLSL builtin function (or one declared elsewhere), called as `name(args...)`.
#[derive(Debug)]
pub struct Generic {
    name: String,
    signature: Signature,
}

impl Add {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            signature: Signature::new([("a", ty), ("b", ty)], ty),
        }
    }
}

impl_function!(Add, "add", |self, cx, args| Value::inline(
    self.signature.output(),
    format!("({} + {})", args[0], args[1])
));

impl Subtract {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            signature: Signature::new([("a", ty), ("b", ty)], ty),
        }
    }
}

impl_function!(Subtract, "subtract", |self, cx, args| Value::inline(
    self.signature.output(),
    format!("({} - {})", args[0], args[1])
));

impl Multiply {
    /// Fails for boolean types.
    pub fn new(ty: TypeDescriptor) -> Result<Self> {
        if ty.kind() == ScalarKind::Bool {
            return Err(Error::InvalidType {
                kind: ty.kind(),
                channels: ty.channels(),
            });
        }

        Ok(Self {
            signature: Signature::new([("a", ty), ("b", ty)], ty),
        })
    }
}

impl_function!(Multiply, "multiply", |self, cx, args| {
    let ty = self.signature.output();
    if ty.is_matrix() {
        Value::inline(ty, CodeBuilder::call("matrixCompMult", args))
    } else {
        Value::inline(ty, format!("({} * {})", args[0], args[1]))
    }
});

impl Scale {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            signature: Signature::new([("value", ty), ("factor", scalar_of(ty))], ty),
        }
    }
}

impl_function!(Scale, "scale", |self, cx, args| Value::inline(
    self.signature.output(),
    format!("({} * {})", args[0], args[1])
));

impl Dot {
    pub fn new(ty: TypeDescriptor) -> Result<Self> {
        require_floating(ty)?;
        Ok(Self {
            signature: Signature::new([("a", ty), ("b", ty)], scalar_of(ty)),
        })
    }
}

impl_function!(Dot, "dot", |self, cx, args| Value::inline(
    self.signature.output(),
    CodeBuilder::call("dot", args)
));

impl Cross {
    pub fn new() -> Self {
        let ty = TypeDescriptor::VEC3;
        Self {
            signature: Signature::new([("a", ty), ("b", ty)], ty),
        }
    }

    /// A cross product over `vec3` or `dvec3`.
    pub fn with_type(ty: TypeDescriptor) -> Result<Self> {
        require_floating(ty)?;
        if ty.channels() != 3 {
            return Err(Error::TypeMismatch {
                target: "cross product".into(),
                slot: 0,
                expected: 3,
                found: ty.channels(),
            });
        }

        Ok(Self {
            signature: Signature::new([("a", ty), ("b", ty)], ty),
        })
    }
}

impl Default for Cross {
    fn default() -> Self {
        Self::new()
    }
}

impl_function!(Cross, "cross", |self, cx, args| Value::inline(
    self.signature.output(),
    CodeBuilder::call("cross", args)
));

impl Normalize {
    pub fn new(ty: TypeDescriptor) -> Result<Self> {
        require_floating(ty)?;
        Ok(Self {
            signature: Signature::new([("value", ty)], ty),
        })
    }
}

impl_function!(Normalize, "normalize", |self, cx, args| Value::inline(
    self.signature.output(),
    CodeBuilder::call("normalize", args)
));

impl Length {
    pub fn new(ty: TypeDescriptor) -> Result<Self> {
        require_floating(ty)?;
        Ok(Self {
            signature: Signature::new([("value", ty)], scalar_of(ty)),
        })
    }
}

impl_function!(Length, "length", |self, cx, args| Value::inline(
    self.signature.output(),
    CodeBuilder::call("length", args)
));

impl Mix {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            signature: Signature::new([("a", ty), ("b", ty), ("factor", scalar_of(ty))], ty),
        }
    }
}

impl_function!(Mix, "mix", |self, cx, args| Value::inline(
    self.signature.output(),
    CodeBuilder::call("mix", args)
));

impl Clamp {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self {
            signature: Signature::new([("value", ty), ("min", ty), ("max", ty)], ty),
        }
    }
}

impl_function!(Clamp, "clamp", |self, cx, args| Value::inline(
    self.signature.output(),
    CodeBuilder::call("clamp", args)
));

impl Saturate {
    pub fn new(ty: TypeDescriptor) -> Result<Self> {
        require_floating(ty)?;
        Ok(Self {
            signature: Signature::new([("value", ty)], ty),
        })
    }
}

impl_function!(Saturate, "saturate", |self, cx, args| Value::inline(
    self.signature.output(),
    format!("clamp({}, 0.0, 1.0)", args[0])
));

impl Swizzle {
    /// Fails if `pattern` is not 1 to 4 of `xyzw`, `rgba` or `stpq` (not mixed), or if it
    /// addresses a channel `input` doesn't have.
    pub fn new(input: TypeDescriptor, pattern: &str) -> Result<Self> {
        const SETS: [&str; 3] = ["xyzw", "rgba", "stpq"];

        let valid = (1..=4).contains(&pattern.len())
            && !input.is_matrix()
            && SETS.iter().any(|set| {
                pattern
                    .chars()
                    .all(|c| set.find(c).is_some_and(|i| (i as u32) < input.channels()))
            });

        if !valid {
            return Err(Error::TypeMismatch {
                target: format!("swizzle `.{}`", pattern),
                slot: 0,
                expected: pattern.len() as u32,
                found: input.channels(),
            });
        }

        let output = input.with_channels(pattern.len() as u32)?;
        Ok(Self {
            pattern: pattern.to_string(),
            signature: Signature::new([("value", input)], output),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl_function!(Swizzle, "swizzle", |self, cx, args| Value::inline(
    self.signature.output(),
    format!("{}.{}", args[0], self.pattern)
));

impl Split {
    pub fn new(input: TypeDescriptor, channel: u32) -> Result<Self> {
        if channel >= input.channels() {
            return Err(Error::TypeMismatch {
                target: format!("split channel {}", channel),
                slot: 0,
                expected: channel + 1,
                found: input.channels(),
            });
        }

        Ok(Self {
            channel,
            signature: Signature::new([("value", input)], scalar_of(input)),
        })
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }
}

impl_function!(Split, "split", |self, cx, args| {
    let input = self.signature.inputs()[0].ty;
    let expr = if input.is_scalar() {
        args[0].expr().to_string()
    } else if input.is_matrix() {
        let rows = input.rows();
        format!("{}[{}][{}]", args[0], self.channel / rows, self.channel % rows)
    } else {
        format!("{}.{}", args[0], component(self.channel))
    };

    Value::inline(self.signature.output(), expr)
});

impl Combine {
    /// `output` must be a vector type; the inputs are one scalar per component.
    pub fn new(output: TypeDescriptor) -> Result<Self> {
        if output.is_matrix() {
            return Err(Error::InvalidType {
                kind: output.kind(),
                channels: output.channels(),
            });
        }

        let scalar = scalar_of(output);
        let names = ["x", "y", "z", "w"];
        Ok(Self {
            signature: Signature::new(
                names[..output.channels() as usize].iter().map(|name| (*name, scalar)),
                output,
            ),
        })
    }
}

impl_function!(Combine, "combine", |self, cx, args| {
    let output = self.signature.output();
    if output.is_scalar() {
        args[0].clone()
    } else {
        Value::inline(output, CodeBuilder::call(&output.name(), args))
    }
});

impl TransformPoint {
    pub fn new() -> Self {
        Self {
            signature: Signature::new(
                [("matrix", TypeDescriptor::MAT4), ("point", TypeDescriptor::VEC3)],
                TypeDescriptor::VEC3,
            ),
        }
    }
}

impl Default for TransformPoint {
    fn default() -> Self {
        Self::new()
    }
}

impl_function!(TransformPoint, "transform_point", |self, cx, args| Value::inline(
    TypeDescriptor::VEC3,
    format!("({} * vec4({}, 1.0)).xyz", args[0], args[1])
));

impl TransformDirection {
    pub fn new() -> Self {
        Self {
            signature: Signature::new(
                [("matrix", TypeDescriptor::MAT4), ("direction", TypeDescriptor::VEC3)],
                TypeDescriptor::VEC3,
            ),
        }
    }
}

impl Default for TransformDirection {
    fn default() -> Self {
        Self::new()
    }
}

impl_function!(TransformDirection, "transform_direction", |self, cx, args| Value::inline(
    TypeDescriptor::VEC3,
    format!("({} * vec4({}, 0.0)).xyz", args[0], args[1])
));

impl MatrixMultiply {
    /// `lhs` must be a matrix; `rhs` a matrix of the same shape or a column vector with as
    /// many rows. The result has the type of `rhs`.
    pub fn new(lhs: TypeDescriptor, rhs: TypeDescriptor) -> Result<Self> {
        let valid = lhs.is_matrix()
            && lhs.kind() == rhs.kind()
            && (rhs == lhs || (!rhs.is_matrix() && rhs.channels() == lhs.rows()));

        if !valid {
            return Err(Error::TypeMismatch {
                target: format!("`{}` by `{}` product", lhs, rhs),
                slot: 1,
                expected: lhs.rows(),
                found: rhs.channels(),
            });
        }

        Ok(Self {
            signature: Signature::new([("lhs", lhs), ("rhs", rhs)], rhs),
        })
    }
}

impl_function!(MatrixMultiply, "matrix_multiply", |self, cx, args| Value::inline(
    self.signature.output(),
    format!("({} * {})", args[0], args[1])
));

impl Premultiply {
    pub fn new() -> Self {
        Self {
            signature: Signature::new([("color", TypeDescriptor::VEC4)], TypeDescriptor::VEC4),
        }
    }
}

impl Default for Premultiply {
    fn default() -> Self {
        Self::new()
    }
}

impl_function!(Premultiply, "premultiply", |self, cx, args| {
    let color = bind(cx, &args[0]);
    Value::inline(TypeDescriptor::VEC4, format!("vec4({0}.rgb * {0}.a, {0}.a)", color))
});

impl Luminance {
    pub fn new() -> Self {
        Self {
            signature: Signature::new([("color", TypeDescriptor::VEC3)], TypeDescriptor::FLOAT),
        }
    }
}

impl Default for Luminance {
    fn default() -> Self {
        Self::new()
    }
}

impl_function!(Luminance, "luminance", |self, cx, args| Value::inline(
    TypeDescriptor::FLOAT,
    format!("dot({}, vec3(0.2126, 0.7152, 0.0722))", args[0])
));

impl Fresnel {
    pub fn new() -> Self {
        Self {
            signature: Signature::new(
                [
                    ("normal", TypeDescriptor::VEC3),
                    ("view", TypeDescriptor::VEC3),
                    ("f0", TypeDescriptor::FLOAT),
                ],
                TypeDescriptor::FLOAT,
            ),
        }
    }
}

impl Default for Fresnel {
    fn default() -> Self {
        Self::new()
    }
}

impl_function!(Fresnel, "fresnel", |self, cx, args| {
    let f0 = bind(cx, &args[2]);
    let cosine = cx.temporary(
        TypeDescriptor::FLOAT,
        format!("clamp(dot({}, {}), 0.0, 1.0)", args[0], args[1]),
    );

    Value::inline(
        TypeDescriptor::FLOAT,
        format!("({0} + (1.0 - {0}) * pow(1.0 - {1}, 5.0))", f0, cosine),
    )
});

impl Generic {
    pub fn new<'a>(
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = (&'a str, TypeDescriptor)>,
        output: TypeDescriptor,
    ) -> Self {
        Self {
            name: name.into(),
            signature: Signature::new(inputs, output),
        }
    }
}

impl Function for Generic {
    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn build(&self, _: &mut CodeBuilder<'_>, args: &[Value]) -> Value {
        Value::inline(self.signature.output(), CodeBuilder::call(&self.name, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn build(function: &dyn Function, args: &[Value]) -> (Value, String) {
        let mut body = String::new();
        let mut counter = 0;
        let value = function.build(&mut CodeBuilder::new(&mut body, &mut counter, "_", None), args);
        (value, body)
    }

    fn var(ty: TypeDescriptor, name: &str) -> Value {
        Value::inline(ty, name)
    }

    #[rstest]
    #[case(&Add::new(TypeDescriptor::VEC3), "(a + b)")]
    #[case(&Subtract::new(TypeDescriptor::VEC3), "(a - b)")]
    #[case(&Multiply::new(TypeDescriptor::VEC3).unwrap(), "(a * b)")]
    #[case(&Cross::new(), "cross(a, b)")]
    #[case(&Dot::new(TypeDescriptor::VEC3).unwrap(), "dot(a, b)")]
    fn binary_operators(#[case] function: &dyn Function, #[case] expected: &str) {
        let args = [var(TypeDescriptor::VEC3, "a"), var(TypeDescriptor::VEC3, "b")];
        let (value, body) = build(function, &args);
        assert_eq!(value.expr(), expected);
        assert_eq!(value.ty(), function.signature().output());
        assert!(body.is_empty());
    }

    #[test]
    fn scalar_results_keep_the_kind() {
        assert_eq!(
            Dot::new(TypeDescriptor::DVEC3).unwrap().signature().output(),
            TypeDescriptor::DOUBLE
        );
        assert_eq!(
            Length::new(TypeDescriptor::VEC2).unwrap().signature().output(),
            TypeDescriptor::FLOAT
        );
        assert_eq!(
            Scale::new(TypeDescriptor::IVEC3).signature().input(1).unwrap().ty,
            TypeDescriptor::INT
        );
        assert_eq!(
            Mix::new(TypeDescriptor::VEC4).signature().input(2).unwrap().ty,
            TypeDescriptor::FLOAT
        );
    }

    #[test]
    fn swizzles_are_validated() {
        let swizzle = Swizzle::new(TypeDescriptor::VEC4, "zyx").unwrap();
        assert_eq!(swizzle.signature().output(), TypeDescriptor::VEC3);

        let (value, _) = build(&swizzle, &[var(TypeDescriptor::VEC4, "color")]);
        assert_eq!(value.expr(), "color.zyx");

        assert!(Swizzle::new(TypeDescriptor::VEC4, "rgba").is_ok());
        assert!(Swizzle::new(TypeDescriptor::VEC2, "xyz").is_err());
        assert!(Swizzle::new(TypeDescriptor::VEC4, "xg").is_err());
        assert!(Swizzle::new(TypeDescriptor::VEC4, "").is_err());
        assert!(Swizzle::new(TypeDescriptor::VEC4, "xyzwx").is_err());
        assert!(Swizzle::new(TypeDescriptor::MAT3, "x").is_err());
        assert!(Swizzle::new(TypeDescriptor::VEC4, "xxxxxxxxx").is_err());
        assert!(Swizzle::new(TypeDescriptor::VEC2, &"xy".repeat(8)).is_err());
    }

    #[rstest]
    #[case(Saturate::new(TypeDescriptor::IVEC3).map(|_| ()))]
    #[case(Saturate::new(TypeDescriptor::MAT3).map(|_| ()))]
    #[case(Multiply::new(TypeDescriptor::BVEC2).map(|_| ()))]
    #[case(Dot::new(TypeDescriptor::MAT4).map(|_| ()))]
    #[case(Dot::new(TypeDescriptor::UVEC3).map(|_| ()))]
    #[case(Length::new(TypeDescriptor::BOOL).map(|_| ()))]
    #[case(Normalize::new(TypeDescriptor::DMAT3).map(|_| ()))]
    #[case(Cross::with_type(TypeDescriptor::VEC2).map(|_| ()))]
    #[case(Cross::with_type(TypeDescriptor::IVEC3).map(|_| ()))]
    fn operand_types_are_validated(#[case] result: Result<()>) {
        assert!(result.is_err());
    }

    #[test]
    fn floating_operands_are_accepted() {
        assert!(Saturate::new(TypeDescriptor::DVEC4).is_ok());
        assert!(Normalize::new(TypeDescriptor::FLOAT).is_ok());
        assert!(Multiply::new(TypeDescriptor::IVEC2).is_ok());
        assert!(Multiply::new(TypeDescriptor::DMAT4).is_ok());
        assert_eq!(
            Cross::with_type(TypeDescriptor::DVEC3).unwrap().signature().output(),
            TypeDescriptor::DVEC3
        );
    }

    #[test]
    fn split_and_combine() {
        let (value, _) = build(&Split::new(TypeDescriptor::VEC3, 2).unwrap(), &[var(TypeDescriptor::VEC3, "v")]);
        assert_eq!(value.expr(), "v.z");

        let (value, _) = build(&Split::new(TypeDescriptor::MAT4, 7).unwrap(), &[var(TypeDescriptor::MAT4, "m")]);
        assert_eq!(value.expr(), "m[1][3]");
        assert!(Split::new(TypeDescriptor::VEC2, 2).is_err());

        let combine = Combine::new(TypeDescriptor::VEC3).unwrap();
        assert_eq!(combine.signature().arity(), 3);
        let args = [
            var(TypeDescriptor::FLOAT, "r"),
            var(TypeDescriptor::FLOAT, "g"),
            var(TypeDescriptor::FLOAT, "b"),
        ];
        let (value, _) = build(&combine, &args);
        assert_eq!(value.expr(), "vec3(r, g, b)");
        assert!(Combine::new(TypeDescriptor::MAT3).is_err());
    }

    #[test]
    fn transforms() {
        let args = [var(TypeDescriptor::MAT4, "camera.view"), var(TypeDescriptor::VEC3, "p")];
        assert_eq!(build(&TransformPoint::new(), &args).0.expr(), "(camera.view * vec4(p, 1.0)).xyz");
        assert_eq!(
            build(&TransformDirection::new(), &args).0.expr(),
            "(camera.view * vec4(p, 0.0)).xyz"
        );

        let product = MatrixMultiply::new(TypeDescriptor::MAT4, TypeDescriptor::VEC4).unwrap();
        assert_eq!(product.signature().output(), TypeDescriptor::VEC4);
        assert!(MatrixMultiply::new(TypeDescriptor::MAT4, TypeDescriptor::MAT4).is_ok());
        assert!(MatrixMultiply::new(TypeDescriptor::MAT4, TypeDescriptor::VEC3).is_err());
        assert!(MatrixMultiply::new(TypeDescriptor::MAT3, TypeDescriptor::DVEC3).is_err());
        assert!(MatrixMultiply::new(TypeDescriptor::VEC4, TypeDescriptor::VEC4).is_err());
    }

    #[test]
    fn repeated_operands_are_bound_once() {
        let (value, body) = build(&Premultiply::new(), &[var(TypeDescriptor::VEC4, "color")]);
        assert_eq!(value.expr(), "vec4(color.rgb * color.a, color.a)");
        assert!(body.is_empty());

        let sampled = var(TypeDescriptor::VEC4, "texture(textures[0], inUv)");
        let (value, body) = build(&Premultiply::new(), &[sampled]);
        assert_eq!(value.expr(), "vec4(_0.rgb * _0.a, _0.a)");
        assert_eq!(body, "    vec4 _0 = texture(textures[0], inUv);\n");
    }

    #[test]
    fn fresnel() {
        let args = [
            var(TypeDescriptor::VEC3, "n"),
            var(TypeDescriptor::VEC3, "v"),
            var(TypeDescriptor::FLOAT, "0.04"),
        ];
        let (value, body) = build(&Fresnel::new(), &args);
        assert_eq!(body, "    float _0 = clamp(dot(n, v), 0.0, 1.0);\n");
        assert_eq!(value.expr(), "(0.04 + (1.0 - 0.04) * pow(1.0 - _0, 5.0))");
    }

    #[test]
    fn generic_calls() {
        let step = Generic::new(
            "smoothstep",
            [
                ("edge0", TypeDescriptor::FLOAT),
                ("edge1", TypeDescriptor::FLOAT),
                ("x", TypeDescriptor::FLOAT),
            ],
            TypeDescriptor::FLOAT,
        );
        assert_eq!(step.name(), "smoothstep");

        let args = [
            var(TypeDescriptor::FLOAT, "0.0"),
            var(TypeDescriptor::FLOAT, "1.0"),
            var(TypeDescriptor::FLOAT, "t"),
        ];
        assert_eq!(build(&step, &args).0.expr(), "smoothstep(0.0, 1.0, t)");
        assert_eq!(
            build(&Saturate::new(TypeDescriptor::VEC3).unwrap(), &[var(TypeDescriptor::VEC3, "c")]).0.expr(),
            "clamp(c, 0.0, 1.0)"
        );
        assert_eq!(
            build(&Luminance::new(), &[var(TypeDescriptor::VEC3, "c")]).0.expr(),
            "dot(c, vec3(0.2126, 0.7152, 0.0722))"
        );
    }
}
