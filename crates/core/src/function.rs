use crate::{Requirement, TypeDescriptor};
use std::fmt::{self, Debug, Display, Write};

/// Named, ordered input types and a single output type of a [`Function`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inputs: Vec<SignatureInput>,
    output: TypeDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureInput {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl Signature {
    /// A signature without inputs.
    pub fn leaf(output: TypeDescriptor) -> Self {
        Self {
            inputs: Vec::new(),
            output,
        }
    }

    pub fn new<'a>(inputs: impl IntoIterator<Item = (&'a str, TypeDescriptor)>, output: TypeDescriptor) -> Self {
        Self {
            inputs: inputs
                .into_iter()
                .map(|(name, ty)| SignatureInput {
                    name: name.to_string(),
                    ty,
                })
                .collect(),
            output,
        }
    }

    pub fn inputs(&self) -> &[SignatureInput] {
        &self.inputs
    }

    pub fn input(&self, slot: usize) -> Option<&SignatureInput> {
        self.inputs.get(slot)
    }

    pub fn arity(&self) -> usize {
        self.inputs.len()
    }

    pub fn output(&self) -> TypeDescriptor {
        self.output
    }

    /// Whether `args` satisfy the signature channel-wise.
    pub fn accepts(&self, args: &[Value]) -> bool {
        args.len() == self.inputs.len()
            && args
                .iter()
                .zip(&self.inputs)
                .all(|(arg, input)| arg.ty().channels() == input.ty.channels())
    }
}

/// A resolved expression: either inline text or the identifier of an emitted temporary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Value {
    ty: TypeDescriptor,
    expr: String,
    temporary: bool,
}

impl Value {
    pub fn inline(ty: TypeDescriptor, expr: impl Into<String>) -> Self {
        Self {
            ty,
            expr: expr.into(),
            temporary: false,
        }
    }

    pub fn ty(&self) -> TypeDescriptor {
        self.ty
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

/// Code emission primitives handed to [`Function::build`].
///
/// Statements are appended to the body of the stage currently being generated.
pub struct CodeBuilder<'a> {
    body: &'a mut String,
    temporaries: &'a mut u32,
    prefix: &'a str,
    access: Option<&'a str>,
}

impl<'a> CodeBuilder<'a> {
    pub fn new(body: &'a mut String, temporaries: &'a mut u32, prefix: &'a str, access: Option<&'a str>) -> Self {
        Self {
            body,
            temporaries,
            prefix,
            access,
        }
    }

    /// The access expression of the resolved requirement of the function being built.
    pub fn access(&self) -> Option<&str> {
        self.access
    }

    /// Declares a fresh temporary holding `expr` and returns a reference to it.
    pub fn temporary(&mut self, ty: TypeDescriptor, expr: impl Display) -> Value {
        let ident = format!("{}{}", self.prefix, *self.temporaries);
        *self.temporaries += 1;

        writeln!(self.body, "    {} {} = {};", ty, ident, expr).ok();
        Value {
            ty,
            expr: ident,
            temporary: true,
        }
    }

    /// Appends a raw statement, without the trailing semicolon.
    pub fn statement(&mut self, text: impl Display) {
        writeln!(self.body, "    {};", text).ok();
    }

    /// Formats `name(a, b, ...)`.
    pub fn call(name: &str, args: &[Value]) -> String {
        let mut buffer = String::with_capacity(name.len() + 2 + args.len() * 8);
        buffer.push_str(name);
        buffer.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                buffer.push_str(", ");
            }
            buffer.push_str(arg.expr());
        }
        buffer.push(')');
        buffer
    }
}

/// A named pure computation with a fixed signature.
///
/// Implementors only describe how to emit code; wiring, type checking and ordering are
/// handled by the [`Graph`](crate::Graph) and the compiler. Two instances are distinct
/// nodes even if they are structurally identical.
pub trait Function: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn signature(&self) -> &Signature;

    /// The backend resource this function depends on, if any.
    fn requirement(&self) -> Option<Requirement> {
        None
    }

    /// Trivial values (literals, plain resource accesses) are re-emitted at every use
    /// instead of being stored in a temporary when shared.
    fn is_trivial(&self) -> bool {
        false
    }

    /// Emits code for this function.
    ///
    /// `args` has exactly one value per signature input with a matching channel count.
    fn build(&self, cx: &mut CodeBuilder<'_>, args: &[Value]) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temporaries_are_numbered() {
        let mut body = String::new();
        let mut counter = 0;
        let mut cx = CodeBuilder::new(&mut body, &mut counter, "_", None);

        let a = cx.temporary(TypeDescriptor::VEC3, "vec3(1.0)");
        let b = cx.temporary(TypeDescriptor::FLOAT, CodeBuilder::call("length", &[a.clone()]));
        cx.statement("discard");

        assert_eq!(a.expr(), "_0");
        assert!(b.is_temporary());
        assert_eq!(counter, 2);
        assert_eq!(
            body,
            "    vec3 _0 = vec3(1.0);\n    float _1 = length(_0);\n    discard;\n"
        );
    }

    #[test]
    fn signature_checks_channels_only() {
        let sig = Signature::new([("a", TypeDescriptor::VEC3)], TypeDescriptor::VEC3);
        assert!(sig.accepts(&[Value::inline(TypeDescriptor::DVEC3, "x")]));
        assert!(!sig.accepts(&[Value::inline(TypeDescriptor::VEC2, "x")]));
        assert!(!sig.accepts(&[]));
    }
}
