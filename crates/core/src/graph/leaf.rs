use crate::{Builtin, CodeBuilder, ConstantValue, Function, Requirement, Signature, TextureRef, TypeDescriptor, Value};

/// A literal value.
#[derive(Debug)]
pub struct Constant {
    value: ConstantValue,
    signature: Signature,
}

/// A value provided by the backend through a capability, such as the vertex uv or the view matrix.
#[derive(Debug)]
pub struct BuiltinConstant {
    builtin: Builtin,
    signature: Signature,
}

/// Samples an external texture at a uv coordinate.
#[derive(Debug)]
pub struct TextureSample {
    texture: TextureRef,
    signature: Signature,
}

impl Constant {
    pub fn new(value: impl Into<ConstantValue>) -> Self {
        let value = value.into();
        Self {
            signature: Signature::leaf(value.ty()),
            value,
        }
    }

    pub fn value(&self) -> &ConstantValue {
        &self.value
    }
}

impl Function for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn is_trivial(&self) -> bool {
        true
    }

    fn build(&self, _: &mut CodeBuilder<'_>, _: &[Value]) -> Value {
        Value::inline(self.value.ty(), self.value.to_glsl())
    }
}

impl BuiltinConstant {
    pub fn new(builtin: Builtin) -> Self {
        Self {
            builtin,
            signature: Signature::leaf(builtin.ty()),
        }
    }

    pub fn builtin(&self) -> Builtin {
        self.builtin
    }
}

impl Function for BuiltinConstant {
    fn name(&self) -> &str {
        self.builtin.name()
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn requirement(&self) -> Option<Requirement> {
        Some(Requirement::Builtin(self.builtin))
    }

    fn is_trivial(&self) -> bool {
        true
    }

    fn build(&self, cx: &mut CodeBuilder<'_>, _: &[Value]) -> Value {
        // the compiler always resolves the accessor first
        let access = cx.access().unwrap_or(self.builtin.name());
        Value::inline(self.builtin.ty(), access)
    }
}

impl TextureSample {
    pub fn new(texture: TextureRef) -> Self {
        Self {
            texture,
            signature: Signature::new([("uv", TypeDescriptor::VEC2)], TypeDescriptor::VEC4),
        }
    }

    pub fn texture(&self) -> TextureRef {
        self.texture
    }
}

impl Function for TextureSample {
    fn name(&self) -> &str {
        "texture_sample"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn requirement(&self) -> Option<Requirement> {
        Some(Requirement::Texture(self.texture))
    }

    fn build(&self, cx: &mut CodeBuilder<'_>, args: &[Value]) -> Value {
        let sampler = cx.access().unwrap_or("textures[0]");
        Value::inline(TypeDescriptor::VEC4, format!("texture({}, {})", sampler, args[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(function: &dyn Function, access: Option<&str>, args: &[Value]) -> (Value, String) {
        let mut body = String::new();
        let mut counter = 0;
        let value = function.build(&mut CodeBuilder::new(&mut body, &mut counter, "_", access), args);
        (value, body)
    }

    #[test]
    fn leaves_emit_inline_expressions() {
        let (value, body) = build(&Constant::new(0.5f32), None, &[]);
        assert_eq!(value.expr(), "0.5");
        assert!(body.is_empty());

        let (value, _) = build(&BuiltinConstant::new(Builtin::ViewMatrix), Some("camera.view"), &[]);
        assert_eq!(value.expr(), "camera.view");
        assert_eq!(value.ty(), TypeDescriptor::MAT4);

        let uv = Value::inline(TypeDescriptor::VEC2, "inUv");
        let (value, _) = build(&TextureSample::new(TextureRef(3)), Some("textures[0]"), &[uv]);
        assert_eq!(value.expr(), "texture(textures[0], inUv)");
    }
}
