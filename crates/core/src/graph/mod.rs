mod leaf;

use crate::{Builtin, ConstantValue, Error, Function, Result, TextureRef, TypeDescriptor};
use slotmap::SlotMap;
use std::collections::HashSet;
use std::fmt::Debug;

pub use leaf::*;

slotmap::new_key_type! {
    /// Handle of a node owned by a [`Graph`].
    pub struct NodeId;
}

/// A shader graph.
///
/// Owns every node it creates and hands out [`NodeId`] handles. Each node wraps a single
/// [`Function`] and one input slot per signature input, each of which references another
/// node of the same graph. Wiring is type checked and cycle checked when the edge is created,
/// so a graph is always a well typed DAG (possibly with unwired slots).
#[derive(Default)]
pub struct Graph {
    nodes: SlotMap<NodeId, Node>,
}

pub struct Node {
    function: Box<dyn Function>,
    inputs: Vec<Option<NodeId>>,
}

impl Node {
    pub fn function(&self) -> &dyn Function {
        self.function.as_ref()
    }

    pub fn inputs(&self) -> &[Option<NodeId>] {
        &self.inputs
    }

    pub fn input(&self, slot: usize) -> Option<NodeId> {
        self.inputs.get(slot).copied().flatten()
    }

    pub fn output_type(&self) -> TypeDescriptor {
        self.function.signature().output()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with all inputs unwired.
    pub fn add_node(&mut self, function: impl Function + 'static) -> NodeId {
        self.add_boxed(Box::new(function))
    }

    pub fn add_boxed(&mut self, function: Box<dyn Function>) -> NodeId {
        let inputs = vec![None; function.signature().arity()];
        self.nodes.insert(Node { function, inputs })
    }

    /// Wires the output of `source` into input `slot` of `node`, replacing any previous wire.
    ///
    /// #### Error Conditions
    /// - [`Error::TypeMismatch`] if `slot` is out of range or the channel counts differ.
    /// - [`Error::CyclicGraph`] if `node` is `source` or an ancestor of it.
    /// - [`Error::UnknownNode`] if either handle is not part of this graph.
    pub fn set_input(&mut self, node: NodeId, slot: usize, source: NodeId) -> Result<()> {
        let found = self.output_type(source).ok_or(Error::UnknownNode(source))?;
        let target = self.nodes.get(node).ok_or(Error::UnknownNode(node))?;

        let expected = match target.function.signature().input(slot) {
            Some(input) => input.ty,
            None => {
                return Err(Error::TypeMismatch {
                    target: self.label(node),
                    slot,
                    expected: 0,
                    found: found.channels(),
                });
            }
        };

        if expected.channels() != found.channels() {
            return Err(Error::mismatch(self.label(node), slot, expected, found));
        }

        if node == source || self.reaches(source, node) {
            return Err(Error::CyclicGraph {
                target: self.label(node),
                source_node: self.label(source),
            });
        }

        self.nodes[node].inputs[slot] = Some(source);
        Ok(())
    }

    /// Clears input `slot` of `node`.
    pub fn clear_input(&mut self, node: NodeId, slot: usize) -> Result<()> {
        let target = self.nodes.get_mut(node).ok_or(Error::UnknownNode(node))?;
        if let Some(input) = target.inputs.get_mut(slot) {
            *input = None;
        }

        Ok(())
    }

    pub fn make_constant(&mut self, value: impl Into<ConstantValue>) -> NodeId {
        self.add_node(Constant::new(value))
    }

    pub fn make_builtin_constant(&mut self, builtin: Builtin) -> NodeId {
        self.add_node(BuiltinConstant::new(builtin))
    }

    pub fn make_texture_sample(&mut self, texture: TextureRef, uv: NodeId) -> Result<NodeId> {
        self.make_function(TextureSample::new(texture), &[uv])
    }

    /// Adds a node and wires `inputs` into its slots in order.
    ///
    /// Every input is validated before the node is created, so a failed call leaves the
    /// graph untouched.
    pub fn make_function(&mut self, function: impl Function + 'static, inputs: &[NodeId]) -> Result<NodeId> {
        self.make_boxed(Box::new(function), inputs)
    }

    pub fn make_boxed(&mut self, function: Box<dyn Function>, inputs: &[NodeId]) -> Result<NodeId> {
        let signature = function.signature();
        for (slot, &source) in inputs.iter().enumerate() {
            let found = self.output_type(source).ok_or(Error::UnknownNode(source))?;
            let expected = match signature.input(slot) {
                Some(input) => input.ty.channels(),
                None => 0,
            };

            if expected != found.channels() {
                return Err(Error::TypeMismatch {
                    target: format!("`{}` node", function.name()),
                    slot,
                    expected,
                    found: found.channels(),
                });
            }
        }

        if let Some(missing) = signature.inputs().get(inputs.len()) {
            return Err(Error::TypeMismatch {
                target: format!("`{}` node", function.name()),
                slot: inputs.len(),
                expected: missing.ty.channels(),
                found: 0,
            });
        }

        Ok(self.nodes.insert(Node {
            function,
            inputs: inputs.iter().copied().map(Some).collect(),
        }))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn output_type(&self, id: NodeId) -> Option<TypeDescriptor> {
        self.nodes.get(id).map(Node::output_type)
    }

    pub fn input(&self, node: NodeId, slot: usize) -> Option<NodeId> {
        self.nodes.get(node)?.input(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A human readable name of a node, used in error messages.
    pub fn label(&self, id: NodeId) -> String {
        match self.nodes.get(id) {
            Some(node) => format!("`{}` node {:?}", node.function.name(), id),
            None => format!("{:?}", id),
        }
    }

    /// Whether `target` is `from` or one of its transitive inputs.
    pub fn reaches(&self, from: NodeId, target: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];

        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }

            if !visited.insert(id) {
                continue;
            }

            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.inputs.iter().flatten().copied());
            }
        }

        false
    }
}

impl Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph {{")?;
        for (id, node) in self.nodes.iter() {
            write!(f, "\t{:?} {:?} = {}(", id, node.output_type(), node.function.name())?;
            for (i, input) in node.inputs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                match input {
                    Some(input) => write!(f, "{:?}", input)?,
                    None => write!(f, "_")?,
                }
            }
            writeln!(f, ")")?;
        }
        writeln!(f, "}}")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodeBuilder, Signature, Value};

    #[derive(Debug)]
    struct Add(Signature);

    impl Add {
        fn new(ty: TypeDescriptor) -> Self {
            Self(Signature::new([("a", ty), ("b", ty)], ty))
        }
    }

    impl Function for Add {
        fn name(&self) -> &str {
            "add"
        }

        fn signature(&self) -> &Signature {
            &self.0
        }

        fn build(&self, _: &mut CodeBuilder<'_>, args: &[Value]) -> Value {
            Value::inline(self.0.output(), format!("({} + {})", args[0], args[1]))
        }
    }

    #[test]
    fn wiring_is_type_checked() {
        let mut graph = Graph::new();
        let a = graph.make_constant([1.0f32, 2.0, 3.0]);
        let b = graph.make_constant(1.0f32);
        let add = graph.add_node(Add::new(TypeDescriptor::VEC3));

        assert!(matches!(
            graph.set_input(add, 0, b),
            Err(Error::TypeMismatch {
                slot: 0,
                expected: 3,
                found: 1,
                ..
            })
        ));
        assert!(matches!(graph.set_input(add, 2, a), Err(Error::TypeMismatch { slot: 2, .. })));
        assert_eq!(graph.input(add, 0), None);

        graph.set_input(add, 0, a).unwrap();
        graph.set_input(add, 1, a).unwrap();
        assert_eq!(graph.input(add, 0), Some(a));
        assert_eq!(graph.input(add, 1), Some(a));
    }

    #[test]
    fn channel_count_is_what_matters() {
        let mut graph = Graph::new();
        let a = graph.make_constant([1.0f64, 2.0, 3.0]);
        let add = graph.add_node(Add::new(TypeDescriptor::VEC3));
        assert_eq!(graph.set_input(add, 0, a), Ok(()));
    }

    #[test]
    fn make_function_validates_eagerly() {
        let mut graph = Graph::new();
        let a = graph.make_constant(1.0f32);
        let v = graph.make_constant([1.0f32, 0.0]);

        let err = graph.make_function(Add::new(TypeDescriptor::FLOAT), &[a, v]);
        assert!(matches!(err, Err(Error::TypeMismatch { slot: 1, .. })));

        let err = graph.make_function(Add::new(TypeDescriptor::FLOAT), &[a]);
        assert!(matches!(
            err,
            Err(Error::TypeMismatch {
                slot: 1,
                found: 0,
                ..
            })
        ));

        let err = graph.make_function(Add::new(TypeDescriptor::FLOAT), &[a, a, a]);
        assert!(matches!(
            err,
            Err(Error::TypeMismatch {
                slot: 2,
                expected: 0,
                ..
            })
        ));
        assert_eq!(graph.len(), 2);

        let sum = graph.make_function(Add::new(TypeDescriptor::FLOAT), &[a, a]).unwrap();
        assert_eq!(graph.output_type(sum), Some(TypeDescriptor::FLOAT));
    }

    #[test]
    fn cycles_are_rejected_at_insertion() {
        let mut graph = Graph::new();
        let one = graph.make_constant(1.0f32);
        let a = graph.add_node(Add::new(TypeDescriptor::FLOAT));
        let b = graph.add_node(Add::new(TypeDescriptor::FLOAT));
        let c = graph.add_node(Add::new(TypeDescriptor::FLOAT));

        assert!(matches!(graph.set_input(a, 0, a), Err(Error::CyclicGraph { .. })));

        graph.set_input(b, 0, a).unwrap();
        graph.set_input(c, 0, b).unwrap();
        graph.set_input(c, 1, one).unwrap();
        assert!(matches!(graph.set_input(a, 1, c), Err(Error::CyclicGraph { .. })));
        assert_eq!(graph.input(a, 1), None);

        // diamonds are fine
        graph.set_input(b, 1, one).unwrap();
        graph.set_input(a, 0, one).unwrap();
        graph.set_input(a, 1, one).unwrap();
        assert!(graph.reaches(c, one));
        assert!(!graph.reaches(a, c));
    }

    #[test]
    fn handles_from_other_graphs_are_rejected() {
        let mut other = Graph::new();
        let _ = other.make_constant(0.0f32);
        let foreign = other.make_constant(1.0f32);

        let mut graph = Graph::new();
        let add = graph.add_node(Add::new(TypeDescriptor::FLOAT));
        assert_eq!(graph.set_input(add, 0, foreign), Err(Error::UnknownNode(foreign)));
    }

    #[test]
    fn debug_dump_lists_wires() {
        let mut graph = Graph::new();
        let a = graph.make_constant(1.0f32);
        let add = graph.add_node(Add::new(TypeDescriptor::FLOAT));
        graph.set_input(add, 0, a).unwrap();

        let dump = format!("{:?}", graph);
        assert!(dump.contains("float = constant()"));
        assert!(dump.contains(&format!("float = add({:?}, _)", a)));
    }
}
