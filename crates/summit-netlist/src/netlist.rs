//! Gate arena and builder

use serde::{Deserialize, Serialize};

/// Unique identifier for a single-bit net
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(pub u32);

impl NetId {
    /// Index of this net in the node arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A gate node in the netlist
///
/// Operand nets always refer to nodes created earlier, which keeps the
/// arena topologically sorted by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// Constant driver
    Const(bool),
    /// Primary input, identified by creation order
    Input {
        /// Position in the flat input assignment vector
        index: u32,
    },
    /// Inverter
    Not(NetId),
    /// Two-input AND
    And(NetId, NetId),
    /// Two-input OR
    Or(NetId, NetId),
    /// Two-input XOR
    Xor(NetId, NetId),
}

/// Append-only gate-level netlist
///
/// Nodes 0 and 1 are the constant-false and constant-true drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Netlist {
    name: String,
    nodes: Vec<Node>,
    input_count: u32,
    outputs: Vec<(String, NetId)>,
}

impl Netlist {
    /// Create an empty netlist holding only the two constant drivers
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: vec![Node::Const(false), Node::Const(true)],
            input_count: 0,
            outputs: Vec::new(),
        }
    }

    /// Design name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of nodes in the arena, constants included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of primary inputs created so far
    pub fn input_count(&self) -> usize {
        self.input_count as usize
    }

    /// Node backing a net
    pub fn node(&self, net: NetId) -> Node {
        self.nodes[net.index()]
    }

    /// The constant-false net
    pub fn zero(&self) -> NetId {
        NetId(0)
    }

    /// The constant-true net
    pub fn one(&self) -> NetId {
        NetId(1)
    }

    /// A constant driver net
    pub fn constant(&self, value: bool) -> NetId {
        if value {
            self.one()
        } else {
            self.zero()
        }
    }

    fn const_value(&self, net: NetId) -> Option<bool> {
        match self.nodes[net.index()] {
            Node::Const(value) => Some(value),
            _ => None,
        }
    }

    fn push(&mut self, node: Node) -> NetId {
        let id = NetId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a fresh primary input
    pub fn input(&mut self) -> NetId {
        let index = self.input_count;
        self.input_count += 1;
        self.push(Node::Input { index })
    }

    /// Create `width` fresh primary inputs, least significant first
    pub fn inputs(&mut self, width: usize) -> Vec<NetId> {
        (0..width).map(|_| self.input()).collect()
    }

    /// Inverter, folding constant operands
    pub fn not(&mut self, a: NetId) -> NetId {
        match self.const_value(a) {
            Some(value) => self.constant(!value),
            None => self.push(Node::Not(a)),
        }
    }

    /// Two-input AND, folding constant and duplicate operands
    pub fn and(&mut self, a: NetId, b: NetId) -> NetId {
        if a == b {
            return a;
        }
        match (self.const_value(a), self.const_value(b)) {
            (Some(false), _) | (_, Some(false)) => self.zero(),
            (Some(true), _) => b,
            (_, Some(true)) => a,
            _ => self.push(Node::And(a, b)),
        }
    }

    /// Two-input OR, folding constant and duplicate operands
    pub fn or(&mut self, a: NetId, b: NetId) -> NetId {
        if a == b {
            return a;
        }
        match (self.const_value(a), self.const_value(b)) {
            (Some(true), _) | (_, Some(true)) => self.one(),
            (Some(false), _) => b,
            (_, Some(false)) => a,
            _ => self.push(Node::Or(a, b)),
        }
    }

    /// Two-input XOR, folding constant and duplicate operands
    pub fn xor(&mut self, a: NetId, b: NetId) -> NetId {
        if a == b {
            return self.zero();
        }
        match (self.const_value(a), self.const_value(b)) {
            (Some(false), _) => b,
            (_, Some(false)) => a,
            (Some(true), _) => self.not(b),
            (_, Some(true)) => self.not(a),
            _ => self.push(Node::Xor(a, b)),
        }
    }

    /// OR over an arbitrary collection of nets (false when empty)
    pub fn or_all(&mut self, nets: &[NetId]) -> NetId {
        let mut acc = self.zero();
        for &net in nets {
            acc = self.or(acc, net);
        }
        acc
    }

    /// Register a named output
    pub fn add_output(&mut self, name: &str, net: NetId) {
        self.outputs.push((name.to_string(), net));
    }

    /// Named outputs in registration order
    pub fn outputs(&self) -> &[(String, NetId)] {
        &self.outputs
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}
