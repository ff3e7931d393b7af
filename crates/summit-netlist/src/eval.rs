//! Functional evaluation of a netlist
//!
//! The arena is topologically sorted by construction, so evaluation is a
//! single forward pass over the nodes.

use crate::netlist::{NetId, Netlist, Node};

impl Netlist {
    /// Evaluate every node for the given input assignment
    ///
    /// `inputs[k]` drives the k-th created primary input. Panics if the
    /// assignment length does not match the number of inputs.
    pub fn eval(&self, inputs: &[bool]) -> Vec<bool> {
        assert_eq!(
            inputs.len(),
            self.input_count(),
            "input assignment length must match the number of primary inputs"
        );
        let mut values: Vec<bool> = Vec::with_capacity(self.node_count());
        for node in self.nodes() {
            let value = match *node {
                Node::Const(value) => value,
                Node::Input { index } => inputs[index as usize],
                Node::Not(a) => !values[a.index()],
                Node::And(a, b) => values[a.index()] && values[b.index()],
                Node::Or(a, b) => values[a.index()] || values[b.index()],
                Node::Xor(a, b) => values[a.index()] ^ values[b.index()],
            };
            values.push(value);
        }
        values
    }

    /// Evaluate a single net
    pub fn eval_net(&self, inputs: &[bool], net: NetId) -> bool {
        self.eval(inputs)[net.index()]
    }

    /// Evaluate a group of nets
    pub fn eval_nets(&self, inputs: &[bool], nets: &[NetId]) -> Vec<bool> {
        let values = self.eval(inputs);
        nets.iter().map(|net| values[net.index()]).collect()
    }

    /// Evaluate a little-endian word: bit k of the result is `nets[k]`
    pub fn eval_word(&self, inputs: &[bool], nets: &[NetId]) -> u64 {
        assert!(nets.len() <= 64, "eval_word is limited to 64 bits");
        let values = self.eval(inputs);
        let mut word = 0u64;
        for (k, net) in nets.iter().enumerate() {
            if values[net.index()] {
                word |= 1 << k;
            }
        }
        word
    }
}
