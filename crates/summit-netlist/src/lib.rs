//! SUMMIT netlist - Bit-level logic netlist
//!
//! This crate provides the signal substrate for the arithmetic generators:
//! - Opaque single-bit signal handles ([`NetId`])
//! - An append-only gate arena ([`Netlist`]) with constant folding
//! - A functional evaluator used by tests and evaluation harnesses
//!
//! Nodes may only reference earlier nodes, so the arena is always
//! topologically sorted and can be evaluated in a single forward pass.

mod eval;
mod netlist;

pub use netlist::{NetId, Netlist, Node};
