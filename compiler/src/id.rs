// id.rs - Node identity for the expression DAG
//
// Two kinds of identity coexist. `NodeRef` is the arena index of a
// canonical node and is what operands point at; equality of subexpressions
// reduces to equality of `NodeRef`s. `NodeId` is the serial number handed
// out when a node (or a candidate the dictionary later discards) is
// constructed; it names temporaries and appears in diagnostics, and never
// takes part in equality.

use std::fmt;

use serde::Serialize;

/// Index of a canonical node in the DAG arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub u32);

impl NodeRef {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Construction serial of a node. Starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Name of the temporary holding this node's value.
    pub fn temp_name(self) -> String {
        format!("t{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocator for node serials. Produces monotonically increasing IDs in
/// construction order, so a given source always yields the same IDs.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> NodeId {
        self.last += 1;
        NodeId(self.last)
    }

    /// Number of serials handed out so far.
    pub fn allocated(&self) -> u32 {
        self.last
    }
}
