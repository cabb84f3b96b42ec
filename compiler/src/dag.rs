// dag.rs - Finished expression DAG and the parent-count pass
//
// A `Dag` is the frozen arena produced by the builder: every canonical node
// stored once, operands referring to each other by `NodeRef`, and a single
// root. The only mutation after freezing is the parent-count pass.
//
// Preconditions: built by `NodeDictionary::into_dag`; operands always refer
//                to nodes registered before their parents.
// Postconditions: after `count_parents`, each node's `parent_count` is its
//                 in-degree, with the root counted once.
// Failure modes: none.
// Side effects: none.

use tracing::debug;

use crate::id::NodeRef;
use crate::node::Node;

#[derive(Debug, Clone)]
pub struct Dag {
    nodes: Vec<Node>,
    root: NodeRef,
    counted: bool,
}

impl Dag {
    pub(crate) fn new(nodes: Vec<Node>, root: NodeRef) -> Self {
        Self {
            nodes,
            root,
            counted: false,
        }
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn get(&self, node: NodeRef) -> &Node {
        &self.nodes[node.index()]
    }

    /// Number of canonical nodes, including any registered by the builder
    /// that are unreachable from the root (never the case for parsed input).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Canonical nodes in registration order, which is also a valid
    /// operands-before-parents order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeRef(i as u32), node))
    }

    /// Nodes reached through more than one edge.
    pub fn shared(&self) -> impl Iterator<Item = (NodeRef, &Node)> {
        self.iter().filter(|(_, node)| node.parent_count > 1)
    }

    pub fn is_counted(&self) -> bool {
        self.counted
    }

    /// Set every reachable node's parent count to its in-degree.
    ///
    /// Each reach of a node increments its counter; its operands are only
    /// walked the first time it is reached, so the cost is linear in the
    /// number of edges rather than the number of root-to-node paths. Runs
    /// once; later calls are no-ops.
    pub fn count_parents(&mut self) {
        if self.counted {
            return;
        }
        self.counted = true;

        let mut recursed = vec![false; self.nodes.len()];
        let mut pending = vec![self.root];
        let mut edges = 0usize;
        while let Some(node) = pending.pop() {
            edges += 1;
            self.nodes[node.index()].parent_count += 1;
            if recursed[node.index()] {
                continue;
            }
            recursed[node.index()] = true;
            // Reverse so the left operand is walked first.
            let operands: Vec<NodeRef> = self.nodes[node.index()].kind.operands().collect();
            pending.extend(operands.into_iter().rev());
        }
        debug!(nodes = self.nodes.len(), edges, "parent counts computed");
    }
}
