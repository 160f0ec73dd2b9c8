//! Operator nodes and their edges.

use std::collections::{BTreeSet, HashMap};

use crate::arena::Handle;
use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;

/// A unique identifier for a node within a [`Graph`](crate::Graph).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct NodeId(pub u32);

/// A connection to another node.
///
/// Edges are mirrored on both endpoints: an input edge on the consumer
/// names the producer as `other_node`, and the matching output edge on
/// the producer names the consumer. Ordering (and therefore set
/// uniqueness) is lexicographic over the three fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    /// The node on the far end, relative to the node holding this edge.
    pub other_node: NodeId,
    /// Index into the producer's output args.
    pub src_arg_index: usize,
    /// Index into the consumer's input args.
    pub dst_arg_index: usize,
}

impl Edge {
    pub fn new(other_node: NodeId, src_arg_index: usize, dst_arg_index: usize) -> Self {
        Self {
            other_node,
            src_arg_index,
            dst_arg_index,
        }
    }
}

/// An operator instance in the graph.
///
/// Arg handles point into the owning graph's arena; edge sets are
/// maintained by the graph, never by the node itself.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    op_type: String,
    domain: String,
    doc_string: String,
    inputs: Vec<Handle<NodeArg>>,
    outputs: Vec<Handle<NodeArg>>,
    attributes: HashMap<String, NodeAttribute>,
    input_edges: BTreeSet<Edge>,
    output_edges: BTreeSet<Edge>,
}

impl Node {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: NodeId,
        name: String,
        op_type: String,
        domain: String,
        doc_string: String,
        inputs: Vec<Handle<NodeArg>>,
        outputs: Vec<Handle<NodeArg>>,
        attributes: HashMap<String, NodeAttribute>,
    ) -> Self {
        Self {
            id,
            name,
            op_type,
            domain,
            doc_string,
            inputs,
            outputs,
            attributes,
            input_edges: BTreeSet::new(),
            output_edges: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node name; may be empty (uniqueness is only enforced when not).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operator type string, e.g. `"Conv"`; selects the shape inferer.
    pub fn op_type(&self) -> &str {
        &self.op_type
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn doc_string(&self) -> &str {
        &self.doc_string
    }

    pub fn input_args(&self) -> &[Handle<NodeArg>] {
        &self.inputs
    }

    pub fn output_args(&self) -> &[Handle<NodeArg>] {
        &self.outputs
    }

    pub fn attributes(&self) -> &HashMap<String, NodeAttribute> {
        &self.attributes
    }

    pub fn input_edges(&self) -> &BTreeSet<Edge> {
        &self.input_edges
    }

    pub fn output_edges(&self) -> &BTreeSet<Edge> {
        &self.output_edges
    }

    pub(crate) fn add_input_edge(&mut self, edge: Edge) {
        self.input_edges.insert(edge);
    }

    pub(crate) fn add_output_edge(&mut self, edge: Edge) {
        self.output_edges.insert(edge);
    }

    pub(crate) fn remove_input_edge(&mut self, edge: &Edge) {
        self.input_edges.remove(edge);
    }

    pub(crate) fn remove_output_edge(&mut self, edge: &Edge) {
        self.output_edges.remove(edge);
    }
}
