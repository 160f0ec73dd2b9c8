//! The computation graph.
//!
//! A graph owns its nodes, the canonical per-name [`NodeArg`]s (in an
//! arena, so producers and consumers share one instance), and the
//! initializer tensors. [`Graph::construct_topology`] validates the
//! structure, orders the nodes topologically, runs shape inference, and
//! garbage-collects unused values.

use std::collections::{HashMap, HashSet};

use log::warn;
use nuon_common::{Result, Status};

use crate::arena::{Arena, Handle};
use crate::attribute::NodeAttribute;
use crate::infer;
use crate::node::{Edge, Node, NodeId};
use crate::node_arg::NodeArg;
use crate::tensor::Tensor;

/// Scratch state shared by the topology-construction stages.
#[derive(Debug, Default)]
struct TopologyContext {
    /// Names of true graph inputs and initializers.
    inputs_and_initializers: HashSet<String>,
    /// Node output name → (producer id, index into its outputs).
    output_args: HashMap<String, (NodeId, usize)>,
    /// Node name → id.
    node_name_to_id: HashMap<String, NodeId>,
}

impl TopologyContext {
    fn clear(&mut self) {
        self.inputs_and_initializers.clear();
        self.output_args.clear();
        self.node_name_to_id.clear();
    }
}

/// A directed acyclic graph of operator nodes wired by arg names.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    next_node_id: u32,

    nodeargs: Arena<NodeArg>,
    /// One canonical arg handle per name.
    nodearg_map: HashMap<String, Handle<NodeArg>>,
    /// Constant tensors pre-bound to input names.
    initializer_map: HashMap<String, Tensor>,

    input_names: Vec<String>,
    output_names: Vec<String>,

    inputs_include_initializer: Vec<Handle<NodeArg>>,
    inputs_exclude_initializer: Vec<Handle<NodeArg>>,
    outputs: Vec<Handle<NodeArg>>,
    overridable_initializers: Vec<Handle<NodeArg>>,

    topological_nodes: Vec<NodeId>,

    /// Arg name → producing node.
    producer_map: HashMap<String, NodeId>,
    /// Arg name → consuming nodes.
    consumer_map: HashMap<String, HashSet<NodeId>>,

    topology_ctx: TopologyContext,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a declared graph-input name, in order.
    pub fn add_input_name(&mut self, name: impl Into<String>) {
        self.input_names.push(name.into());
    }

    /// Records a declared graph-output name, in order.
    pub fn add_output_name(&mut self, name: impl Into<String>) {
        self.output_names.push(name.into());
    }

    /// Inserts an initializer; an existing tensor of the same name is
    /// replaced (last writer wins).
    pub fn add_initializer(&mut self, tensor: Tensor) {
        let name = tensor.name().to_string();
        if self.initializer_map.insert(name.clone(), tensor).is_some() {
            warn!("Duplicate initializer [{name}], the model will use the last one");
        }
    }

    pub fn has_initializer(&self, name: &str) -> bool {
        self.initializer_map.contains_key(name)
    }

    pub fn get_initializer(&self, name: &str) -> Option<&Tensor> {
        self.initializer_map.get(name)
    }

    pub fn initializer_names(&self) -> impl Iterator<Item = &str> {
        self.initializer_map.keys().map(String::as_str)
    }

    /// Returns the canonical arg handle for `name`, storing a copy of
    /// `template_arg` on first sight. Later calls with the same name
    /// return the existing handle unchanged; the template is ignored.
    pub fn get_or_create_nodearg(&mut self, name: &str, template_arg: &NodeArg) -> Handle<NodeArg> {
        if let Some(&handle) = self.nodearg_map.get(name) {
            return handle;
        }
        let handle = self.nodeargs.append(template_arg.clone());
        self.nodearg_map.insert(name.to_string(), handle);
        handle
    }

    /// Looks up the canonical arg handle for `name`.
    pub fn get_nodearg(&self, name: &str) -> Option<Handle<NodeArg>> {
        self.nodearg_map.get(name).copied()
    }

    /// Resolves an arg handle.
    pub fn arg(&self, handle: Handle<NodeArg>) -> &NodeArg {
        &self.nodeargs[handle]
    }

    /// Appends a node and assigns it the next id.
    #[allow(clippy::too_many_arguments)]
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        op_type: impl Into<String>,
        domain: impl Into<String>,
        doc_string: impl Into<String>,
        inputs: Vec<Handle<NodeArg>>,
        outputs: Vec<Handle<NodeArg>>,
        attributes: HashMap<String, NodeAttribute>,
    ) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.push(Node::new(
            id,
            name.into(),
            op_type.into(),
            domain.into(),
            doc_string.into(),
            inputs,
            outputs,
            attributes,
        ));
        id
    }

    /// The nodes in insertion order.
    pub fn get_nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_pos(id).map(|pos| &self.nodes[pos])
    }

    /// Node ids in a valid topological order, filled in by
    /// [`construct_topology`](Self::construct_topology).
    pub fn get_topological_nodes(&self) -> &[NodeId] {
        &self.topological_nodes
    }

    /// The nodes in topological order.
    pub fn topological_nodes(&self) -> impl Iterator<Item = &Node> {
        self.topological_nodes.iter().filter_map(|&id| self.node(id))
    }

    /// True graph inputs (initializers excluded).
    pub fn inputs(&self) -> &[Handle<NodeArg>] {
        &self.inputs_exclude_initializer
    }

    /// Graph inputs including initializer-backed ones.
    pub fn inputs_including_initializers(&self) -> &[Handle<NodeArg>] {
        &self.inputs_include_initializer
    }

    pub fn outputs(&self) -> &[Handle<NodeArg>] {
        &self.outputs
    }

    /// Initializers that also appear in the declared inputs; a caller may
    /// override them with a runtime value.
    pub fn overridable_initializers(&self) -> &[Handle<NodeArg>] {
        &self.overridable_initializers
    }

    /// The node producing the arg named `name`, if any.
    pub fn producer_of(&self, name: &str) -> Option<NodeId> {
        self.producer_map.get(name).copied()
    }

    /// The nodes consuming the arg named `name`.
    pub fn consumers_of(&self, name: &str) -> Option<&HashSet<NodeId>> {
        self.consumer_map.get(name)
    }

    fn node_pos(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id() == id)
    }

    /// Computes the derived input/output/overridable-initializer sets
    /// once all args, nodes, and initializers are in place.
    ///
    /// Fails with `INVALID_MODEL` when a declared boundary name has no
    /// backing value in the graph.
    pub fn initialize(&mut self) -> Result<()> {
        self.inputs_include_initializer.clear();
        self.inputs_exclude_initializer.clear();
        self.outputs.clear();
        self.overridable_initializers.clear();

        let mut include = Vec::new();
        let mut exclude = Vec::new();
        let mut overridable = Vec::new();
        for name in &self.input_names {
            let Some(&arg) = self.nodearg_map.get(name) else {
                return Err(Status::InvalidModel(format!(
                    "Invalid graph. graph's input [{name}] does not exist in the graph"
                )));
            };
            include.push(arg);
            if self.initializer_map.contains_key(name) {
                overridable.push(arg);
            } else {
                exclude.push(arg);
            }
        }

        let mut produced = HashSet::new();
        for node in &self.nodes {
            for &out in node.output_args() {
                produced.insert(self.nodeargs[out].name().to_string());
            }
        }

        let mut outputs = Vec::new();
        for name in &self.output_names {
            let resolvable = produced.contains(name)
                || self.initializer_map.contains_key(name)
                || self.input_names.contains(name);
            let handle = if resolvable {
                self.nodearg_map.get(name).copied()
            } else {
                None
            };
            let Some(handle) = handle else {
                return Err(Status::InvalidModel(format!(
                    "Invalid graph. graph's output [{name}] does not exist in the graph"
                )));
            };
            outputs.push(handle);
        }

        self.inputs_include_initializer = include;
        self.inputs_exclude_initializer = exclude;
        self.overridable_initializers = overridable;
        self.outputs = outputs;

        Ok(())
    }

    /// Validates the graph structure and prepares it for execution:
    /// name-uniqueness checks, edge construction, DAG check with
    /// topological ordering, shape inference, and dead-value cleanup.
    pub fn construct_topology(&mut self) -> Result<()> {
        self.check_inputs_initializers_names()?;
        self.check_no_duplicate_names()?;
        self.build_nodes_connections()?;
        self.topological_sort()?;
        self.infer_shape()?;

        self.topology_ctx.clear();
        self.clean_unused_initializers_args()?;

        Ok(())
    }

    /// True-input names must be unique; initializer names join the same
    /// set (an input/initializer name overlap is legal and makes the
    /// initializer overridable).
    fn check_inputs_initializers_names(&mut self) -> Result<()> {
        self.topology_ctx.inputs_and_initializers.clear();

        for &arg in &self.inputs_exclude_initializer {
            let name = self.nodeargs[arg].name().to_string();
            if !self.topology_ctx.inputs_and_initializers.insert(name.clone()) {
                return Err(Status::InvalidModel(format!("Duplicate input name: {name}")));
            }
        }

        for name in self.initializer_map.keys() {
            self.topology_ctx
                .inputs_and_initializers
                .insert(name.clone());
        }

        Ok(())
    }

    /// Non-empty node names must be unique; non-empty node-output names
    /// must be unique and disjoint from input/initializer names.
    fn check_no_duplicate_names(&mut self) -> Result<()> {
        self.topology_ctx.output_args.clear();
        self.topology_ctx.node_name_to_id.clear();

        for node in &self.nodes {
            let node_name = node.name();
            if !node_name.is_empty()
                && self.topology_ctx.node_name_to_id.contains_key(node_name)
            {
                return Err(Status::InvalidModel(format!(
                    "Node name is not unique: {node_name}"
                )));
            }
            self.topology_ctx
                .node_name_to_id
                .insert(node_name.to_string(), node.id());

            for (output_index, &out) in node.output_args().iter().enumerate() {
                let output_name = self.nodeargs[out].name();
                if output_name.is_empty() {
                    continue;
                }
                if self
                    .topology_ctx
                    .inputs_and_initializers
                    .contains(output_name)
                {
                    return Err(Status::InvalidModel(format!(
                        "Node output name is same as some input/initializer: {output_name}"
                    )));
                }
                if self
                    .topology_ctx
                    .output_args
                    .insert(output_name.to_string(), (node.id(), output_index))
                    .is_some()
                {
                    return Err(Status::InvalidModel(format!(
                        "Node output name is not unique: {output_name}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Wires consumers to producers by arg name, drops nodes with neither
    /// inputs nor outputs, and rebuilds the producer/consumer maps.
    fn build_nodes_connections(&mut self) -> Result<()> {
        let mut orphans = Vec::new();
        let mut new_edges = Vec::new();

        for node in &self.nodes {
            let inputs = node.input_args();
            if !inputs.is_empty() {
                for (input_index, &input_arg) in inputs.iter().enumerate() {
                    let input_name = self.nodeargs[input_arg].name();
                    if input_name.is_empty() {
                        continue;
                    }

                    if let Some(&(producer, output_index)) =
                        self.topology_ctx.output_args.get(input_name)
                    {
                        // this input is a previous node's output
                        new_edges.push((producer, node.id(), output_index, input_index));
                    } else if !self
                        .topology_ctx
                        .inputs_and_initializers
                        .contains(input_name)
                    {
                        return Err(Status::InvalidModel(format!(
                            "Invalid model. Node input [{input_name}] is not a graph input, \
                             initializer, or output of a previous node"
                        )));
                    }
                }
            } else if node.output_args().is_empty() {
                orphans.push(node.id());
            }
        }

        for (src, dst, src_arg_index, dst_arg_index) in new_edges {
            self.add_edge(src, dst, src_arg_index, dst_arg_index)?;
        }

        for id in orphans {
            self.remove_node(id)?;
        }

        self.init_node_arg_to_connected_nodes();

        Ok(())
    }

    fn init_node_arg_to_connected_nodes(&mut self) {
        self.producer_map.clear();
        self.consumer_map.clear();

        for node in &self.nodes {
            for &input in node.input_args() {
                let name = self.nodeargs[input].name().to_string();
                self.consumer_map.entry(name).or_default().insert(node.id());
            }
            for &output in node.output_args() {
                let name = self.nodeargs[output].name().to_string();
                self.producer_map.entry(name).or_insert(node.id());
            }
        }
    }

    /// Connects `src`'s output arg to `dst`'s input arg, mirrored on both
    /// nodes. The two args must be the same canonical arg or compare
    /// equal.
    pub fn add_edge(
        &mut self,
        src: NodeId,
        dst: NodeId,
        src_arg_index: usize,
        dst_arg_index: usize,
    ) -> Result<()> {
        let src_pos = self
            .node_pos(src)
            .ok_or_else(|| Status::Fail(format!("node not found, node id: {}", src.0)))?;
        let dst_pos = self
            .node_pos(dst)
            .ok_or_else(|| Status::Fail(format!("node not found, node id: {}", dst.0)))?;

        let src_arg = *self.nodes[src_pos]
            .output_args()
            .get(src_arg_index)
            .ok_or_else(|| Status::Fail("invalid source arg index".into()))?;
        let dst_arg = *self.nodes[dst_pos]
            .input_args()
            .get(dst_arg_index)
            .ok_or_else(|| Status::Fail("invalid destination arg index".into()))?;

        if src_arg != dst_arg && self.nodeargs[src_arg] != self.nodeargs[dst_arg] {
            return Err(Status::Fail("Argument type mismatch".into()));
        }

        self.nodes[src_pos].add_output_edge(Edge::new(dst, src_arg_index, dst_arg_index));
        self.nodes[dst_pos].add_input_edge(Edge::new(src, src_arg_index, dst_arg_index));

        Ok(())
    }

    /// Removes the mirrored edge between `src` and `dst`. The endpoints
    /// must reference the same canonical arg.
    pub fn remove_edge(
        &mut self,
        src: NodeId,
        dst: NodeId,
        src_arg_index: usize,
        dst_arg_index: usize,
    ) -> Result<()> {
        let src_pos = self
            .node_pos(src)
            .ok_or_else(|| Status::Fail(format!("node not found, node id: {}", src.0)))?;
        let dst_pos = self
            .node_pos(dst)
            .ok_or_else(|| Status::Fail(format!("node not found, node id: {}", dst.0)))?;

        let src_arg = *self.nodes[src_pos]
            .output_args()
            .get(src_arg_index)
            .ok_or_else(|| Status::Fail("invalid source arg index".into()))?;
        let dst_arg = *self.nodes[dst_pos]
            .input_args()
            .get(dst_arg_index)
            .ok_or_else(|| Status::Fail("invalid destination arg index".into()))?;

        if src_arg != dst_arg {
            return Err(Status::Fail("Argument mismatch when removing edge".into()));
        }

        self.nodes[dst_pos].remove_input_edge(&Edge::new(src, src_arg_index, dst_arg_index));
        self.nodes[src_pos].remove_output_edge(&Edge::new(dst, src_arg_index, dst_arg_index));

        Ok(())
    }

    /// Removes a node. Refused while the node still has output edges,
    /// since that would orphan its consumers.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let Some(pos) = self.node_pos(id) else {
            return Ok(());
        };

        let output_edges = self.nodes[pos].output_edges().len();
        if output_edges != 0 {
            return Err(Status::Fail(format!(
                "Remove node fail. the node has {output_edges} output edges"
            )));
        }

        let input_edges: Vec<Edge> = self.nodes[pos].input_edges().iter().copied().collect();
        for edge in input_edges {
            self.remove_edge(edge.other_node, id, edge.src_arg_index, edge.dst_arg_index)?;
        }

        self.nodes.remove(pos);

        Ok(())
    }

    /// Orders the nodes topologically, failing on any cycle.
    ///
    /// Roots (no input edges) seed the order in insertion order; an
    /// iterative depth-first walk then climbs backwards from each leaf
    /// (no output edges), emitting a node the second time it is popped.
    /// Meeting a node already on the active downstream path means the
    /// graph is not a DAG.
    fn topological_sort(&mut self) -> Result<()> {
        self.topological_nodes.clear();

        let mut downstream: HashSet<NodeId> = HashSet::new();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut added: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<NodeId> = Vec::new();

        for node in &self.nodes {
            if node.input_edges().is_empty() {
                self.topological_nodes.push(node.id());
                visited.insert(node.id());
                added.insert(node.id());
            }
        }

        for node in &self.nodes {
            if node.output_edges().is_empty() {
                stack.push(node.id());
            }
        }

        while let Some(current) = stack.pop() {
            let Some(pos) = self.node_pos(current) else {
                continue;
            };
            if added.contains(&current) {
                continue;
            }
            if visited.contains(&current) {
                // second pop: all producers emitted
                self.topological_nodes.push(current);
                added.insert(current);
                downstream.remove(&current);
                continue;
            }

            visited.insert(current);
            downstream.insert(current);
            stack.push(current);

            for edge in self.nodes[pos].input_edges() {
                let other = edge.other_node;
                if downstream.contains(&other) {
                    return Err(Status::InvalidModel("The graph is not a DAG".into()));
                }
                if !visited.contains(&other) {
                    stack.push(other);
                }
            }
        }

        if self.topological_nodes.len() != self.nodes.len() {
            return Err(Status::InvalidModel("The graph is not a DAG".into()));
        }

        Ok(())
    }

    /// Runs per-operator shape inference over the topological order.
    ///
    /// Inferred shapes are written into the canonical output args, so
    /// consumers observe them through their shared handles.
    fn infer_shape(&mut self) -> Result<()> {
        let registry = infer::registry();

        for idx in 0..self.topological_nodes.len() {
            let id = self.topological_nodes[idx];
            let Some(pos) = self.node_pos(id) else {
                continue;
            };

            let node = &self.nodes[pos];
            let Some(inferer) = registry.get(node.op_type()) else {
                return Err(Status::Fail(format!(
                    "Infer object for node: {}[{}] not found",
                    node.op_type(),
                    node.name()
                )));
            };

            let inputs: Vec<NodeArg> = node
                .input_args()
                .iter()
                .map(|&h| self.nodeargs[h].clone())
                .collect();
            let mut outputs: Vec<NodeArg> = node
                .output_args()
                .iter()
                .map(|&h| self.nodeargs[h].clone())
                .collect();
            let output_handles: Vec<Handle<NodeArg>> = node.output_args().to_vec();

            inferer.infer(node.name(), &inputs, node.attributes(), &mut outputs)?;

            for (&handle, inferred) in output_handles.iter().zip(outputs) {
                self.nodeargs[handle].set_shape(inferred.shape().clone());
            }
        }

        Ok(())
    }

    /// Drops initializers and named args reachable from nothing: not a
    /// true input, overridable initializer, graph output, or node arg.
    fn clean_unused_initializers_args(&mut self) -> Result<()> {
        let mut used: HashSet<Handle<NodeArg>> = HashSet::new();
        used.extend(self.inputs_exclude_initializer.iter().copied());
        used.extend(self.overridable_initializers.iter().copied());
        used.extend(self.outputs.iter().copied());
        for node in &self.nodes {
            used.extend(node.input_args().iter().copied());
        }

        let mut dead_initializers = Vec::new();
        for name in self.initializer_map.keys() {
            let Some(&handle) = self.nodearg_map.get(name) else {
                return Err(Status::Fail(format!("Can't find the initializer: {name}")));
            };
            if !used.contains(&handle) {
                dead_initializers.push(name.clone());
            }
        }
        for name in &dead_initializers {
            self.initializer_map.remove(name);
        }

        for node in &self.nodes {
            used.extend(node.output_args().iter().copied());
        }

        self.nodearg_map
            .retain(|name, handle| name.is_empty() || used.contains(handle));

        Ok(())
    }
}
