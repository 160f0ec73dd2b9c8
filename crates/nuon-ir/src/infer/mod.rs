//! Per-operator shape inference.
//!
//! A process-wide registry maps operator-type strings to [`ShapeInfer`]
//! implementations. [`Graph::construct_topology`](crate::Graph::construct_topology)
//! dispatches through it while walking the topological order.

mod add;
mod conv;
mod flatten;
mod gemm;
mod global_average_pool;
mod max_pool;
mod relu;

pub use add::AddInfer;
pub use conv::ConvInfer;
pub use flatten::FlattenInfer;
pub use gemm::GemmInfer;
pub use global_average_pool::GlobalAveragePoolInfer;
pub use max_pool::MaxPoolInfer;
pub use relu::ReluInfer;

use std::collections::HashMap;
use std::sync::OnceLock;

use nuon_common::{Result, Status};

use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;

/// Shape inference for one operator type.
///
/// `infer` reads the input args and writes inferred shapes into the
/// output args via [`NodeArg::set_shape`].
pub trait ShapeInfer: Send + Sync {
    /// The operator-type string this inferer handles, e.g. `"Conv"`.
    fn node_type(&self) -> &'static str;

    /// Infers the output shapes for a node of this operator type.
    fn infer(
        &self,
        node_name: &str,
        inputs: &[NodeArg],
        attributes: &HashMap<String, NodeAttribute>,
        outputs: &mut [NodeArg],
    ) -> Result<()>;
}

/// Operator-type-keyed table of shape inferers.
pub struct InferRegistry {
    inferers: HashMap<&'static str, Box<dyn ShapeInfer>>,
}

impl InferRegistry {
    fn register(&mut self, inferer: Box<dyn ShapeInfer>) {
        self.inferers.entry(inferer.node_type()).or_insert(inferer);
    }

    /// Looks up the inferer for an operator type.
    pub fn get(&self, op_type: &str) -> Option<&dyn ShapeInfer> {
        self.inferers.get(op_type).map(|inferer| &**inferer)
    }

    /// The registered operator-type strings.
    pub fn op_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inferers.keys().copied()
    }
}

/// The process-wide inferer registry, populated on first access.
pub fn registry() -> &'static InferRegistry {
    static REGISTRY: OnceLock<InferRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = InferRegistry {
            inferers: HashMap::new(),
        };
        registry.register(Box::new(ConvInfer));
        registry.register(Box::new(GemmInfer));
        registry.register(Box::new(ReluInfer));
        registry.register(Box::new(MaxPoolInfer));
        registry.register(Box::new(GlobalAveragePoolInfer));
        registry.register(Box::new(FlattenInfer));
        registry.register(Box::new(AddInfer));
        registry
    })
}

/// Scalar int64 attribute, or `default` when absent. A kind mismatch is
/// an error, not a fallback.
pub(crate) fn attr_i64(
    attributes: &HashMap<String, NodeAttribute>,
    name: &str,
    default: i64,
) -> Result<i64> {
    match attributes.get(name) {
        Some(attr) => attr.as_i64(),
        None => Ok(default),
    }
}

/// String attribute, or `default` when absent.
pub(crate) fn attr_str(
    attributes: &HashMap<String, NodeAttribute>,
    name: &str,
    default: &str,
) -> Result<String> {
    match attributes.get(name) {
        Some(attr) => attr.as_str().map(str::to_string),
        None => Ok(default.to_string()),
    }
}

/// Int64-array attribute, or empty when absent.
pub(crate) fn attr_i64s(
    attributes: &HashMap<String, NodeAttribute>,
    name: &str,
) -> Result<Vec<i64>> {
    match attributes.get(name) {
        Some(attr) => attr.as_i64s().map(<[i64]>::to_vec),
        None => Ok(Vec::new()),
    }
}

/// Normalizes the dilations/pads/strides triple against the kernel rank.
///
/// Absent arrays take their defaults (all-1 dilations and strides, all-0
/// pads of length 2×kernel rank); present arrays must match the kernel
/// rank exactly (2× for pads), and pads must be non-negative.
pub(crate) fn resolve_spatial_attrs(
    kernel_size: usize,
    mut dilations: Vec<i64>,
    mut pads: Vec<i64>,
    mut strides: Vec<i64>,
) -> Result<(Vec<i64>, Vec<i64>, Vec<i64>)> {
    if dilations.len() != kernel_size {
        if !dilations.is_empty() {
            return Err(Status::InvalidParam("Invalid dilations".into()));
        }
        dilations = vec![1; kernel_size];
    }

    if pads.len() % 2 != 0 {
        return Err(Status::InvalidParam("Invalid pads".into()));
    }
    if pads.len() / 2 == kernel_size && !pads.is_empty() {
        if pads.iter().any(|&pad| pad < 0) {
            return Err(Status::InvalidParam("Invalid pads".into()));
        }
    } else if pads.is_empty() {
        pads = vec![0; kernel_size * 2];
    } else {
        return Err(Status::InvalidParam("Invalid pads".into()));
    }

    if strides.len() != kernel_size {
        if !strides.is_empty() {
            return Err(Status::InvalidParam("Invalid strides".into()));
        }
        strides = vec![1; kernel_size];
    }

    Ok((dilations, pads, strides))
}
