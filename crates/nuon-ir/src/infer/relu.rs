//! Relu shape inference.

use std::collections::HashMap;

use nuon_common::{Result, Status};

use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;

use super::ShapeInfer;

/// Relu passes the input shape through unchanged.
#[derive(Debug)]
pub struct ReluInfer;

impl ShapeInfer for ReluInfer {
    fn node_type(&self) -> &'static str {
        "Relu"
    }

    fn infer(
        &self,
        node_name: &str,
        inputs: &[NodeArg],
        _attributes: &HashMap<String, NodeAttribute>,
        outputs: &mut [NodeArg],
    ) -> Result<()> {
        if inputs.len() != 1 || outputs.len() != 1 {
            return Err(Status::InvalidParam(format!(
                "Node: Relu[{node_name}], invalid input size: {} or output size: {}",
                inputs.len(),
                outputs.len()
            )));
        }

        outputs[0].set_shape(inputs[0].shape().clone());
        Ok(())
    }
}
