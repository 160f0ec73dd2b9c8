//! GlobalAveragePool shape inference.

use std::collections::HashMap;

use nuon_common::{Result, Status};

use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;
use crate::tensor_shape::TensorShape;

use super::ShapeInfer;

/// Pools every spatial dim down to 1, keeping batch and channels.
#[derive(Debug)]
pub struct GlobalAveragePoolInfer;

impl ShapeInfer for GlobalAveragePoolInfer {
    fn node_type(&self) -> &'static str {
        "GlobalAveragePool"
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
                "Node: GlobalAveragePool[{node_name}], invalid input size: {} \
                 or output size: {}",
                inputs.len(),
                outputs.len()
            )));
        }

        let input_shape = inputs[0].shape();
        let rank = input_shape.dims_num();
        if rank < 2 {
            return Err(Status::InvalidParam(format!(
                "Node: GlobalAveragePool[{node_name}], too few input dimensions: {rank}"
            )));
        }

        let mut output_shape = TensorShape::new();
        output_shape.add_dim(input_shape[0]);
        output_shape.add_dim(input_shape[1]);
        for _ in 2..rank {
            output_shape.add_dim(1);
        }

        outputs[0].set_shape(output_shape);
        Ok(())
    }
}
