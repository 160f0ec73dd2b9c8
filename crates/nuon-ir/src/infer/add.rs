//! Add shape inference.

use std::collections::HashMap;

use nuon_common::{Result, Status};

use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;
use crate::tensor_shape::TensorShape;

use super::ShapeInfer;

/// Element-wise Add with numpy-style right-aligned broadcasting.
#[derive(Debug)]
pub struct AddInfer;

impl ShapeInfer for AddInfer {
    fn node_type(&self) -> &'static str {
        "Add"
    }

    fn infer(
        &self,
        node_name: &str,
        inputs: &[NodeArg],
        _attributes: &HashMap<String, NodeAttribute>,
        outputs: &mut [NodeArg],
    ) -> Result<()> {
        if inputs.len() != 2 || outputs.len() != 1 {
            return Err(Status::InvalidParam(format!(
                "Node: Add[{node_name}], invalid input size: {} or output size: {}",
                inputs.len(),
                outputs.len()
            )));
        }

        let shape1 = inputs[0].shape();
        let shape2 = inputs[1].shape();

        // align the shorter shape to the right of the longer
        let (long, short) = if shape1.dims_num() >= shape2.dims_num() {
            (shape1, shape2)
        } else {
            (shape2, shape1)
        };

        let mut out_dims = long.dims().to_vec();
        let start = long.dims_num() - short.dims_num();
        for i in 0..short.dims_num() {
            let d1 = long[start + i];
            let d2 = short[i];
            if d1 == 1 || d2 == 1 || d1 == d2 {
                out_dims[start + i] = d1.max(d2);
            } else {
                return Err(Status::InvalidParam(format!(
                    "Node: Add[{node_name}], input1 shape: {shape1} input2 shape: {shape2}"
                )));
            }
        }

        outputs[0].set_shape(TensorShape::from_dims(out_dims));
        Ok(())
    }
}
