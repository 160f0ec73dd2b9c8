//! Flatten shape inference.

use std::collections::HashMap;

use nuon_common::{Result, Status};

use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;
use crate::tensor_shape::TensorShape;

use super::{attr_i64, ShapeInfer};

/// Flatten collapses the input into a 2-D matrix split at `axis`.
#[derive(Debug)]
pub struct FlattenInfer;

impl ShapeInfer for FlattenInfer {
    fn node_type(&self) -> &'static str {
        "Flatten"
    }

    fn infer(
        &self,
        node_name: &str,
        inputs: &[NodeArg],
        attributes: &HashMap<String, NodeAttribute>,
        outputs: &mut [NodeArg],
    ) -> Result<()> {
        if inputs.len() != 1 || outputs.len() != 1 {
            return Err(Status::InvalidParam(format!(
                "Node: Flatten[{node_name}], invalid input size: {} or output size: {}",
                inputs.len(),
                outputs.len()
            )));
        }

        let raw_axis = attr_i64(attributes, "axis", 1)?;
        let input_shape = inputs[0].shape();
        let rank = input_shape.dims_num() as i64;

        // axis must land in [-rank, rank]; negative values count from the back
        let mut axis = raw_axis;
        if axis < 0 {
            axis += rank;
        }
        if axis < 0 || axis > rank {
            return Err(Status::InvalidParam(format!(
                "Node: Flatten[{node_name}], invalid axis: {raw_axis}"
            )));
        }

        let dim0: i64 = (0..axis as usize).map(|i| input_shape[i]).product();
        let dim1: i64 = (axis as usize..rank as usize)
            .map(|i| input_shape[i])
            .product();

        outputs[0].set_shape(TensorShape::from_dims([dim0, dim1]));
        Ok(())
    }
}
