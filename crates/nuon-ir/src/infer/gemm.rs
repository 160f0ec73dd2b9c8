//! Gemm shape inference.

use std::collections::HashMap;

use nuon_common::{Result, Status};

use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;
use crate::tensor_shape::TensorShape;

use super::{attr_i64, ShapeInfer};

/// General matrix multiply: `Y = alpha·A'·B' + beta·C` with optional
/// transposes on A and B and a broadcastable bias C.
#[derive(Debug)]
pub struct GemmInfer;

impl ShapeInfer for GemmInfer {
    fn node_type(&self) -> &'static str {
        "Gemm"
    }

    fn infer(
        &self,
        node_name: &str,
        inputs: &[NodeArg],
        attributes: &HashMap<String, NodeAttribute>,
        outputs: &mut [NodeArg],
    ) -> Result<()> {
        if inputs.len() < 2 || outputs.len() != 1 {
            return Err(Status::InvalidParam(format!(
                "Node: Gemm[{node_name}], invalid input size: {} or output size: {}",
                inputs.len(),
                outputs.len()
            )));
        }

        let mat_a = inputs[0].shape();
        let mat_b = inputs[1].shape();
        if mat_a.dims_num() != 2 || mat_b.dims_num() != 2 {
            return Err(Status::InvalidParam(format!(
                "Node: Gemm[{node_name}], invalid dims of inputs. Matrix A: {} Matrix B: {}",
                mat_a.dims_num(),
                mat_b.dims_num()
            )));
        }

        let trans_a = attr_i64(attributes, "transA", 0)? != 0;
        let trans_b = attr_i64(attributes, "transB", 0)? != 0;

        let (m, k_a) = if trans_a {
            (mat_a[1], mat_a[0])
        } else {
            (mat_a[0], mat_a[1])
        };
        let (k_b, n) = if trans_b {
            (mat_b[1], mat_b[0])
        } else {
            (mat_b[0], mat_b[1])
        };

        if k_a != k_b {
            return Err(Status::InvalidParam(format!(
                "Node: Gemm[{node_name}], mismatch for A dim1 and B dim0"
            )));
        }

        if inputs.len() == 3 {
            let mat_c = inputs[2].shape();
            let valid = match mat_c.dims_num() {
                1 => mat_c[0] == 1 || mat_c[0] == n,
                2 => (mat_c[0] == m || mat_c[0] == 1) && (mat_c[1] == n || mat_c[1] == 1),
                _ => false,
            };
            if !valid {
                return Err(Status::InvalidParam(format!(
                    "Node: Gemm[{node_name}], invalid matrix C dimensions"
                )));
            }
        }

        outputs[0].set_shape(TensorShape::from_dims([m, n]));
        Ok(())
    }
}
