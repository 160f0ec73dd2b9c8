//! MaxPool shape inference.

use std::collections::HashMap;

use nuon_common::{Result, Status};

use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;
use crate::tensor_shape::TensorShape;

use super::{attr_i64, attr_i64s, attr_str, resolve_spatial_attrs, ShapeInfer};

/// Max pooling over the trailing spatial dims of an (N x C x D1 ... Dn)
/// input. The two-output variant (with an indices tensor) is not
/// supported; `storage_order` is read and ignored.
#[derive(Debug)]
pub struct MaxPoolInfer;

impl ShapeInfer for MaxPoolInfer {
    fn node_type(&self) -> &'static str {
        "MaxPool"
    }

    fn infer(
        &self,
        node_name: &str,
        inputs: &[NodeArg],
        attributes: &HashMap<String, NodeAttribute>,
        outputs: &mut [NodeArg],
    ) -> Result<()> {
        if inputs.len() != 1 || outputs.len() != 1 {
            return Err(Status::NotImplemented(format!(
                "Node: MaxPool[{node_name}], not implemented or invalid input size: {} \
                 or output size: {}",
                inputs.len(),
                outputs.len()
            )));
        }

        let auto_pad = attr_str(attributes, "auto_pad", "NOTSET")?;
        let ceil_mode = attr_i64(attributes, "ceil_mode", 0)?;
        let dilations = attr_i64s(attributes, "dilations")?;
        let kernel_shape = attr_i64s(attributes, "kernel_shape")?;
        let pads = attr_i64s(attributes, "pads")?;
        let _storage_order = attr_i64(attributes, "storage_order", 0)?;
        let strides = attr_i64s(attributes, "strides")?;

        let input_shape = inputs[0].shape();
        let rank = input_shape.dims_num();
        if rank < 2 {
            return Err(Status::InvalidParam(format!(
                "Node: MaxPool[{node_name}], invalid input dimensions length: {rank}"
            )));
        }

        // auto_pad is a deprecated attribute in the operator spec
        if auto_pad != "NOTSET" {
            return Err(Status::InvalidParam(format!(
                "Node: MaxPool[{node_name}], auto_pad is a DEPRECATED attribute, \
                 not supported now. auto_pad value: {auto_pad}"
            )));
        }

        let kernel_size = kernel_shape.len();
        if kernel_size > rank {
            return Err(Status::InvalidParam("Invalid kernel_shape".into()));
        }

        let (dilations, pads, strides) =
            resolve_spatial_attrs(kernel_size, dilations, pads, strides)?;

        let mut output_shape = TensorShape::new();
        output_shape.set_dims_num(rank);

        for i in 0..rank - kernel_size {
            output_shape[i] = input_shape[i];
        }

        for (j, i) in (rank - kernel_size..rank).enumerate() {
            let tmp = input_shape[i] + pads[j] + pads[j + kernel_size]
                - dilations[j] * (kernel_shape[j] - 1)
                - 1;
            let q = tmp / strides[j];
            output_shape[i] = if ceil_mode == 0 || q * strides[j] == tmp {
                q + 1
            } else {
                q + 2
            };
        }

        outputs[0].set_shape(output_shape);
        Ok(())
    }
}
