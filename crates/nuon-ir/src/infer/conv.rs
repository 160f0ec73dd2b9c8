//! Conv shape inference.

use std::collections::HashMap;

use nuon_common::{Result, Status};

use crate::attribute::NodeAttribute;
use crate::node_arg::NodeArg;
use crate::tensor_shape::TensorShape;

use super::{attr_i64, attr_i64s, attr_str, resolve_spatial_attrs, ShapeInfer};

/// N-dimensional convolution over an (N x C x D1 ... Dn) input.
///
/// Only `auto_pad == "NOTSET"` and `group == 1` are supported.
#[derive(Debug)]
pub struct ConvInfer;

impl ShapeInfer for ConvInfer {
    fn node_type(&self) -> &'static str {
        "Conv"
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
                "Node: Conv[{node_name}], invalid input size: {} or output size: {}",
                inputs.len(),
                outputs.len()
            )));
        }

        let auto_pad = attr_str(attributes, "auto_pad", "NOTSET")?;
        let group = attr_i64(attributes, "group", 1)?;
        let mut kernel_shape = attr_i64s(attributes, "kernel_shape")?;
        let dilations = attr_i64s(attributes, "dilations")?;
        let pads = attr_i64s(attributes, "pads")?;
        let strides = attr_i64s(attributes, "strides")?;

        if auto_pad != "NOTSET" {
            return Err(Status::NotImplemented(format!(
                "Node: Conv[{node_name}], auto_pad attribute is not supported now. \
                 auto_pad value: {auto_pad}"
            )));
        }

        if group > 1 {
            return Err(Status::NotImplemented(format!(
                "Node: Conv[{node_name}], group convolution is not supported now. \
                 group attribute: {group}"
            )));
        }

        let input_shape = inputs[0].shape();
        let weight_shape = inputs[1].shape();
        let input_rank = input_shape.dims_num();
        let weight_rank = weight_shape.dims_num();

        if input_rank < 2 {
            return Err(Status::InvalidParam(format!(
                "Node: Conv[{node_name}], invalid input dimensions length: {input_rank}"
            )));
        }
        if weight_rank < 2 || input_rank != weight_rank {
            return Err(Status::InvalidParam(format!(
                "Node: Conv[{node_name}], invalid weight dimensions length: {weight_rank}"
            )));
        }

        // absent kernel_shape is derived from the weight's spatial dims
        if kernel_shape.is_empty() {
            kernel_shape = weight_shape.dims()[2..].to_vec();
        }
        // spatial axes start after batch and channel, so the kernel rank
        // must fit in rank - 2
        let kernel_size = kernel_shape.len();
        if kernel_size > input_rank - 2 {
            return Err(Status::InvalidParam("Invalid kernel_shape".into()));
        }

        let (dilations, pads, strides) =
            resolve_spatial_attrs(kernel_size, dilations, pads, strides)?;

        let mut out_shape = TensorShape::new();
        out_shape.add_dim(input_shape[0]); // batch
        out_shape.add_dim(weight_shape[0]); // output channels

        for i in 0..kernel_size {
            let dim = (input_shape[i + 2] + pads[i] + pads[i + kernel_size]
                - dilations[i] * (kernel_shape[i] - 1)
                - 1)
                / strides[i]
                + 1;
            out_shape.add_dim(dim);
        }

        outputs[0].set_shape(out_shape);
        Ok(())
    }
}
