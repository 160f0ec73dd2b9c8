//! Loading pipeline: serialized ONNX → IR model.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use prost::Message as _;

use nuon_common::{Result, Status};
use nuon_framework::{Allocator, AllocatorKind, AllocatorRegistry};
use nuon_ir::{
    AttributeValue, Graph, Model, NodeArg, NodeAttribute, PrimitiveDataType, Tensor, TensorShape,
};
use nuon_utils::file_exists;

use crate::proto::{
    attribute_type, data_type, type_proto, AttributeProto, GraphProto, ModelProto, NodeProto,
    TensorProto, TensorShapeProto,
};

/// Oldest ir_version the loader accepts.
pub const IR_VERSION_MIN: i64 = 4;
/// Newest ir_version the loader recognizes.
pub const IR_VERSION_MAX: i64 = 11;

/// Loads a serialized ONNX model from a file.
///
/// The returned model's graph is initialized; the caller runs
/// `construct_topology()` before using it.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    if !file_exists(path) {
        return Err(Status::FileNotFound(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let bytes = std::fs::read(path).map_err(|err| {
        Status::FileNotFound(format!("open file failed: {}: {err}", path.display()))
    })?;
    let onnx_model = ModelProto::decode(bytes.as_slice()).map_err(|_| {
        Status::InvalidModel(format!("Parse onnx model failed: {}", path.display()))
    })?;

    load_model(onnx_model)
}

/// Loads a serialized ONNX model from an in-memory byte slice.
pub fn load_from_memory(data: &[u8]) -> Result<Model> {
    if data.is_empty() {
        return Err(Status::InvalidParam(
            "Parse onnx model from memory failed, invalid parameters".into(),
        ));
    }
    let onnx_model = ModelProto::decode(data)
        .map_err(|_| Status::InvalidModel("Parse onnx model from memory failed".into()))?;

    load_model(onnx_model)
}

fn load_model(onnx_model: ModelProto) -> Result<Model> {
    validate_model(&onnx_model)?;
    parse_model(onnx_model)
}

/// Envelope checks: a graph, at least one opset import, and a
/// recognized, supported ir_version.
fn validate_model(onnx_model: &ModelProto) -> Result<()> {
    if onnx_model.graph.is_none() {
        return Err(Status::InvalidModel("no graph in onnx model".into()));
    }

    if onnx_model.opset_import.is_empty() {
        return Err(Status::InvalidModel(
            "opset_import missed in onnx model".into(),
        ));
    }

    let ir_version = onnx_model.ir_version;
    if !(1..=IR_VERSION_MAX).contains(&ir_version) {
        return Err(Status::InvalidModel(format!(
            "unsupported model IR version: {ir_version}"
        )));
    }

    if ir_version < IR_VERSION_MIN {
        return Err(Status::NotImplemented(format!(
            "Too old ir version: {ir_version}, not supported now"
        )));
    }

    Ok(())
}

fn parse_model(onnx_model: ModelProto) -> Result<Model> {
    let mut model = Model::new();

    let metadata: HashMap<String, String> = onnx_model
        .metadata_props
        .iter()
        .map(|prop| (prop.key.clone(), prop.value.clone()))
        .collect();
    model.set_metadata(metadata);

    let domain_version: HashMap<String, i64> = onnx_model
        .opset_import
        .iter()
        .map(|opset| (opset.domain.clone(), opset.version))
        .collect();
    model.set_domain_version(domain_version);

    model.set_ir_version(onnx_model.ir_version);
    model.set_producer_name(onnx_model.producer_name);
    model.set_producer_version(onnx_model.producer_version);
    model.set_domain(onnx_model.domain);
    model.set_model_version(onnx_model.model_version);
    model.set_doc_string(onnx_model.doc_string);

    // presence was checked by validate_model
    let onnx_graph = onnx_model
        .graph
        .ok_or_else(|| Status::InvalidModel("no graph in onnx model".into()))?;
    let graph = parse_graph(&onnx_graph)?;
    model.set_graph(graph);

    Ok(model)
}

fn parse_graph(onnx_graph: &GraphProto) -> Result<Graph> {
    let mut graph = Graph::new();

    // templates gathered from inputs/initializers/outputs/value_info,
    // consulted when node args are resolved in the final pass
    let mut nodearg_templates: HashMap<String, NodeArg> = HashMap::new();

    let allocator = cpu_allocator()?;

    // Pass A: lift Constant nodes into initializers keyed by their first
    // output name; they never become graph nodes.
    for proto_node in &onnx_graph.node {
        if proto_node.op_type != "Constant" {
            continue;
        }

        info!("Constant node: {}", proto_node.name);
        let tensor = constant_node_to_tensor(proto_node, &allocator)?;
        if graph.has_initializer(tensor.name()) {
            warn!("Tensor [{}] has already exist in the graph", tensor.name());
        }
        graph.add_initializer(tensor);
    }

    // Pass B: declared graph inputs.
    for input in &onnx_graph.input {
        if input.name.is_empty() {
            warn!("Graph input name is empty");
            continue;
        }
        match tensor_type_of(input.r#type.as_ref()) {
            Some((elem_type, shape)) => {
                let dt = tensor_datatype_to_primitive(elem_type);
                if dt == PrimitiveDataType::Unknown {
                    return Err(Status::InvalidModel(
                        "unsupported data type of graph inputs".into(),
                    ));
                }
                let arg = NodeArg::with_type_shape(&input.name, dt, shape);
                nodearg_templates.insert(input.name.clone(), arg.clone());
                graph.get_or_create_nodearg(&input.name, &arg);
                graph.add_input_name(&input.name);
            }
            None => {
                warn!(
                    "Graph input [{}] has no type or has an unsupported type",
                    input.name
                );
            }
        }
    }

    // Pass C: initializer tensors, allocated through the CPU allocator.
    for initializer in &onnx_graph.initializer {
        let tensor = retrieve_tensor_data(initializer, &allocator, &initializer.name)
            .inspect_err(|_| warn!("Parsing initializer[{}] fails", initializer.name))?;

        info!("Initializer name: {}", tensor.name());
        if graph.get_nodearg(tensor.name()).is_none() {
            let arg =
                NodeArg::with_type_shape(tensor.name(), tensor.data_type(), tensor.shape().clone());
            nodearg_templates.insert(tensor.name().to_string(), arg.clone());
            graph.get_or_create_nodearg(tensor.name(), &arg);
        } else {
            warn!(
                "Initializer [{}] appears in graph inputs and will not be treated as constant value",
                tensor.name()
            );
        }

        if graph.has_initializer(tensor.name()) {
            warn!(
                "Duplicate initializer[{}], the model will use the last initializer, \
                 please modify the model",
                tensor.name()
            );
        }
        graph.add_initializer(tensor);
    }

    // Pass D: declared graph outputs.
    for output in &onnx_graph.output {
        if output.name.is_empty() {
            warn!("Graph output name is empty");
            continue;
        }
        match tensor_type_of(output.r#type.as_ref()) {
            Some((elem_type, shape)) => {
                let dt = tensor_datatype_to_primitive(elem_type);
                if dt == PrimitiveDataType::Unknown {
                    return Err(Status::InvalidModel(
                        "unsupported data type of graph outputs".into(),
                    ));
                }
                let arg = NodeArg::with_type_shape(&output.name, dt, shape);
                nodearg_templates.insert(output.name.clone(), arg.clone());
                graph.get_or_create_nodearg(&output.name, &arg);
                graph.add_output_name(&output.name);
            }
            None => {
                warn!(
                    "Graph output [{}] has no type or has an unsupported type",
                    output.name
                );
            }
        }
    }

    // Pass E: value_info seeds type/shape templates for internal args.
    for val_info in &onnx_graph.value_info {
        if val_info.name.is_empty() {
            warn!("Graph value_info name is empty");
            continue;
        }
        if let Some((elem_type, shape)) = tensor_type_of(val_info.r#type.as_ref()) {
            let dt = tensor_datatype_to_primitive(elem_type);
            if dt == PrimitiveDataType::Unknown {
                return Err(Status::InvalidModel(
                    "unsupported data type of graph value infos".into(),
                ));
            }
            let arg = NodeArg::with_type_shape(&val_info.name, dt, shape);
            nodearg_templates.insert(val_info.name.clone(), arg);
        }
    }

    // Pass F: remaining nodes in source order; ids start at 0.
    for proto_node in &onnx_graph.node {
        if proto_node.op_type == "Constant" {
            continue;
        }
        parse_node(proto_node, &mut graph, &nodearg_templates, &allocator)?;
    }

    graph.initialize()?;

    Ok(graph)
}

fn parse_node(
    onnx_node: &NodeProto,
    graph: &mut Graph,
    nodearg_templates: &HashMap<String, NodeArg>,
    allocator: &Arc<dyn Allocator>,
) -> Result<()> {
    let resolve_args = |graph: &mut Graph, names: &[String]| {
        names
            .iter()
            .map(|name| match nodearg_templates.get(name) {
                Some(template) => graph.get_or_create_nodearg(name, template),
                None => graph.get_or_create_nodearg(name, &NodeArg::new(name)),
            })
            .collect::<Vec<_>>()
    };

    let input_args = resolve_args(graph, &onnx_node.input);
    let output_args = resolve_args(graph, &onnx_node.output);

    let mut attributes = HashMap::new();
    for item in &onnx_node.attribute {
        let attr = parse_attribute(item, allocator)?;
        attributes.insert(item.name.clone(), attr);
    }

    graph.add_node(
        &onnx_node.name,
        &onnx_node.op_type,
        &onnx_node.domain,
        &onnx_node.doc_string,
        input_args,
        output_args,
        attributes,
    );

    Ok(())
}

/// Materializes a tensor literal. Only FLOAT payloads are supported:
/// raw bytes must span exactly `4 × element_count`, typed floats must
/// match the element count.
fn retrieve_tensor_data(
    proto_tensor: &TensorProto,
    allocator: &Arc<dyn Allocator>,
    name: &str,
) -> Result<Tensor> {
    match proto_tensor.data_type {
        data_type::FLOAT => {
            let mut shape = TensorShape::new();
            for &dim in &proto_tensor.dims {
                shape.add_dim(dim);
            }

            let mut tensor = Tensor::new(name);
            tensor
                .init_with_allocator(PrimitiveDataType::Float32, shape, Arc::clone(allocator))
                .map_err(|err| {
                    Status::new(
                        err.kind(),
                        format!("init tensor failed, tensor proto: {}", proto_tensor.name),
                    )
                })?;

            let element_num = tensor.shape().element_num() as usize;
            if !proto_tensor.raw_data.is_empty() {
                if proto_tensor.raw_data.len() != std::mem::size_of::<f32>() * element_num {
                    return Err(Status::InvalidModel(
                        "Invalid tensor raw data length with its dims".into(),
                    ));
                }
                if element_num > 0 {
                    unsafe {
                        std::ptr::copy_nonoverlapping(
                            proto_tensor.raw_data.as_ptr(),
                            tensor.data_raw(),
                            proto_tensor.raw_data.len(),
                        );
                    }
                }
            } else {
                if proto_tensor.float_data.len() != element_num {
                    return Err(Status::InvalidModel(
                        "Invalid tensor float data length with its dims".into(),
                    ));
                }
                let data = tensor.data_as::<f32>();
                for (i, &value) in proto_tensor.float_data.iter().enumerate() {
                    unsafe { *data.add(i) = value };
                }
            }

            Ok(tensor)
        }
        _ => Err(Status::NotImplemented(
            "not support data type for proto tensor".into(),
        )),
    }
}

/// Lifts a Constant node's first attribute into a tensor keyed by the
/// node's first output name.
fn constant_node_to_tensor(
    proto_node: &NodeProto,
    allocator: &Arc<dyn Allocator>,
) -> Result<Tensor> {
    if proto_node.output.is_empty() {
        return Err(Status::InvalidModel(format!(
            "Constant node [{}] has no outputs",
            proto_node.name
        )));
    }
    if proto_node.attribute.is_empty() {
        return Err(Status::InvalidModel(format!(
            "Constant node [{}] has no attributes",
            proto_node.name
        )));
    }

    let name = &proto_node.output[0];
    let const_attr = &proto_node.attribute[0];

    match const_attr.r#type {
        attribute_type::TENSOR => {
            let tensor_proto = const_attr.t.as_ref().ok_or_else(|| {
                Status::InvalidModel(format!(
                    "Constant node [{}] has an empty tensor attribute",
                    proto_node.name
                ))
            })?;
            retrieve_tensor_data(tensor_proto, allocator, name)
        }
        attribute_type::FLOAT => {
            let tensor = alloc_constant(
                name,
                PrimitiveDataType::Float32,
                1,
                allocator,
                &proto_node.name,
                "float",
            )?;
            unsafe { *tensor.data_as::<f32>() = const_attr.f };
            Ok(tensor)
        }
        attribute_type::FLOATS => {
            let tensor = alloc_constant(
                name,
                PrimitiveDataType::Float32,
                const_attr.floats.len() as i64,
                allocator,
                &proto_node.name,
                "floats",
            )?;
            let data = tensor.data_as::<f32>();
            for (i, &value) in const_attr.floats.iter().enumerate() {
                unsafe { *data.add(i) = value };
            }
            Ok(tensor)
        }
        attribute_type::INT => {
            let tensor = alloc_constant(
                name,
                PrimitiveDataType::Int64,
                1,
                allocator,
                &proto_node.name,
                "int",
            )?;
            unsafe { *tensor.data_as::<i64>() = const_attr.i };
            Ok(tensor)
        }
        attribute_type::INTS => {
            let tensor = alloc_constant(
                name,
                PrimitiveDataType::Int64,
                const_attr.ints.len() as i64,
                allocator,
                &proto_node.name,
                "ints",
            )?;
            let data = tensor.data_as::<i64>();
            for (i, &value) in const_attr.ints.iter().enumerate() {
                unsafe { *data.add(i) = value };
            }
            Ok(tensor)
        }
        _ => Err(Status::InvalidModel(format!(
            "not supported attributes of constant node: {}",
            proto_node.name
        ))),
    }
}

fn alloc_constant(
    name: &str,
    dt: PrimitiveDataType,
    len: i64,
    allocator: &Arc<dyn Allocator>,
    node_name: &str,
    payload: &str,
) -> Result<Tensor> {
    let mut shape = TensorShape::new();
    shape.add_dim(len);

    let mut tensor = Tensor::new(name);
    tensor
        .init_with_allocator(dt, shape, Arc::clone(allocator))
        .map_err(|err| {
            Status::new(
                err.kind(),
                format!("convert constant node {payload} tensor failed, node proto: {node_name}"),
            )
        })?;
    Ok(tensor)
}

fn parse_attribute(
    proto_attr: &AttributeProto,
    allocator: &Arc<dyn Allocator>,
) -> Result<NodeAttribute> {
    let value = match proto_attr.r#type {
        attribute_type::FLOAT => AttributeValue::Float(proto_attr.f),
        attribute_type::INT => AttributeValue::Int64(proto_attr.i),
        attribute_type::STRING => {
            AttributeValue::String(String::from_utf8_lossy(&proto_attr.s).into_owned())
        }
        attribute_type::TENSOR => {
            let tensor_proto = proto_attr.t.as_ref().ok_or_else(|| {
                Status::InvalidModel(format!(
                    "attribute [{}] has an empty tensor payload",
                    proto_attr.name
                ))
            })?;
            let tensor = retrieve_tensor_data(tensor_proto, allocator, &tensor_proto.name)?;
            AttributeValue::Tensor(tensor)
        }
        attribute_type::FLOATS => AttributeValue::Floats(proto_attr.floats.clone()),
        attribute_type::INTS => AttributeValue::Int64s(proto_attr.ints.clone()),
        attribute_type::STRINGS => AttributeValue::Strings(
            proto_attr
                .strings
                .iter()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect(),
        ),
        attribute_type::TENSORS => {
            let mut tensors = Vec::with_capacity(proto_attr.tensors.len());
            for tensor_proto in &proto_attr.tensors {
                tensors.push(retrieve_tensor_data(
                    tensor_proto,
                    allocator,
                    &tensor_proto.name,
                )?);
            }
            AttributeValue::Tensors(tensors)
        }
        _ => {
            return Err(Status::InvalidModel(format!(
                "unsupported node attribute data type: {}",
                proto_attr.name
            )))
        }
    };

    Ok(NodeAttribute::new(&proto_attr.name, value))
}

fn cpu_allocator() -> Result<Arc<dyn Allocator>> {
    AllocatorRegistry::instance()
        .get(AllocatorKind::Cpu)
        .ok_or_else(|| Status::Fail("CPU allocator unavailable".into()))
}

/// Maps a `TensorProto.DataType` constant to a primitive type; anything
/// unrecognized becomes `Unknown`.
fn tensor_datatype_to_primitive(elem_type: i32) -> PrimitiveDataType {
    match elem_type {
        data_type::FLOAT => PrimitiveDataType::Float32,
        data_type::INT8 => PrimitiveDataType::Int8,
        data_type::UINT8 => PrimitiveDataType::Uint8,
        data_type::INT16 => PrimitiveDataType::Int16,
        data_type::UINT16 => PrimitiveDataType::Uint16,
        data_type::INT32 => PrimitiveDataType::Int32,
        data_type::UINT32 => PrimitiveDataType::Uint32,
        data_type::INT64 => PrimitiveDataType::Int64,
        data_type::UINT64 => PrimitiveDataType::Uint64,
        _ => PrimitiveDataType::Unknown,
    }
}

/// A dim with a concrete value contributes it; symbolic or absent dims
/// contribute −1.
fn shapeproto_to_tensorshape(shape_proto: &TensorShapeProto) -> TensorShape {
    let mut shape = TensorShape::new();
    for dim in &shape_proto.dim {
        match dim.value {
            Some(crate::proto::tensor_shape_dimension::Value::DimValue(value)) => {
                shape.add_dim(value)
            }
            _ => shape.add_dim(-1),
        }
    }
    shape
}

/// Extracts (elem_type, shape) when the value info declares a tensor type.
fn tensor_type_of(type_proto: Option<&crate::proto::TypeProto>) -> Option<(i32, TensorShape)> {
    let type_proto = type_proto?;
    let type_proto::Value::TensorType(tensor_type) = type_proto.value.as_ref()?;
    let shape = tensor_type
        .shape
        .as_ref()
        .map(shapeproto_to_tensorshape)
        .unwrap_or_default();
    Some((tensor_type.elem_type, shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::{OperatorSetIdProto, TensorShapeDimension, ValueInfoProto};
    use nuon_common::StatusKind;
    use prost::Message;

    fn minimal_relu_model() -> ModelProto {
        ModelProto {
            ir_version: 8,
            producer_name: "nuon-tests".into(),
            producer_version: "0.1.0".into(),
            graph: Some(GraphProto {
                name: "relu".into(),
                node: vec![NodeProto::simple(
                    "Relu",
                    "r",
                    vec!["x".into()],
                    vec!["y".into()],
                )],
                input: vec![ValueInfoProto::tensor(
                    "x",
                    data_type::FLOAT,
                    vec![TensorShapeDimension::fixed(1), TensorShapeDimension::fixed(8)],
                )],
                output: vec![ValueInfoProto::tensor(
                    "y",
                    data_type::FLOAT,
                    vec![TensorShapeDimension::fixed(1), TensorShapeDimension::fixed(8)],
                )],
                ..Default::default()
            }),
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: 13,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn loads_minimal_model_from_memory() {
        let bytes = minimal_relu_model().encode_to_vec();
        let model = load_from_memory(&bytes).unwrap();

        assert_eq!(model.get_ir_version(), 8);
        assert_eq!(model.get_producer_name(), "nuon-tests");
        assert_eq!(model.get_domain_version().get(""), Some(&13));

        let graph = model.get_graph();
        assert_eq!(graph.get_nodes().len(), 1);
        assert_eq!(graph.get_nodes()[0].op_type(), "Relu");
        assert_eq!(graph.inputs().len(), 1);
        assert_eq!(graph.outputs().len(), 1);
    }

    #[test]
    fn empty_buffer_is_invalid_param() {
        let err = load_from_memory(&[]).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidParam);
    }

    #[test]
    fn garbage_bytes_are_invalid_model() {
        let err = load_from_memory(&[0xFF; 64]).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
    }

    #[test]
    fn missing_graph_is_invalid_model() {
        let mut model = minimal_relu_model();
        model.graph = None;
        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
        assert!(err.message().contains("no graph"));
    }

    #[test]
    fn missing_opset_is_invalid_model() {
        let mut model = minimal_relu_model();
        model.opset_import.clear();
        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
        assert!(err.message().contains("opset_import"));
    }

    #[test]
    fn unrecognized_ir_version_is_invalid_model() {
        let mut model = minimal_relu_model();
        model.ir_version = 99;
        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
    }

    #[test]
    fn old_ir_version_is_not_implemented() {
        let mut model = minimal_relu_model();
        model.ir_version = 3;
        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::NotImplemented);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let err = load_from_file("/nonexistent/model.onnx").unwrap_err();
        assert_eq!(err.kind(), StatusKind::FileNotFound);
    }

    #[test]
    fn loads_model_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relu.onnx");
        std::fs::write(&path, minimal_relu_model().encode_to_vec()).unwrap();

        let model = load_from_file(&path).unwrap();
        assert_eq!(model.get_graph().get_nodes().len(), 1);
    }

    #[test]
    fn file_with_garbage_is_invalid_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.onnx");
        std::fs::write(&path, [0xFFu8; 32]).unwrap();

        let err = load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
    }

    #[test]
    fn initializer_raw_data_length_mismatch_is_invalid_model() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.initializer.push(TensorProto {
            dims: vec![4],
            data_type: data_type::FLOAT,
            float_data: vec![],
            name: "w".into(),
            raw_data: vec![0u8; 10], // needs 16
        });

        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
        assert!(err.message().contains("raw data length"));
    }

    #[test]
    fn initializer_float_data_length_mismatch_is_invalid_model() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph
            .initializer
            .push(TensorProto::floats("w", vec![4], vec![1.0, 2.0]));

        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
        assert!(err.message().contains("float data length"));
    }

    #[test]
    fn non_float_initializer_is_not_implemented() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.initializer.push(TensorProto {
            dims: vec![2],
            data_type: data_type::DOUBLE,
            float_data: vec![],
            name: "w".into(),
            raw_data: vec![0u8; 16],
        });

        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::NotImplemented);
    }

    #[test]
    fn initializer_payload_is_copied() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph
            .initializer
            .push(TensorProto::raw_floats("w", vec![3], &[1.5, -2.0, 0.25]));

        let model = load_from_memory(&model.encode_to_vec()).unwrap();
        let tensor = model.get_graph().get_initializer("w").unwrap();
        assert_eq!(tensor.data_type(), PrimitiveDataType::Float32);
        assert_eq!(tensor.shape().dims(), &[3]);
        let data = tensor.data_as::<f32>();
        unsafe {
            assert_eq!(*data, 1.5);
            assert_eq!(*data.add(1), -2.0);
            assert_eq!(*data.add(2), 0.25);
        }
    }

    #[test]
    fn symbolic_dims_become_minus_one() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.input[0] = ValueInfoProto::tensor(
            "x",
            data_type::FLOAT,
            vec![
                TensorShapeDimension::symbolic("batch"),
                TensorShapeDimension::fixed(8),
            ],
        );

        let model = load_from_memory(&model.encode_to_vec()).unwrap();
        let graph = model.get_graph();
        let x = graph.get_nodearg("x").unwrap();
        assert_eq!(graph.arg(x).shape().dims(), &[-1, 8]);
    }

    #[test]
    fn constant_floats_node_becomes_initializer() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.node.push(NodeProto::with_attrs(
            "Constant",
            "const0",
            vec![],
            vec!["cval".into()],
            vec![AttributeProto::floats(
                "value",
                vec![1.0, 2.0, 3.0, 4.0, 5.0],
            )],
        ));

        let model = load_from_memory(&model.encode_to_vec()).unwrap();
        let graph = model.get_graph();
        assert!(graph.has_initializer("cval"));
        let tensor = graph.get_initializer("cval").unwrap();
        assert_eq!(tensor.data_type(), PrimitiveDataType::Float32);
        assert_eq!(tensor.shape().dims(), &[5]);
        // the Constant node itself is not materialized
        assert!(graph.get_nodes().iter().all(|n| n.op_type() != "Constant"));
    }

    #[test]
    fn constant_int_scalar_becomes_int64_initializer() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.node.push(NodeProto::with_attrs(
            "Constant",
            "const0",
            vec![],
            vec!["cint".into()],
            vec![AttributeProto::int("value", 42)],
        ));

        let model = load_from_memory(&model.encode_to_vec()).unwrap();
        let tensor = model.get_graph().get_initializer("cint").unwrap();
        assert_eq!(tensor.data_type(), PrimitiveDataType::Int64);
        assert_eq!(tensor.shape().dims(), &[1]);
        unsafe { assert_eq!(*tensor.data_as::<i64>(), 42) };
    }

    #[test]
    fn constant_with_unsupported_payload_is_invalid_model() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.node.push(NodeProto::with_attrs(
            "Constant",
            "const0",
            vec![],
            vec!["cstr".into()],
            vec![AttributeProto::string("value", "nope")],
        ));

        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
    }

    #[test]
    fn constant_without_outputs_is_invalid_model() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.node.push(NodeProto::with_attrs(
            "Constant",
            "const0",
            vec![],
            vec![],
            vec![AttributeProto::int("value", 1)],
        ));

        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
    }

    #[test]
    fn node_attributes_are_converted() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.node[0] = NodeProto::with_attrs(
            "Flatten",
            "f",
            vec!["x".into()],
            vec!["y".into()],
            vec![AttributeProto::int("axis", 1)],
        );

        let model = load_from_memory(&model.encode_to_vec()).unwrap();
        let node = &model.get_graph().get_nodes()[0];
        assert_eq!(node.attributes()["axis"].as_i64().unwrap(), 1);
    }

    #[test]
    fn node_ids_skip_constants_and_stay_dense() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.node.insert(
            0,
            NodeProto::with_attrs(
                "Constant",
                "const0",
                vec![],
                vec!["cval".into()],
                vec![AttributeProto::floats("value", vec![1.0])],
            ),
        );

        let model = load_from_memory(&model.encode_to_vec()).unwrap();
        let nodes = model.get_graph().get_nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id().0, 0);
        assert_eq!(nodes[0].op_type(), "Relu");
    }

    #[test]
    fn unknown_input_elem_type_is_invalid_model() {
        let mut model = minimal_relu_model();
        let graph = model.graph.as_mut().unwrap();
        graph.input[0] = ValueInfoProto::tensor(
            "x",
            data_type::STRING,
            vec![TensorShapeDimension::fixed(1)],
        );

        let err = load_from_memory(&model.encode_to_vec()).unwrap_err();
        assert_eq!(err.kind(), StatusKind::InvalidModel);
    }

    #[test]
    fn primitive_type_map() {
        assert_eq!(
            tensor_datatype_to_primitive(data_type::FLOAT),
            PrimitiveDataType::Float32
        );
        assert_eq!(
            tensor_datatype_to_primitive(data_type::INT64),
            PrimitiveDataType::Int64
        );
        assert_eq!(
            tensor_datatype_to_primitive(data_type::UINT16),
            PrimitiveDataType::Uint16
        );
        assert_eq!(
            tensor_datatype_to_primitive(data_type::DOUBLE),
            PrimitiveDataType::Unknown
        );
        assert_eq!(
            tensor_datatype_to_primitive(data_type::BOOL),
            PrimitiveDataType::Unknown
        );
    }
}
