//! Model header plus the owned graph.

use std::collections::HashMap;

use crate::graph::Graph;

/// A loaded model: header metadata and the root [`Graph`].
#[derive(Debug, Default)]
pub struct Model {
    ir_version: i64,
    producer_name: String,
    producer_version: String,
    domain: String,
    model_version: i64,
    doc_string: String,
    /// Free-form metadata properties from the model header.
    metadata: HashMap<String, String>,
    /// Operator-set domain → version.
    domain_version: HashMap<String, i64>,
    graph: Graph,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_graph(&self) -> &Graph {
        &self.graph
    }

    pub fn get_graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn set_graph(&mut self, graph: Graph) {
        self.graph = graph;
    }

    pub fn get_ir_version(&self) -> i64 {
        self.ir_version
    }

    pub fn set_ir_version(&mut self, ir_version: i64) {
        self.ir_version = ir_version;
    }

    pub fn get_producer_name(&self) -> &str {
        &self.producer_name
    }

    pub fn set_producer_name(&mut self, producer_name: impl Into<String>) {
        self.producer_name = producer_name.into();
    }

    pub fn get_producer_version(&self) -> &str {
        &self.producer_version
    }

    pub fn set_producer_version(&mut self, producer_version: impl Into<String>) {
        self.producer_version = producer_version.into();
    }

    pub fn get_domain(&self) -> &str {
        &self.domain
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = domain.into();
    }

    pub fn get_model_version(&self) -> i64 {
        self.model_version
    }

    pub fn set_model_version(&mut self, model_version: i64) {
        self.model_version = model_version;
    }

    pub fn get_doc_string(&self) -> &str {
        &self.doc_string
    }

    pub fn set_doc_string(&mut self, doc_string: impl Into<String>) {
        self.doc_string = doc_string.into();
    }

    pub fn get_metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: HashMap<String, String>) {
        self.metadata = metadata;
    }

    pub fn get_domain_version(&self) -> &HashMap<String, i64> {
        &self.domain_version
    }

    pub fn set_domain_version(&mut self, domain_version: HashMap<String, i64>) {
        self.domain_version = domain_version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let mut model = Model::new();
        model.set_ir_version(8);
        model.set_producer_name("nuon");
        model.set_producer_version("0.1.0");
        model.set_domain("ai.nuon");
        model.set_model_version(3);
        model.set_doc_string("test model");

        assert_eq!(model.get_ir_version(), 8);
        assert_eq!(model.get_producer_name(), "nuon");
        assert_eq!(model.get_producer_version(), "0.1.0");
        assert_eq!(model.get_domain(), "ai.nuon");
        assert_eq!(model.get_model_version(), 3);
        assert_eq!(model.get_doc_string(), "test model");
    }

    #[test]
    fn opset_map_roundtrip() {
        let mut model = Model::new();
        let mut opsets = HashMap::new();
        opsets.insert(String::new(), 13);
        opsets.insert("com.example".to_string(), 2);
        model.set_domain_version(opsets);

        assert_eq!(model.get_domain_version().get(""), Some(&13));
        assert_eq!(model.get_domain_version().get("com.example"), Some(&2));
    }

    #[test]
    fn default_model_has_empty_graph() {
        let model = Model::new();
        assert!(model.get_graph().get_nodes().is_empty());
        assert!(model.get_metadata().is_empty());
    }
}
