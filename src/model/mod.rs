//! Uniform graph model shared by every graph-shaped artifact.
//!
//! Each artifact kind has its own native schema; the builders in
//! [`builders`] funnel them into [`GraphElements`], and [`ViewModel`] tags the
//! result so the session can route it to the canvas or the table surface.

pub mod builders;

pub use builders::{build_lineage_graph, build_module_graph, build_pipeline_graph, PipelineGraph};

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::catalog::CatalogTable;
use crate::layout::LayoutKind;

/// Attribute payload handed to the detail panel.
pub type Payload = Map<String, Value>;

/// Style family of a node. Fixed, not user-configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Package,
    Module,
    Dataset,
    Generic,
}

impl NodeCategory {
    pub fn from_type(node_type: &str) -> Self {
        match node_type {
            "package" => Self::Package,
            "module" => Self::Module,
            "dataset" => Self::Dataset,
            _ => Self::Generic,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub label: String,
    pub node_type: String,
    /// Kind-specific attributes (dataset grain, pipeline inputs, ...).
    pub attributes: BTreeMap<String, Value>,
    pub doc_ref: Option<String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            label: name.clone(),
            name,
            node_type: node_type.into(),
            attributes: BTreeMap::new(),
            doc_ref: None,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    pub fn with_ref(mut self, doc_ref: Option<String>) -> Self {
        self.doc_ref = doc_ref;
        self
    }

    pub fn category(&self) -> NodeCategory {
        NodeCategory::from_type(&self.node_type)
    }

    /// Full attribute set: identity fields, kind attributes, and `ref`
    /// (`null` when nothing resolved).
    pub fn payload(&self) -> Payload {
        let mut payload = Payload::new();
        for (key, value) in &self.attributes {
            payload.insert(key.clone(), value.clone());
        }
        payload.insert("id".into(), Value::String(self.id.clone()));
        payload.insert("name".into(), Value::String(self.name.clone()));
        payload.insert("label".into(), Value::String(self.label.clone()));
        payload.insert("type".into(), Value::String(self.node_type.clone()));
        payload.insert(
            "ref".into(),
            self.doc_ref.clone().map(Value::String).unwrap_or(Value::Null),
        );
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub edge_type: String,
}

impl GraphEdge {
    pub fn payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert("id".into(), Value::String(self.id.clone()));
        payload.insert("source".into(), Value::String(self.source.clone()));
        payload.insert("target".into(), Value::String(self.target.clone()));
        payload.insert("label".into(), Value::String(self.label.clone()));
        payload.insert("type".into(), Value::String(self.edge_type.clone()));
        payload
    }
}

/// `{nodes, edges}` - the one shape every graph builder produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphElements {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Deterministic edge id: `{prefix}{index}:{from}->{to}`.
pub(crate) fn edge_id(prefix: char, index: usize, from: &str, to: &str) -> String {
    format!("{prefix}{index}:{from}->{to}")
}

/// One built view, tagged by the artifact family it came from.
#[derive(Debug, Clone)]
pub enum ViewModel {
    Module(GraphElements),
    Lineage(GraphElements),
    Pipeline(PipelineGraph),
    Catalog(CatalogTable),
}

impl ViewModel {
    /// Layout to run for graph-shaped views; `None` for tables.
    pub fn layout(&self) -> Option<LayoutKind> {
        match self {
            Self::Module(_) => Some(LayoutKind::Cose),
            Self::Lineage(_) | Self::Pipeline(_) => Some(LayoutKind::Breadthfirst),
            Self::Catalog(_) => None,
        }
    }

    pub fn graph(&self) -> Option<&GraphElements> {
        match self {
            Self::Module(g) | Self::Lineage(g) => Some(g),
            Self::Pipeline(p) => Some(&p.elements),
            Self::Catalog(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_payload_includes_null_ref() {
        let node = GraphNode::new("a", "a", "module");
        let payload = node.payload();
        assert_eq!(payload["type"], json!("module"));
        assert_eq!(payload["ref"], Value::Null);
        assert_eq!(payload.len(), 5);
    }

    #[test]
    fn test_identity_fields_override_attributes() {
        let node = GraphNode::new("a", "a", "dataset").with_attribute("type", json!("bogus"));
        assert_eq!(node.payload()["type"], json!("dataset"));
    }

    #[test]
    fn test_category() {
        assert_eq!(NodeCategory::from_type("package"), NodeCategory::Package);
        assert_eq!(NodeCategory::from_type("pipeline_node"), NodeCategory::Generic);
    }
}
