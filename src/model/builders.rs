//! One pure builder per graph-shaped artifact.

use serde_json::Value;

use super::{edge_id, GraphEdge, GraphElements, GraphNode};
use crate::artifacts::{LineageDoc, ModuleGraphDoc, PipelineDagsDoc, PipelineDoc};
use crate::refs::{RefResolver, RefRule};

const DEFAULT_NODE_TYPE: &str = "node";
const DEFAULT_EDGE_TYPE: &str = "edge";
const LINEAGE_EDGE_TYPE: &str = "derived_from";
const PIPELINE_NODE_TYPE: &str = "pipeline_node";
const PIPELINE_EDGE_TYPE: &str = "depends_on";

/// Module dependency graph: nodes and edges copied 1:1.
pub fn build_module_graph(doc: &ModuleGraphDoc, refs: &RefResolver) -> GraphElements {
    let nodes = doc
        .nodes
        .iter()
        .map(|n| {
            let mut node = GraphNode::new(
                n.name.as_str(),
                n.name.as_str(),
                n.node_type.as_deref().unwrap_or(DEFAULT_NODE_TYPE),
            );
            node.attributes = n.extra.clone();
            let doc_ref = refs.resolve_with(n.doc_ref.as_deref(), &n.name, RefRule::Module);
            node.with_ref(doc_ref.map(|r| r.to_string()))
        })
        .collect();

    let edges = doc
        .edges
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            let kind = e.edge_type.as_deref().unwrap_or(DEFAULT_EDGE_TYPE);
            GraphEdge {
                id: edge_id('e', idx, &e.from, &e.to),
                source: e.from.clone(),
                target: e.to.clone(),
                label: kind.to_string(),
                edge_type: kind.to_string(),
            }
        })
        .collect();

    GraphElements { nodes, edges }
}

/// Data lineage: one `dataset` node per entry.
pub fn build_lineage_graph(doc: &LineageDoc, refs: &RefResolver) -> GraphElements {
    let nodes = doc
        .datasets
        .iter()
        .map(|d| {
            let doc_ref = refs.resolve_with(d.doc_ref.as_deref(), &d.name, RefRule::Lineage);
            GraphNode::new(d.name.as_str(), d.name.as_str(), "dataset")
                .with_attribute("dataset_type", d.dataset_type.clone())
                .with_attribute("grain", d.grain.clone())
                .with_attribute("source", d.source.clone())
                .with_attribute("known_by_time", d.known_by_time.clone())
                .with_ref(doc_ref.map(|r| r.to_string()))
        })
        .collect();

    let edges = doc
        .edges
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            let kind = e.edge_type.as_deref().unwrap_or(LINEAGE_EDGE_TYPE);
            GraphEdge {
                id: edge_id('l', idx, &e.from, &e.to),
                source: e.from.clone(),
                target: e.to.clone(),
                label: kind.to_string(),
                edge_type: kind.to_string(),
            }
        })
        .collect();

    GraphElements { nodes, edges }
}

/// The graph of one pipeline plus which pipeline was actually rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineGraph {
    pub elements: GraphElements,
    /// `None` only when the artifact has no pipelines at all.
    pub pipeline: Option<String>,
    /// The requested pipeline was absent and the first one was used.
    pub fell_back: bool,
}

/// Select `requested` (or the first pipeline) and build its scoped graph.
pub fn build_pipeline_graph(
    doc: &PipelineDagsDoc,
    refs: &RefResolver,
    requested: &str,
) -> PipelineGraph {
    let found = doc.pipelines.iter().find(|p| p.name == requested);
    let Some(pipeline) = found.or_else(|| doc.pipelines.first()) else {
        return PipelineGraph::default();
    };
    let fell_back = found.is_none() && !requested.is_empty();
    if fell_back {
        tracing::warn!(
            requested,
            used = %pipeline.name,
            "pipeline not found, falling back to first"
        );
    }

    PipelineGraph {
        elements: pipeline_elements(pipeline, refs),
        pipeline: Some(pipeline.name.clone()),
        fell_back,
    }
}

fn scoped_id(pipeline: &str, node: &str) -> String {
    format!("pipeline:{pipeline}:{node}")
}

fn or_default(value: &Value, default: Value) -> Value {
    if value.is_null() {
        default
    } else {
        value.clone()
    }
}

fn pipeline_elements(pipeline: &PipelineDoc, refs: &RefResolver) -> GraphElements {
    // Pipeline nodes link to their pipeline's page, not a per-node page.
    let pipeline_ref = refs
        .resolve_with(pipeline.doc_ref.as_deref(), &pipeline.name, RefRule::Pipeline)
        .map(|r| r.to_string());

    let nodes = pipeline
        .nodes
        .iter()
        .map(|n| {
            let doc_ref = n.doc_ref.clone().or_else(|| pipeline_ref.clone());
            GraphNode::new(scoped_id(&pipeline.name, &n.name), n.name.as_str(), PIPELINE_NODE_TYPE)
                .with_attribute("entrypoint", n.entrypoint.clone())
                .with_attribute("inputs", or_default(&n.inputs, Value::Array(Vec::new())))
                .with_attribute("outputs", or_default(&n.outputs, Value::Array(Vec::new())))
                .with_attribute("schedule", or_default(&n.schedule, Value::String(String::new())))
                .with_ref(doc_ref)
        })
        .collect();

    let edges = pipeline
        .edges
        .iter()
        .enumerate()
        .map(|(idx, e)| GraphEdge {
            id: edge_id('p', idx, &e.from, &e.to),
            source: scoped_id(&pipeline.name, &e.from),
            target: scoped_id(&pipeline.name, &e.to),
            label: String::new(),
            edge_type: PIPELINE_EDGE_TYPE.to_string(),
        })
        .collect();

    GraphElements { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;

    fn refs() -> RefResolver {
        RefResolver::new(HashMap::from([(
            "etl".to_string(),
            "codebase_map_pack/pipelines/#pipeline-etl".to_string(),
        )]))
    }

    fn pipelines() -> PipelineDagsDoc {
        serde_json::from_value(json!({
            "pipelines": [
                {
                    "name": "etl",
                    "nodes": [
                        {"name": "extract", "entrypoint": "etl.extract:main", "schedule": "daily"},
                        {"name": "load", "entrypoint": "etl.load:main", "inputs": ["raw"]}
                    ],
                    "edges": [{"from": "extract", "to": "load"}]
                },
                {
                    "name": "export",
                    "nodes": [{"name": "extract"}],
                    "edges": []
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_module_graph_defaults() {
        let doc: ModuleGraphDoc = serde_json::from_value(json!({
            "nodes": [{"name": "a", "type": "package"}, {"name": "b"}],
            "edges": [{"from": "a", "to": "b"}, {"from": "b", "to": "a", "type": "imports"}]
        }))
        .unwrap();
        let g = build_module_graph(&doc, &RefResolver::default());

        assert_eq!(g.nodes[0].node_type, "package");
        assert_eq!(g.nodes[1].node_type, "node");
        assert_eq!(g.nodes[1].label, "b");
        assert_eq!(g.edges[0].id, "e0:a->b");
        assert_eq!(g.edges[0].label, "edge");
        assert_eq!(g.edges[1].edge_type, "imports");
        assert_eq!(
            g.nodes[0].doc_ref.as_deref(),
            Some("codebase_map_pack/architecture/")
        );
    }

    #[test]
    fn test_lineage_nodes_are_datasets() {
        let doc: LineageDoc = serde_json::from_value(json!({
            "datasets": [
                {"name": "raw_events", "type": "table", "grain": "event", "source": "github", "known_by_time": "ingested_at"},
                {"name": "pr_features", "type": "view"}
            ],
            "edges": [{"from": "raw_events", "to": "pr_features"}]
        }))
        .unwrap();
        let g = build_lineage_graph(&doc, &RefResolver::default());

        assert!(g.nodes.iter().all(|n| n.node_type == "dataset"));
        assert_eq!(g.nodes[0].attributes["dataset_type"], json!("table"));
        assert_eq!(g.nodes[0].attributes["known_by_time"], json!("ingested_at"));
        assert_eq!(g.nodes[1].attributes["grain"], Value::Null);
        assert_eq!(g.edges[0].label, "derived_from");
        assert_eq!(g.edges[0].id, "l0:raw_events->pr_features");
    }

    #[test]
    fn test_pipeline_scoped_ids() {
        let built = build_pipeline_graph(&pipelines(), &refs(), "etl");
        assert_eq!(built.pipeline.as_deref(), Some("etl"));
        assert!(!built.fell_back);

        let ids: Vec<_> = built.elements.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["pipeline:etl:extract", "pipeline:etl:load"]);

        let edge = &built.elements.edges[0];
        assert_eq!(edge.source, "pipeline:etl:extract");
        assert_eq!(edge.target, "pipeline:etl:load");
        assert_eq!(edge.edge_type, "depends_on");
        assert_eq!(edge.label, "");
    }

    #[test]
    fn test_pipeline_node_defaults_and_ref() {
        let built = build_pipeline_graph(&pipelines(), &refs(), "etl");
        let extract = &built.elements.nodes[0];
        assert_eq!(extract.attributes["inputs"], json!([]));
        assert_eq!(extract.attributes["outputs"], json!([]));
        assert_eq!(extract.attributes["schedule"], json!("daily"));
        assert_eq!(
            extract.doc_ref.as_deref(),
            Some("codebase_map_pack/pipelines/#pipeline-etl")
        );
        let load = &built.elements.nodes[1];
        assert_eq!(load.attributes["schedule"], json!(""));
        assert_eq!(load.attributes["inputs"], json!(["raw"]));
    }

    #[test]
    fn test_two_pipelines_never_collide() {
        let doc = pipelines();
        let etl = build_pipeline_graph(&doc, &refs(), "etl");
        let export = build_pipeline_graph(&doc, &refs(), "export");
        let etl_ids: Vec<_> = etl.elements.nodes.iter().map(|n| &n.id).collect();
        assert!(export
            .elements
            .nodes
            .iter()
            .all(|n| !etl_ids.contains(&&n.id)));
    }

    #[test]
    fn test_missing_pipeline_falls_back_to_first() {
        let built = build_pipeline_graph(&pipelines(), &refs(), "ingest");
        assert_eq!(built.pipeline.as_deref(), Some("etl"));
        assert!(built.fell_back);

        let built = build_pipeline_graph(&pipelines(), &refs(), "");
        assert_eq!(built.pipeline.as_deref(), Some("etl"));
        assert!(!built.fell_back);
    }

    #[test]
    fn test_no_pipelines_is_empty() {
        let built = build_pipeline_graph(&PipelineDagsDoc::default(), &refs(), "etl");
        assert_eq!(built, PipelineGraph::default());
    }
}
