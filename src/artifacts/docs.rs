//! Wire shapes of the JSON artifacts.
//!
//! Every list field tolerates being absent or `null`, and every scalar we
//! read by name tolerates being a number, bool or `null`. Artifacts are
//! produced by an external pipeline, so a single odd field must never make
//! the whole document unreadable.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// One flat row of a tabular artifact.
pub type CatalogRecord = Map<String, Value>;

// =============================================================================
// LENIENT FIELD HELPERS
// =============================================================================

/// Render any JSON value as display text: strings verbatim, `null` as empty,
/// everything else as compact JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text of `record[key]`, empty when absent.
pub fn field_text(record: &CatalogRecord, key: &str) -> String {
    record.get(key).map(value_to_text).unwrap_or_default()
}

pub(crate) fn lenient_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().map(value_to_text).unwrap_or_default())
}

/// Like [`lenient_string`] but empty text collapses to `None`.
pub(crate) fn lenient_opt_string<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_string(de)?;
    Ok((!text.is_empty()).then_some(text))
}

pub(crate) fn null_as_empty<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(de)?.unwrap_or_default())
}

fn object_records<'de, D>(de: D) -> Result<Vec<CatalogRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<Value> = null_as_empty(de)?;
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            other => {
                tracing::debug!(value = %other, "skipping non-object catalog entry");
                None
            }
        })
        .collect())
}

// =============================================================================
// GRAPH ARTIFACTS
// =============================================================================

/// An edge as written by the generators: `{from, to, type}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub to: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_opt_string")]
    pub edge_type: Option<String>,
}

/// `module_graph.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleGraphDoc {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nodes: Vec<ModuleNodeDoc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub edges: Vec<EdgeDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleNodeDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_opt_string")]
    pub node_type: Option<String>,
    #[serde(default, rename = "ref", deserialize_with = "lenient_opt_string")]
    pub doc_ref: Option<String>,
    /// Generator-specific fields (path, package, ...) carried to the inspector.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// `data_lineage_graph.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineageDoc {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub datasets: Vec<DatasetDoc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub edges: Vec<EdgeDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, rename = "type")]
    pub dataset_type: Value,
    #[serde(default)]
    pub grain: Value,
    #[serde(default)]
    pub source: Value,
    #[serde(default)]
    pub known_by_time: Value,
    #[serde(default, rename = "ref", deserialize_with = "lenient_opt_string")]
    pub doc_ref: Option<String>,
}

/// `pipeline_dags.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineDagsDoc {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pipelines: Vec<PipelineDoc>,
}

impl PipelineDagsDoc {
    /// Pipeline names in artifact order.
    pub fn names(&self) -> Vec<String> {
        self.pipelines.iter().map(|p| p.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nodes: Vec<PipelineNodeDoc>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub edges: Vec<EdgeDoc>,
    #[serde(default, rename = "ref", deserialize_with = "lenient_opt_string")]
    pub doc_ref: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineNodeDoc {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default)]
    pub entrypoint: Value,
    #[serde(default)]
    pub inputs: Value,
    #[serde(default)]
    pub outputs: Value,
    #[serde(default)]
    pub schedule: Value,
    #[serde(default, rename = "ref", deserialize_with = "lenient_opt_string")]
    pub doc_ref: Option<String>,
}

// =============================================================================
// CATALOG ARTIFACTS
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaCatalogDoc {
    #[serde(default, deserialize_with = "object_records")]
    pub tables: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCatalogDoc {
    #[serde(default, deserialize_with = "object_records")]
    pub features: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelRegistryDoc {
    #[serde(default, deserialize_with = "object_records")]
    pub labels: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricRegistryDoc {
    #[serde(default, deserialize_with = "object_records")]
    pub metrics: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContractsDoc {
    #[serde(default, deserialize_with = "object_records")]
    pub boundaries: Vec<CatalogRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemporalValidityDoc {
    #[serde(default, deserialize_with = "object_records")]
    pub entities: Vec<CatalogRecord>,
}

// =============================================================================
// OPTIONAL ARTIFACTS
// =============================================================================

/// `ref_map.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefMapDoc {
    #[serde(default, deserialize_with = "string_map")]
    pub refs: HashMap<String, String>,
}

fn string_map<'de, D>(de: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Value>>::deserialize(de)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) if !s.is_empty() => Some((k, s)),
            _ => None,
        })
        .collect())
}

/// The documentation site's search index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocsIndexDoc {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub docs: Vec<DocEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_lists_are_empty() {
        let doc: ModuleGraphDoc = serde_json::from_value(json!({})).unwrap();
        assert!(doc.nodes.is_empty() && doc.edges.is_empty());

        let doc: LineageDoc = serde_json::from_value(json!({"datasets": null})).unwrap();
        assert!(doc.datasets.is_empty());
    }

    #[test]
    fn test_scalar_names_are_coerced() {
        let doc: ModuleGraphDoc = serde_json::from_value(json!({
            "nodes": [{"name": 42, "type": null}, {"name": null}],
            "edges": [{"from": "a", "to": true}]
        }))
        .unwrap();
        assert_eq!(doc.nodes[0].name, "42");
        assert_eq!(doc.nodes[0].node_type, None);
        assert_eq!(doc.nodes[1].name, "");
        assert_eq!(doc.edges[0].to, "true");
    }

    #[test]
    fn test_module_node_keeps_extra_fields() {
        let doc: ModuleGraphDoc = serde_json::from_value(json!({
            "nodes": [{"name": "pkg.a", "type": "module", "path": "src/a.py"}]
        }))
        .unwrap();
        assert_eq!(doc.nodes[0].extra.get("path"), Some(&json!("src/a.py")));
        assert!(!doc.nodes[0].extra.contains_key("name"));
    }

    #[test]
    fn test_catalog_skips_non_objects() {
        let doc: SchemaCatalogDoc =
            serde_json::from_value(json!({"tables": [{"name": "t"}, "oops", 3]})).unwrap();
        assert_eq!(doc.tables.len(), 1);
    }

    #[test]
    fn test_ref_map_drops_non_string_targets() {
        let doc: RefMapDoc = serde_json::from_value(json!({
            "refs": {"a": "docs/a/", "b": 7, "c": ""}
        }))
        .unwrap();
        assert_eq!(doc.refs.len(), 1);
        assert_eq!(doc.refs["a"], "docs/a/");
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(&json!(null)), "");
        assert_eq!(value_to_text(&json!("x")), "x");
        assert_eq!(value_to_text(&json!(["a", "b"])), r#"["a","b"]"#);
        assert_eq!(value_to_text(&json!({"k": 1})), r#"{"k":1}"#);
    }
}
