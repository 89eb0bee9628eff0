//! Substring search across graph nodes, catalog records and the
//! documentation index. No ranking: order is source order.

use url::Url;

use crate::artifacts::{CatalogRecord, DocsIndexDoc};
use crate::model::GraphNode;
use crate::refs::docs_location_href;

/// Documentation hits listed per keystroke.
pub const MAX_DOC_MATCHES: usize = 8;

/// Trim and case-fold.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether the node's `name` contains `query` (already normalised).
pub fn node_matches(node: &GraphNode, query: &str) -> bool {
    !query.is_empty() && node.name.to_lowercase().contains(query)
}

/// Whether the record's full compact serialization contains `query`.
pub fn record_matches(record: &CatalogRecord, query: &str) -> bool {
    match serde_json::to_string(record) {
        Ok(text) => text.to_lowercase().contains(query),
        Err(_) => false,
    }
}

/// One documentation page that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocMatch {
    pub title: String,
    pub href: Option<String>,
}

/// Scan titles and bodies of the documentation index.
pub fn search_docs(index: &DocsIndexDoc, query: &str, site_base: &Url) -> Vec<DocMatch> {
    if query.is_empty() {
        return Vec::new();
    }
    index
        .docs
        .iter()
        .filter(|d| format!("{}\n{}", d.title, d.text).to_lowercase().contains(query))
        .take(MAX_DOC_MATCHES)
        .map(|d| {
            let title = [d.title.as_str(), d.location.as_str()]
                .into_iter()
                .find(|s| !s.is_empty())
                .unwrap_or("doc")
                .to_string();
            DocMatch {
                title,
                href: docs_location_href(site_base, &d.location),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::DocEntry;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("http://localhost:8000/").unwrap()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_query("  Auth-Service \n"), "auth-service");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_node_match_is_case_insensitive_on_name() {
        let node = GraphNode::new("id-1", "Auth-Service", "module");
        assert!(node_matches(&node, "auth"));
        assert!(!node_matches(&node, "id-1"));
        assert!(!node_matches(&node, ""));
    }

    #[test]
    fn test_record_match_uses_every_field() {
        let record = match json!({"name": "t", "notes": {"deep": "Leakage Risk"}}) {
            serde_json::Value::Object(m) => m,
            _ => unreachable!(),
        };
        assert!(record_matches(&record, "leakage"));
        assert!(record_matches(&record, "\"name\""));
        assert!(!record_matches(&record, "absent"));
    }

    #[test]
    fn test_docs_search_caps_and_links() {
        let docs = (0..12)
            .map(|i| DocEntry {
                title: format!("Routing {i}"),
                text: "body".into(),
                location: format!("routing/{i}/index.html"),
            })
            .collect();
        let index = DocsIndexDoc { docs };
        let hits = search_docs(&index, "routing", &base());
        assert_eq!(hits.len(), MAX_DOC_MATCHES);
        assert_eq!(hits[0].href.as_deref(), Some("http://localhost:8000/routing/0/"));
    }

    #[test]
    fn test_docs_search_matches_body_and_falls_back_title() {
        let index = DocsIndexDoc {
            docs: vec![DocEntry {
                title: String::new(),
                text: "Known-by time semantics".into(),
                location: "temporal/".into(),
            }],
        };
        let hits = search_docs(&index, "known-by", &base());
        assert_eq!(hits[0].title, "temporal/");
        assert!(search_docs(&index, "", &base()).is_empty());
    }
}
