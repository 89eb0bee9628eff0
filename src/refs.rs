//! Reference resolution - entity name to documentation fragment.
//!
//! Resolution order:
//! 1. an explicit `ref` already carried by the payload
//! 2. an exact-name hit in the RefMap
//! 3. a fixed fallback per artifact kind
//!
//! Nothing here fails: a missing mapping is `None` and callers render without
//! a link.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::artifacts::RefMapDoc;
use crate::catalog::CatalogKind;

const ARCHITECTURE_PAGE: &str = "codebase_map_pack/architecture/";
const LINEAGE_PAGE: &str = "codebase_map_pack/data_lineage/#dataset-catalog";
const PIPELINES_PAGE: &str = "codebase_map_pack/pipelines/#pipelines";
const SCHEMAS_PAGE: &str = "codebase_map_pack/schemas/";
const FEATURES_PAGE: &str = "codebase_map_pack/features/#feature-families";
const LABELS_METRICS_PAGE: &str = "codebase_map_pack/labels_metrics/";
const CONTRACTS_PAGE: &str = "codebase_map_pack/contracts/";
const TEMPORAL_PAGE: &str = "codebase_map_pack/temporal_validity/";

/// Namespace whose tables get their own anchor family on the schema page.
const NAMESPACED_SCHEMA_PREFIX: &str = "examples_index.";

/// A documentation location relative to the site root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocRef(String);

impl DocRef {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self(fragment.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Absolute link under `site_base`, or `None` if the fragment cannot be
    /// joined (which only happens for malformed input).
    pub fn href(&self, site_base: &Url) -> Option<String> {
        site_base.join(&self.0).ok().map(String::from)
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which fallback rule applies when the RefMap has no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefRule {
    Module,
    Lineage,
    Pipeline,
    Catalog(CatalogKind),
}

impl RefRule {
    /// Fixed fallback fragment for `name` under this rule.
    pub fn fallback(&self, name: &str) -> Option<DocRef> {
        let page = match self {
            Self::Module => ARCHITECTURE_PAGE,
            Self::Lineage => LINEAGE_PAGE,
            Self::Pipeline => PIPELINES_PAGE,
            Self::Catalog(CatalogKind::Schemas) => return schema_table_ref(name),
            Self::Catalog(CatalogKind::Features) => FEATURES_PAGE,
            Self::Catalog(CatalogKind::Labels | CatalogKind::Metrics) => LABELS_METRICS_PAGE,
            Self::Catalog(CatalogKind::Contracts) => CONTRACTS_PAGE,
            Self::Catalog(CatalogKind::Temporal) => TEMPORAL_PAGE,
        };
        Some(DocRef::new(page))
    }
}

/// Anchor of a table on the shared schema page.
///
/// `examples_index.pr_examples` → `…/schemas/#table-examples_index-pr_examples`
pub fn schema_table_ref(table_name: &str) -> Option<DocRef> {
    let name = table_name.trim();
    if name.is_empty() {
        return None;
    }
    let anchor = match name.strip_prefix(NAMESPACED_SCHEMA_PREFIX) {
        Some(suffix) => format!("table-examples_index-{suffix}"),
        None => format!("table-{name}"),
    };
    Some(DocRef::new(format!("{SCHEMAS_PAGE}#{anchor}")))
}

/// Read-only name → fragment lookup shared by every component.
#[derive(Debug, Clone, Default)]
pub struct RefResolver {
    refs: Arc<HashMap<String, String>>,
}

impl RefResolver {
    pub fn new(refs: HashMap<String, String>) -> Self {
        Self {
            refs: Arc::new(refs),
        }
    }

    pub fn from_doc(doc: &RefMapDoc) -> Self {
        Self::new(doc.refs.clone())
    }

    /// Exact-name lookup only.
    pub fn resolve(&self, name: &str) -> Option<DocRef> {
        self.refs.get(name).map(|s| DocRef::new(s.as_str()))
    }

    /// Full resolution: explicit ref, then RefMap, then the rule's fallback.
    pub fn resolve_with(&self, explicit: Option<&str>, name: &str, rule: RefRule) -> Option<DocRef> {
        if let Some(explicit) = explicit.filter(|s| !s.is_empty()) {
            return Some(DocRef::new(explicit));
        }
        self.resolve(name).or_else(|| rule.fallback(name))
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

/// Link for a documentation-index location (`foo/index.html` → `foo/`).
pub fn docs_location_href(site_base: &Url, location: &str) -> Option<String> {
    let href = site_base.join(location).ok()?;
    let href = String::from(href);
    Some(match href.strip_suffix("index.html") {
        Some(stripped) => stripped.to_string(),
        None => href,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> RefResolver {
        RefResolver::new(HashMap::from([(
            "gh_history_ingestion".to_string(),
            "codebase_map_pack/packages/#ingestion".to_string(),
        )]))
    }

    #[test]
    fn test_explicit_ref_wins() {
        let r = resolver();
        let got = r.resolve_with(Some("custom/page/"), "gh_history_ingestion", RefRule::Module);
        assert_eq!(got, Some(DocRef::new("custom/page/")));
    }

    #[test]
    fn test_ref_map_before_fallback() {
        let r = resolver();
        let got = r.resolve_with(None, "gh_history_ingestion", RefRule::Module);
        assert_eq!(got.unwrap().as_str(), "codebase_map_pack/packages/#ingestion");
        let got = r.resolve_with(Some(""), "other", RefRule::Module);
        assert_eq!(got.unwrap().as_str(), ARCHITECTURE_PAGE);
    }

    #[test]
    fn test_schema_table_anchor() {
        assert_eq!(
            schema_table_ref("pull_requests").unwrap().as_str(),
            "codebase_map_pack/schemas/#table-pull_requests"
        );
        assert_eq!(
            schema_table_ref(" examples_index.pr_examples ").unwrap().as_str(),
            "codebase_map_pack/schemas/#table-examples_index-pr_examples"
        );
        assert_eq!(schema_table_ref("  "), None);
    }

    #[test]
    fn test_catalog_fallbacks() {
        let r = RefResolver::default();
        let cases = [
            (CatalogKind::Features, FEATURES_PAGE),
            (CatalogKind::Labels, LABELS_METRICS_PAGE),
            (CatalogKind::Metrics, LABELS_METRICS_PAGE),
            (CatalogKind::Contracts, CONTRACTS_PAGE),
            (CatalogKind::Temporal, TEMPORAL_PAGE),
        ];
        for (kind, page) in cases {
            let got = r.resolve_with(None, "x", RefRule::Catalog(kind)).unwrap();
            assert_eq!(got.as_str(), page, "{kind:?}");
        }
        assert_eq!(r.resolve_with(None, "", RefRule::Catalog(CatalogKind::Schemas)), None);
    }

    #[test]
    fn test_href_joins_site_root() {
        let base = Url::parse("http://localhost:8000/").unwrap();
        let href = DocRef::new("codebase_map_pack/contracts/").href(&base).unwrap();
        assert_eq!(href, "http://localhost:8000/codebase_map_pack/contracts/");
    }

    #[test]
    fn test_docs_location_strips_index_html() {
        let base = Url::parse("http://localhost:8000/").unwrap();
        assert_eq!(
            docs_location_href(&base, "guide/index.html").unwrap(),
            "http://localhost:8000/guide/"
        );
        assert_eq!(
            docs_location_href(&base, "guide/#setup").unwrap(),
            "http://localhost:8000/guide/#setup"
        );
    }
}
