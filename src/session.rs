//! The explorer session: artifacts, view state and every surface the UI
//! paints.
//!
//! ```text
//!  ExplorerEvent
//!       │
//!       ▼
//!  state::transition(&ViewState, &event, &ArtifactContext)
//!       │ (ViewState, [RenderEffect])
//!       ▼
//!  Explorer::apply ──► canvas / table / detail / doc matches / notices
//! ```
//!
//! One event is handled to completion before the next; nothing here is
//! shared across threads except the read-only artifact set.

use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use url::Url;

use crate::artifacts::ArtifactSet;
use crate::canvas::GraphCanvas;
use crate::catalog::{record_payload, CatalogKind, CatalogTable};
use crate::config::ExplorerConfig;
use crate::detail::{DetailView, DocMatches};
use crate::error::Result;
use crate::loader::ArtifactLoader;
use crate::model::{
    build_lineage_graph, build_module_graph, build_pipeline_graph, Payload, ViewModel,
};
use crate::refs::RefResolver;
use crate::search::{node_matches, search_docs};
use crate::state::{
    transition, ExplorerEvent, RenderEffect, SelectorOption, Tab, ViewContext, ViewState,
};

const DEFAULT_NODE_TYPE: &str = "node";

/// Read-only view of the artifacts for the state machine.
struct ArtifactContext<'a> {
    artifacts: &'a ArtifactSet,
}

impl ViewContext for ArtifactContext<'_> {
    fn pipeline_names(&self) -> Vec<String> {
        self.artifacts.pipelines.names()
    }

    fn node_types(&self, tab: Tab, selector: &str) -> BTreeSet<String> {
        match tab {
            Tab::ModuleGraph => self
                .artifacts
                .module_graph
                .nodes
                .iter()
                .map(|n| n.node_type.clone().unwrap_or_else(|| DEFAULT_NODE_TYPE.to_string()))
                .collect(),
            Tab::DataLineage if !self.artifacts.lineage.datasets.is_empty() => {
                BTreeSet::from(["dataset".to_string()])
            }
            Tab::PipelineDags => {
                let pipelines = &self.artifacts.pipelines.pipelines;
                let selected = pipelines
                    .iter()
                    .find(|p| p.name == selector)
                    .or_else(|| pipelines.first());
                match selected {
                    Some(p) if !p.nodes.is_empty() => BTreeSet::from(["pipeline_node".to_string()]),
                    _ => BTreeSet::new(),
                }
            }
            _ => BTreeSet::new(),
        }
    }
}

pub struct Explorer {
    artifacts: Arc<ArtifactSet>,
    refs: RefResolver,
    site_base: Url,
    state: ViewState,

    // Surfaces
    search_input: String,
    selector_options: Vec<SelectorOption>,
    canvas: GraphCanvas,
    table: Option<CatalogTable>,
    detail_payload: Option<Payload>,
    detail: DetailView,
    doc_matches: DocMatches,
    notices: Vec<String>,
}

impl Explorer {
    /// Session over already-loaded artifacts, opened on the Module Graph tab.
    pub fn new(artifacts: ArtifactSet, site_base: Url) -> Self {
        let refs = RefResolver::from_doc(&artifacts.ref_map);
        let mut explorer = Self {
            artifacts: Arc::new(artifacts),
            refs,
            site_base,
            state: ViewState::default(),
            search_input: String::new(),
            selector_options: Vec::new(),
            canvas: GraphCanvas::new(),
            table: None,
            detail_payload: None,
            detail: DetailView::Placeholder,
            doc_matches: DocMatches::default(),
            notices: Vec::new(),
        };
        explorer.dispatch(ExplorerEvent::ActivateTab(Tab::default()));
        explorer
    }

    /// Load every artifact named by `config` and open the session.
    pub async fn start(config: &ExplorerConfig) -> Result<Self> {
        let site_base = config.site_url()?;
        let artifacts = ArtifactLoader::from_config(config)?.load().await?;
        tracing::info!(site = %site_base, "explorer ready");
        Ok(Self::new(artifacts, site_base))
    }

    pub fn dispatch(&mut self, event: ExplorerEvent) {
        if let ExplorerEvent::ActivateTab(tab) = &event {
            tracing::info!(tab = tab.label(), "switching tab");
        } else {
            tracing::debug!(?event, "dispatch");
        }

        let artifacts = Arc::clone(&self.artifacts);
        let ctx = ArtifactContext {
            artifacts: &artifacts,
        };
        let (next, effects) = transition(&self.state, &event, &ctx);
        self.state = next;
        for effect in effects {
            self.apply(effect);
        }
    }

    /// Build the view model for `(tab, selector)` from the artifacts.
    pub fn build_view(&self, tab: Tab, selector: &str, query: &str) -> ViewModel {
        let artifacts = &self.artifacts;
        match tab {
            Tab::ModuleGraph => ViewModel::Module(build_module_graph(&artifacts.module_graph, &self.refs)),
            Tab::DataLineage => ViewModel::Lineage(build_lineage_graph(&artifacts.lineage, &self.refs)),
            Tab::PipelineDags => {
                ViewModel::Pipeline(build_pipeline_graph(&artifacts.pipelines, &self.refs, selector))
            }
            Tab::Catalogs => {
                let kind = CatalogKind::from_str(selector).unwrap_or_else(|| {
                    tracing::warn!(selector, "unknown catalog kind, showing schemas");
                    CatalogKind::Schemas
                });
                ViewModel::Catalog(CatalogTable::from_catalogs(kind, &artifacts.catalogs, query))
            }
            Tab::TemporalValidity => ViewModel::Catalog(CatalogTable::from_catalogs(
                CatalogKind::Temporal,
                &artifacts.catalogs,
                query,
            )),
        }
    }

    fn apply(&mut self, effect: RenderEffect) {
        match effect {
            RenderEffect::ClearSearchInput => self.search_input.clear(),
            RenderEffect::ClearDetail => self.show_payload(None),
            RenderEffect::ClearDocMatches => self.doc_matches.clear(),
            RenderEffect::SetSelectorOptions(options) => self.selector_options = options,
            RenderEffect::ClearSurfaces => {
                self.canvas.clear();
                self.table = None;
            }
            RenderEffect::Populate {
                tab,
                selector,
                query,
            } => self.populate(tab, &selector, &query),
            RenderEffect::HighlightMatches(query) => self.highlight_matches(&query),
            RenderEffect::FilterTable(query) => {
                if let Some(kind) = self.table.as_ref().map(|t| t.kind) {
                    let table = CatalogTable::from_catalogs(kind, &self.artifacts.catalogs, &query);
                    self.show_payload(Some(table.summary_payload()));
                    self.table = Some(table);
                }
            }
            RenderEffect::SearchDocs(query) => {
                let matches = search_docs(&self.artifacts.docs_index, &query, &self.site_base);
                self.doc_matches.replace(matches);
            }
            RenderEffect::ApplyTypeFilter(active) => self.canvas.apply_type_filter(&active),
            RenderEffect::ShowNode(id) => match self.canvas.tap_node(&id) {
                Some(payload) => self.show_payload(Some(payload)),
                None => tracing::debug!(id, "tap on unknown node"),
            },
            RenderEffect::ShowEdge(id) => match self.canvas.tap_edge(&id) {
                Some(payload) => self.show_payload(Some(payload)),
                None => tracing::debug!(id, "tap on unknown edge"),
            },
            RenderEffect::ShowRow(index) => self.show_row(index),
            RenderEffect::Notice(message) => self.notices.push(message),
        }
    }

    fn populate(&mut self, tab: Tab, selector: &str, query: &str) {
        let view = self.build_view(tab, selector, query);
        let layout = view.layout();
        match view {
            ViewModel::Catalog(table) => {
                self.show_payload(Some(table.summary_payload()));
                self.table = Some(table);
            }
            ViewModel::Pipeline(built) => {
                if let Some(layout) = layout {
                    self.canvas.set_graph(&built.elements, layout);
                }
                if built.fell_back {
                    if let Some(used) = &built.pipeline {
                        self.notices
                            .push(format!("pipeline '{selector}' not found, showing '{used}'"));
                    }
                }
                if let Some(name) = built.pipeline {
                    let mut payload = Payload::new();
                    payload.insert("title".into(), Value::String(format!("Pipeline: {name}")));
                    self.show_payload(Some(payload));
                }
            }
            ViewModel::Module(elements) | ViewModel::Lineage(elements) => {
                if let Some(layout) = layout {
                    self.canvas.set_graph(&elements, layout);
                }
            }
        }
        self.canvas.apply_type_filter(&self.state.active_type_filters);
    }

    fn highlight_matches(&mut self, query: &str) {
        self.canvas.clear_highlights();
        if query.is_empty() {
            return;
        }
        let ids: Vec<String> = self
            .canvas
            .nodes()
            .iter()
            .filter(|n| node_matches(n, query))
            .map(|n| n.id.clone())
            .collect();
        tracing::debug!(query, matches = ids.len(), "highlight");
        if !ids.is_empty() {
            self.canvas.highlight(ids.iter().map(String::as_str));
            self.canvas.fit(ids.iter().map(String::as_str));
        }
    }

    fn show_row(&mut self, index: usize) {
        let Some(table) = &self.table else {
            return;
        };
        let mut payload = None;
        let refs = &self.refs;
        table.activate_row(index, |record| {
            payload = Some(record_payload(table.kind, record, refs));
        });
        if payload.is_some() {
            self.show_payload(payload);
        }
    }

    fn show_payload(&mut self, payload: Option<Payload>) {
        self.detail = DetailView::render(payload.as_ref(), &self.refs, &self.site_base);
        self.detail_payload = payload;
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn refs(&self) -> &RefResolver {
        &self.refs
    }

    /// Current text of the search box.
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Mirror what the user typed; the UI dispatches `Search` alongside.
    pub fn set_search_input(&mut self, text: &str) {
        self.search_input = text.to_string();
    }

    pub fn selector_options(&self) -> &[SelectorOption] {
        &self.selector_options
    }

    pub fn canvas(&self) -> &GraphCanvas {
        &self.canvas
    }

    pub fn table(&self) -> Option<&CatalogTable> {
        self.table.as_ref()
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    pub fn detail_payload(&self) -> Option<&Payload> {
        self.detail_payload.as_ref()
    }

    pub fn doc_matches(&self) -> &DocMatches {
        &self.doc_matches
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifacts() -> ArtifactSet {
        let mut set = ArtifactSet::default();
        set.module_graph = serde_json::from_value(json!({
            "nodes": [{"name": "core", "type": "package"}, {"name": "core.io", "type": "module"}],
            "edges": [{"from": "core", "to": "core.io", "type": "contains"}]
        }))
        .unwrap();
        set.pipelines = serde_json::from_value(json!({
            "pipelines": [{"name": "etl", "nodes": [{"name": "extract"}], "edges": []}]
        }))
        .unwrap();
        set.catalogs.features = serde_json::from_value(json!({
            "features": [{"name": "pr_size", "entity": "pr"}]
        }))
        .unwrap();
        set
    }

    fn explorer() -> Explorer {
        Explorer::new(artifacts(), Url::parse("http://localhost:8000/").unwrap())
    }

    #[test]
    fn test_opens_on_module_graph() {
        let e = explorer();
        assert_eq!(e.state().active_tab, Tab::ModuleGraph);
        assert_eq!(e.canvas().nodes().len(), 2);
        assert!(e.detail().is_placeholder());
        assert_eq!(e.selector_options()[0].value, "module_graph");
    }

    #[test]
    fn test_pipeline_tab_shows_pipeline_title() {
        let mut e = explorer();
        e.dispatch(ExplorerEvent::ActivateTab(Tab::PipelineDags));
        assert_eq!(e.detail().title(), "Pipeline: etl");
        assert_eq!(e.canvas().nodes()[0].id, "pipeline:etl:extract");
        assert_eq!(
            e.state().active_type_filters,
            BTreeSet::from(["pipeline_node".to_string()])
        );
    }

    #[test]
    fn test_catalog_row_activation_and_summary() {
        let mut e = explorer();
        e.dispatch(ExplorerEvent::ActivateTab(Tab::Catalogs));
        e.dispatch(ExplorerEvent::SelectView("features".into()));
        assert_eq!(e.detail().title(), "Catalog: features");
        assert!(e.canvas().is_empty());

        e.dispatch(ExplorerEvent::ActivateRow(0));
        let payload = e.detail_payload().unwrap();
        assert_eq!(payload["title"], json!("pr_size"));
        assert_eq!(payload["ref"], json!("codebase_map_pack/features/#feature-families"));
    }

    #[test]
    fn test_search_clears_on_tab_change() {
        let mut e = explorer();
        e.set_search_input("core");
        e.dispatch(ExplorerEvent::Search("core".into()));
        assert_eq!(e.canvas().highlighted_count(), 2);
        e.dispatch(ExplorerEvent::ActivateTab(Tab::DataLineage));
        assert_eq!(e.search_input(), "");
        assert_eq!(e.state().search_query, "");
        assert!(e.canvas().is_empty());
    }

    #[test]
    fn test_edge_tap() {
        let mut e = explorer();
        let id = e.canvas().edges()[0].id.clone();
        e.dispatch(ExplorerEvent::TapEdge(id));
        assert_eq!(e.detail().title(), "Edge");
    }
}
