//! View/tab state machine.
//!
//! `ViewState` is a plain value. [`transition`] maps `(state, event)` to the
//! next state plus an ordered list of [`RenderEffect`]s; it never touches a
//! surface. The session applies the effects in order.
//!
//! ```text
//!   UI event ──► ExplorerEvent ──► transition() ──► (ViewState, [RenderEffect])
//!                                                          │
//!                                    Explorer::apply ◄─────┘
//! ```

use std::collections::BTreeSet;

use crate::catalog::CatalogKind;
use crate::search::normalize_query;

/// Selector value of the module graph tab.
pub const MODULE_GRAPH_VIEW: &str = "module_graph";
/// Selector value of the data lineage tab.
pub const DATA_LINEAGE_VIEW: &str = "data_lineage";

// =============================================================================
// TABS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    ModuleGraph,
    DataLineage,
    PipelineDags,
    Catalogs,
    TemporalValidity,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::ModuleGraph,
        Tab::DataLineage,
        Tab::PipelineDags,
        Tab::Catalogs,
        Tab::TemporalValidity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::ModuleGraph => "Module Graph",
            Self::DataLineage => "Data Lineage",
            Self::PipelineDags => "Pipeline DAGs",
            Self::Catalogs => "Catalogs",
            Self::TemporalValidity => "Temporal Validity",
        }
    }

    /// Graph tabs render on the canvas; the others render a table.
    pub fn is_graph(&self) -> bool {
        matches!(
            self,
            Self::ModuleGraph | Self::DataLineage | Self::PipelineDags
        )
    }
}

/// One entry of the view selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
}

impl SelectorOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// What the state machine needs to know about the loaded artifacts.
pub trait ViewContext {
    /// Pipeline names in artifact order.
    fn pipeline_names(&self) -> Vec<String>;

    /// Node types the given view would put on the canvas. Empty for tables.
    fn node_types(&self, tab: Tab, selector: &str) -> BTreeSet<String>;
}

/// Options valid for `tab`, in display order.
pub fn selector_options(tab: Tab, ctx: &dyn ViewContext) -> Vec<SelectorOption> {
    match tab {
        Tab::ModuleGraph => vec![SelectorOption::new(MODULE_GRAPH_VIEW, "module_graph.json")],
        Tab::DataLineage => vec![SelectorOption::new(DATA_LINEAGE_VIEW, "data_lineage_graph.json")],
        Tab::PipelineDags => ctx
            .pipeline_names()
            .into_iter()
            .map(|name| SelectorOption::new(name.clone(), name))
            .collect(),
        Tab::Catalogs => CatalogKind::catalog_tab()
            .iter()
            .map(|k| SelectorOption::new(k.as_str(), k.display_name()))
            .collect(),
        Tab::TemporalValidity => vec![SelectorOption::new(
            CatalogKind::Temporal.as_str(),
            CatalogKind::Temporal.display_name(),
        )],
    }
}

// =============================================================================
// STATE, EVENTS, EFFECTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub active_tab: Tab,
    pub active_selector: String,
    /// Raw text as typed.
    pub search_query: String,
    pub active_type_filters: BTreeSet<String>,
}

impl ViewState {
    pub fn normalized_query(&self) -> String {
        normalize_query(&self.search_query)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerEvent {
    ActivateTab(Tab),
    SelectView(String),
    Search(String),
    SetTypeVisible { node_type: String, visible: bool },
    TapNode(String),
    TapEdge(String),
    ActivateRow(usize),
}

/// A single instruction for the session. Applied strictly in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEffect {
    ClearSearchInput,
    ClearDetail,
    ClearDocMatches,
    SetSelectorOptions(Vec<SelectorOption>),
    /// Empty the canvas and the table.
    ClearSurfaces,
    /// Build the view for `(tab, selector)` and populate canvas or table.
    /// Tables are filtered by `query` (normalised).
    Populate {
        tab: Tab,
        selector: String,
        query: String,
    },
    /// Clear highlights; highlight and fit node-name matches of `query`.
    HighlightMatches(String),
    /// Rebuild the active table filtered by `query`.
    FilterTable(String),
    /// Replace documentation matches for `query`; empty clears them.
    SearchDocs(String),
    ApplyTypeFilter(BTreeSet<String>),
    ShowNode(String),
    ShowEdge(String),
    ShowRow(usize),
    /// Non-fatal message for the user.
    Notice(String),
}

// =============================================================================
// TRANSITION
// =============================================================================

/// Pure transition. Same inputs, same outputs.
pub fn transition(
    state: &ViewState,
    event: &ExplorerEvent,
    ctx: &dyn ViewContext,
) -> (ViewState, Vec<RenderEffect>) {
    match event {
        ExplorerEvent::ActivateTab(tab) => activate_tab(*tab, ctx),
        ExplorerEvent::SelectView(value) => select_view(state, value, ctx),
        ExplorerEvent::Search(raw) => search(state, raw),
        ExplorerEvent::SetTypeVisible { node_type, visible } => {
            set_type_visible(state, node_type, *visible)
        }
        ExplorerEvent::TapNode(id) => (state.clone(), vec![RenderEffect::ShowNode(id.clone())]),
        ExplorerEvent::TapEdge(id) => (state.clone(), vec![RenderEffect::ShowEdge(id.clone())]),
        ExplorerEvent::ActivateRow(index) => {
            if state.active_tab.is_graph() {
                (state.clone(), Vec::new())
            } else {
                (state.clone(), vec![RenderEffect::ShowRow(*index)])
            }
        }
    }
}

fn activate_tab(tab: Tab, ctx: &dyn ViewContext) -> (ViewState, Vec<RenderEffect>) {
    let options = selector_options(tab, ctx);
    let selector = options.first().map(|o| o.value.clone()).unwrap_or_default();
    let next = ViewState {
        active_tab: tab,
        active_type_filters: ctx.node_types(tab, &selector),
        active_selector: selector.clone(),
        search_query: String::new(),
    };
    let effects = vec![
        RenderEffect::ClearSearchInput,
        RenderEffect::ClearDetail,
        RenderEffect::ClearDocMatches,
        RenderEffect::SetSelectorOptions(options),
        RenderEffect::ClearSurfaces,
        RenderEffect::Populate {
            tab,
            selector,
            query: String::new(),
        },
    ];
    (next, effects)
}

fn select_view(
    state: &ViewState,
    value: &str,
    ctx: &dyn ViewContext,
) -> (ViewState, Vec<RenderEffect>) {
    let tab = state.active_tab;
    let options = selector_options(tab, ctx);
    let mut effects = Vec::new();

    let selector = if options.iter().any(|o| o.value == value) {
        value.to_string()
    } else {
        let Some(first) = options.first() else {
            tracing::warn!(tab = tab.label(), value, "no views available");
            return (state.clone(), effects);
        };
        tracing::warn!(
            tab = tab.label(),
            requested = value,
            used = %first.value,
            "view not found, falling back to first"
        );
        effects.push(RenderEffect::Notice(format!(
            "'{value}' not found, showing '{}'",
            first.value
        )));
        first.value.clone()
    };

    let next = ViewState {
        active_tab: tab,
        active_type_filters: ctx.node_types(tab, &selector),
        active_selector: selector.clone(),
        search_query: state.search_query.clone(),
    };
    effects.extend([
        RenderEffect::ClearDetail,
        RenderEffect::ClearSurfaces,
        RenderEffect::Populate {
            tab,
            selector,
            query: state.normalized_query(),
        },
    ]);
    (next, effects)
}

fn search(state: &ViewState, raw: &str) -> (ViewState, Vec<RenderEffect>) {
    let next = ViewState {
        search_query: raw.to_string(),
        ..state.clone()
    };
    let query = next.normalized_query();
    let view_effect = if state.active_tab.is_graph() {
        RenderEffect::HighlightMatches(query.clone())
    } else {
        RenderEffect::FilterTable(query.clone())
    };
    (next, vec![view_effect, RenderEffect::SearchDocs(query)])
}

fn set_type_visible(
    state: &ViewState,
    node_type: &str,
    visible: bool,
) -> (ViewState, Vec<RenderEffect>) {
    if !state.active_tab.is_graph() {
        return (state.clone(), Vec::new());
    }
    let mut next = state.clone();
    if visible {
        next.active_type_filters.insert(node_type.to_string());
    } else {
        next.active_type_filters.remove(node_type);
    }
    let effect = RenderEffect::ApplyTypeFilter(next.active_type_filters.clone());
    (next, vec![effect])
}
