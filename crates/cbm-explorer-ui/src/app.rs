//! Explorer application shell
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ Module Graph | Data Lineage | Pipeline DAGs | ...      │
//! ├──────────┬──────────────────────────────┬──────────────┤
//! │ Search   │                              │ Details      │
//! │ View ▾   │   graph canvas / catalog     │  fields      │
//! │ Types ☑  │   table                      │  Open Docs   │
//! │          │                              │  Docs Matches│
//! ├──────────┴──────────────────────────────┴──────────────┤
//! │ notices                                                │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup loads every artifact in the background; until it resolves the
//! window shows a spinner, and a fatal load error replaces the whole
//! explorer with an inline error block.

use std::sync::{Arc, Mutex};

use cbm_explorer::{Explorer, ExplorerConfig, ExplorerEvent};

use crate::graph_view::{GraphAction, GraphView};
use crate::panels;

type Pending<T> = Arc<Mutex<Option<Result<T, String>>>>;

pub struct ExplorerApp {
    config: ExplorerConfig,
    explorer: Option<Explorer>,
    pending_explorer: Option<Pending<Explorer>>,
    error: Option<String>,

    graph_view: GraphView,
    /// Edit buffer behind the search box.
    search_text: String,

    #[cfg(not(target_arch = "wasm32"))]
    runtime: Option<Arc<tokio::runtime::Runtime>>,
}

impl ExplorerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ExplorerConfig) -> Self {
        let mut app = Self {
            config,
            explorer: None,
            pending_explorer: None,
            error: None,
            graph_view: GraphView::default(),
            search_text: String::new(),
            #[cfg(not(target_arch = "wasm32"))]
            runtime: None,
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match tokio::runtime::Runtime::new() {
                Ok(runtime) => app.runtime = Some(Arc::new(runtime)),
                Err(e) => {
                    tracing::error!(error = %e, "cannot create async runtime");
                    app.error = Some(format!("cannot create async runtime: {e}"));
                    return app;
                }
            }
        }

        app.start_loading();
        app
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    fn start_loading(&mut self) {
        let config = self.config.clone();
        let result: Pending<Explorer> = Arc::new(Mutex::new(None));
        let result_clone = result.clone();

        tracing::info!(site = %config.site_base, artifacts = %config.artifacts_base, "loading artifacts");

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let res = Explorer::start(&config).await.map_err(|e| e.to_string());
                if let Ok(mut slot) = result_clone.lock() {
                    *slot = Some(res);
                }
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let Some(runtime) = &self.runtime else {
                return;
            };
            runtime.spawn(async move {
                let res = Explorer::start(&config).await.map_err(|e| e.to_string());
                if let Ok(mut slot) = result_clone.lock() {
                    *slot = Some(res);
                }
            });
        }

        self.pending_explorer = Some(result);
    }

    fn check_pending(&mut self) {
        let Some(pending) = &self.pending_explorer else {
            return;
        };
        let taken = pending.lock().ok().and_then(|mut slot| slot.take());
        let Some(result) = taken else {
            return;
        };
        self.pending_explorer = None;
        match result {
            Ok(explorer) => {
                self.search_text = explorer.search_input().to_string();
                self.explorer = Some(explorer);
            }
            Err(e) => {
                tracing::error!(error = %e, "explorer failed to start");
                self.error = Some(e);
            }
        }
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    fn dispatch_all(&mut self, events: Vec<ExplorerEvent>) {
        let Some(explorer) = self.explorer.as_mut() else {
            return;
        };
        for event in events {
            match &event {
                ExplorerEvent::Search(text) => explorer.set_search_input(text),
                ExplorerEvent::ActivateTab(_) | ExplorerEvent::SelectView(_) => {
                    self.graph_view.request_fit()
                }
                _ => {}
            }
            explorer.dispatch(event);
        }
        // Tab switches clear the search box.
        if explorer.search_input() != self.search_text {
            self.search_text = explorer.search_input().to_string();
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_pending();

        if let Some(error) = &self.error {
            egui::CentralPanel::default().show(ctx, |ui| panels::error_block(ui, error));
            return;
        }

        let Some(explorer) = self.explorer.as_ref() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| ui.spinner());
            });
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
            return;
        };

        let mut events = Vec::new();
        let mut dismiss_notices = false;

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            events.extend(panels::tab_bar(ui, explorer.state().active_tab));
        });

        if !explorer.notices().is_empty() {
            egui::TopBottomPanel::bottom("notices").show(ctx, |ui| {
                dismiss_notices = panels::notices_bar(ui, explorer.notices());
            });
        }

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                events.extend(panels::controls(ui, explorer, &mut self.search_text));
            });

        egui::SidePanel::right("detail")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                panels::detail_panel(ui, explorer.detail(), explorer.doc_matches());
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            if explorer.state().active_tab.is_graph() {
                match self.graph_view.ui(ui, explorer.canvas()) {
                    Some(GraphAction::TapNode(id)) => events.push(ExplorerEvent::TapNode(id)),
                    Some(GraphAction::TapEdge(id)) => events.push(ExplorerEvent::TapEdge(id)),
                    None => {}
                }
            } else if let Some(table) = explorer.table() {
                if let Some(index) = panels::catalog_table(ui, table) {
                    events.push(ExplorerEvent::ActivateRow(index));
                }
            }
        });

        if dismiss_notices {
            if let Some(explorer) = self.explorer.as_mut() {
                explorer.take_notices();
            }
        }
        if !events.is_empty() {
            self.dispatch_all(events);
        }
    }
}
