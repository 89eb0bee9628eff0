//! Codebase Map Explorer - headless core.
//!
//! Turns the precomputed JSON artifacts of a codebase map (module graph,
//! data lineage, pipeline DAGs and six flat catalogs) into three surfaces a
//! UI can paint:
//! - `GraphCanvas` - nodes, edges, positions, visibility and highlights
//! - `CatalogTable` - filtered, insertion-ordered rows
//! - `DetailView` - the selected entity plus one documentation link
//!
//! # Architecture
//!
//! ```text
//! ArtifactLoader ──► ArtifactSet (read-only, Arc)
//!                        │
//!            ┌───────────┴────────────┐
//!            ▼                        ▼
//!   model::builders            catalog::CatalogTable
//!   (GraphElements)                   │
//!            │                        │
//!            ▼                        ▼
//!      GraphCanvas ◄── Explorer ──► DetailView
//!                         ▲
//!                         │ (ViewState, [RenderEffect])
//!                  state::transition
//! ```
//!
//! No GUI code lives here; `cbm-explorer-ui` paints these surfaces with egui.
//!
//! # Example
//!
//! ```
//! use cbm_explorer::{ArtifactSet, Explorer, ExplorerEvent, Tab};
//! use url::Url;
//!
//! let artifacts = ArtifactSet::default();
//! let mut explorer = Explorer::new(artifacts, Url::parse("http://localhost:8000/").unwrap());
//! explorer.dispatch(ExplorerEvent::ActivateTab(Tab::Catalogs));
//! assert_eq!(explorer.detail().title(), "Catalog: schemas");
//! ```

pub mod artifacts;
pub mod canvas;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod layout;
pub mod loader;
pub mod model;
pub mod refs;
pub mod search;
pub mod session;
pub mod state;

pub use artifacts::{ArtifactKind, ArtifactSet, CatalogRecord};
pub use canvas::{GraphCanvas, NodeStyle, Rgb};
pub use catalog::{CatalogKind, CatalogTable, Column, ROW_RENDER_CAP};
pub use config::ExplorerConfig;
pub use detail::{DetailView, DocLink, DocMatches};
pub use error::{ExplorerError, Result};
pub use layout::{Bounds, LayoutKind, Point};
pub use loader::{ArtifactLoader, ArtifactSource, HttpSource};
#[cfg(not(target_arch = "wasm32"))]
pub use loader::DirSource;
pub use model::{GraphEdge, GraphElements, GraphNode, NodeCategory, Payload, ViewModel};
pub use refs::{DocRef, RefResolver};
pub use search::{normalize_query, DocMatch};
pub use session::Explorer;
pub use state::{ExplorerEvent, RenderEffect, SelectorOption, Tab, ViewState};
