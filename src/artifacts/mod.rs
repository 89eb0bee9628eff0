//! Artifact catalogue and the parsed, read-only artifact set.
//!
//! # Architecture
//!
//! ```text
//! ArtifactKind (fixed list of file names)
//!        │
//!        ▼
//! ArtifactLoader (fetch + parse, concurrent)
//!        │
//!        ▼
//! ArtifactSet (immutable for the session, shared via Arc)
//! ```

pub mod docs;

pub use docs::{
    field_text, value_to_text, CatalogRecord, ContractsDoc, DatasetDoc, DocEntry, DocsIndexDoc,
    EdgeDoc, FeatureCatalogDoc, LabelRegistryDoc, LineageDoc, MetricRegistryDoc, ModuleGraphDoc,
    ModuleNodeDoc, PipelineDagsDoc, PipelineDoc, PipelineNodeDoc, RefMapDoc, SchemaCatalogDoc,
    TemporalValidityDoc,
};

use crate::catalog::CatalogKind;

/// Where an artifact lives relative to the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactLocation {
    /// Under the configured artifacts base (`_artifacts/…`).
    ArtifactsBase,
    /// Relative to the documentation site root.
    SiteRoot,
}

/// Every artifact the explorer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    RefMap,
    ModuleGraph,
    DataLineage,
    PipelineDags,
    SchemaCatalog,
    FeatureCatalog,
    LabelRegistry,
    MetricRegistry,
    Contracts,
    TemporalValidity,
    SearchIndex,
}

impl ArtifactKind {
    /// Default file name; the search index path can be overridden by config.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::RefMap => "ref_map.json",
            Self::ModuleGraph => "module_graph.json",
            Self::DataLineage => "data_lineage_graph.json",
            Self::PipelineDags => "pipeline_dags.json",
            Self::SchemaCatalog => "schema_catalog.json",
            Self::FeatureCatalog => "feature_catalog.json",
            Self::LabelRegistry => "label_registry.json",
            Self::MetricRegistry => "metric_registry.json",
            Self::Contracts => "contracts.json",
            Self::TemporalValidity => "temporal_validity.json",
            Self::SearchIndex => "search/search_index.json",
        }
    }

    pub fn location(&self) -> ArtifactLocation {
        match self {
            Self::SearchIndex => ArtifactLocation::SiteRoot,
            _ => ArtifactLocation::ArtifactsBase,
        }
    }

    /// Required artifacts abort startup when they fail; optional ones degrade.
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::RefMap | Self::SearchIndex)
    }

    pub fn all() -> &'static [ArtifactKind] {
        &[
            Self::RefMap,
            Self::ModuleGraph,
            Self::DataLineage,
            Self::PipelineDags,
            Self::SchemaCatalog,
            Self::FeatureCatalog,
            Self::LabelRegistry,
            Self::MetricRegistry,
            Self::Contracts,
            Self::TemporalValidity,
            Self::SearchIndex,
        ]
    }

    pub fn required() -> impl Iterator<Item = ArtifactKind> {
        Self::all().iter().copied().filter(|k| k.is_required())
    }
}

/// The six flat catalogs.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub schemas: SchemaCatalogDoc,
    pub features: FeatureCatalogDoc,
    pub labels: LabelRegistryDoc,
    pub metrics: MetricRegistryDoc,
    pub contracts: ContractsDoc,
    pub temporal: TemporalValidityDoc,
}

impl Catalogs {
    /// Records of one catalog kind, in artifact order.
    pub fn records(&self, kind: CatalogKind) -> &[CatalogRecord] {
        match kind {
            CatalogKind::Schemas => &self.schemas.tables,
            CatalogKind::Features => &self.features.features,
            CatalogKind::Labels => &self.labels.labels,
            CatalogKind::Metrics => &self.metrics.metrics,
            CatalogKind::Contracts => &self.contracts.boundaries,
            CatalogKind::Temporal => &self.temporal.entities,
        }
    }
}

/// All artifacts of one session. Never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    pub ref_map: RefMapDoc,
    pub module_graph: ModuleGraphDoc,
    pub lineage: LineageDoc,
    pub pipelines: PipelineDagsDoc,
    pub catalogs: Catalogs,
    pub docs_index: DocsIndexDoc,
}
