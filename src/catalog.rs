//! Catalog tables over flat records.
//!
//! Columns are declared per [`CatalogKind`]; they are never inferred from the
//! records. Rows keep artifact order. Filtering matches the query against the
//! whole record, so a row can match on a field that has no column.

use serde_json::Value;

use crate::artifacts::{field_text, CatalogRecord, Catalogs};
use crate::model::Payload;
use crate::refs::{RefResolver, RefRule};
use crate::search::record_matches;

/// Rows materialised per table; the reported total is not capped.
pub const ROW_RENDER_CAP: usize = 500;

/// Every tabular artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatalogKind {
    Schemas,
    Features,
    Labels,
    Metrics,
    Contracts,
    Temporal,
}

/// One displayed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

const fn col(key: &'static str, label: &'static str) -> Column {
    Column { key, label }
}

impl CatalogKind {
    /// Selector value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schemas => "schemas",
            Self::Features => "features",
            Self::Labels => "labels",
            Self::Metrics => "metrics",
            Self::Contracts => "contracts",
            Self::Temporal => "temporal",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Schemas => "Schemas",
            Self::Features => "Features",
            Self::Labels => "Labels",
            Self::Metrics => "Metrics",
            Self::Contracts => "Contracts",
            Self::Temporal => "Temporal Validity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "schemas" => Some(Self::Schemas),
            "features" => Some(Self::Features),
            "labels" => Some(Self::Labels),
            "metrics" => Some(Self::Metrics),
            "contracts" => Some(Self::Contracts),
            "temporal" => Some(Self::Temporal),
            _ => None,
        }
    }

    /// Kinds offered on the Catalogs tab. Temporal validity has its own tab.
    pub fn catalog_tab() -> &'static [CatalogKind] {
        &[
            Self::Schemas,
            Self::Features,
            Self::Labels,
            Self::Metrics,
            Self::Contracts,
        ]
    }

    pub fn columns(&self) -> &'static [Column] {
        const SCHEMAS: &[Column] = &[
            col("name", "name"),
            col("grain", "grain"),
            col("primary_key", "primary_key"),
        ];
        const FEATURES: &[Column] = &[
            col("name", "name"),
            col("entity", "entity"),
            col("window", "window"),
            col("known_by_time", "known_by_time"),
        ];
        const LABELS: &[Column] = &[
            col("name", "name"),
            col("grain", "grain"),
            col("computed_in", "computed_in"),
        ];
        const METRICS: &[Column] = &[
            col("name", "name"),
            col("type", "type"),
            col("implemented_in", "implemented_in"),
        ];
        const CONTRACTS: &[Column] = &[
            col("from_package", "from"),
            col("to_package", "to"),
            col("api_surface", "api"),
        ];
        const TEMPORAL: &[Column] = &[
            col("name", "name"),
            col("available_at", "available_at"),
            col("risk_of_leakage", "risk_of_leakage"),
        ];
        match self {
            Self::Schemas => SCHEMAS,
            Self::Features => FEATURES,
            Self::Labels => LABELS,
            Self::Metrics => METRICS,
            Self::Contracts => CONTRACTS,
            Self::Temporal => TEMPORAL,
        }
    }
}

/// A materialised row: display cells plus the record they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub cells: Vec<String>,
    pub record: CatalogRecord,
}

/// A filtered, capped table ready to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTable {
    pub kind: CatalogKind,
    pub columns: &'static [Column],
    pub rows: Vec<CatalogRow>,
    /// Size of the full filtered set, before the render cap.
    pub total: usize,
}

impl CatalogTable {
    /// Build a table of `records`. `query` must already be normalised; an
    /// empty query keeps every record.
    pub fn build(kind: CatalogKind, records: &[CatalogRecord], query: &str) -> Self {
        let columns = kind.columns();
        let matching: Vec<&CatalogRecord> = records
            .iter()
            .filter(|r| query.is_empty() || record_matches(r, query))
            .collect();
        let total = matching.len();
        let rows = matching
            .into_iter()
            .take(ROW_RENDER_CAP)
            .map(|record| CatalogRow {
                cells: columns.iter().map(|c| field_text(record, c.key)).collect(),
                record: record.clone(),
            })
            .collect();
        Self {
            kind,
            columns,
            rows,
            total,
        }
    }

    pub fn from_catalogs(kind: CatalogKind, catalogs: &Catalogs, query: &str) -> Self {
        Self::build(kind, catalogs.records(kind), query)
    }

    /// Invoke `on_select` with the record behind row `index`.
    pub fn activate_row<F>(&self, index: usize, on_select: F) -> bool
    where
        F: FnOnce(&CatalogRecord),
    {
        match self.rows.get(index) {
            Some(row) => {
                on_select(&row.record);
                true
            }
            None => false,
        }
    }

    /// Detail payload shown when the table is first displayed.
    pub fn summary_payload(&self) -> Payload {
        let mut payload = Payload::new();
        payload.insert(
            "title".into(),
            Value::String(format!("Catalog: {}", self.kind.as_str())),
        );
        payload.insert("count".into(), Value::from(self.total));
        payload
    }
}

/// Detail payload for an activated record: the record itself plus a title and
/// a resolved `ref`.
pub fn record_payload(kind: CatalogKind, record: &CatalogRecord, refs: &RefResolver) -> Payload {
    let name = field_text(record, "name");
    let from = field_text(record, "from_package");
    let lookup = if name.is_empty() { &from } else { &name };
    let explicit = record.get("ref").and_then(Value::as_str);

    let doc_ref = refs.resolve_with(explicit, lookup, RefRule::Catalog(kind));

    let mut payload = record.clone();
    let title = if name.is_empty() {
        format!("{} -> {}", from, field_text(record, "to_package"))
    } else {
        name
    };
    payload.insert("title".into(), Value::String(title));
    payload.insert(
        "ref".into(),
        doc_ref.map(|r| Value::String(r.to_string())).unwrap_or(Value::Null),
    );
    payload
}
