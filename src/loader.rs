//! Artifact loader.
//!
//! Fetches every artifact once per session. Required artifacts are fetched
//! concurrently and all of them must parse; optional ones (ref map, docs
//! search index) fall back to empty defaults with a warning.
//!
//! Transport is behind [`ArtifactSource`]:
//! - [`HttpSource`] - browser fetch on WASM, reqwest natively
//! - [`DirSource`] - local directory (native only)

use async_trait::async_trait;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::artifacts::{ArtifactKind, ArtifactLocation, ArtifactSet, Catalogs};
use crate::config::ExplorerConfig;
use crate::error::{ExplorerError, Result};

// =============================================================================
// SOURCES
// =============================================================================

/// Reads raw artifact bytes by site-relative path.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ArtifactSource: Send + Sync {
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Human-readable location of `path`, for diagnostics.
    fn describe(&self, path: &str) -> String;
}

/// Fetches over HTTP, bypassing caches.
#[derive(Clone)]
pub struct HttpSource {
    base: Url,
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder
                .build()
                .map_err(|e| ExplorerError::Config(format!("http client: {e}")))?;
            Ok(Self { base, client })
        }

        #[cfg(target_arch = "wasm32")]
        {
            if timeout.is_some() {
                tracing::debug!("fetch timeout is not applied in the browser");
            }
            Ok(Self { base })
        }
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| ExplorerError::Fetch {
            url: format!("{}{}", self.base, path),
            reason: e.to_string(),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl ArtifactSource for HttpSource {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url_for(path)?;
        let fetch_error = |e: reqwest::Error| ExplorerError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(fetch_error)?;

        if !response.status().is_success() {
            return Err(ExplorerError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(fetch_error)?;
        Ok(body.to_vec())
    }

    fn describe(&self, path: &str) -> String {
        self.url_for(path)
            .map(String::from)
            .unwrap_or_else(|_| path.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl ArtifactSource for HttpSource {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen_futures::JsFuture;
        use web_sys::{Request, RequestCache, RequestInit, RequestMode, Response};

        let url = self.url_for(path)?;
        let fetch_error = |reason: String| ExplorerError::Fetch {
            url: url.to_string(),
            reason,
        };

        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::Cors);
        opts.set_cache(RequestCache::NoCache);

        let request = Request::new_with_str_and_init(url.as_str(), &opts)
            .map_err(|e| fetch_error(format!("request error: {:?}", e)))?;

        let window = web_sys::window().ok_or_else(|| fetch_error("no window".into()))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| fetch_error(format!("fetch error: {:?}", e)))?;

        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| fetch_error("response is not a Response".into()))?;

        if !resp.ok() {
            return Err(ExplorerError::Status {
                url: url.to_string(),
                status: resp.status(),
            });
        }

        let text = JsFuture::from(
            resp.text()
                .map_err(|e| fetch_error(format!("text promise error: {:?}", e)))?,
        )
        .await
        .map_err(|e| fetch_error(format!("text error: {:?}", e)))?;

        Ok(text.as_string().unwrap_or_default().into_bytes())
    }

    fn describe(&self, path: &str) -> String {
        self.url_for(path)
            .map(String::from)
            .unwrap_or_else(|_| path.to_string())
    }
}

/// Reads artifacts from a local site directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirSource {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirSource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait]
impl ArtifactSource for DirSource {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        tokio::fs::read(&full).await.map_err(|e| ExplorerError::Fetch {
            url: full.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn describe(&self, path: &str) -> String {
        self.root.join(path).display().to_string()
    }
}

// =============================================================================
// LOADER
// =============================================================================

pub struct ArtifactLoader {
    source: Box<dyn ArtifactSource>,
    artifacts_prefix: String,
    search_index_path: String,
}

impl ArtifactLoader {
    pub fn new(source: Box<dyn ArtifactSource>, config: &ExplorerConfig) -> Self {
        Self {
            source,
            artifacts_prefix: config.artifacts_prefix(),
            search_index_path: config.search_index_path.clone(),
        }
    }

    /// HTTP for `http(s)` site bases, otherwise a local directory.
    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        let source: Box<dyn ArtifactSource> = if config.is_remote() {
            Box::new(HttpSource::new(config.site_url()?, config.fetch_timeout())?)
        } else {
            Self::dir_source(config)?
        };
        Ok(Self::new(source, config))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn dir_source(config: &ExplorerConfig) -> Result<Box<dyn ArtifactSource>> {
        Ok(Box::new(DirSource::new(&config.site_base)))
    }

    #[cfg(target_arch = "wasm32")]
    fn dir_source(config: &ExplorerConfig) -> Result<Box<dyn ArtifactSource>> {
        Err(ExplorerError::Config(format!(
            "cannot read directory '{}' in the browser",
            config.site_base
        )))
    }

    /// Site-relative path of an artifact.
    pub fn path_of(&self, kind: ArtifactKind) -> String {
        match kind.location() {
            ArtifactLocation::ArtifactsBase => format!("{}{}", self.artifacts_prefix, kind.file_name()),
            ArtifactLocation::SiteRoot => self.search_index_path.clone(),
        }
    }

    /// Load the full artifact set. Fails only on a required artifact.
    pub async fn load(&self) -> Result<ArtifactSet> {
        let required: Vec<ArtifactKind> = ArtifactKind::required().collect();
        tracing::info!(
            base = %self.source.describe(&self.artifacts_prefix),
            required = required.len(),
            "loading artifacts"
        );

        let (ref_map, docs_index, fetched) = futures::join!(
            self.fetch_optional(ArtifactKind::RefMap),
            self.fetch_optional(ArtifactKind::SearchIndex),
            join_all(required.iter().map(|kind| self.fetch_bytes(*kind))),
        );

        let mut bodies: HashMap<ArtifactKind, Result<Vec<u8>>> =
            required.into_iter().zip(fetched).collect();

        // Field order below is artifact order, so the first failure reported
        // is the first failing artifact.
        let set = ArtifactSet {
            ref_map,
            module_graph: take_required(&mut bodies, ArtifactKind::ModuleGraph)?,
            lineage: take_required(&mut bodies, ArtifactKind::DataLineage)?,
            pipelines: take_required(&mut bodies, ArtifactKind::PipelineDags)?,
            catalogs: Catalogs {
                schemas: take_required(&mut bodies, ArtifactKind::SchemaCatalog)?,
                features: take_required(&mut bodies, ArtifactKind::FeatureCatalog)?,
                labels: take_required(&mut bodies, ArtifactKind::LabelRegistry)?,
                metrics: take_required(&mut bodies, ArtifactKind::MetricRegistry)?,
                contracts: take_required(&mut bodies, ArtifactKind::Contracts)?,
                temporal: take_required(&mut bodies, ArtifactKind::TemporalValidity)?,
            },
            docs_index,
        };

        tracing::info!(
            refs = set.ref_map.refs.len(),
            modules = set.module_graph.nodes.len(),
            datasets = set.lineage.datasets.len(),
            pipelines = set.pipelines.pipelines.len(),
            docs = set.docs_index.docs.len(),
            "artifacts loaded"
        );
        Ok(set)
    }

    async fn fetch_bytes(&self, kind: ArtifactKind) -> Result<Vec<u8>> {
        let path = self.path_of(kind);
        tracing::debug!(artifact = kind.file_name(), path = %path, "fetching");
        self.source.read(&path).await
    }

    async fn fetch_optional<T>(&self, kind: ArtifactKind) -> T
    where
        T: DeserializeOwned + Default,
    {
        let parsed = match self.fetch_bytes(kind).await {
            Ok(body) => parse(kind, &body),
            Err(e) => Err(e),
        };
        parsed.unwrap_or_else(|e| {
            tracing::warn!(
                artifact = kind.file_name(),
                error = %e,
                "optional artifact unavailable, using empty default"
            );
            T::default()
        })
    }
}

fn parse<T: DeserializeOwned>(kind: ArtifactKind, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ExplorerError::Parse {
        name: kind.file_name().to_string(),
        source,
    })
}

fn take_required<T: DeserializeOwned>(
    bodies: &mut HashMap<ArtifactKind, Result<Vec<u8>>>,
    kind: ArtifactKind,
) -> Result<T> {
    let body = bodies.remove(&kind).unwrap_or_else(|| {
        Err(ExplorerError::Fetch {
            url: kind.file_name().to_string(),
            reason: "not fetched".into(),
        })
    });
    body.and_then(|b| parse(kind, &b)).map_err(|e| {
        tracing::error!(artifact = kind.file_name(), error = %e, "required artifact failed");
        ExplorerError::RequiredArtifact {
            name: kind.file_name().to_string(),
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory source that records every path read.
    #[derive(Default)]
    struct MemorySource {
        files: HashMap<String, Vec<u8>>,
        reads: Mutex<Vec<String>>,
    }

    impl MemorySource {
        fn with(mut self, path: &str, body: serde_json::Value) -> Self {
            self.files.insert(path.to_string(), body.to_string().into_bytes());
            self
        }

        fn with_raw(mut self, path: &str, body: &str) -> Self {
            self.files.insert(path.to_string(), body.as_bytes().to_vec());
            self
        }
    }

    #[async_trait]
    impl ArtifactSource for MemorySource {
        async fn read(&self, path: &str) -> Result<Vec<u8>> {
            self.reads.lock().unwrap().push(path.to_string());
            self.files.get(path).cloned().ok_or_else(|| ExplorerError::Status {
                url: path.to_string(),
                status: 404,
            })
        }

        fn describe(&self, path: &str) -> String {
            format!("mem://{path}")
        }
    }

    fn complete() -> MemorySource {
        let mut source = MemorySource::default();
        for kind in ArtifactKind::required() {
            source = source.with(&format!("_artifacts/{}", kind.file_name()), json!({}));
        }
        source
    }

    fn loader(source: MemorySource) -> ArtifactLoader {
        ArtifactLoader::new(Box::new(source), &ExplorerConfig::default())
    }

    #[tokio::test]
    async fn test_optional_artifacts_default() {
        let set = loader(complete()).load().await.unwrap();
        assert!(set.ref_map.refs.is_empty());
        assert!(set.docs_index.docs.is_empty());
        assert!(set.module_graph.nodes.is_empty());
    }

    #[tokio::test]
    async fn test_optional_parse_failure_degrades() {
        let source = complete()
            .with_raw("_artifacts/ref_map.json", "{not json")
            .with("search/search_index.json", json!({"docs": [{"title": "Home", "text": "", "location": ""}]}));
        let set = loader(source).load().await.unwrap();
        assert!(set.ref_map.refs.is_empty());
        assert_eq!(set.docs_index.docs.len(), 1);
    }

    #[tokio::test]
    async fn test_first_required_failure_is_reported() {
        let mut source = complete();
        source.files.remove("_artifacts/pipeline_dags.json");
        source.files.remove("_artifacts/contracts.json");
        let err = loader(source).load().await.unwrap_err();
        match err {
            ExplorerError::RequiredArtifact { name, reason } => {
                assert_eq!(name, "pipeline_dags.json");
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_required_parse_failure_is_fatal() {
        let source = complete().with_raw("_artifacts/schema_catalog.json", "[1, 2");
        let err = loader(source).load().await.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("schema_catalog.json"));
    }

    #[tokio::test]
    async fn test_every_artifact_read_once() {
        let source = std::sync::Arc::new(complete());
        struct Shared(std::sync::Arc<MemorySource>);
        #[async_trait]
        impl ArtifactSource for Shared {
            async fn read(&self, path: &str) -> Result<Vec<u8>> {
                self.0.read(path).await
            }
            fn describe(&self, path: &str) -> String {
                self.0.describe(path)
            }
        }

        let loader = ArtifactLoader::new(Box::new(Shared(source.clone())), &ExplorerConfig::default());
        loader.load().await.unwrap();

        let mut reads = source.reads.lock().unwrap().clone();
        reads.sort();
        let mut expected: Vec<String> = ArtifactKind::all().iter().map(|k| loader.path_of(*k)).collect();
        expected.sort();
        assert_eq!(reads, expected);
    }

    #[test]
    fn test_paths_follow_config() {
        let config = ExplorerConfig {
            artifacts_base: "/gen/".into(),
            search_index_path: "idx.json".into(),
            ..ExplorerConfig::default()
        };
        let loader = ArtifactLoader::new(Box::new(MemorySource::default()), &config);
        assert_eq!(loader.path_of(ArtifactKind::ModuleGraph), "gen/module_graph.json");
        assert_eq!(loader.path_of(ArtifactKind::SearchIndex), "idx.json");
    }

    #[tokio::test]
    async fn test_dir_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), b"{}").unwrap();
        let source = DirSource::new(dir.path());
        assert_eq!(source.read("a.json").await.unwrap(), b"{}");
        let err = source.read("missing.json").await.unwrap_err();
        assert_eq!(err.code(), "FETCH");
    }
}
