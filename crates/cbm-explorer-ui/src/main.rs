//! Native entry point for the codebase map explorer.
//!
//! ```text
//! cbm-explorer --site-base ./site
//! cbm-explorer --site-base https://docs.example.org/map/ --timeout-secs 10
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use cbm_explorer::ExplorerConfig;
    use cbm_explorer_ui::ExplorerApp;
    use clap::Parser;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    #[derive(Parser, Debug)]
    #[command(name = "cbm-explorer", about = "Browse a precomputed codebase map")]
    struct Args {
        /// Documentation site root: http(s) URL or local directory
        #[arg(long)]
        site_base: Option<String>,

        /// Artifact directory relative to the site root
        #[arg(long)]
        artifacts_base: Option<String>,

        /// Search index path relative to the site root
        #[arg(long)]
        search_index: Option<String>,

        /// Per-request HTTP timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// YAML config file
        #[arg(short, long, env = "CBM_EXPLORER_CONFIG")]
        config: Option<PathBuf>,
    }

    fn resolve_config(args: Args) -> cbm_explorer::Result<ExplorerConfig> {
        let mut config = ExplorerConfig::load_from(args.config.as_deref())?;
        if let Some(v) = args.site_base {
            config.site_base = v;
        }
        if let Some(v) = args.artifacts_base {
            config.artifacts_base = v;
        }
        if let Some(v) = args.search_index {
            config.search_index_path = v;
        }
        if let Some(v) = args.timeout_secs {
            config.fetch_timeout_secs = Some(v);
        }
        Ok(config)
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "cbm_explorer=info,cbm_explorer_ui=info".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();

        let config = resolve_config(Args::parse())?;
        tracing::info!(site = %config.site_base, "starting codebase map explorer");

        eframe::run_native(
            "Codebase Map Explorer",
            eframe::NativeOptions::default(),
            Box::new(move |cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
        )?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
