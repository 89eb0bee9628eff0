//! Codebase Map Explorer UI - egui shell over `cbm-explorer`
//!
//! Natively the `cbm-explorer` binary opens a window. In the browser the
//! WASM start hook mounts on `#cbm-explorer` if the page has one and does
//! nothing otherwise.

pub mod app;
pub mod camera;
pub mod graph_view;
pub mod panels;

pub use app::ExplorerApp;

#[cfg(target_arch = "wasm32")]
mod web {
    use cbm_explorer::config::{ARTIFACTS_BASE_ATTR, MOUNT_ELEMENT_ID};
    use cbm_explorer::ExplorerConfig;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::HtmlCanvasElement;

    /// Canvas inside the mount element plus the config read from the page.
    /// `Ok(None)` when the page has no mount element.
    pub fn prepare_mount() -> Result<Option<(HtmlCanvasElement, ExplorerConfig)>, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let Some(mount) = document.get_element_by_id(MOUNT_ELEMENT_ID) else {
            return Ok(None);
        };

        let origin = window.location().origin()?;
        let config = ExplorerConfig::for_mount(&origin, mount.get_attribute(ARTIFACTS_BASE_ATTR));

        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        canvas.set_attribute("style", "width: 100%; height: 100%; min-height: 640px;")?;
        mount.append_child(&canvas)?;
        Ok(Some((canvas, config)))
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let (canvas, config) = match web::prepare_mount() {
        Ok(Some(mounted)) => mounted,
        Ok(None) => {
            tracing::debug!("no mount element on this page");
            return;
        }
        Err(e) => {
            tracing::error!(error = ?e, "cannot prepare explorer mount");
            return;
        }
    };

    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(Box::new(ExplorerApp::new(cc, config)))),
            )
            .await;
        if let Err(e) = started {
            tracing::error!(error = ?e, "failed to start explorer");
        }
    });
}
