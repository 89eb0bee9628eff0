//! UI Panels
//!
//! Each panel takes `&mut Ui` plus read-only explorer data and returns the
//! events the user triggered. Panels never mutate the explorer; the app
//! dispatches what they return once the frame's layout is done.

use cbm_explorer::detail::PLACEHOLDER;
use cbm_explorer::{CatalogTable, DetailView, DocMatches, Explorer, ExplorerEvent, Tab, ROW_RENDER_CAP};
use egui::{Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

// =============================================================================
// TABS
// =============================================================================

pub fn tab_bar(ui: &mut Ui, active: Tab) -> Option<ExplorerEvent> {
    let mut event = None;
    ui.horizontal(|ui| {
        for tab in Tab::ALL {
            if ui.selectable_label(tab == active, tab.label()).clicked() && tab != active {
                event = Some(ExplorerEvent::ActivateTab(tab));
            }
        }
    });
    event
}

// =============================================================================
// CONTROLS
// =============================================================================

/// Search box, view selector and (on graph tabs) node-type toggles.
///
/// `search_text` is the app-owned edit buffer; every edit emits `Search`.
pub fn controls(ui: &mut Ui, explorer: &Explorer, search_text: &mut String) -> Vec<ExplorerEvent> {
    let mut events = Vec::new();
    let state = explorer.state();

    ui.label(RichText::new("Search").strong());
    let response = ui.add(
        egui::TextEdit::singleline(search_text)
            .hint_text("name, id, type...")
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        events.push(ExplorerEvent::Search(search_text.clone()));
    }

    ui.add_space(8.0);
    ui.label(RichText::new("View").strong());
    let options = explorer.selector_options();
    let selected_label = options
        .iter()
        .find(|o| o.value == state.active_selector)
        .map(|o| o.label.as_str())
        .unwrap_or("");
    egui::ComboBox::from_id_salt("view_selector")
        .selected_text(selected_label)
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            for option in options {
                let selected = option.value == state.active_selector;
                if ui.selectable_label(selected, &option.label).clicked() && !selected {
                    events.push(ExplorerEvent::SelectView(option.value.clone()));
                }
            }
        });

    if state.active_tab.is_graph() {
        let types = explorer.canvas().node_types();
        if !types.is_empty() {
            ui.add_space(8.0);
            ui.label(RichText::new("Node types").strong());
            for node_type in types {
                let mut visible = state.active_type_filters.contains(&node_type);
                if ui.checkbox(&mut visible, &node_type).changed() {
                    events.push(ExplorerEvent::SetTypeVisible { node_type, visible });
                }
            }
        }
    }

    events
}

// =============================================================================
// CATALOG TABLE
// =============================================================================

/// Paint `table`; returns the index of a clicked row.
pub fn catalog_table(ui: &mut Ui, table: &CatalogTable) -> Option<usize> {
    if table.total > ROW_RENDER_CAP {
        ui.label(
            RichText::new(format!("Showing {} of {} rows", table.rows.len(), table.total))
                .weak()
                .small(),
        );
    }
    if table.rows.is_empty() {
        ui.label(RichText::new("No rows match.").weak());
        return None;
    }

    let mut clicked = None;
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .sense(egui::Sense::click())
        .columns(TableColumn::auto().at_least(80.0).clip(true), table.columns.len())
        .header(20.0, |mut header| {
            for column in table.columns {
                header.col(|ui| {
                    ui.strong(column.label);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, table.rows.len(), |mut row| {
                let index = row.index();
                for cell in &table.rows[index].cells {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
                if row.response().clicked() {
                    clicked = Some(index);
                }
            });
        });
    clicked
}

// =============================================================================
// DETAIL
// =============================================================================

pub fn detail_panel(ui: &mut Ui, detail: &DetailView, doc_matches: &DocMatches) {
    ui.heading(detail.title());
    ui.separator();

    ScrollArea::vertical().auto_shrink([false, true]).show(ui, |ui| {
        if detail.is_placeholder() {
            ui.label(RichText::new(PLACEHOLDER).weak());
        } else {
            egui::Grid::new("detail_fields")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for (key, text) in detail.fields() {
                        ui.label(RichText::new(key).strong());
                        ui.label(text);
                        ui.end_row();
                    }
                });
            if let Some(link) = detail.link() {
                ui.add_space(6.0);
                ui.hyperlink_to(link.label, &link.href);
            }
        }

        if !doc_matches.is_empty() {
            ui.add_space(12.0);
            ui.label(RichText::new("Docs Matches").strong());
            for m in doc_matches.items() {
                match &m.href {
                    Some(href) => {
                        ui.hyperlink_to(&m.title, href);
                    }
                    None => {
                        ui.label(&m.title);
                    }
                }
            }
        }
    });
}

// =============================================================================
// NOTICES
// =============================================================================

/// Non-fatal messages (fallbacks, missing optional artifacts). Returns true
/// when the user dismissed them.
pub fn notices_bar(ui: &mut Ui, notices: &[String]) -> bool {
    let mut dismissed = false;
    ui.horizontal_wrapped(|ui| {
        if ui.small_button("Dismiss").clicked() {
            dismissed = true;
        }
        for notice in notices {
            ui.label(RichText::new(notice).color(Color32::from_rgb(0xd2, 0x99, 0x22)).small());
        }
    });
    dismissed
}

/// Inline replacement for the whole explorer when startup fails.
pub fn error_block(ui: &mut Ui, message: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(RichText::new("The codebase map could not be loaded.").strong().color(Color32::RED));
        ui.add_space(8.0);
        ui.label(message);
    });
}
