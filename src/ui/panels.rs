use eframe::egui::{self, Color32, RichText, Ui};

use super::ACCENT;
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("Command Center").color(ACCENT).strong());
    ui.separator();

    ui.radio_value(&mut state.page, Page::Search, "Search Engine");
    ui.radio_value(&mut state.page, Page::Analysis, "Analysis Engine");
    ui.separator();

    if ui.button("Open patent file…").clicked() {
        open_file_dialog(state);
    }

    match &state.source {
        Some(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            ui.label(RichText::new(name).small()).on_hover_text(path.display().to_string());
        }
        None => {
            ui.label("No dataset loaded.");
        }
    }

    ui.add_space(8.0);
    if ui.button("Reset search").clicked() {
        state.reset_search();
    }
    if ui
        .button("Clear cache")
        .on_hover_text("Re-read files from disk on next open")
        .clicked()
    {
        state.clear_cache();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.view.as_ref().is_some_and(|v| !v.is_empty());
            if ui
                .add_enabled(can_export, egui::Button::new("Export results…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!("{} records loaded, {} matching", ds.len(), view.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::LIGHT_GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open patent data")
        .add_filter("Supported files", &["csv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export matching records")
        .set_file_name("patents_filtered.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_view(&path);
    }
}
