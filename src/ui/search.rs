use eframe::egui::{self, Align, Layout, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use super::ACCENT;
use crate::data::model::{Column, Dataset, FieldKey, Value};
use crate::state::AppState;

const FORM_COLUMNS: usize = 3;

/// Search page: one box per known field, a global box, and the result table.
pub fn search_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("Patent Query Engine").color(ACCENT).strong());

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Open a patent file to begin  (File → Open…)");
        });
        return;
    }

    ui.strong("Active filters");
    let mut changed = false;

    egui::Grid::new("search_form")
        .num_columns(FORM_COLUMNS * 2)
        .spacing([8.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for (i, key) in FieldKey::RAW.into_iter().enumerate() {
                let hint = if key.is_date() { "YYYY-MM-DD" } else { "" };
                ui.label(key.header());
                let term = state.query.terms.entry(Column::Field(key)).or_default();
                changed |= ui
                    .add(
                        egui::TextEdit::singleline(term)
                            .hint_text(hint)
                            .desired_width(160.0),
                    )
                    .changed();
                if (i + 1) % FORM_COLUMNS == 0 {
                    ui.end_row();
                }
            }
            ui.end_row();
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search all fields");
        changed |= ui
            .add(
                egui::TextEdit::singleline(&mut state.query.global)
                    .hint_text("any text")
                    .desired_width(320.0),
            )
            .changed();
    });

    if changed {
        state.refilter();
    }

    ui.separator();

    let Some(view) = &state.view else {
        return;
    };
    ui.label(
        RichText::new(format!("IDENTIFIED: {} RECORDS", view.len()))
            .color(ACCENT)
            .strong(),
    );
    ui.add_space(4.0);

    if view.is_empty() {
        ui.label("No records match the current filters.");
        return;
    }
    results_table(ui, view);
}

fn cell_text(value: Option<Value>) -> String {
    value.and_then(|v| v.search_text()).unwrap_or_default()
}

/// Scrollable table of the matching records, derived fields last.
fn results_table(ui: &mut Ui, view: &Dataset) {
    let columns = view.schema().display_columns();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(TableColumn::initial(140.0).at_least(48.0).clip(true), columns.len())
        .header(20.0, |mut header| {
            for col in &columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(col.name());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let Some(rec) = view.record(row.index()) else {
                    return;
                };
                for col in &columns {
                    let text = cell_text(view.value(rec, col));
                    row.col(|ui: &mut Ui| {
                        ui.label(text.as_str()).on_hover_text(text.as_str());
                    });
                }
            });
        });
}
