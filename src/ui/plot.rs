use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use super::ACCENT;
use crate::color::generate_palette;
use crate::data::model::Value;
use crate::data::summary::ColumnSummary;
use crate::state::{Analysis, AppState, DISTRIBUTION_FIELDS};

// ---------------------------------------------------------------------------
// Analysis page (central panel)
// ---------------------------------------------------------------------------

/// Render the charts and summary for the current search results.
pub fn analysis_page(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("Intelligence Analysis Engine").color(ACCENT).strong());

    let empty = state.view.as_ref().map_or(true, |v| v.is_empty());
    if empty {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(
                RichText::new("No data available for analysis. Adjust your search filters.")
                    .color(Color32::YELLOW),
            );
        });
        return;
    }

    state.ensure_analysis();
    let mut field = state.distribution_field;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let Some(analysis) = &state.analysis else {
                return;
            };

            ui.strong("Temporal IPC growth");
            growth_plot(ui, analysis);
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                ui.strong("Analyze distribution of:");
                egui::ComboBox::from_id_salt("distribution_field")
                    .selected_text(field.header())
                    .show_ui(ui, |ui: &mut Ui| {
                        for key in DISTRIBUTION_FIELDS {
                            ui.selectable_value(&mut field, key, key.header());
                        }
                    });
            });
            distribution_plot(ui, analysis, state.config.top_n);
            ui.separator();

            ui.strong("Summary");
            summary_grid(ui, &analysis.summary);
        });

    state.set_distribution_field(field);
}

/// Filings per year, one line per IPC group.
fn growth_plot(ui: &mut Ui, analysis: &Analysis) {
    if analysis.growth.is_empty() {
        ui.label("No dated, classified records to chart.");
        return;
    }

    Plot::new("ipc_growth")
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label("Filing year")
        .y_axis_label("Applications")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for series in &analysis.growth {
                let color = analysis.growth_colors.color_for(&series.group);
                let xy: Vec<[f64; 2]> = series
                    .points
                    .iter()
                    .map(|&(year, count)| [year as f64, count as f64])
                    .collect();

                let line_points: PlotPoints = xy.iter().copied().collect();
                plot_ui.line(
                    Line::new(line_points)
                        .name(&series.group)
                        .color(color)
                        .width(2.0),
                );

                let markers: PlotPoints = xy.into_iter().collect();
                plot_ui.points(
                    Points::new(markers)
                        .name(&series.group)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

/// Top-N bar chart of the selected field.
fn distribution_plot(ui: &mut Ui, analysis: &Analysis, top_n: usize) {
    if analysis.distribution.is_empty() {
        ui.label("No values to chart for this field.");
        return;
    }

    let palette = generate_palette(analysis.distribution.len());
    Plot::new("distribution")
        .legend(Legend::default())
        .height(280.0)
        .y_axis_label(format!("Top {top_n}: count"))
        .show_x(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (group, color)) in analysis.distribution.iter().zip(&palette).enumerate() {
                let label = group.label();
                let bar = Bar::new(i as f64, group.count as f64)
                    .width(0.7)
                    .name(&label)
                    .fill(*color);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&label).color(*color));
            }
        });
}

fn format_top(top: &Option<(Value, usize)>) -> String {
    match top {
        Some((value, freq)) => format!("{value} ({freq})"),
        None => "no data".to_string(),
    }
}

/// Per-column descriptive statistics.
fn summary_grid(ui: &mut Ui, summary: &[ColumnSummary]) {
    egui::Grid::new("summary_grid")
        .striped(true)
        .num_columns(6)
        .show(ui, |ui: &mut Ui| {
            for heading in ["Column", "Count", "Unique", "Most common", "Min", "Max"] {
                ui.strong(heading);
            }
            ui.end_row();

            for s in summary {
                let opt = |v: &Option<Value>| {
                    v.as_ref().map_or_else(|| "–".to_string(), |v| v.to_string())
                };
                ui.label(s.column.name());
                ui.label(s.count.to_string());
                ui.label(s.unique.to_string());
                ui.label(format_top(&s.top));
                let max = match s.mean {
                    Some(mean) => format!("{} (mean {mean:.1})", opt(&s.max)),
                    None => opt(&s.max),
                };
                ui.label(opt(&s.min));
                ui.label(max);
                ui.end_row();
            }
        });
}
