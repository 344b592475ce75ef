use eframe::egui;

use crate::config::AppConfig;
use crate::state::{AppState, Page};
use crate::ui::{gate, panels, plot, search, ACCENT};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PatentLensApp {
    pub state: AppState,
}

impl PatentLensApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.selection.bg_fill = ACCENT;
        cc.egui_ctx.set_visuals(visuals);

        let startup_path = config.data_path.clone();
        let mut state = AppState::new(config);
        if let Some(path) = startup_path {
            state.load_path(&path);
        }
        Self { state }
    }
}

impl eframe::App for PatentLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.state.authenticated {
            egui::CentralPanel::default().show(ctx, |ui| {
                gate::gate_screen(ui, &mut self.state);
            });
            return;
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("nav_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: search or analysis ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Search => search::search_page(ui, &mut self.state),
            Page::Analysis => plot::analysis_page(ui, &mut self.state),
        });
    }
}
