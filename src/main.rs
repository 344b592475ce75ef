mod app;
mod auth;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::PatentLensApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}");
            std::process::exit(2);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Patent Lens",
        options,
        Box::new(move |cc| Ok(Box::new(PatentLensApp::new(cc, config)))),
    )
}
