use eframe::egui::Color32;

pub mod gate;
pub mod panels;
pub mod plot;
pub mod search;

/// Accent used for headings and selections.
pub const ACCENT: Color32 = Color32::from_rgb(0xFF, 0x8C, 0x00);
