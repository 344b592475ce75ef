use eframe::egui::{self, Color32, RichText, Ui};

use super::ACCENT;
use crate::state::AppState;

/// Passcode screen shown until the session is authenticated.
pub fn gate_screen(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(ui.available_height() * 0.25);
        ui.heading(RichText::new("SECURITY GATEWAY").color(ACCENT).strong());
        ui.add_space(12.0);

        let response = ui.add(
            egui::TextEdit::singleline(&mut state.passcode_input)
                .password(true)
                .hint_text("Enter passcode")
                .desired_width(260.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.add_space(8.0);
        if ui.button("Authenticate").clicked() || submitted {
            state.try_authenticate();
        }

        if let Some(msg) = &state.status_message {
            ui.add_space(8.0);
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
