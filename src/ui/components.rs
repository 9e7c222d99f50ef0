//! Reusable UI components

use crate::theme;
use eframe::egui;

/// Custom checkbox widget used as the plugin enable toggle
pub fn styled_checkbox(ui: &mut egui::Ui, selected: bool, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        let rounding = 3.0;

        if selected {
            // Filled checkbox
            painter.rect_filled(rect, rounding, theme::ACCENT);
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::CHECK,
                egui::FontId::proportional(size * 0.7),
                egui::Color32::WHITE,
            );
        } else {
            // Empty checkbox
            painter.rect_stroke(
                rect,
                rounding,
                egui::Stroke::new(1.5, theme::BORDER_DEFAULT),
                egui::StrokeKind::Inside,
            );
        }
    }

    response
}

/// Small rounded label for a plugin tag
pub fn tag_chip(ui: &mut egui::Ui, tag: &str) -> egui::Response {
    egui::Frame::new()
        .fill(theme::ACCENT_MUTED)
        .corner_radius(theme::RADIUS_DEFAULT)
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(format!("#{tag}"))
                    .size(theme::FONT_SMALL)
                    .color(theme::TEXT_SECONDARY),
            );
        })
        .response
}
