//! Plugin card rendering

use super::App;
use crate::theme;
use crate::ui::components::{styled_checkbox, tag_chip};
use eframe::egui;
use tracing::warn;

impl App {
    pub fn render_plugin_list(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for idx in 0..self.host.entries().len() {
                    self.render_plugin_card(ui, ctx, idx);
                    ui.add_space(theme::SPACING_MD);
                }
            });
    }

    fn render_plugin_card(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, idx: usize) {
        let icon = self.load_icon(ctx, idx);
        let previews = self.load_previews(ctx, idx);
        let mut toggled = None;
        let mut edited_config = None;

        theme::card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            let entry = &mut self.host.entries_mut()[idx];
            let enabled = entry.plugin.is_enabled();

            ui.horizontal(|ui| {
                if let Some(icon) = &icon {
                    ui.add(
                        egui::Image::new(icon)
                            .fit_to_exact_size(egui::vec2(theme::ICON_SIZE, theme::ICON_SIZE)),
                    );
                }
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(entry.plugin.display_name())
                                .size(theme::FONT_TITLE)
                                .color(theme::TEXT_PRIMARY)
                                .strong(),
                        );
                        ui.label(
                            egui::RichText::new(entry.plugin.version())
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_MUTED),
                        );
                    });
                    ui.label(
                        egui::RichText::new(format!(
                            "{} · {}",
                            entry.plugin.name(),
                            entry.plugin.author()
                        ))
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_MUTED),
                    );
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if styled_checkbox(ui, enabled, theme::TOGGLE_SIZE)
                        .on_hover_text(if enabled { "Disable" } else { "Enable" })
                        .clicked()
                    {
                        toggled = Some(!enabled);
                    }
                });
            });

            ui.add_space(theme::SPACING_SM);
            ui.label(
                egui::RichText::new(entry.plugin.desc())
                    .size(theme::FONT_BODY)
                    .color(theme::TEXT_SECONDARY),
            );

            ui.horizontal_wrapped(|ui| {
                for tag in entry.plugin.tags() {
                    tag_chip(ui, tag);
                }
                let link = ui.link(format!("{} Homepage", egui_phosphor::regular::LINK));
                if link.on_hover_text(entry.plugin.url()).clicked() {
                    if let Err(e) = open::that(entry.plugin.url()) {
                        warn!(url = entry.plugin.url(), error = %e, "Failed to open homepage");
                    }
                }
            });

            edited_config = entry.plugin.options_ui(ui);
            if let Some(status) = entry.plugin.status() {
                ui.label(
                    egui::RichText::new(format!("{} {}", egui_phosphor::regular::CLOCK, status))
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_MUTED),
                );
            }

            if !previews.is_empty() {
                ui.add_space(theme::SPACING_SM);
                egui::ScrollArea::horizontal()
                    .id_salt(("previews", idx))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            for texture in &previews {
                                let size = texture.size_vec2();
                                let scale = theme::PREVIEW_HEIGHT / size.y.max(1.0);
                                ui.add(
                                    egui::Image::new(texture)
                                        .fit_to_exact_size(size * scale)
                                        .corner_radius(theme::RADIUS_DEFAULT),
                                );
                            }
                        });
                    });
            }

            if let Some(message) = &entry.error {
                ui.add_space(theme::SPACING_SM);
                ui.label(
                    egui::RichText::new(format!("{} {}", egui_phosphor::regular::WARNING, message))
                        .color(theme::STATUS_ERROR),
                );
            }
        });

        if let Some(enabled) = toggled {
            self.host.set_enabled(idx, enabled);
            self.save_settings();
        } else if let Some(config) = edited_config {
            self.host.apply_config(idx, &config);
            self.save_settings();
        }
    }
}
