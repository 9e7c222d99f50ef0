//! App module - the plugin host window and its state

mod host;
mod textures;
mod views;

use host::PluginHost;

use crate::plugin::Plugin;
use crate::settings::Settings;
use crate::theme;
use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    pub(crate) host: PluginHost,
    pub(crate) settings: Settings,
    pub(crate) data_dir: PathBuf,
    // Texture caches, keyed by plugin index
    pub(crate) icon_cache: HashMap<usize, Option<egui::TextureHandle>>,
    pub(crate) preview_cache: HashMap<usize, Vec<egui::TextureHandle>>,
    // Host window geometry, saved on exit
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        plugins: Vec<Box<dyn Plugin>>,
        settings: Settings,
        data_dir: PathBuf,
    ) -> Self {
        // Force dark theme
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        theme::install_fonts(&cc.egui_ctx);
        theme::apply_visuals(&cc.egui_ctx);

        let mut host = PluginHost::new(plugins);
        host.restore(&settings);

        Self {
            host,
            settings,
            data_dir,
            icon_cache: HashMap::new(),
            preview_cache: HashMap::new(),
            window_pos: None,
            window_size: None,
        }
    }

    pub fn save_settings(&mut self) {
        self.settings.window_x = self.window_pos.map(|p| p.x);
        self.settings.window_y = self.window_pos.map(|p| p.y);
        self.settings.window_w = self.window_size.map(|s| s.x);
        self.settings.window_h = self.window_size.map(|s| s.y);
        self.host.store(&mut self.settings);
        self.settings.save(&self.data_dir);
    }
}
