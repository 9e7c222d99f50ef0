//! Plugin icon and preview image textures

use super::App;
use crate::utils::rasterize_svg_square;
use eframe::egui;
use tracing::{debug, warn};

/// Icons are rasterised at twice their display size for HiDPI screens
const ICON_PIXELS: u32 = 96;

impl App {
    pub fn load_icon(&mut self, ctx: &egui::Context, idx: usize) -> Option<egui::TextureHandle> {
        if let Some(cached) = self.icon_cache.get(&idx) {
            return cached.clone();
        }

        let entry = self.host.entries().get(idx)?;
        let svg = entry.plugin.icon_svg();
        let texture = match rasterize_svg_square(&svg, ICON_PIXELS) {
            Ok((rgba, w, h)) => Some(ctx.load_texture(
                format!("{}_icon", entry.plugin.name()),
                egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &rgba),
                egui::TextureOptions::LINEAR,
            )),
            Err(e) => {
                warn!(plugin = entry.plugin.name(), error = %e, "Failed to rasterize plugin icon");
                None
            }
        };
        self.icon_cache.insert(idx, texture.clone());
        texture
    }

    pub fn load_previews(&mut self, ctx: &egui::Context, idx: usize) -> Vec<egui::TextureHandle> {
        if let Some(cached) = self.preview_cache.get(&idx) {
            return cached.clone();
        }

        let Some(entry) = self.host.entries().get(idx) else {
            return Vec::new();
        };
        let paths = entry.plugin.preview_images();
        debug!(plugin = entry.plugin.name(), count = paths.len(), "Loading preview images");

        let textures: Vec<egui::TextureHandle> = paths
            .iter()
            .filter_map(|path| match image::open(path) {
                Ok(img) => {
                    let rgba = img.to_rgba8();
                    let size = [rgba.width() as usize, rgba.height() as usize];
                    let pixels = rgba.into_raw();
                    Some(ctx.load_texture(
                        path.to_string_lossy(),
                        egui::ColorImage::from_rgba_unmultiplied(size, &pixels),
                        egui::TextureOptions::LINEAR,
                    ))
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable preview image");
                    None
                }
            })
            .collect();
        self.preview_cache.insert(idx, textures.clone());
        textures
    }
}
