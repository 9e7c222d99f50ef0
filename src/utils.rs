//! Utility functions

use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use std::path::PathBuf;

/// Rasterize an SVG to a square RGBA image (straight alpha).
pub fn rasterize_svg_square(svg: &str, size: u32) -> Result<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(svg, &resvg::usvg::Options::default())
        .map_err(|e| Error::Icon(e.to_string()))?;
    let scale = size as f32 / tree.size().width().max(tree.size().height());
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)
        .ok_or_else(|| Error::Icon(format!("invalid icon size {size}")))?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Directory holding settings and logs
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Directory of the running executable, used as the default plugin runtime path
pub fn get_exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources;

    #[test]
    fn bundled_icon_rasterizes() {
        let svg = resources::bundled(resources::ICON).unwrap();
        let (rgba, w, h) = rasterize_svg_square(svg, 32).unwrap();
        assert_eq!((w, h), (32, 32));
        assert_eq!(rgba.len(), 32 * 32 * 4);
        // Center of the dial is opaque
        let center = ((16 * 32 + 16) * 4) as usize;
        assert_eq!(rgba[center + 3], 255);
    }

    #[test]
    fn broken_svg_is_an_icon_error() {
        assert!(matches!(
            rasterize_svg_square("<svg", 16),
            Err(Error::Icon(_))
        ));
    }

    #[test]
    fn zero_size_is_an_icon_error() {
        let svg = resources::bundled(resources::ICON).unwrap();
        assert!(matches!(rasterize_svg_square(svg, 0), Err(Error::Icon(_))));
    }
}
