#![windows_subsystem = "windows"]
//! Desktop Clock - plugin host entry point

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;
mod clock;
mod constants;
mod error;
mod plugin;
mod resources;
mod scene;
mod settings;
mod theme;
mod ui;
mod utils;
mod window;

use app::App;
use constants::*;
use eframe::egui;
use plugin::{DesktopClock, Plugin};
use tracing::{info, warn};
use utils::{get_data_dir, rasterize_svg_square};

/// Initialize file logging. Returns a guard that must be held for the app lifetime.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, EnvFilter, prelude::*};

    let logs_dir = data_dir.join("logs");
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "desktop-clock.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,desktop_clock=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    guard
}

fn main() -> eframe::Result<()> {
    let data_dir = get_data_dir();
    std::fs::create_dir_all(&data_dir).ok();

    // Initialize logging - guard must live for entire app lifetime
    let _log_guard = init_logging(&data_dir);

    info!(version = APP_VERSION, "Desktop Clock starting");

    let settings = settings::Settings::load(&data_dir);
    let runtime_path = settings.plugin_dir_or_default();
    info!(path = %runtime_path.display(), "Plugin runtime path");

    let clock = DesktopClock::new(runtime_path);

    let win_pos = match (settings.window_x, settings.window_y) {
        (Some(x), Some(y)) => Some(egui::pos2(x, y)),
        _ => None,
    };
    let win_size = match (settings.window_w, settings.window_h) {
        (Some(w), Some(h)) => Some(egui::vec2(w, h)),
        _ => None,
    };

    // The root surface must allow alpha so the overlay viewport can be see-through
    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size(win_size.unwrap_or(theme::HOST_WINDOW_SIZE.into()))
        .with_min_inner_size([420.0, 260.0])
        .with_transparent(true)
        .with_title(APP_NAME);

    // Set window/taskbar icon from the plugin icon
    match rasterize_svg_square(&clock.icon_svg(), 64) {
        Ok((rgba, width, height)) => {
            let icon = egui::IconData { rgba, width, height };
            viewport = viewport.with_icon(std::sync::Arc::new(icon));
        }
        Err(e) => warn!(error = %e, "Failed to build window icon"),
    }

    if let Some(pos) = win_pos {
        viewport = viewport.with_position(pos);
    }

    let hardware_acceleration = if settings.software_rendering {
        info!("Software rendering requested");
        eframe::HardwareAcceleration::Off
    } else {
        eframe::HardwareAcceleration::Preferred
    };

    let options = eframe::NativeOptions {
        viewport,
        hardware_acceleration,
        ..Default::default()
    };

    let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(clock)];

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, plugins, settings, data_dir)))),
    )
}

// ============================================================================
// MAIN UPDATE LOOP
// ============================================================================

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Track window position/size for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().outer_rect {
                self.window_pos = Some(rect.min);
            }
            if let Some(rect) = i.viewport().inner_rect {
                self.window_size = Some(rect.size());
            }
        });

        // Plugin overlays run off the host's frame loop
        self.host.show(ctx);

        egui::TopBottomPanel::top("header")
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::symmetric(16, 12)),
            )
            .show_separator_line(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("{} Plugins", egui_phosphor::regular::PUZZLE_PIECE))
                            .size(theme::FONT_TITLE)
                            .color(theme::TEXT_PRIMARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("v{}", APP_VERSION))
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_MUTED),
                        );
                    });
                });
            });

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                self.render_plugin_list(ui, ctx);
            });
    }

    // Transparent so overlay viewports show the desktop; host panels paint their own fill
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application shutting down");
        self.save_settings();
        self.host.shutdown();
    }
}
