//! Overlay window: hosting strategies, flags and bottom-right placement
//!
//! The clock lives in its own borderless, always-on-top viewport that ignores
//! pointer input. Three hosting strategies exist. They differ only in their
//! margins, background and input flags, and exactly one is active at a time.

use crate::clock::{Backend, Hms, TimeSource};
use crate::scene::ClockScene;
use egui::{Color32, Pos2, Rect, Vec2, ViewportBuilder, ViewportClass, ViewportId};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const WINDOW_TITLE: &str = "DesktopClock";

/// Tinted panel behind the face for the scene-embedding strategy
const SCENE_PANEL_FILL: Color32 = Color32::from_rgba_premultiplied(0x1d, 0x1d, 0x1d, 0xE3);

/// How the clock's rendering surface is hosted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostingStrategy {
    /// Face embedded in a scene inside a tinted tool window, flush with the corner
    GraphicsScene,
    /// Face drawn directly into a transparent tool window
    #[default]
    QuickWidget,
    /// Standalone transparent surface, lifted clear of a bottom taskbar
    QuickView,
}

impl HostingStrategy {
    pub const ALL: [HostingStrategy; 3] = [
        HostingStrategy::GraphicsScene,
        HostingStrategy::QuickWidget,
        HostingStrategy::QuickView,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HostingStrategy::GraphicsScene => "Graphics scene",
            HostingStrategy::QuickWidget => "Quick widget",
            HostingStrategy::QuickView => "Quick view",
        }
    }

    pub fn margins(self) -> Margins {
        match self {
            HostingStrategy::GraphicsScene => Margins::ZERO,
            HostingStrategy::QuickWidget => Margins::uniform(12.0),
            HostingStrategy::QuickView => Margins {
                right: 12.0,
                bottom: 48.0,
            },
        }
    }

    pub fn flags(self) -> WindowFlags {
        let base = WindowFlags {
            frameless: true,
            always_on_top: true,
            translucent_background: true,
            transparent_for_mouse: false,
            transparent_for_input: false,
            tool: false,
        };
        match self {
            HostingStrategy::GraphicsScene => WindowFlags {
                transparent_for_mouse: true,
                transparent_for_input: true,
                tool: true,
                ..base
            },
            HostingStrategy::QuickWidget => WindowFlags {
                transparent_for_mouse: true,
                tool: true,
                ..base
            },
            HostingStrategy::QuickView => WindowFlags {
                transparent_for_input: true,
                ..base
            },
        }
    }

    pub fn background(self) -> Color32 {
        match self {
            HostingStrategy::GraphicsScene => SCENE_PANEL_FILL,
            HostingStrategy::QuickWidget | HostingStrategy::QuickView => Color32::TRANSPARENT,
        }
    }
}

/// Inset of the window's bottom-right corner from the screen's
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub right: f32,
    pub bottom: f32,
}

impl Margins {
    pub const ZERO: Margins = Margins {
        right: 0.0,
        bottom: 0.0,
    };

    pub fn uniform(margin: f32) -> Self {
        Self {
            right: margin,
            bottom: margin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFlags {
    pub frameless: bool,
    pub always_on_top: bool,
    pub translucent_background: bool,
    pub transparent_for_mouse: bool,
    /// Never receives pointer or keyboard input
    pub transparent_for_input: bool,
    /// Tool windows stay out of the taskbar
    pub tool: bool,
}

impl WindowFlags {
    pub fn ignores_pointer(&self) -> bool {
        self.transparent_for_mouse || self.transparent_for_input
    }

    pub fn apply(&self, builder: ViewportBuilder) -> ViewportBuilder {
        let mut builder = builder
            .with_decorations(!self.frameless)
            .with_transparent(self.translucent_background)
            .with_mouse_passthrough(self.ignores_pointer())
            .with_taskbar(!self.tool)
            .with_resizable(false);
        if self.always_on_top {
            builder = builder.with_window_level(egui::WindowLevel::AlwaysOnTop);
        }
        if self.transparent_for_input {
            builder = builder.with_active(false);
        }
        builder
    }
}

/// Top-left origin that puts the window's bottom-right corner at the
/// screen's bottom-right corner, inset by `margins`
pub fn bottom_right_origin(screen: Vec2, window: Vec2, margins: Margins) -> Pos2 {
    egui::pos2(
        screen.x - window.x - margins.right,
        screen.y - window.y - margins.bottom,
    )
}

/// Bottom-right placement inside the host window, for backends that draw
/// viewports embedded in the root one
pub fn embedded_origin(host: Rect, window: Vec2, margins: Margins) -> Pos2 {
    host.min + bottom_right_origin(host.size(), window, margins).to_vec2()
}

/// The live overlay: a scene, the backend feeding it, and its viewport
pub struct ClockWindow<S: TimeSource> {
    strategy: HostingStrategy,
    scene: ClockScene,
    backend: Backend<S>,
    viewport_id: ViewportId,
}

impl<S: TimeSource> ClockWindow<S> {
    /// Bind `scene` to a fresh backend and push one reading straight away so
    /// the first frame already shows the time.
    pub fn new(
        strategy: HostingStrategy,
        mut scene: ClockScene,
        source: S,
        interval: Duration,
        now: Instant,
    ) -> Self {
        let mut backend = Backend::new(source, interval, now);
        let first = backend.update_time(&mut scene);
        info!(strategy = strategy.label(), time = %first, "Clock window created");
        Self {
            strategy,
            scene,
            backend,
            viewport_id: ViewportId::from_hash_of(WINDOW_TITLE),
        }
    }

    pub fn strategy(&self) -> HostingStrategy {
        self.strategy
    }

    pub fn scene(&self) -> &ClockScene {
        &self.scene
    }

    #[cfg(test)]
    pub fn backend(&self) -> &Backend<S> {
        &self.backend
    }

    pub fn size(&self) -> Vec2 {
        self.scene.scene().size()
    }

    pub fn origin(&self, screen: Vec2) -> Pos2 {
        bottom_right_origin(screen, self.size(), self.strategy.margins())
    }

    /// Forward a reading to the scene if the timer is due
    pub fn tick(&mut self, now: Instant) -> Option<Hms> {
        self.backend.poll(now, &mut self.scene)
    }

    pub fn viewport_builder(&self, screen: Vec2) -> ViewportBuilder {
        let builder = ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(self.size())
            .with_position(self.origin(screen));
        self.strategy.flags().apply(builder)
    }

    /// Advance the clock and draw the overlay. Called from the host's update.
    pub fn show(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.tick(now);
        if let Some(delay) = self.backend.remaining(now) {
            ctx.request_repaint_after(delay);
        }

        // Placement needs the monitor size, which arrives after the first frame.
        // winit reports the monitor the host window is on, which is the primary
        // screen unless the host was moved to another one.
        let Some(screen) = ctx.input(|i| i.viewport().monitor_size) else {
            return;
        };

        let builder = self.viewport_builder(screen);
        let size = self.size();
        let margins = self.strategy.margins();
        let background = self.strategy.background();
        let scene = &self.scene;

        ctx.show_viewport_immediate(self.viewport_id, builder, |ctx, class| {
            if class == ViewportClass::Embedded {
                // No native multi-window support: draw in the host's corner instead
                egui::Area::new(egui::Id::new(WINDOW_TITLE))
                    .fixed_pos(embedded_origin(ctx.screen_rect(), size, margins))
                    .interactable(false)
                    .show(ctx, |ui| {
                        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                        ui.painter().rect_filled(rect, 0.0, background);
                        scene.paint(ui.painter(), rect);
                    });
                return;
            }

            egui::CentralPanel::default()
                .frame(egui::Frame::new().fill(background))
                .show(ctx, |ui| {
                    scene.paint(ui.painter(), ui.max_rect());
                });
        });
    }

    pub fn close(&mut self) {
        self.backend.stop();
    }
}

impl<S: TimeSource> Drop for ClockWindow<S> {
    fn drop(&mut self) {
        self.close();
        debug!(emitted = self.backend.emitted(), "Clock window released");
    }
}
