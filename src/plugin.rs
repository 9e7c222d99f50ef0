//! Plugin contract and the desktop clock plugin
//!
//! The host keeps plugins as `Box<dyn Plugin>`, shows their metadata and
//! flips them on and off. Enabling the clock opens its overlay window;
//! disabling it stops the timer and releases the window.

use crate::clock::{LocalClock, TimeSource};
use crate::constants::*;
use crate::error::{Error, Result};
use crate::resources;
use crate::scene::ClockScene;
use crate::window::{ClockWindow, HostingStrategy};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub trait Plugin {
    /// Stable identifier, used as the key in the host's settings
    fn name(&self) -> &str;
    fn display_name(&self) -> &str;
    fn desc(&self) -> &str;
    fn author(&self) -> &str;
    fn version(&self) -> &str;
    fn url(&self) -> &str;
    fn tags(&self) -> &[&str];

    /// Directory the plugin's icons and previews are read from
    fn runtime_path(&self) -> &Path;

    fn icon_path(&self) -> PathBuf;

    /// SVG source of the plugin icon
    fn icon_svg(&self) -> Cow<'static, str>;

    fn preview_images(&self) -> Vec<PathBuf> {
        list_preview_images(&self.runtime_path().join(PREVIEW_DIR))
    }

    fn is_enabled(&self) -> bool;

    /// Enable or disable the plugin. Enabling can fail, in which case the
    /// plugin stays disabled.
    fn set_enabled(&mut self, enabled: bool) -> Result<()>;

    /// Per-frame hook, called by the host while the plugin is enabled
    fn show(&mut self, ctx: &egui::Context);

    /// Plugin-specific options, persisted by the host
    fn config(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    fn apply_config(&mut self, _config: &serde_json::Value) -> Result<()> {
        Ok(())
    }

    /// Extra controls on the plugin's card. Returns the edited options when
    /// the user changed something; the host applies them with `apply_config`.
    fn options_ui(&mut self, _ui: &mut egui::Ui) -> Option<serde_json::Value> {
        None
    }

    /// Short live status for the card, `None` while idle
    fn status(&self) -> Option<String> {
        None
    }
}

/// Files matching `*.*` directly inside `dir`, sorted by path.
///
/// Hidden files are skipped and a missing directory yields an empty list.
pub fn list_preview_images(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "No preview directory");
            return Vec::new();
        }
    };

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| !n.starts_with('.') && n.contains('.'))
                .unwrap_or(false)
        })
        .collect();
    images.sort();
    images
}

/// Options of the clock plugin as stored in the host settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockOptions {
    pub strategy: HostingStrategy,
    pub interval_ms: u64,
    /// `res:/` path of a bundled scene or a path on disk
    pub scene_path: String,
}

impl Default for ClockOptions {
    fn default() -> Self {
        Self {
            strategy: HostingStrategy::default(),
            interval_ms: DEFAULT_TICK.as_millis() as u64,
            scene_path: resources::MAIN_SCENE.to_string(),
        }
    }
}

impl ClockOptions {
    /// Timer period; zero falls back to the default tick
    pub fn interval(&self) -> Duration {
        if self.interval_ms == 0 {
            DEFAULT_TICK
        } else {
            Duration::from_millis(self.interval_ms)
        }
    }
}

pub struct DesktopClock<S: TimeSource + Clone = LocalClock> {
    runtime_path: PathBuf,
    options: ClockOptions,
    source: S,
    enabled: bool,
    window: Option<ClockWindow<S>>,
}

impl DesktopClock<LocalClock> {
    pub fn new(runtime_path: PathBuf) -> Self {
        Self::with_source(runtime_path, LocalClock)
    }
}

impl<S: TimeSource + Clone> DesktopClock<S> {
    pub fn with_source(runtime_path: PathBuf, source: S) -> Self {
        Self {
            runtime_path,
            options: ClockOptions::default(),
            source,
            enabled: false,
            window: None,
        }
    }

    #[cfg(test)]
    pub fn options(&self) -> &ClockOptions {
        &self.options
    }

    pub fn window(&self) -> Option<&ClockWindow<S>> {
        self.window.as_ref()
    }

    /// Replace the options, reopening the window if it is live
    pub fn set_options(&mut self, options: ClockOptions) -> Result<()> {
        if options == self.options {
            return Ok(());
        }
        debug!(?options, "Clock options changed");
        self.options = options;
        if self.enabled {
            self.window = None;
            self.on_change_enabled()?;
        }
        Ok(())
    }

    fn on_change_enabled(&mut self) -> Result<()> {
        if self.enabled {
            let scene = match ClockScene::load(&self.options.scene_path) {
                Ok(scene) => scene,
                Err(e) => {
                    self.enabled = false;
                    return Err(e);
                }
            };
            self.window = Some(ClockWindow::new(
                self.options.strategy,
                scene,
                self.source.clone(),
                self.options.interval(),
                Instant::now(),
            ));
            info!(plugin = PLUGIN_NAME, "Plugin enabled");
        } else if let Some(mut window) = self.window.take() {
            window.close();
            info!(plugin = PLUGIN_NAME, "Plugin disabled");
        }
        Ok(())
    }
}

impl<S: TimeSource + Clone> Plugin for DesktopClock<S> {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn display_name(&self) -> &str {
        PLUGIN_DISPLAY_NAME
    }

    fn desc(&self) -> &str {
        PLUGIN_DESC
    }

    fn author(&self) -> &str {
        PLUGIN_AUTHOR
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    fn url(&self) -> &str {
        PLUGIN_URL
    }

    fn tags(&self) -> &[&str] {
        PLUGIN_TAGS
    }

    fn runtime_path(&self) -> &Path {
        &self.runtime_path
    }

    fn icon_path(&self) -> PathBuf {
        self.runtime_path.join(ICON_FILE)
    }

    fn icon_svg(&self) -> Cow<'static, str> {
        let path = self.icon_path();
        match resources::load(&path.to_string_lossy()) {
            Ok(svg) => svg,
            Err(e) => {
                if !matches!(e, Error::ResourceNotFound(_)) {
                    warn!(error = %e, "Failed to read plugin icon, using bundled one");
                }
                Cow::Borrowed(resources::bundled(resources::ICON).unwrap_or_default())
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if self.enabled == enabled {
            return Ok(());
        }
        self.enabled = enabled;
        self.on_change_enabled()
    }

    fn show(&mut self, ctx: &egui::Context) {
        if let Some(window) = self.window.as_mut() {
            window.show(ctx);
        }
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.options).unwrap_or(serde_json::Value::Null)
    }

    fn apply_config(&mut self, config: &serde_json::Value) -> Result<()> {
        if config.is_null() {
            return Ok(());
        }
        let options: ClockOptions = serde_json::from_value(config.clone())?;
        self.set_options(options)
    }

    fn options_ui(&mut self, ui: &mut egui::Ui) -> Option<serde_json::Value> {
        let mut strategy = self.options.strategy;
        ui.horizontal(|ui| {
            for candidate in HostingStrategy::ALL {
                ui.radio_value(&mut strategy, candidate, candidate.label());
            }
        });
        if strategy == self.options.strategy {
            return None;
        }

        let options = ClockOptions {
            strategy,
            ..self.options.clone()
        };
        serde_json::to_value(options).ok()
    }

    fn status(&self) -> Option<String> {
        let window = self.window()?;
        let time = window
            .scene()
            .time()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "--:--:--".into());
        Some(format!("{} · {}", window.strategy().label(), time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::tests::FixedClock;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "desktop-clock-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn plugin() -> DesktopClock<FixedClock> {
        DesktopClock::with_source(PathBuf::from("/opt/desktop_clock"), FixedClock::at(9, 30, 0))
    }

    #[test]
    fn metadata() {
        let p = plugin();
        assert_eq!(p.name(), "DesktopClock");
        assert_eq!(p.display_name(), "桌面时钟");
        assert_eq!(p.author(), "yaoxuanzhi");
        assert_eq!(p.version(), "v1.0.0");
        assert_eq!(p.url(), "https://github.com/InterwovenCode/desktop_clock");
        assert_eq!(p.tags(), &["clock"]);
        assert_eq!(
            p.icon_path(),
            PathBuf::from("/opt/desktop_clock/icons/desktop_clock.svg")
        );
    }

    #[test]
    fn icon_falls_back_to_bundled() {
        let p = plugin();
        assert!(p.icon_svg().starts_with("<svg"));
    }

    #[test]
    fn preview_listing_is_flat_and_sorted() {
        let dir = temp_dir("previews");
        let preview = dir.join(PREVIEW_DIR);
        std::fs::create_dir_all(preview.join("nested")).unwrap();
        for name in ["b.png", "a.jpg", "README", ".hidden.png"] {
            std::fs::write(preview.join(name), b"x").unwrap();
        }
        std::fs::write(preview.join("nested").join("c.png"), b"x").unwrap();

        let p = DesktopClock::with_source(dir.clone(), FixedClock::default());
        let images = p.preview_images();
        assert_eq!(images, vec![preview.join("a.jpg"), preview.join("b.png")]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_preview_dir_is_empty() {
        assert!(list_preview_images(Path::new("/definitely/not/here")).is_empty());
    }

    #[test]
    fn enable_opens_window_with_eager_update() {
        let mut p = plugin();
        assert!(p.window().is_none());

        p.set_enabled(true).unwrap();
        assert!(p.is_enabled());
        let window = p.window().unwrap();
        assert_eq!(window.scene().updates(), 1);
        assert_eq!(window.strategy(), HostingStrategy::QuickWidget);
        assert!(window.backend().is_running());
    }

    #[test]
    fn disable_releases_window_and_stops_reads() {
        let clock = FixedClock::at(1, 1, 1);
        let mut p = DesktopClock::with_source(PathBuf::from("."), clock.clone());
        p.set_enabled(true).unwrap();
        let reads = clock.reads.get();

        p.set_enabled(false).unwrap();
        assert!(!p.is_enabled());
        assert!(p.window().is_none());

        // Nothing left to poll: showing is a no-op and the clock is never read again
        let ctx = egui::Context::default();
        let _ = ctx.run(Default::default(), |ctx| p.show(ctx));
        assert_eq!(clock.reads.get(), reads);
    }

    #[test]
    fn enabling_twice_keeps_the_same_window() {
        let clock = FixedClock::at(1, 1, 1);
        let mut p = DesktopClock::with_source(PathBuf::from("."), clock.clone());
        p.set_enabled(true).unwrap();
        p.set_enabled(true).unwrap();
        assert_eq!(clock.reads.get(), 1);
    }

    #[test]
    fn missing_scene_keeps_plugin_disabled() {
        let mut p = plugin();
        p.set_options(ClockOptions {
            scene_path: "res:/desktop_clock/scene/missing.json".into(),
            ..ClockOptions::default()
        })
        .unwrap();

        let err = p.set_enabled(true).unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound(_)));
        assert!(!p.is_enabled());
        assert!(p.window().is_none());
    }

    #[test]
    fn config_switches_strategy_of_live_window() {
        let mut p = plugin();
        p.set_enabled(true).unwrap();

        let config = serde_json::json!({ "strategy": "quick_view" });
        p.apply_config(&config).unwrap();
        assert_eq!(p.options().strategy, HostingStrategy::QuickView);
        assert_eq!(p.options().interval(), DEFAULT_TICK);
        assert_eq!(p.window().unwrap().strategy(), HostingStrategy::QuickView);

        assert_eq!(p.config()["strategy"], "quick_view");
    }

    #[test]
    fn strategy_edit_is_returned_not_applied() {
        let mut p = plugin();
        p.set_enabled(true).unwrap();

        let ctx = egui::Context::default();
        let mut edited = None;
        let _ = ctx.run(Default::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| edited = p.options_ui(ui));
        });
        // No click happened, so nothing changed
        assert!(edited.is_none());
        assert_eq!(p.options().strategy, HostingStrategy::QuickWidget);
    }

    #[test]
    fn status_shows_strategy_and_last_reading() {
        let mut p = plugin();
        assert_eq!(p.status(), None);

        p.set_enabled(true).unwrap();
        assert_eq!(p.status().as_deref(), Some("Quick widget · 09:30:00"));

        p.set_enabled(false).unwrap();
        assert_eq!(p.status(), None);
    }

    #[test]
    fn bad_config_is_rejected() {
        let mut p = plugin();
        let err = p
            .apply_config(&serde_json::json!({ "strategy": "hologram" }))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(p.options(), &ClockOptions::default());
    }

    #[test]
    fn zero_interval_uses_default_tick() {
        let options = ClockOptions {
            interval_ms: 0,
            ..ClockOptions::default()
        };
        assert_eq!(options.interval(), Duration::from_millis(100));
    }
}
