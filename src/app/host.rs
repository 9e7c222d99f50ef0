//! Plugin registry: lifecycle, persistence and per-frame dispatch

use crate::error::Result;
use crate::plugin::Plugin;
use crate::settings::Settings;
use eframe::egui;
use tracing::{error, info, warn};

pub struct PluginEntry {
    pub plugin: Box<dyn Plugin>,
    /// Last lifecycle failure, shown on the plugin's card
    pub error: Option<String>,
}

impl PluginEntry {
    /// Keep the outcome of a lifecycle call on the entry
    fn record(&mut self, action: &str, result: Result<()>) -> bool {
        match result {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(e) => {
                error!(plugin = self.plugin.name(), action, error = %e, "Plugin state change failed");
                self.error = Some(e.to_string());
                false
            }
        }
    }
}

pub struct PluginHost {
    entries: Vec<PluginEntry>,
}

impl PluginHost {
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self {
            entries: plugins
                .into_iter()
                .map(|plugin| PluginEntry {
                    plugin,
                    error: None,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[PluginEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [PluginEntry] {
        &mut self.entries
    }

    /// Apply stored plugin options and re-enable what was enabled last run
    pub fn restore(&mut self, settings: &Settings) {
        for idx in 0..self.entries.len() {
            let entry = &mut self.entries[idx];
            let name = entry.plugin.name().to_string();
            if let Some(config) = settings.plugin_config.get(&name) {
                if let Err(e) = entry.plugin.apply_config(config) {
                    warn!(plugin = %name, error = %e, "Ignoring stored plugin options");
                    entry.error = Some(e.to_string());
                }
            }
            if settings.is_enabled(&name) {
                self.set_enabled(idx, true);
            }
        }
    }

    /// Flip a plugin on or off. Failures are logged and kept on the entry.
    pub fn set_enabled(&mut self, idx: usize, enabled: bool) -> bool {
        let Some(entry) = self.entries.get_mut(idx) else {
            return false;
        };
        let result = entry.plugin.set_enabled(enabled);
        entry.record(if enabled { "enable" } else { "disable" }, result)
    }

    /// Apply options edited on a plugin's card. A live plugin that cannot
    /// reopen ends up disabled, with the failure kept on the entry.
    pub fn apply_config(&mut self, idx: usize, config: &serde_json::Value) -> bool {
        let Some(entry) = self.entries.get_mut(idx) else {
            return false;
        };
        let result = entry.plugin.apply_config(config);
        entry.record("configure", result)
    }

    /// Run the per-frame hook of every enabled plugin
    pub fn show(&mut self, ctx: &egui::Context) {
        for entry in self.entries.iter_mut().filter(|e| e.plugin.is_enabled()) {
            entry.plugin.show(ctx);
        }
    }

    pub fn store(&self, settings: &mut Settings) {
        settings.enabled_plugins = self
            .entries
            .iter()
            .filter(|e| e.plugin.is_enabled())
            .map(|e| e.plugin.name().to_string())
            .collect();
        for entry in &self.entries {
            let config = entry.plugin.config();
            if !config.is_null() {
                settings
                    .plugin_config
                    .insert(entry.plugin.name().to_string(), config);
            }
        }
    }

    /// Disable everything, releasing plugin windows
    pub fn shutdown(&mut self) {
        for idx in 0..self.entries.len() {
            if self.entries[idx].plugin.is_enabled() {
                self.set_enabled(idx, false);
            }
        }
        info!(count = self.entries.len(), "Plugins shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::tests::FixedClock;
    use crate::plugin::{ClockOptions, DesktopClock};
    use crate::resources;
    use crate::window::HostingStrategy;
    use std::path::PathBuf;

    fn host_with_clock(clock: FixedClock) -> PluginHost {
        PluginHost::new(vec![Box::new(DesktopClock::with_source(
            PathBuf::from("."),
            clock,
        ))])
    }

    #[test]
    fn restore_enables_and_configures() {
        let mut settings = Settings::default();
        settings.enabled_plugins.push("DesktopClock".into());
        settings.plugin_config.insert(
            "DesktopClock".into(),
            serde_json::json!({ "strategy": "graphics_scene", "interval_ms": 250 }),
        );

        let mut host = host_with_clock(FixedClock::at(5, 6, 7));
        host.restore(&settings);

        let entry = &host.entries()[0];
        assert!(entry.plugin.is_enabled());
        assert!(entry.error.is_none());
        assert_eq!(entry.plugin.config()["strategy"], "graphics_scene");
        assert_eq!(entry.plugin.config()["interval_ms"], 250);
    }

    #[test]
    fn failed_enable_is_reported_on_entry() {
        let mut settings = Settings::default();
        settings.enabled_plugins.push("DesktopClock".into());
        settings.plugin_config.insert(
            "DesktopClock".into(),
            serde_json::to_value(ClockOptions {
                scene_path: "res:/desktop_clock/scene/gone.json".into(),
                ..ClockOptions::default()
            })
            .unwrap(),
        );

        let mut host = host_with_clock(FixedClock::default());
        host.restore(&settings);

        let entry = &host.entries()[0];
        assert!(!entry.plugin.is_enabled());
        assert!(entry.error.as_deref().unwrap().contains("gone.json"));
    }

    #[test]
    fn store_records_enabled_plugins_and_options() {
        let mut host = host_with_clock(FixedClock::default());
        assert!(host.set_enabled(0, true));

        let mut settings = Settings::default();
        host.store(&mut settings);
        assert_eq!(settings.enabled_plugins, vec!["DesktopClock".to_string()]);
        let stored: ClockOptions =
            serde_json::from_value(settings.plugin_config["DesktopClock"].clone()).unwrap();
        assert_eq!(stored.strategy, HostingStrategy::QuickWidget);

        host.shutdown();
        host.store(&mut settings);
        assert!(settings.enabled_plugins.is_empty());
    }

    #[test]
    fn shutdown_stops_clock_reads() {
        let clock = FixedClock::at(0, 0, 0);
        let mut host = host_with_clock(clock.clone());
        host.set_enabled(0, true);
        host.shutdown();

        let reads = clock.reads.get();
        let ctx = egui::Context::default();
        let _ = ctx.run(Default::default(), |ctx| host.show(ctx));
        assert_eq!(clock.reads.get(), reads);
        assert!(!host.entries()[0].plugin.is_enabled());
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut host = host_with_clock(FixedClock::default());
        assert!(!host.set_enabled(3, true));
        assert!(!host.apply_config(3, &serde_json::Value::Null));
    }

    #[test]
    fn failed_reopen_after_option_change_is_reported() {
        let dir = std::env::temp_dir().join(format!("desktop-clock-reopen-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let scene_file = dir.join("face.json");
        std::fs::write(&scene_file, resources::bundled(resources::MAIN_SCENE).unwrap()).unwrap();

        let mut options = ClockOptions {
            scene_path: scene_file.to_string_lossy().into_owned(),
            ..ClockOptions::default()
        };
        let mut host = host_with_clock(FixedClock::at(4, 5, 6));
        assert!(host.apply_config(0, &serde_json::to_value(&options).unwrap()));
        assert!(host.set_enabled(0, true));

        std::fs::remove_file(&scene_file).unwrap();
        options.strategy = HostingStrategy::QuickView;
        assert!(!host.apply_config(0, &serde_json::to_value(&options).unwrap()));

        let entry = &host.entries()[0];
        assert!(!entry.plugin.is_enabled());
        assert!(entry.plugin.status().is_none());
        assert!(entry.error.as_deref().unwrap().contains("face.json"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
