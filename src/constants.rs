//! Application constants and plugin metadata

use std::time::Duration;

pub const APP_NAME: &str = "Desktop Clock";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// Plugin metadata shown by the host
pub const PLUGIN_NAME: &str = "DesktopClock";
pub const PLUGIN_DISPLAY_NAME: &str = "桌面时钟";
pub const PLUGIN_DESC: &str = "给桌面右下角添加一个时钟挂件";
pub const PLUGIN_AUTHOR: &str = "yaoxuanzhi";
pub const PLUGIN_VERSION: &str = "v1.0.0";
pub const PLUGIN_URL: &str = "https://github.com/InterwovenCode/desktop_clock";
pub const PLUGIN_TAGS: &[&str] = &["clock"];

/// Layout of a plugin's runtime directory
pub const ICON_FILE: &str = "icons/desktop_clock.svg";
pub const PREVIEW_DIR: &str = "preview";

/// 1/10th of a second
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);
