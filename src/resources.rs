//! Bundled resources addressed by internal `res:/` paths
//!
//! Anything without the `res:/` prefix is treated as a filesystem path, so a
//! user-supplied scene can stand in for the bundled one.

use crate::error::{Error, Result};
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

pub const SCHEME: &str = "res:/";

pub const MAIN_SCENE: &str = "res:/desktop_clock/scene/main.json";
pub const ICON: &str = "res:/desktop_clock/icons/desktop_clock.svg";

const BUNDLED: &[(&str, &str)] = &[
    (MAIN_SCENE, include_str!("../assets/scene/main.json")),
    (ICON, include_str!("../assets/icons/desktop_clock.svg")),
];

/// Look up a bundled resource by its internal path
pub fn bundled(path: &str) -> Option<&'static str> {
    BUNDLED
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, content)| *content)
}

/// Load a resource: bundled for `res:/` paths, otherwise from disk.
pub fn load(path: &str) -> Result<Cow<'static, str>> {
    if path.starts_with(SCHEME) {
        return bundled(path)
            .map(Cow::Borrowed)
            .ok_or_else(|| Error::ResourceNotFound(path.to_string()));
    }

    let file = Path::new(path);
    match std::fs::read_to_string(file) {
        Ok(content) => {
            debug!(path = %file.display(), bytes = content.len(), "Loaded resource from disk");
            Ok(Cow::Owned(content))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(Error::ResourceNotFound(path.to_string()))
        }
        Err(e) => Err(Error::Io {
            path: file.to_path_buf(),
            source: e,
        }),
    }
}
