//! Error types for loading the clock's resources and scene

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scene {path}: {source}")]
    SceneParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("Invalid color {0:?}, expected #RRGGBB or #AARRGGBB")]
    InvalidColor(String),

    #[error("Invalid plugin configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to load icon: {0}")]
    Icon(String),
}

pub type Result<T> = std::result::Result<T, Error>;
