//! Domain errors of the editor core.
//!
//! None of these are fatal: asset errors are contained inside a compositor
//! pass, layer errors are returned to the collaborator that issued the call.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a user-supplied asset (image or font).
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("font '{0}' not found in any font directory")]
    FontNotFound(String),

    #[error("failed to parse font '{name}': {reason}")]
    FontParse { name: String, reason: String },
}

/// Which layer list an index refers to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LayerKind {
    Text,
    Icon,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Text => f.write_str("text"),
            LayerKind::Icon => f.write_str("icon"),
        }
    }
}

/// Rejected index-based layer mutation.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LayerError {
    #[error("{kind} layer index {index} out of range (len {len})")]
    IndexOutOfRange { kind: LayerKind, index: usize, len: usize },
}
