//! Error kinds surfaced by the lab.
//!
//! None of these are fatal: request handlers log them and leave the lab in a
//! usable state.

use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabError {
    /// The model asset could not be loaded or deserialized.
    #[error("failed to load model '{key}' from {path}: {reason}")]
    AssetLoadFailure {
        key: String,
        path: String,
        reason: String,
    },

    #[error("unknown model key '{0}' (expected one of: d6, d12, coin)")]
    UnknownAssetKey(String),

    #[error("unknown theme key '{0}'")]
    UnknownThemeKey(String),

    /// A part has no captured rest pose; its animation is skipped.
    #[error("part {0:?} has no captured original state")]
    MissingOriginalState(Entity),

    /// The model has no measurable extent.
    #[error("model bounds are degenerate")]
    DegenerateBounds,

    #[error("invalid configuration {path}: {reason}")]
    Config { path: String, reason: String },
}

pub type LabResult<T> = Result<T, LabError>;
