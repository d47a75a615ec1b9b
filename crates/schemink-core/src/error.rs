//! Error types shared across the core.

use crate::ids::ItemId;
use crate::shapes::ItemKind;
use thiserror::Error;

/// Errors raised while reading or applying item property trees.
#[derive(Debug, Error)]
pub enum PropertiesError {
    #[error("Malformed item properties: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Properties of a {found} cannot be applied to a {expected}")]
    TypeMismatch { expected: ItemKind, found: ItemKind },
}

/// Errors raised by scene graph operations.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),
    #[error("Item {0} is not a link")]
    NotALink(ItemId),
    #[error("Link {0} is already connected")]
    AlreadyConnected(ItemId),
    #[error("Link {0} cannot be connected to itself")]
    SelfConnection(ItemId),
    #[error(transparent)]
    Properties(#[from] PropertiesError),
}

/// Errors raised while loading editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
