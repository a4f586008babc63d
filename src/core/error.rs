use crate::core::types::{ItemId, ProcessKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CroftError {
    #[error("Content error: {0}")]
    ContentError(String),

    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    #[error("Prerequisite cycle involving: {0:?}")]
    PrerequisiteCycle(Vec<ItemId>),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Insufficient {resource}: required {required}, available {available}")]
    InsufficientResource {
        resource: String,
        required: f64,
        available: f64,
    },

    #[error("Process rejected ({kind}): {reason}")]
    ProcessRejected { kind: ProcessKind, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Override error: {0}")]
    OverrideError(String),

    #[error("System error in {system}: {detail}")]
    SystemError { system: String, detail: String },

    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    #[error("Host channel closed")]
    HostChannelClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CroftError>;
