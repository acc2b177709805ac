//! Shared bootstrap pieces for the booklist binaries.

pub mod settings;

pub use settings::{
    Environment, LogFormat, Settings, StorageBackend, StorageSettings, TelemetrySettings,
};
