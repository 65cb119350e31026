//! Durable storage: key-value stores, snapshot blobs, and app configuration.

pub mod config;
pub mod kv;
pub mod snapshot;

pub use config::{load_config, save_config, AppConfig, ConfigError};
pub use kv::{Database, KeyValueStore, MemoryStore, PersistenceFailure};
pub use snapshot::SnapshotStore;
