//! Configuration management for portprobe.
//!
//! Provides XDG-compliant application settings and the key/value store
//! exposed through the `config` command and the HTTP endpoint.

mod settings;
mod store;

pub use settings::{AppSettings, Paths};
pub use store::ConfigStore;
