//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod network;
mod port;

pub use network::Network;
pub use port::{Port, PortError, PortRange};
