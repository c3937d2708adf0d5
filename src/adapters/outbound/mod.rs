//! Outbound adapters implement the backend port.

pub mod http;
pub mod memory;
