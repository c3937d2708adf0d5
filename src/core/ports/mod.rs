//! Directional port definitions for the clean architecture rings.
//! Inbound ports are the tool operations driving adapters call into,
//! while outbound ports are the backend services the application calls out to.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
