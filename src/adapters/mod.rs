pub mod inbound;
pub mod outbound;

// Re-export commonly used adapters at the adapters level
pub use inbound::mcp::AgentStudioServer;
pub use outbound::http::HttpStudioBackend;
