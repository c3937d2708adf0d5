//! Inbound adapters translate external stimuli (MCP host, CLI) into tool calls.

pub mod cli;
pub mod mcp;
