pub mod error;
pub mod gateway;
pub mod mcp_api;
pub mod model;
