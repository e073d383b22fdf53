//! colloquy-client — wire contract and HTTP client for the copilot
//! query endpoint (`POST /api/query`).

pub mod client;
pub mod retry;
pub mod wire;

pub use client::{ClientConfig, ClientError, QueryBackend, QueryClient};
pub use retry::RetryConfig;
pub use wire::{Outcome, QueryMetadata, QueryReply, QueryRequest};
