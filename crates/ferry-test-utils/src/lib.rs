//! Testing utilities for the ferry workspace
//!
//! Shared test doubles: an in-memory record store, a scripted-failure
//! wrapper, a mockall mock of the endpoint capability, and a warp-based
//! HTTP stub that speaks the real wire protocol.

#![allow(missing_docs)]

pub mod flaky;
pub mod http_stub;
pub mod memory;
pub mod mock;

pub use flaky::{EndpointOp, FlakyEndpoint};
pub use http_stub::{base_url, spawn_stub_server, StubStore};
pub use memory::MemoryEndpoint;
pub use mock::MockEndpoint;
