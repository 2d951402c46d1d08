//! Integration test common infrastructure.
//!
//! Provides a TestServer that assembles the service in-process on an
//! ephemeral port, backed by an isolated in-memory database.

pub mod server;

#[allow(unused_imports)]
pub use server::TestServer;
