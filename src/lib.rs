//! userd - greeting counter and user registry HTTP service.
//!
//! Library crate so integration tests can assemble the service in-process;
//! the `userd` binary is a thin wrapper around [`http::serve`].

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod http;
pub mod metrics;
