//! Taskboard HTTP server library.
//!
//! Exposes the API surface for use in tests and embedding. The server
//! parses HTTP input, calls into the `taskboard-core` store, and
//! translates results and errors into status codes.

pub mod api;
pub mod config;
