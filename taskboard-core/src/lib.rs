//! Taskboard core library.
//!
//! Owns the task model and the concurrency-safe, optionally file-backed
//! record store. The HTTP layer lives in `taskboard-server` and only
//! parses input, calls the store, and formats output.

pub mod store;
pub mod task;
