//! Integration tests
//!
//! `catalog` drives the router in-process over the memory store.
//! `live_server` needs a running server: `cargo test -- --ignored`.

mod catalog;
mod live_server;
