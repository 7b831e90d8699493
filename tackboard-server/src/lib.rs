//! Tackboard server: HTTP API and realtime fan-out for collaborative
//! task boards.
//!
//! The server keeps all state in memory and broadcasts every committed
//! mutation to WebSocket subscribers of the affected board.

pub mod activity;
pub mod auth;
pub mod boards;
pub mod config;
pub mod error;
pub mod lists;
pub mod server;
pub mod store;
pub mod tasks;
pub mod topics;
pub mod ws;
