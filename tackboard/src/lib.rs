//! Tackboard client library.
//!
//! Provides the pieces a frontend needs to talk to a tackboard server:
//! an HTTP [`api::ApiClient`], a WebSocket [`sync::EventFeed`] for
//! realtime events, a local [`state::BoardState`] replica, and a
//! [`drag::DragSession`] implementing drag-and-drop reordering.

pub mod api;
pub mod drag;
pub mod state;
pub mod sync;
