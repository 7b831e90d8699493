//! Shared protocol definitions and data model for Tackboard.

pub mod codec;
pub mod event;
pub mod id;
pub mod model;
pub mod position;
pub mod rest;
pub mod wire;
