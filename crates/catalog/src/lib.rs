//! portsync catalog — mirrors Port organization users and teams into the
//! Port software catalog.
//!
//! This crate authenticates with client credentials, lists users and teams,
//! maps them onto `user`/`team` blueprint entities, and upserts them.

pub mod auth;
pub mod client;
pub mod identifier;
pub mod models;
pub mod sync;
pub mod transform;
