//! Arbor People Service
//!
//! Directory, profile, and remote-discovery backend for the Arbor federated
//! social platform. Exposes person search, tag lookup, relationship-scoped
//! profile views, and asynchronous webfinger resolution.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod jobs;
pub mod people;
