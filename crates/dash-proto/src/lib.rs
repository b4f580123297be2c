//! Shared types for the xrit-dash client: receiver API wire models,
//! local client configuration, and platform paths.

pub mod api;
pub mod config;
pub mod platform;
