//! Subcommand implementations.

pub mod auth;
pub mod boot;
pub mod config;
pub mod export;
pub mod normalize;
pub mod ports;
pub mod types;
