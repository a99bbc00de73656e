//! Core engine services
//!
//! Currently hosts the unified configuration system.

pub mod config;
