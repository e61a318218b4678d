//! I/O helpers for contracts commands.

pub mod config;
pub mod manifest;
