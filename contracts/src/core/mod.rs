//! Deterministic, pure logic of the contract system.
//!
//! Core modules must be free of I/O side effects. Interfaces and
//! implementations live in a [`registry::Registry`]; every declaration is
//! validated in memory and either fully registered or rejected.

pub mod callable;
pub mod conflict;
pub mod error;
pub mod implementation;
pub mod instance;
pub mod interface;
pub mod member;
pub mod policy;
pub mod registry;
