//! # Roster Core
//!
//! Character roster management on top of `sheet_rules`. This crate owns
//! storage and decides when derived stats are recomputed; the rules
//! themselves live in `sheet_rules`.
//!
//! ## Core Components
//!
//! - **store**: Character storage trait with in-memory and JSON-file backends
//! - **service**: Create/read/update/delete plus hit point and spell slot quick actions
//! - **config**: TOML configuration for the file store

pub mod config;
pub mod service;
pub mod store;

pub use config::*;
pub use service::*;
pub use store::*;
