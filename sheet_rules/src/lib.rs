//! # Sheet Rules
//!
//! Character sheet rules for 5e-style characters: entity definitions, core
//! mechanics, reference data, and the stat calculator that derives every
//! calculated field from a handful of user inputs.
//! This crate performs no persistence and fetches nothing remotely.

pub mod calculator;
pub mod entities;
pub mod mechanics;
pub mod reference;

pub use calculator::*;
pub use entities::*;
pub use mechanics::*;
pub use reference::*;
