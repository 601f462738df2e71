//! Canonical, device-independent report model.

pub mod parse;
mod types;

pub use types::*;
