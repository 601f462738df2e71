//! Static parameter catalog shared by every report adapter.
//!
//! The catalog answers one question: for a logical parameter, on a given
//! device, for a given symbology, where is the value in the report and what
//! variant does it decode to?
//!
//! # Architecture
//!
//! - **Vocabulary**: `Device`, `Symbology`, `Family`, `Parameter`, `ValueKind`
//! - **Entries**: authored in TOML and compiled in (or loaded from a path)
//! - **Lookup**: most specific scope wins (symbology, then family, then any)
//!
//! # Example
//!
//! ```ignore
//! use sectorval::catalog::{Device, Parameter, ParameterCatalog, Symbology};
//!
//! let catalog = ParameterCatalog::global();
//! match catalog.lookup(Parameter::Modulation, Device::FixedText, Symbology::Code128) {
//!     Ok(identity) => println!("{} -> {:?}", identity.path, identity.kind),
//!     Err(_) => println!("not applicable"),
//! }
//! ```

mod registry;
mod types;

pub use registry::{
    default_catalog, load_catalog, CatalogConfig, EntryConfig, ParameterCatalog, ParameterIdentity,
};
pub use types::*;
