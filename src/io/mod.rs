//! Input/output helpers.
//!
//! - combined series CSV export (`export`)
//! - forecast bundle JSON read/write (`bundle`)

pub mod bundle;
pub mod export;

pub use bundle::*;
pub use export::*;
