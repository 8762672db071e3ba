//! Reporting utilities: run summary and text rendering of views.

pub mod format;

pub use format::*;
