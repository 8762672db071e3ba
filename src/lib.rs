//! `tourcast` library crate.
//!
//! The binary (`tourcast`) is a thin wrapper around this library so that:
//!
//! - the data and forecast engines are testable without spawning processes
//! - views can be rendered by both the text report and the TUI

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod segment;
pub mod tui;
pub mod views;
