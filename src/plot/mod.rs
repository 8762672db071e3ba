//! Terminal plotting.

pub mod ascii;

pub use ascii::{render_ascii_bars, render_ascii_plot, render_forecast_plot};
