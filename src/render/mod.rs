//! PNG rendering of datasets
//!
//! - [`heatmap`] - Concentration by time and diameter for a resolved selection
//! - [`pnsd`] - Per-scan size distribution curves of one record
//!
//! Both draw through `plotters` onto a bitmap backend. Text needs a system
//! font; without one the plots are still written, only unlabelled.

pub mod backend;
pub mod colormap;
pub mod heatmap;
pub mod pnsd;

pub use heatmap::render_heatmap;
pub use pnsd::{pnsd_file_name, pnsd_title, render_pnsd};
