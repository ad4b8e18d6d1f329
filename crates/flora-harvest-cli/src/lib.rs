//! flora-harvest command-line front end.

pub mod commands;
#[cfg(feature = "http")]
pub mod server;

pub use commands::{classify_report, harvest, index};
