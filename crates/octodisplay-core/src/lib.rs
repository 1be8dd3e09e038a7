//! Core octodisplay library (config, logging, status source, polling pipeline).

pub mod config;
pub mod core;
pub mod logging;
pub mod source;
