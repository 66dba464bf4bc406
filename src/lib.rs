// Library exports for forest-rs
// This allows the headless binary and main binary to use the modules

pub mod config;
pub mod control;
pub mod debug;
pub mod diagnostics;
pub mod forest;
pub mod grid;
pub mod species;
pub mod stats;
pub mod surface;
pub mod ticker;
pub mod tree;
pub mod ui;
