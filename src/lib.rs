//! Macroeconomic indicator dashboard: data layer, configuration and colour
//! scales. The egui front end lives in the binary.

pub mod color;
pub mod config;
pub mod data;
