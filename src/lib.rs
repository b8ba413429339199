//! Displacement and precipitation viewer: CSV loading and the figure
//! filtering pipeline shared by the desktop window and the headless CLI.

pub mod data;
