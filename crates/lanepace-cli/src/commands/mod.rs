pub mod config;
pub mod program;
pub mod series;
pub mod session;
pub mod stopwatch;

mod input;
mod render;
