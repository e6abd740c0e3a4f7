pub mod config;
pub mod math;
pub mod renderer;
pub mod world;
