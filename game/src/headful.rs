//! Windowed front end: wires the router, audio and renderer into the engine's app loop.

pub mod app;
pub mod input_adapter;

pub use app::TetrisApp;
