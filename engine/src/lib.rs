pub mod app;
pub mod assets;
pub mod graphics;
pub mod pixels_renderer;
pub mod profiling;
pub mod render;
pub mod surface;
pub mod ui;

/// Deterministic game rules: a pure step from one state to the next.
pub trait GameLogic {
    type State;
    type Input;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State;
}
