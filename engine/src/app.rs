use std::collections::HashSet;
use std::time::{Duration, Instant};

use pixels::{PixelsBuilder, SurfaceTexture};
use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::graphics::Renderer2d;
use crate::pixels_renderer::PixelsRenderer2d;
use crate::profiling::{FrameStats, FrameTimings};
use crate::surface::SurfaceSize;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create pixel surface: {0}")]
    Pixels(#[from] pixels::Error),
}

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
    pub vsync: Option<bool>,
}

pub struct AppContext {
    pub window: Window,
    pub renderer: PixelsRenderer2d,
    pub surface_size: SurfaceSize,
}

/// Input gathered since the previous frame.
///
/// `keys_pressed` keeps arrival order and skips OS auto-repeat, so a held key shows up once.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub mouse_pos: Option<(u32, u32)>,
    pub clicks: Vec<(u32, u32)>,
    pub keys_pressed: Vec<VirtualKeyCode>,
    pub keys_down: HashSet<VirtualKeyCode>,
    pub keys_released: HashSet<VirtualKeyCode>,
    pub focus_lost: bool,
}

impl InputFrame {
    pub fn on_key(&mut self, key: VirtualKeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_down.insert(key) {
                    self.keys_pressed.push(key);
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    pub fn on_focus(&mut self, focused: bool) {
        if !focused {
            // Releases are not delivered to an unfocused window.
            self.keys_down.clear();
            self.focus_lost = true;
        }
    }

    /// Drops the per-frame edges while keeping held-key state.
    pub fn end_frame(&mut self) {
        self.clicks.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.focus_lost = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppControl {
    Continue,
    Exit,
}

pub trait GameApp {
    type State;

    fn init_state(&mut self, ctx: &mut AppContext) -> Self::State;

    fn update_state(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        ctx: &mut AppContext,
    ) -> AppControl;

    fn render(&mut self, state: &Self::State, renderer: &mut dyn Renderer2d);

    /// Called once when the loop is about to exit.
    fn shutdown(&mut self, _state: &mut Self::State) {}
}

fn initial_window_size(event_loop: &EventLoop<()>, config: &AppConfig) -> PhysicalSize<u32> {
    let monitor = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    match monitor {
        Some(monitor) => PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        ),
        None => config.desired_size,
    }
}

pub fn run_game<G: GameApp + 'static>(config: AppConfig, mut game: G) -> Result<(), AppError> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(initial_window_size(&event_loop, &config))
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width, window_size.height);

    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut builder = PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture);
    if let Some(vsync) = config.vsync {
        builder = builder.enable_vsync(vsync);
    }
    let pixels = builder.build()?;
    let renderer = PixelsRenderer2d::new(pixels, surface_size)?;

    let mut ctx = AppContext {
        window,
        renderer,
        surface_size,
    };
    let mut state = game.init_state(&mut ctx);
    let mut input = InputFrame::default();
    let mut stats = FrameStats::default();
    let mut last_frame = Instant::now();
    let mut exiting = false;

    tracing::info!(
        width = surface_size.width,
        height = surface_size.height,
        "window opened"
    );

    event_loop.run(move |event, _, control_flow| {
        if exiting {
            return;
        }
        *control_flow = ControlFlow::Poll;

        match &event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    tracing::info!("window close requested");
                    game.shutdown(&mut state);
                    exiting = true;
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    ctx.surface_size = SurfaceSize::new(size.width, size.height);
                    if let Err(err) = ctx.renderer.resize(ctx.surface_size) {
                        tracing::warn!(error = %err, "resize failed");
                    }
                    ctx.window.request_redraw();
                }
                WindowEvent::Focused(focused) => input.on_focus(*focused),
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: key_state,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => input.on_key(*key, *key_state),
                WindowEvent::CursorMoved { position, .. } => {
                    input.mouse_pos = Some((position.x.max(0.0) as u32, position.y.max(0.0) as u32));
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => {
                    if let Some(pos) = input.mouse_pos {
                        input.clicks.push(pos);
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let frame_start = Instant::now();
                let dt = frame_start.saturating_duration_since(last_frame);
                last_frame = frame_start;

                let control = game.update_state(&mut state, &input, dt, &mut ctx);
                input.end_frame();
                let updated = Instant::now();

                if control == AppControl::Exit {
                    game.shutdown(&mut state);
                    exiting = true;
                    *control_flow = ControlFlow::Exit;
                    return;
                }

                ctx.renderer.draw_frame(|gfx| game.render(&state, gfx));
                let rendered = Instant::now();

                if let Err(err) = ctx.renderer.present() {
                    tracing::warn!(error = %err, "present failed");
                }
                let presented = Instant::now();

                stats.record(FrameTimings {
                    update: updated - frame_start,
                    render: rendered - updated,
                    present: presented - rendered,
                    total: presented - frame_start,
                });
                stats.maybe_log();
            }
            Event::MainEventsCleared => {
                ctx.window.request_redraw();
            }
            _ => {}
        }
    });
}
