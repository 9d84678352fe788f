use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use pointmorph::{BlendController, Gallery, TransitionOutcome};
use tracing::{debug, error, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::window::{Window, WindowBuilder};

use crate::camera::OrbitCamera;
use crate::gpu::RenderContext;
use crate::input::{key_action, step_index, KeyAction, PointerTracker};
use crate::runtime::{FrameClock, FrameScheduler};
use crate::types::RendererConfig;

const SOFTWARE_FPS_CAP: f32 = 15.0;
/// Pixel-based scroll deltas are converted to line steps with this factor.
const PIXELS_PER_SCROLL_LINE: f64 = 40.0;

/// Everything the event loop mutates. `context` is declared first so the
/// surface drops before the window it was created from.
struct WindowState {
    context: RenderContext,
    window: Arc<Window>,
    controller: BlendController,
    camera: OrbitCamera,
    pointer: PointerTracker,
    scheduler: FrameScheduler,
    clock: FrameClock,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig, gallery: &Gallery) -> Result<Self> {
        let size = window.inner_size();
        let mut context = RenderContext::new(window.as_ref(), size, config, gallery)?;
        let controller = BlendController::new(
            gallery.len(),
            config.start_index,
            config.transition_duration,
            config.curve,
            &mut context,
        );
        context.set_active(controller.source());

        let profile = context.adapter_profile();
        let target_fps = match config.target_fps {
            Some(fps) => Some(fps),
            None if profile.is_software() => {
                warn!(
                    adapter = %profile.name,
                    backend = ?profile.backend,
                    cap = SOFTWARE_FPS_CAP,
                    "software rasterizer detected; capping transitions to {} FPS (override with --fps)",
                    SOFTWARE_FPS_CAP
                );
                Some(SOFTWARE_FPS_CAP)
            }
            None => None,
        };

        let size = context.size();
        let camera = OrbitCamera::new(
            config.fov_degrees,
            config.camera_distance,
            size.width as f32 / size.height.max(1) as f32,
        );

        Ok(Self {
            window,
            context,
            controller,
            camera,
            pointer: PointerTracker::default(),
            scheduler: FrameScheduler::new(target_fps),
            clock: FrameClock::default(),
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.context.resize(new_size);
        self.camera.set_aspect(new_size.width, new_size.height);
        self.window.request_redraw();
    }

    /// Forwards a selection to the controller; dropped while a transition runs.
    fn request(&mut self, index: usize) {
        if self.controller.request_transition(index, &mut self.context) {
            info!(
                from = self.controller.source(),
                to = index,
                "starting transition"
            );
            self.context.set_active(index);
            self.clock.reset(Instant::now());
            self.scheduler.reset();
            self.window.request_redraw();
        }
    }

    fn handle_key(&mut self, action: KeyAction) -> bool {
        let count = self.controller.image_count();
        match action {
            KeyAction::Select(index) => self.request(index),
            KeyAction::Next => self.request(step_index(self.controller.source(), count, true)),
            KeyAction::Previous => {
                self.request(step_index(self.controller.source(), count, false))
            }
            KeyAction::Quit => return false,
        }
        true
    }

    fn redraw(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        if self.controller.is_transitioning() {
            let dt = self.clock.tick(now);
            match self.controller.tick(dt, &mut self.context) {
                TransitionOutcome::Completed(index) => {
                    info!(index, "transition complete");
                }
                TransitionOutcome::InProgress(blend) => {
                    tracing::trace!(blend, "transition frame");
                }
                TransitionOutcome::Idle => {}
            }
        }
        self.context.render(&self.camera)?;
        self.scheduler.mark_rendered(now);
        Ok(())
    }
}

pub(crate) fn run(config: RendererConfig, gallery: Gallery) -> Result<()> {
    let event_loop = EventLoopBuilder::new()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("morphview")
        .with_inner_size(window_size)
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config, &gallery)
        .map_err(|err| anyhow!("failed to initialise renderer: {err:#}"))?;
    // Pixels now live on the GPU.
    drop(gallery);
    state.window().request_redraw();

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => elwt.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let Some(action) = key_action(&event.logical_key) {
                        if !state.handle_key(action) {
                            elwt.exit();
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((dx, dy)) = state.pointer.moved(position.x, position.y) {
                    state.camera.orbit(dx, dy);
                    state.window().request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => match button_state {
                ElementState::Pressed => state.pointer.pressed(),
                ElementState::Released => {
                    if let Some((x, y)) = state.pointer.released() {
                        if let Some(index) = state.context.thumbnail_at(x, y) {
                            debug!(index, "thumbnail clicked");
                            state.request(index);
                        }
                    }
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => {
                        (position.y / PIXELS_PER_SCROLL_LINE) as f32
                    }
                };
                state.camera.zoom(steps);
                state.window().request_redraw();
            }
            WindowEvent::Resized(new_size) => state.resize(new_size),
            WindowEvent::RedrawRequested => match state.redraw() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let size = state.context.size();
                    state.resize(size);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    error!("surface out of memory; exiting");
                    elwt.exit();
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    warn!("surface timeout; retrying next frame");
                }
                Err(other) => {
                    warn!(error = ?other, "surface error; retrying next frame");
                }
            },
            _ => {}
        },
        Event::AboutToWait => {
            if !state.controller.is_transitioning() {
                tracing::trace!("scheduler: idle");
                elwt.set_control_flow(ControlFlow::Wait);
                return;
            }
            let now = Instant::now();
            if state.scheduler.ready_for_frame(now) {
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = state.scheduler.next_deadline() {
                tracing::trace!(
                    deadline_ms = deadline.saturating_duration_since(now).as_millis() as u64,
                    "scheduler: waiting until next frame"
                );
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}
