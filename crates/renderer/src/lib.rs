//! Renderer crate for morphview.
//!
//! Draws a gallery as a cloud of points and morphs it from one image to the
//! next. The overall flow is:
//!
//! ```text
//!   CLI / morphview
//!          │ RendererConfig + Gallery
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ redraw()
//!                                         │                  │
//!                        keys / thumbnail clicks       controller.tick(dt)
//!                                         ▼                  ▼
//!                          BlendController ──▶ RenderContext (BlendBindings) ─▶ GPU
//! ```
//!
//! `RenderContext` owns all GPU resources (surface, device, pipelines, one
//! texture and coordinate buffer per image). The point shader reads the
//! source and target coordinates of each slot and interpolates position and
//! colour by the blend uniform the controller writes.

mod camera;
mod compile;
mod gpu;
mod input;
mod runtime;
mod strip;
mod types;
mod window;

use anyhow::Result;
use pointmorph::Gallery;

pub use camera::OrbitCamera;
pub use runtime::{FrameClock, FrameScheduler};
pub use strip::{StripLayout, ThumbnailSlot};
pub use types::{AdapterProfile, Antialiasing, ColorSpaceMode, GpuPowerPreference, RendererConfig};

/// Entry point that opens the viewer window.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Uploads the gallery and blocks until the window closes.
    pub fn run(self, gallery: Gallery) -> Result<()> {
        tracing::info!(
            images = gallery.len(),
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            "opening viewer window"
        );
        window::run(self.config, gallery)
    }
}
