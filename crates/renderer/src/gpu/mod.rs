//! GPU side of the viewer.
//!
//! - `context` owns wgpu instance/device/surface wiring and rebuilds the
//!   swapchain when the window resizes.
//! - `textures` uploads gallery images, thumbnails and frame attachments.
//! - `pipeline` builds the point cloud and thumbnail strip pipelines.
//! - `uniforms` mirrors the std140 blocks the shaders read.
//! - `state` glues everything into `RenderContext`, the `BlendBindings`
//!   implementation the transition controller drives.

mod context;
mod pipeline;
mod state;
mod textures;
mod uniforms;

pub(crate) use state::RenderContext;
