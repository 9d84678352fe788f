//! Point-correspondence and blend-transition core for the image morph viewer.
//!
//! The crate is renderer agnostic. It turns decoded images into ordered
//! coordinate buffers and drives the single blend scalar that a point-cloud
//! shader interpolates with:
//!
//! ```text
//!   files ──▶ load_gallery ──▶ Gallery { ImageRecord.. }
//!                                   │ coordinate buffers, pixels
//!                                   ▼
//!   user selection ──▶ BlendController ──▶ BlendBindings (GPU side)
//!                          ▲      │
//!                          └ tick(dt) ──▶ TransitionOutcome
//! ```
//!
//! - `mapper` sorts pixels by HSL saturation and emits the coordinate buffer
//!   whose slot `i` holds the location of the `i`-th least saturated pixel.
//! - `gallery` decodes every file concurrently, validates the shared grid and
//!   maps each image.
//! - `controller` owns the idle/transitioning state machine.
//! - `easing` provides the curves that shape the blend over time.

mod controller;
mod easing;
mod error;
mod gallery;
mod mapper;

pub use controller::{
    BlendBindings, BlendController, BlendSnapshot, BlendState, TransitionOutcome,
    DEFAULT_TRANSITION_DURATION,
};
pub use easing::EasingCurve;
pub use error::MorphError;
pub use gallery::{load_gallery, Gallery, GalleryOptions, ImageRecord, Thumbnail};
pub use mapper::{
    correspondence_order, map_pixels, position_grid, saturation, CoordinateBuffer, PixelSample,
};
