use bytemuck::{Pod, Zeroable};

use crate::camera::Mat4;

/// CPU mirror of the `MorphParams` std140 block.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct MorphUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub dimensions: [f32; 2],
    pub viewport: [f32; 2],
    pub blend: f32,
    pub point_size: f32,
    pub stagger: f32,
    pub arc_height: f32,
}

impl MorphUniforms {
    pub fn new(dimensions: (u32, u32), viewport: (u32, u32)) -> Self {
        Self {
            view: crate::camera::IDENTITY,
            projection: crate::camera::IDENTITY,
            dimensions: [dimensions.0.max(1) as f32, dimensions.1.max(1) as f32],
            viewport: [viewport.0.max(1) as f32, viewport.1.max(1) as f32],
            blend: 0.0,
            point_size: 1.0,
            stagger: 0.5,
            arc_height: 0.2,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = [width.max(1) as f32, height.max(1) as f32];
    }

    pub fn set_camera(&mut self, view: Mat4, projection: Mat4) {
        self.view = view;
        self.projection = projection;
    }
}

/// CPU mirror of the `ThumbnailParams` std140 block.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct ThumbnailUniforms {
    pub rect: [f32; 4],
    pub tint: [f32; 4],
}

/// Brightness of thumbnails that are not the active image.
const INACTIVE_TINT: f32 = 0.6;
/// Highlight border width in UV units.
const ACTIVE_BORDER: f32 = 0.04;

impl ThumbnailUniforms {
    pub fn new(rect: [f32; 4], active: bool) -> Self {
        let tint = if active {
            [1.0, 1.0, 1.0, ACTIVE_BORDER]
        } else {
            [INACTIVE_TINT, INACTIVE_TINT, INACTIVE_TINT, 0.0]
        };
        Self { rect, tint }
    }
}
