use image::imageops::{self, FilterType};
use image::RgbaImage;
use wgpu::util::{DeviceExt, TextureDataOrder};
use winit::dpi::PhysicalSize;

use super::context::{SurfaceColorSpace, DEPTH_FORMAT};

/// Longest thumbnail edge uploaded for the strip.
const THUMBNAIL_EDGE: u32 = 128;

pub(crate) struct ImageTexture {
    pub _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl ImageTexture {
    /// Uploads pixels unflipped: row 0 is the top row, as in the coordinate buffers.
    pub(crate) fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        pixels: &RgbaImage,
        color_space: SurfaceColorSpace,
    ) -> Self {
        let (width, height) = pixels.dimensions();
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: width.max(1),
                    height: height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: color_space.texture_format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            TextureDataOrder::LayerMajor,
            pixels.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    /// Downscaled copy for the thumbnail strip.
    pub(crate) fn thumbnail(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        pixels: &RgbaImage,
        color_space: SurfaceColorSpace,
    ) -> Self {
        let (width, height) = pixels.dimensions();
        if width <= THUMBNAIL_EDGE && height <= THUMBNAIL_EDGE {
            return Self::from_rgba(device, queue, label, pixels, color_space);
        }
        let scale = THUMBNAIL_EDGE as f32 / width.max(height) as f32;
        let small = imageops::resize(
            pixels,
            ((width as f32 * scale).round() as u32).max(1),
            ((height as f32 * scale).round() as u32).max(1),
            FilterType::Triangle,
        );
        Self::from_rgba(device, queue, label, &small, color_space)
    }
}

/// Sampler for per-point lookups: one texel per point, no filtering.
pub(crate) fn point_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("point sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    })
}

pub(crate) fn thumbnail_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("thumbnail sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

/// Colour (when multisampled) and depth attachments sized to the surface.
pub(crate) struct FrameTargets {
    _msaa_texture: Option<wgpu::Texture>,
    pub msaa_view: Option<wgpu::TextureView>,
    _depth_texture: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
}

impl FrameTargets {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let attachment = |label: &str, format: wgpu::TextureFormat| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: extent,
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        };

        let msaa_texture = (sample_count > 1).then(|| attachment("msaa color target", format));
        let msaa_view = msaa_texture
            .as_ref()
            .map(|texture| texture.create_view(&wgpu::TextureViewDescriptor::default()));
        let depth_texture = attachment("depth target", DEPTH_FORMAT);
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _msaa_texture: msaa_texture,
            msaa_view,
            _depth_texture: depth_texture,
            depth_view,
        }
    }
}
