use anyhow::{Context, Result};
use pointmorph::{BlendBindings, Gallery};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::{debug, warn};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::camera::OrbitCamera;
use crate::strip::StripLayout;
use crate::types::{AdapterProfile, RendererConfig};

use super::context::GpuContext;
use super::pipeline::{create_point_pipeline, create_strip_pipeline, PipelineLayouts};
use super::textures::{point_sampler, thumbnail_sampler, FrameTargets, ImageTexture};
use super::uniforms::{MorphUniforms, ThumbnailUniforms};

/// GPU inputs of one gallery image.
struct ImageResources {
    texture: ImageTexture,
    coordinates: wgpu::Buffer,
}

struct ThumbnailResources {
    _texture: ImageTexture,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Every GPU resource the viewer draws with.
///
/// Source and target inputs are selected by index through [`BlendBindings`];
/// the bind group pairing their textures is rebuilt lazily on the next frame.
pub(crate) struct RenderContext {
    context: GpuContext,
    layouts: PipelineLayouts,
    point_pipeline: wgpu::RenderPipeline,
    strip_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: MorphUniforms,
    grid_buffer: wgpu::Buffer,
    point_count: u32,
    images: Vec<ImageResources>,
    point_sampler: wgpu::Sampler,
    source: usize,
    target: usize,
    pair_bind_group: Option<wgpu::BindGroup>,
    thumbnails: Vec<ThumbnailResources>,
    strip: StripLayout,
    show_thumbnails: bool,
    active: usize,
    targets: FrameTargets,
    clear_color: wgpu::Color,
}

impl RenderContext {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        config: &RendererConfig,
        gallery: &Gallery,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(
            target,
            initial_size,
            config.antialiasing,
            config.color_space,
            config.gpu_power,
        )?;
        let device = &context.device;
        let queue = &context.queue;

        let (width, height) = gallery.dimensions();
        let max_dimension = context.adapter_profile.max_texture_dimension;
        if width > max_dimension || height > max_dimension {
            anyhow::bail!(
                "images are {width}x{height} but the GPU supports at most {max_dimension}; \
                 resample them with --grid-size"
            );
        }
        let point_count =
            u32::try_from(gallery.point_count()).context("point grid exceeds u32 instances")?;

        let layouts = PipelineLayouts::new(device);
        let point_pipeline =
            create_point_pipeline(device, &layouts, context.surface_format, context.sample_count);
        let strip_pipeline =
            create_strip_pipeline(device, &layouts, context.surface_format, context.sample_count);

        let mut uniforms = MorphUniforms::new(
            (width, height),
            (context.size.width, context.size.height),
        );
        uniforms.point_size = config.point_size;
        uniforms.stagger = config.stagger;
        uniforms.arc_height = config.arc_height;

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("morph uniform buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("morph uniform bind group"),
            layout: &layouts.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let grid = gallery.position_grid();
        let grid_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("position grid"),
            contents: bytemuck::cast_slice(&grid),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let images: Vec<ImageResources> = gallery
            .records()
            .iter()
            .enumerate()
            .map(|(index, record)| {
                debug!(index, path = %record.file().display(), "uploading image");
                ImageResources {
                    texture: ImageTexture::from_rgba(
                        device,
                        queue,
                        &format!("image texture #{index}"),
                        record.pixels(),
                        context.color_space,
                    ),
                    coordinates: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("coordinate buffer #{index}")),
                        contents: bytemuck::cast_slice(record.coordinates().as_slice()),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
                }
            })
            .collect();

        let thumb_sampler = thumbnail_sampler(device);
        let thumbnails = gallery
            .records()
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let texture = ImageTexture::thumbnail(
                    device,
                    queue,
                    &format!("thumbnail #{index}"),
                    record.pixels(),
                    context.color_space,
                );
                let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("thumbnail uniforms #{index}")),
                    size: std::mem::size_of::<ThumbnailUniforms>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("thumbnail bind group #{index}")),
                    layout: &layouts.thumbnail_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniform_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&thumb_sampler),
                        },
                    ],
                });
                ThumbnailResources {
                    _texture: texture,
                    uniform_buffer,
                    bind_group,
                }
            })
            .collect();

        let targets = FrameTargets::new(
            device,
            context.surface_format,
            context.size,
            context.sample_count,
        );
        let strip = StripLayout::new(images.len(), context.size.width, context.size.height);
        let clear_color = context.color_space.clear_color(config.background);
        let point_sampler = point_sampler(device);

        let mut state = Self {
            context,
            layouts,
            point_pipeline,
            strip_pipeline,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            grid_buffer,
            point_count,
            images,
            point_sampler,
            source: 0,
            target: 0,
            pair_bind_group: None,
            thumbnails,
            strip,
            show_thumbnails: config.show_thumbnails,
            active: 0,
            targets,
            clear_color,
        };
        state.write_thumbnail_uniforms();
        Ok(state)
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.context.resize(new_size);
        self.targets = FrameTargets::new(
            &self.context.device,
            self.context.surface_format,
            self.context.size,
            self.context.sample_count,
        );
        self.uniforms.set_viewport(new_size.width, new_size.height);
        self.strip = StripLayout::new(self.images.len(), new_size.width, new_size.height);
        self.write_thumbnail_uniforms();
    }

    /// Highlights `index` in the thumbnail strip.
    pub(crate) fn set_active(&mut self, index: usize) {
        if self.active != index {
            self.active = index;
            self.write_thumbnail_uniforms();
        }
    }

    /// Gallery index of the thumbnail under a window position, if any.
    pub(crate) fn thumbnail_at(&self, x: f64, y: f64) -> Option<usize> {
        if !self.show_thumbnails {
            return None;
        }
        self.strip.hit_test(x as f32, y as f32)
    }

    pub(crate) fn render(&mut self, camera: &OrbitCamera) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if self.pair_bind_group.is_none() {
            self.pair_bind_group = self.create_pair_bind_group();
        }
        self.uniforms
            .set_camera(camera.view_matrix(), camera.projection_matrix());
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("morph encoder"),
                });
        {
            let (attachment_view, resolve_target) = match self.targets.msaa_view.as_ref() {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("morph pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let (Some(pair), Some(source), Some(target)) = (
                self.pair_bind_group.as_ref(),
                self.images.get(self.source),
                self.images.get(self.target),
            ) {
                pass.set_pipeline(&self.point_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_bind_group(1, pair, &[]);
                pass.set_vertex_buffer(0, self.grid_buffer.slice(..));
                pass.set_vertex_buffer(1, source.coordinates.slice(..));
                pass.set_vertex_buffer(2, target.coordinates.slice(..));
                pass.draw(0..6, 0..self.point_count);
            }

            if self.show_thumbnails && !self.strip.is_empty() {
                pass.set_pipeline(&self.strip_pipeline);
                for thumbnail in &self.thumbnails {
                    pass.set_bind_group(0, &thumbnail.bind_group, &[]);
                    pass.draw(0..6, 0..1);
                }
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn create_pair_bind_group(&self) -> Option<wgpu::BindGroup> {
        let source = self.images.get(self.source)?;
        let target = self.images.get(self.target)?;
        debug!(source = self.source, target = self.target, "binding image pair");
        Some(
            self.context
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("image pair bind group"),
                    layout: &self.layouts.image_pair_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&source.texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&target.texture.view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.point_sampler),
                        },
                    ],
                }),
        )
    }

    fn write_thumbnail_uniforms(&self) {
        for (index, thumbnail) in self.thumbnails.iter().enumerate() {
            let rect = self.strip.ndc_rect(index).unwrap_or([0.0; 4]);
            let uniforms = ThumbnailUniforms::new(rect, index == self.active);
            self.context.queue.write_buffer(
                &thumbnail.uniform_buffer,
                0,
                bytemuck::bytes_of(&uniforms),
            );
        }
    }
}

impl BlendBindings for RenderContext {
    fn bind_source(&mut self, index: usize) {
        if index >= self.images.len() {
            warn!(index, "source index outside gallery; keeping current binding");
            return;
        }
        if self.source != index {
            self.source = index;
            self.pair_bind_group = None;
        }
    }

    fn bind_target(&mut self, index: usize) {
        if index >= self.images.len() {
            warn!(index, "target index outside gallery; keeping current binding");
            return;
        }
        if self.target != index {
            self.target = index;
            self.pair_bind_group = None;
        }
    }

    fn set_blend(&mut self, blend: f32) {
        self.uniforms.blend = blend;
    }
}
