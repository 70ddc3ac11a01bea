// render.rs - Selection Overlay Renderer
//
// Draws the overlay window's two layers with wgpu: a translucent dim over
// the whole (transparent) window as the clear color, and the rubber-band
// rectangle as a single uniform-driven quad. One write_buffer per frame,
// one draw call.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::constants::overlay;

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct RectUniform {
    /// Clip-space x0, y0, x1, y1.
    rect: [f32; 4],
    color: [f32; 4],
}

pub struct OverlayRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    dim_color: wgpu::Color,
}

impl OverlayRenderer {
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create render surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("No suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("overlay device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .context("Failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        // Per-pixel transparency needs an alpha-composited surface; which
        // flavor is available depends on the compositor.
        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PostMultiplied)
        {
            wgpu::CompositeAlphaMode::PostMultiplied
        } else {
            surface_caps.alpha_modes[0]
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("selection shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("selection.wgsl").into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("selection uniforms"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("selection rect"),
            size: std::mem::size_of::<RectUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("selection uniforms"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("selection pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("selection pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let dim_color = dim_clear_color(alpha_mode);
        info!(
            "Overlay renderer ready ({}x{}, {:?}, {:?})",
            config.width, config.height, format, alpha_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            bind_group,
            dim_color,
        })
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width > 0 && size.height > 0 {
            self.config.width = size.width;
            self.config.height = size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Draw one frame. `selection` is the rubber band as window-space pixel
    /// corners `[x0, y0, x1, y1]`; `None` draws the dim layer alone.
    pub fn render(&mut self, selection: Option<[f32; 4]>) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(corners) = selection {
            let uniform = RectUniform {
                rect: to_clip(
                    corners,
                    self.config.width as f32,
                    self.config.height as f32,
                ),
                color: overlay::SELECTION_COLOR,
            };
            self.queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("overlay encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("overlay pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.dim_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if selection.is_some() {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.bind_group, &[]);
                pass.draw(0..4, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Map pixel corners to clip space (y flipped).
fn to_clip([x0, y0, x1, y1]: [f32; 4], width: f32, height: f32) -> [f32; 4] {
    [
        x0 / width * 2.0 - 1.0,
        1.0 - y0 / height * 2.0,
        x1 / width * 2.0 - 1.0,
        1.0 - y1 / height * 2.0,
    ]
}

/// The dim layer as a clear color, adjusted for how the surface composites
/// alpha.
fn dim_clear_color(alpha_mode: wgpu::CompositeAlphaMode) -> wgpu::Color {
    let [r, g, b, a] = overlay::DIM_COLOR;
    match alpha_mode {
        wgpu::CompositeAlphaMode::PreMultiplied => wgpu::Color {
            r: r * a,
            g: g * a,
            b: b * a,
            a,
        },
        _ => wgpu::Color { r, g, b, a },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_corners_map_to_clip_space() {
        assert_eq!(
            to_clip([0.0, 0.0, 100.0, 100.0], 100.0, 100.0),
            [-1.0, 1.0, 1.0, -1.0]
        );
        assert_eq!(
            to_clip([50.0, 50.0, 100.0, 100.0], 100.0, 100.0),
            [0.0, 0.0, 1.0, -1.0]
        );
    }

    #[test]
    fn dim_color_is_premultiplied_only_when_the_surface_wants_it() {
        let pre = dim_clear_color(wgpu::CompositeAlphaMode::PreMultiplied);
        assert!(pre.r < overlay::DIM_COLOR[0]);
        assert_eq!(pre.a, overlay::DIM_COLOR[3]);

        let post = dim_clear_color(wgpu::CompositeAlphaMode::PostMultiplied);
        assert_eq!(post.r, overlay::DIM_COLOR[0]);
        assert_eq!(post.a, overlay::DIM_COLOR[3]);
    }
}
