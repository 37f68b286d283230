use std::collections::HashMap;

use glam::Mat4;
use relief_core::constants::CLEAR_COLOR;
use relief_scene::{Scene, SolidHandle};
use wgpu::util::DeviceExt;

use crate::uniforms::{solid_vertices, FrameUniforms, SolidUniforms, SolidVertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU copy of one scene solid. Dropped together with its buffers when the
/// solid leaves the scene.
struct GpuSolid {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    // Referenced by `bind_group`.
    _uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws the scene's solids with Lambert shading and a depth buffer.
pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    solid_bgl: wgpu::BindGroupLayout,
    depth_view: wgpu::TextureView,
    linear_output: bool,
    solids: HashMap<SolidHandle, GpuSolid>,
}

impl Renderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let solid_wgsl = include_str!("../../../shaders/render/solid.wgsl");
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("solid-shader"),
            source: wgpu::ShaderSource::Wgsl(solid_wgsl.into()),
        });

        let frame_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame-uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bgl"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let solid_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("solid-bgl"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bg"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("solid-pipeline-layout"),
            bind_group_layouts: &[&frame_bgl, &solid_bgl],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("solid-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: Some("vs_main"),
                buffers: &[SolidVertex::layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Caps come out of the triangulator in either winding.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        let depth_view = Self::create_depth_view(device, width, height);

        Self {
            pipeline,
            frame_uniform_buffer,
            frame_bind_group,
            solid_bgl,
            depth_view,
            linear_output: surface_format.is_srgb(),
            solids: HashMap::new(),
        }
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreate the depth texture on window resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_view = Self::create_depth_view(device, width, height);
    }

    /// Bring the GPU copies in line with `scene`: drop solids that left it,
    /// upload the ones that appeared. Solids never change while in the scene.
    pub fn sync(&mut self, device: &wgpu::Device, scene: &Scene) {
        let before = self.solids.len();
        self.solids.retain(|handle, _| scene.contains(*handle));
        let dropped = before - self.solids.len();

        let mut uploaded = 0;
        for (handle, solid) in scene.iter() {
            if self.solids.contains_key(&handle) || solid.mesh.indices.is_empty() {
                continue;
            }

            let vertices = solid_vertices(&solid.mesh);
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("solid-vertices"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("solid-indices"),
                contents: bytemuck::cast_slice(&solid.mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("solid-uniforms"),
                contents: bytemuck::bytes_of(&SolidUniforms::new(solid, self.linear_output)),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("solid-bg"),
                layout: &self.solid_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

            self.solids.insert(
                handle,
                GpuSolid {
                    vertex_buffer,
                    index_buffer,
                    index_count: solid.mesh.indices.len() as u32,
                    _uniform_buffer: uniform_buffer,
                    bind_group,
                },
            );
            uploaded += 1;
        }

        if dropped > 0 || uploaded > 0 {
            log::debug!("Renderer sync: {uploaded} uploaded, {dropped} dropped");
        }
    }

    /// Write the per-frame uniforms.
    pub fn update_frame(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        queue.write_buffer(
            &self.frame_uniform_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::new(view_proj)),
        );
    }

    /// Encode the scene pass into the command encoder.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let [r, g, b] = CLEAR_COLOR;
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("solid-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for solid in self.solids.values() {
            pass.set_bind_group(1, &solid.bind_group, &[]);
            pass.set_vertex_buffer(0, solid.vertex_buffer.slice(..));
            pass.set_index_buffer(solid.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..solid.index_count, 0, 0..1);
        }
    }
}

fn uniform_entry(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
