use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::camera::OrbitCamera;
use crate::coords::TextureSize;
use crate::geometry::{BoxParams, GeometryCache, Vertex};
use crate::render::{RenderCtx, RenderTarget};

use super::common::{create_rgba_texture, linear_sampler, texture_sampler_entries, uniform_binding_size, write_rgba};

/// Single directional light fixed to the eye.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightParams {
    /// Direction towards the light in view space.
    pub direction: Vec3,
    pub ambient: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self { direction: Vec3::Z, ambient: 0.2 }
    }
}

/// Draws the bevel box textured with the master texture.
///
/// The master texture is created once per size and overwritten in place on
/// every upload. The mesh is re-uploaded only when the geometry cache
/// regenerates it.
pub struct BoxRenderer {
    light: LightParams,

    // pipeline
    pipeline_formats: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    // bindings
    uniform_buffer: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,
    bind_group: Option<wgpu::BindGroup>,

    // master texture
    texture: Option<(TextureSize, wgpu::Texture, wgpu::TextureView)>,

    // geometry
    geometry: GeometryCache,
    uploaded_generation: u64,
    vbo: Option<wgpu::Buffer>,
    ibo: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Default for BoxRenderer {
    fn default() -> Self {
        Self::new(LightParams::default())
    }
}

impl BoxRenderer {
    pub fn new(light: LightParams) -> Self {
        Self {
            light,
            pipeline_formats: None,
            pipeline: None,
            bind_group_layout: None,
            uniform_buffer: None,
            sampler: None,
            bind_group: None,
            texture: None,
            geometry: GeometryCache::new(),
            uploaded_generation: 0,
            vbo: None,
            ibo: None,
            index_count: 0,
        }
    }

    /// Writes `bytes` (already flipped, tightly packed RGBA8) into the master
    /// texture, creating it on first use or when `size` changes.
    pub fn upload_texture(&mut self, ctx: &RenderCtx<'_>, size: TextureSize, bytes: &[u8]) {
        if self.texture.as_ref().is_none_or(|(s, _, _)| *s != size) {
            let (texture, view) = create_rgba_texture(ctx.device, "boxmaker master texture", size);
            self.texture = Some((size, texture, view));
            self.bind_group = None;
            log::debug!("master texture allocated: {}x{}", size.width, size.height);
        }
        if let Some((size, texture, _)) = &self.texture {
            write_rgba(ctx.queue, texture, *size, bytes);
        }
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        params: BoxParams,
        camera: &OrbitCamera,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_mesh(ctx, params);
        self.ensure_bindings(ctx);
        self.write_uniform(ctx, camera);

        let Some(pipeline)   = self.pipeline.as_ref()   else { return; };
        let Some(bind_group) = self.bind_group.as_ref() else { return; };
        let Some(vbo)        = self.vbo.as_ref()        else { return; };
        let Some(ibo)        = self.ibo.as_ref()        else { return; };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("boxmaker box pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, vbo.slice(..));
        rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let formats = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_formats == Some(formats) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("boxmaker box shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/box.wgsl").into()),
        });

        let [tex_entry, sampler_entry] = texture_sampler_entries(1);
        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("boxmaker box bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_binding_size::<SceneUniform>(),
                    },
                    count: None,
                },
                tex_entry,
                sampler_entry,
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("boxmaker box pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("boxmaker box pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Patch winding differs per octant; depth testing resolves visibility.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_formats = Some(formats);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_mesh(&mut self, ctx: &RenderCtx<'_>, params: BoxParams) {
        self.geometry.get(params);
        let generation = self.geometry.generation();
        if generation == self.uploaded_generation && self.vbo.is_some() {
            return;
        }

        let mesh = self.geometry.get(params);

        self.vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("boxmaker box vbo"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("boxmaker box ibo"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        self.index_count = mesh.indices.len() as u32;
        self.uploaded_generation = generation;
        log::debug!("box mesh uploaded: {} triangles", mesh.triangle_count());
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }

        let Some(bgl) = self.bind_group_layout.as_ref() else { return; };
        let Some((_, _, view)) = self.texture.as_ref() else { return; };

        let sampler = self
            .sampler
            .get_or_insert_with(|| linear_sampler(ctx.device, "boxmaker master sampler", wgpu::AddressMode::ClampToEdge));
        let uniform_buffer = self.uniform_buffer.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("boxmaker scene ubo"),
                size: std::mem::size_of::<SceneUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("boxmaker box bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
    }

    fn write_uniform(&self, ctx: &RenderCtx<'_>, camera: &OrbitCamera) {
        let Some(ubo) = self.uniform_buffer.as_ref() else { return; };
        let uniform = SceneUniform::new(camera, ctx.viewport.aspect(), self.light);
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniform));
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Uniform layout (160 bytes):
///
///  offset   0  view_proj  mat4x4
///  offset  64  view       mat4x4
///  offset 128  light_dir  vec4
///  offset 144  ambient    vec4 (x used)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SceneUniform {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    light_dir: [f32; 4],
    ambient: [f32; 4],
}

impl SceneUniform {
    fn new(camera: &OrbitCamera, aspect: f32, light: LightParams) -> Self {
        let dir = light.direction.try_normalize().unwrap_or(Vec3::Z);
        Self {
            view_proj: camera.view_proj(aspect).to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            light_dir: [dir.x, dir.y, dir.z, 0.0],
            ambient: [light.ambient, 0.0, 0.0, 0.0],
        }
    }
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x3, // normal
    2 => Float32x2  // uv
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_is_160_bytes() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 160);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn zero_light_direction_falls_back_to_eye() {
        let light = LightParams { direction: Vec3::ZERO, ambient: 0.5 };
        let u = SceneUniform::new(&OrbitCamera::default(), 1.0, light);
        assert_eq!(u.light_dir, [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(u.ambient[0], 0.5);
    }
}
