use crate::coords::TextureSize;
use crate::render::{RenderCtx, RenderTarget};

use super::common::{create_rgba_texture, linear_sampler, texture_sampler_entries, write_rgba};

/// Stretches an independently sized image over the whole viewport, behind
/// the box.
///
/// Replacing the image builds a new texture and bind group first; the bind
/// group owns its texture view, so the previous image lives until it is
/// swapped out.
#[derive(Default)]
pub struct BackdropRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    sampler: Option<wgpu::Sampler>,

    bind_group: Option<wgpu::BindGroup>,
}

impl BackdropRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads a new backdrop from top-down RGBA8 rows.
    pub fn set_image(&mut self, ctx: &RenderCtx<'_>, size: TextureSize, bytes: &[u8]) {
        self.ensure_pipeline(ctx);

        let (texture, view) = create_rgba_texture(ctx.device, "boxmaker backdrop texture", size);
        write_rgba(ctx.queue, &texture, size, bytes);

        let Some(bgl) = self.bind_group_layout.as_ref() else { return; };
        let sampler = self
            .sampler
            .get_or_insert_with(|| linear_sampler(ctx.device, "boxmaker backdrop sampler", wgpu::AddressMode::ClampToEdge));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("boxmaker backdrop bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        // The previous bind group, and with it the old texture, drops here.
        self.bind_group = Some(bind_group);
        log::debug!("backdrop replaced: {}x{}", size.width, size.height);
    }

    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.bind_group.is_none() {
            return;
        }
        self.ensure_pipeline(ctx);

        let Some(pipeline)   = self.pipeline.as_ref()   else { return; };
        let Some(bind_group) = self.bind_group.as_ref() else { return; };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("boxmaker backdrop pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.draw(0..6, 0..1);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("boxmaker backdrop shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/backdrop.wgsl").into()),
        });

        // Keep the existing layout so bind groups made against it stay valid.
        if self.bind_group_layout.is_none() {
            self.bind_group_layout = Some(ctx.device.create_bind_group_layout(
                &wgpu::BindGroupLayoutDescriptor {
                    label: Some("boxmaker backdrop bgl"),
                    entries: &texture_sampler_entries(0),
                },
            ));
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return; };

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("boxmaker backdrop pipeline layout"),
            bind_group_layouts: &[bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("boxmaker backdrop pipeline"),
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
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
    }
}
