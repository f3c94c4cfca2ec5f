//! Scene renderer: one surface, three pipelines, per-object GPU buffers

use crate::device::GpuContext;
use crate::mesh::{CameraUniform, GpuMesh, MeshVertex, ObjectUniform, Topology};
use nalgebra::Matrix4;
use orbitview_core::{Error, Result, Rgba};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub background_color: [f64; 4],
    pub present_mode: wgpu::PresentMode,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_color: [0.02, 0.03, 0.06, 1.0],
            present_mode: wgpu::PresentMode::AutoVsync,
        }
    }
}

/// GPU buffers backing one uploaded mesh.
///
/// Dropping the value frees the buffers lazily; [`MeshBuffers::release`]
/// destroys them immediately.
pub struct MeshBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    index_count: u32,
    topology: Topology,
    color: Rgba,
    unlit: bool,
}

impl MeshBuffers {
    /// Destroy the GPU memory held by this mesh
    pub fn release(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.uniform_buffer.destroy();
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    fn bucket(&self) -> Bucket {
        match self.topology {
            Topology::Lines => Bucket::Lines,
            Topology::Triangles if self.color.is_translucent() => Bucket::Translucent,
            Topology::Triangles => Bucket::Opaque,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Opaque,
    Lines,
    Translucent,
}

/// One mesh to draw this frame with its model matrix
pub struct DrawCommand<'a> {
    pub mesh: &'a MeshBuffers,
    pub model: Matrix4<f32>,
}

/// A second pass drawn over the scene (e.g. a UI overlay)
pub trait OverlayPass {
    /// Upload whatever the pass needs; returned buffers are submitted first
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        surface_size: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer>;

    /// Record draw calls into a pass that loads the rendered scene
    fn paint<'rp>(&'rp self, render_pass: &mut wgpu::RenderPass<'rp>);
}

/// Renderer for topology scenes
pub struct SceneRenderer<'window> {
    pub gpu_context: GpuContext,
    pub surface: wgpu::Surface<'window>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub config: RenderConfig,
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl<'window> SceneRenderer<'window> {
    /// Create a renderer presenting to `target`
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'window>>,
        width: u32,
        height: u32,
        config: RenderConfig,
    ) -> Result<Self> {
        let instance = GpuContext::new_instance();
        let surface = instance
            .create_surface(target)
            .map_err(|e| Error::Gpu(format!("Failed to create surface: {:?}", e)))?;
        let gpu_context = GpuContext::for_surface(instance, &surface).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: width.max(1),
            height: height.max(1),
            present_mode: config.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu_context.device, &surface_config);

        let camera_buffer = gpu_context.create_buffer_init(
            "Camera Buffer",
            &[CameraUniform::new(Matrix4::identity())],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let camera_layout = gpu_context.create_uniform_layout("camera_bind_group_layout", wgpu::ShaderStages::VERTEX);
        let camera_bind_group = gpu_context.create_uniform_bind_group("camera_bind_group", &camera_layout, &camera_buffer);
        let object_layout = gpu_context.create_uniform_layout(
            "object_bind_group_layout",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );

        let shader = gpu_context.create_shader_module("Scene Shader", include_str!("shaders/scene.wgsl"));
        let pipeline_layout = gpu_context.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let opaque_pipeline = Self::create_render_pipeline(
            &gpu_context.device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            true,
            "Opaque",
        );
        let translucent_pipeline = Self::create_render_pipeline(
            &gpu_context.device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
            false,
            "Translucent",
        );
        let line_pipeline = Self::create_render_pipeline(
            &gpu_context.device,
            &pipeline_layout,
            &shader,
            surface_format,
            wgpu::PrimitiveTopology::LineList,
            false,
            "Line",
        );

        let (depth_texture, depth_view) = Self::create_depth_texture(&gpu_context.device, &surface_config);

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            config,
            opaque_pipeline,
            translucent_pipeline,
            line_pipeline,
            camera_buffer,
            camera_bind_group,
            object_layout,
            depth_texture,
            depth_view,
        })
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        topology: wgpu::PrimitiveTopology,
        depth_write: bool,
        label: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{} Scene Pipeline", label)),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[MeshVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_write,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        surface_config: &wgpu::SurfaceConfiguration,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: surface_config.width,
                height: surface_config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.gpu_context.device
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn size(&self) -> [u32; 2] {
        [self.surface_config.width, self.surface_config.height]
    }

    /// Resize the surface and depth buffer; zero-sized requests are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.gpu_context.device, &self.surface_config);

        let (depth_texture, depth_view) = Self::create_depth_texture(&self.gpu_context.device, &self.surface_config);
        let old = std::mem::replace(&mut self.depth_texture, depth_texture);
        old.destroy();
        self.depth_view = depth_view;
    }

    /// Upload a mesh into its own vertex, index and uniform buffers
    pub fn upload(&self, mesh: &GpuMesh) -> MeshBuffers {
        let ctx = &self.gpu_context;
        let vertex_buffer = ctx.create_buffer_init("Scene Vertex Buffer", &mesh.vertices, wgpu::BufferUsages::VERTEX);
        let index_buffer = ctx.create_buffer_init("Scene Index Buffer", &mesh.indices, wgpu::BufferUsages::INDEX);
        let uniform_buffer = ctx.create_buffer_init(
            "Object Uniform Buffer",
            &[ObjectUniform::new(Matrix4::identity(), mesh.color, mesh.unlit)],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let bind_group = ctx.create_uniform_bind_group("object_bind_group", &self.object_layout, &uniform_buffer);

        MeshBuffers {
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            bind_group,
            index_count: mesh.index_count(),
            topology: mesh.topology,
            color: mesh.color,
            unlit: mesh.unlit,
        }
    }

    /// Draw `commands` and an optional overlay, then present.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(
        &mut self,
        view_proj: Matrix4<f32>,
        commands: &[DrawCommand<'_>],
        overlay: Option<&mut dyn OverlayPass>,
    ) -> Result<()> {
        let queue = &self.gpu_context.queue;
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::new(view_proj)));
        for command in commands {
            let uniform = ObjectUniform::new(command.model, command.mesh.color, command.mesh.unlit);
            queue.write_buffer(&command.mesh.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost, reconfiguring");
                self.surface.configure(&self.gpu_context.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {:?}", e))),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu_context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        let mut overlay = overlay;
        let extra_buffers = match overlay.as_deref_mut() {
            Some(pass) => pass.prepare(
                &self.gpu_context.device,
                &self.gpu_context.queue,
                &mut encoder,
                self.size(),
            ),
            None => Vec::new(),
        };

        {
            let [r, g, b, a] = self.config.background_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
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

            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            // opaque first so translucent shells blend over what they contain
            for (bucket, pipeline) in [
                (Bucket::Opaque, &self.opaque_pipeline),
                (Bucket::Lines, &self.line_pipeline),
                (Bucket::Translucent, &self.translucent_pipeline),
            ] {
                render_pass.set_pipeline(pipeline);
                for command in commands.iter().filter(|c| c.mesh.bucket() == bucket) {
                    if command.mesh.index_count == 0 {
                        continue;
                    }
                    render_pass.set_bind_group(1, &command.mesh.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, command.mesh.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(command.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..command.mesh.index_count, 0, 0..1);
                }
            }
        }

        if let Some(pass) = overlay.as_deref() {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.paint(&mut render_pass);
        }

        self.gpu_context
            .queue
            .submit(extra_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }
}
