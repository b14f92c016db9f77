use std::sync::Arc;

use glam::Mat4;
use wgpu::*;

use crate::model::{PerspectiveCamera, Scene};
use crate::utils::{create_box_mesh, MeshBuffer, Vertex};
use crate::view::{GpuContext, RenderError, Renderer, ViewportSize};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
pub const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
struct LightUniform {
    direction: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GlobalsUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_count: [u32; 4],
    lights: [LightUniform; MAX_LIGHTS],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct MeshUniform {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    color: [f32; 4],
}

impl GlobalsUniform {
    fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut lights = [LightUniform::default(); MAX_LIGHTS];
        for (slot, light) in lights.iter_mut().zip(&scene.lights) {
            let [r, g, b] = light.color.to_linear();
            let dir = light.direction();
            slot.direction = [dir.x, dir.y, dir.z, 0.0];
            slot.color = [r * light.intensity, g * light.intensity, b * light.intensity, 1.0];
        }
        if scene.lights.len() > MAX_LIGHTS {
            tracing::warn!("scene has {} lights, only {MAX_LIGHTS} are shaded", scene.lights.len());
        }

        let p = camera.position;
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            camera_pos: [p.x, p.y, p.z, 1.0],
            light_count: [scene.lights.len().min(MAX_LIGHTS) as u32, 0, 0, 0],
            lights,
        }
    }
}

/// Uniform buffer and bind group for one scene object
struct MeshSlot {
    buffer: Buffer,
    bind_group: BindGroup,
}

/// WebGPU only guarantees 1x and 4x multisampling for renderable formats
pub fn supported_sample_count(requested: u32) -> u32 {
    if requested > 1 { 4 } else { 1 }
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32, sample_count: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

/// Multisampled colour target, resolved into the swapchain frame each pass
fn create_msaa_target(device: &Device, config: &SurfaceConfiguration, sample_count: u32) -> TextureView {
    device
        .create_texture(&TextureDescriptor {
            label: Some("msaa_color"),
            size: Extent3d { width: config.width, height: config.height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count,
            dimension: TextureDimension::D2,
            format: config.format,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&TextureViewDescriptor::default())
}

fn uniform_layout(device: &Device, label: &str, visibility: ShaderStages) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_mesh_pipeline(
    device: &Device,
    format: TextureFormat,
    globals_layout: &BindGroupLayout,
    mesh_layout: &BindGroupLayout,
    sample_count: u32,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("phong_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/phong.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts: &[globals_layout, mesh_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("mesh_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
                step_mode: VertexStepMode::Vertex,
                attributes: &[
                    VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
                    VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: Some(Face::Back),
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: sample_count, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// wgpu implementation of [`Renderer`]: every scene object is the shared unit
/// box, scaled and placed by its model matrix.
pub struct WgpuRenderer {
    device: Arc<Device>,
    queue: Arc<Queue>,
    surface: Surface<'static>,
    config: SurfaceConfiguration,
    sample_count: u32,
    depth_view: TextureView,
    /// Present only when multisampling
    msaa_view: Option<TextureView>,
    pipeline: RenderPipeline,
    globals_buffer: Buffer,
    globals_bind_group: BindGroup,
    mesh_layout: BindGroupLayout,
    mesh_slots: Vec<MeshSlot>,
    box_mesh: MeshBuffer,
}

impl WgpuRenderer {
    /// `sample_count` above 1 enables 4x MSAA.
    pub fn new(gpu: GpuContext, sample_count: u32) -> Self {
        let GpuContext { device, queue, surface, format, config } = gpu;
        let sample_count = supported_sample_count(sample_count);
        tracing::info!(sample_count, "creating renderer");

        let (_, depth_view) = create_depth_texture(&device, config.width, config.height, sample_count);
        let msaa_view = (sample_count > 1).then(|| create_msaa_target(&device, &config, sample_count));

        let globals_layout = uniform_layout(&device, "globals_bgl", ShaderStages::VERTEX_FRAGMENT);
        let mesh_layout = uniform_layout(&device, "mesh_bgl", ShaderStages::VERTEX_FRAGMENT);

        let globals_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_layout,
            entries: &[BindGroupEntry { binding: 0, resource: globals_buffer.as_entire_binding() }],
        });

        let pipeline = create_mesh_pipeline(&device, format, &globals_layout, &mesh_layout, sample_count);
        let box_mesh = create_box_mesh().upload(&device);

        Self {
            device,
            queue,
            surface,
            config,
            sample_count,
            depth_view,
            msaa_view,
            pipeline,
            globals_buffer,
            globals_bind_group,
            mesh_layout,
            mesh_slots: Vec::new(),
            box_mesh,
        }
    }

    fn configure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        let (_, depth_view) =
            create_depth_texture(&self.device, self.config.width, self.config.height, self.sample_count);
        self.depth_view = depth_view;
        if self.sample_count > 1 {
            self.msaa_view = Some(create_msaa_target(&self.device, &self.config, self.sample_count));
        }
    }

    fn ensure_mesh_slots(&mut self, count: usize) {
        while self.mesh_slots.len() < count {
            let buffer = self.device.create_buffer(&BufferDescriptor {
                label: Some("mesh_uniform"),
                size: std::mem::size_of::<MeshUniform>() as BufferAddress,
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
                label: Some("mesh_bg"),
                layout: &self.mesh_layout,
                entries: &[BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
            });
            self.mesh_slots.push(MeshSlot { buffer, bind_group });
        }
    }

    fn write_uniforms(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        let globals = GlobalsUniform::new(scene, camera);
        self.queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        self.ensure_mesh_slots(scene.objects.len());
        for (object, slot) in scene.objects.iter().zip(&self.mesh_slots) {
            let [r, g, b] = object.color.to_linear();
            let uniform = MeshUniform {
                model: object.model_matrix().to_cols_array_2d(),
                normal: Mat4::from_mat3(object.normal_matrix()).to_cols_array_2d(),
                color: [r, g, b, 1.0],
            };
            self.queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&uniform));
        }
    }
}

impl Renderer for WgpuRenderer {
    fn size(&self) -> ViewportSize {
        ViewportSize::new(self.config.width, self.config.height)
    }

    fn set_size(&mut self, size: ViewportSize) {
        if size.is_empty() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.configure();
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::debug!("surface lost or outdated, reconfiguring");
                self.configure();
                return Ok(());
            }
            Err(SurfaceError::Timeout) => return Err(RenderError::Timeout),
            Err(SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Surface(e.to_string())),
        };

        self.write_uniforms(scene, camera);

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        let [r, g, b] = scene.background.to_linear();
        // Multisampled frames draw offscreen and resolve into the swapchain view
        let (target, resolve_target, store) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&view), StoreOp::Discard),
            None => (&view, None, StoreOp::Store),
        };
        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: Operations {
                        load: LoadOp::Clear(Color { r: r as f64, g: g as f64, b: b as f64, a: 1.0 }),
                        store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.globals_bind_group, &[]);
            rp.set_vertex_buffer(0, self.box_mesh.vertex_buffer.slice(..));
            rp.set_index_buffer(self.box_mesh.index_buffer.slice(..), IndexFormat::Uint32);

            for slot in self.mesh_slots.iter().take(scene.objects.len()) {
                rp.set_bind_group(1, &slot.bind_group, &[]);
                rp.draw_indexed(0..self.box_mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;

    #[test]
    fn test_uniform_sizes_match_shader() {
        // mat4 + vec4 + vec4<u32> + 4 lights of two vec4s
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 64 + 16 + 16 + MAX_LIGHTS * 32);
        assert_eq!(std::mem::size_of::<MeshUniform>(), 64 + 64 + 16);
    }

    #[test]
    fn test_sample_count_is_one_or_four() {
        assert_eq!(supported_sample_count(ViewerConfig::default().sample_count), 4);
        assert_eq!(supported_sample_count(1), 1);
        assert_eq!(supported_sample_count(0), 1);
        assert_eq!(supported_sample_count(8), 4);
    }

    #[test]
    fn test_globals_premultiply_intensity() {
        let config = ViewerConfig::default();
        let (scene, _) = Scene::from_config(&config);
        let camera = PerspectiveCamera::new(75.0, 2.0, 0.1, 1000.0);

        let globals = GlobalsUniform::new(&scene, &camera);
        assert_eq!(globals.light_count[0], 1);
        for c in &globals.lights[0].color[..3] {
            assert!((c - 3.0).abs() < 1e-4, "white light at intensity 3, got {c}");
        }
        let dir = glam::Vec3::from_slice(&globals.lights[0].direction[..3]);
        assert!((dir - glam::Vec3::new(-1.0, 2.0, 4.0).normalize()).length() < 1e-6);
    }
}
