use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};
use tankfield::camera::{ChaseCamera, Projection};
use tankfield::config::CameraTuning;
use tankfield::input::WeaponMode;
use tankfield::mesh::terrain_color;
use tankfield::projectile::{Projectile, ProjectileId, RemovalReason};
use tankfield::sim::{SimObserver, Simulation};
use tankfield::tank::{frame_scale, sanitize_dt, TankPose};
use wgpu::util::DeviceExt;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::controls::Controls;

const MAX_BOXES: usize = 512;
const BOX_VERTICES: usize = 24;
const BOX_INDICES: usize = 36;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    color: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }

    fn update_view_proj(&mut self, camera: &ChaseCamera, projection: &Projection) {
        let view_proj = projection.build_projection_matrix() * camera.build_view_matrix();
        self.view_proj = view_proj.to_cols_array_2d();
    }
}

/// Writes simulation events to the log.
struct EventLog;

impl SimObserver for EventLog {
    fn tank_reset(&mut self, pose: &TankPose) {
        log::info!("tank left the map, respawned at {:?}", pose.position);
    }

    fn projectile_fired(&mut self, projectile: &Projectile) {
        log::debug!("fired {:?} shell {}", projectile.weapon(), projectile.id().0);
    }

    fn projectile_removed(&mut self, id: ProjectileId, reason: RemovalReason) {
        log::trace!("shell {} gone ({reason:?})", id.0);
    }
}

/// Per-frame geometry for everything that moves: the tank and its shells.
#[derive(Default)]
struct DynamicGeometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl DynamicGeometry {
    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    fn push_box(&mut self, center: Vec3, half: Vec3, rotation: Quat, color: [f32; 3]) {
        if self.vertices.len() + BOX_VERTICES > MAX_BOXES * BOX_VERTICES {
            return;
        }
        // (normal, up, side) with side x up == normal, so quads wind CCW.
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::Y, Vec3::NEG_Z),
            (Vec3::NEG_X, Vec3::Y, Vec3::Z),
            (Vec3::Y, Vec3::Z, Vec3::NEG_X),
            (Vec3::NEG_Y, Vec3::Z, Vec3::X),
            (Vec3::Z, Vec3::Y, Vec3::X),
            (Vec3::NEG_Z, Vec3::Y, Vec3::NEG_X),
        ];
        for (normal, up, side) in FACES {
            let base = self.vertices.len() as u32;
            let n = rotation * normal;
            for (u, v) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let local = (normal + side * u + up * v) * half;
                self.vertices.push(Vertex {
                    position: (center + rotation * local).to_array(),
                    normal: n.to_array(),
                    color,
                });
            }
            self.indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
    }

    fn push_tank(&mut self, pose: &TankPose, muzzle_forward: f32, muzzle_height: f32) {
        let at = |local: Vec3| pose.position + pose.orientation * local;
        let hull = [0.29, 0.37, 0.22];
        let turret = [0.24, 0.31, 0.18];

        let rotation = pose.orientation;
        self.push_box(at(Vec3::new(0.0, 0.6, 0.0)), Vec3::new(1.5, 0.6, 2.25), rotation, hull);
        self.push_box(at(Vec3::new(0.0, 1.5, -0.2)), Vec3::new(1.0, 0.35, 1.1), rotation, turret);

        let barrel_start = 0.9;
        let barrel_half = (muzzle_forward - barrel_start) * 0.5;
        self.push_box(
            at(Vec3::new(0.0, muzzle_height, barrel_start + barrel_half)),
            Vec3::new(0.12, 0.12, barrel_half),
            pose.orientation,
            turret,
        );
    }

    fn push_projectile(&mut self, projectile: &Projectile) {
        match projectile.explosion_age() {
            Some(age) => {
                let size = 0.5 + age * 6.0;
                let fire = [1.0, 0.55, 0.1];
                self.push_box(projectile.position(), Vec3::splat(size), Quat::IDENTITY, fire);
            }
            None => {
                let (size, color) = match projectile.weapon() {
                    WeaponMode::Cannon => (0.3, [0.15, 0.15, 0.15]),
                    WeaponMode::MachineGun => (0.12, [1.0, 0.9, 0.4]),
                };
                self.push_box(projectile.position(), Vec3::splat(size), Quat::IDENTITY, color);
            }
        }
    }
}

pub struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    terrain_vertex_buffer: wgpu::Buffer,
    terrain_index_buffer: wgpu::Buffer,
    terrain_indices: u32,
    dynamic_vertex_buffer: wgpu::Buffer,
    dynamic_index_buffer: wgpu::Buffer,
    dynamic: DynamicGeometry,
    sim: Simulation,
    controls: Controls,
    camera: ChaseCamera,
    projection: Projection,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl State {
    pub async fn new(
        window: Arc<Window>,
        sim: Simulation,
        camera_tuning: CameraTuning,
    ) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor { ..Default::default() });
        let surface = instance.create_surface(window).context("creating surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                ..Default::default()
            })
            .await
            .context("no suitable graphics adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                ..Default::default()
            })
            .await
            .context("requesting device")?;
        log::info!("rendering with {:?}", adapter.get_info().backend);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera = ChaseCamera::new(camera_tuning, &sim.tank().pose());
        let projection = Projection::new(config.width, config.height, &camera_tuning);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(&camera, &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let (depth_texture, depth_view) = create_depth_texture(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let flat = sim.terrain().mesh().flat_shaded();
        let terrain_vertices: Vec<Vertex> = flat
            .positions
            .iter()
            .zip(&flat.normals)
            .map(|(position, normal)| Vertex {
                position: *position,
                normal: *normal,
                color: terrain_color(position[1]),
            })
            .collect();
        log::info!(
            "uploading terrain: {} vertices, {} triangles",
            terrain_vertices.len(),
            flat.indices.len() / 3
        );

        let terrain_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertex Buffer"),
            contents: bytemuck::cast_slice(&terrain_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let terrain_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Index Buffer"),
            contents: bytemuck::cast_slice(&flat.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let terrain_indices = flat.indices.len() as u32;

        let dynamic_vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Dynamic Vertex Buffer"),
            size: (MAX_BOXES * BOX_VERTICES * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let dynamic_index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Dynamic Index Buffer"),
            size: (MAX_BOXES * BOX_INDICES * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::desc()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            terrain_vertex_buffer,
            terrain_index_buffer,
            terrain_indices,
            dynamic_vertex_buffer,
            dynamic_index_buffer,
            dynamic: DynamicGeometry::default(),
            sim,
            controls: Controls::new(1.5, 0.2),
            camera,
            projection,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            depth_texture,
            depth_view,
        })
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.controls.process_events(event)
    }

    pub fn mouse_motion(&mut self, delta: (f64, f64)) {
        self.controls.process_mouse_motion(delta.0, delta.1);
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.projection.resize(new_size.width, new_size.height);

            let (depth_texture, depth_view) = create_depth_texture(&self.device, &self.config);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    /// Advances the simulation by `dt` seconds and refreshes GPU buffers.
    pub fn update(&mut self, dt: f32) {
        let snapshot = self.controls.snapshot();
        let pose = self.sim.advance(&snapshot, dt, &mut EventLog);

        let scale = frame_scale(sanitize_dt(dt), self.sim.tank().tuning());
        self.controls.update_camera(&mut self.camera, scale);
        self.camera.follow(&pose, &self.sim.sampler(), scale);
        self.camera_uniform.update_view_proj(&self.camera, &self.projection);
        self.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[self.camera_uniform]));

        let tuning = self.sim.tank().tuning();
        self.dynamic.clear();
        self.dynamic.push_tank(&pose, tuning.muzzle_forward, tuning.muzzle_height);
        for projectile in self.sim.projectiles().iter() {
            self.dynamic.push_projectile(projectile);
        }
        let DynamicGeometry { vertices, indices } = &self.dynamic;
        self.queue.write_buffer(&self.dynamic_vertex_buffer, 0, bytemuck::cast_slice(vertices));
        self.queue.write_buffer(&self.dynamic_index_buffer, 0, bytemuck::cast_slice(indices));
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.53,
                            g: 0.74,
                            b: 0.92,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
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
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            render_pass.set_vertex_buffer(0, self.terrain_vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.terrain_index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.terrain_indices, 0, 0..1);

            let dynamic_indices = self.dynamic.indices.len() as u32;
            if dynamic_indices > 0 {
                render_pass.set_vertex_buffer(0, self.dynamic_vertex_buffer.slice(..));
                let indices = self.dynamic_index_buffer.slice(..);
                render_pass.set_index_buffer(indices, wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..dynamic_indices, 0, 0..1);
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
