use std::borrow::Cow;
use std::path::Path;

use crate::camera::Camera;
use crate::config::ShaderConfig;
use crate::error::{EyeError, Result};
use crate::frame::RenderSurface;
use crate::rig::{Lid, Side};
use crate::scene::EyeState;

const EMBEDDED_SHADER: &str = include_str!("../shaders/iris.wgsl");
const ENTRY_POINTS: [&str; 2] = ["vs_main", "fs_main"];

/// Uniform block shared with `iris.wgsl`. Every field is a vec4 so the
/// layout needs no padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EyeUniforms {
    /// xyz: camera position, w: vertical fov in radians.
    pub camera: [f32; 4],
    /// width, height, aspect, unused.
    pub viewport: [f32; 4],
    /// xyz: eyeball centre, w: radius.
    pub right_eye: [f32; 4],
    pub left_eye: [f32; 4],
    /// gaze pitch, gaze yaw, upper lid angle, lower lid angle.
    pub pose: [f32; 4],
    pub base_color_1: [f32; 4],
    pub base_color_2: [f32; 4],
    pub mid_color: [f32; 4],
    /// shrink, vignette, brightness, darkness.
    pub iris: [f32; 4],
    /// x: cat-eye (0 or 1).
    pub flags: [f32; 4],
}

impl Default for EyeUniforms {
    fn default() -> Self {
        Self::from_state(&EyeState::default(), None)
    }
}

impl EyeUniforms {
    pub fn from_state(state: &EyeState, camera: Option<&Camera>) -> Self {
        let params = &state.params;
        let rig = &state.rig;
        let radius = rig.eye_radius();
        let eye = |side: Side| {
            let [x, y, z] = rig.assembly(side).eye.position;
            [x, y, z, radius]
        };
        let rgb = |c: crate::params::Rgb| [c.0[0], c.0[1], c.0[2], 1.0];
        let (pitch, yaw) = rig.gaze();

        let (camera, viewport) = match camera {
            Some(cam) => {
                let [x, y, z] = cam.position();
                let (w, h) = cam.viewport();
                (
                    [x, y, z, cam.fov_y()],
                    [w as f32, h as f32, cam.aspect(), 0.0],
                )
            }
            None => (
                [rig.center_x(), 0.0, 600.0, 20f32.to_radians()],
                [1.0, 1.0, 1.0, 0.0],
            ),
        };

        Self {
            camera,
            viewport,
            right_eye: eye(Side::Right),
            left_eye: eye(Side::Left),
            pose: [
                pitch,
                yaw,
                rig.lid_angle(Lid::Upper),
                rig.lid_angle(Lid::Lower),
            ],
            base_color_1: rgb(params.base_color_1),
            base_color_2: rgb(params.base_color_2),
            mid_color: rgb(params.mid_color),
            iris: [
                params.shrink,
                params.vignette,
                params.brightness,
                params.darkness,
            ],
            flags: [if params.cat_eye { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// WGSL program text plus where it came from.
#[derive(Clone, Debug)]
pub struct ShaderSource {
    origin: String,
    code: Cow<'static, str>,
}

impl ShaderSource {
    pub fn embedded() -> Self {
        Self {
            origin: "embedded iris.wgsl".into(),
            code: Cow::Borrowed(EMBEDDED_SHADER),
        }
    }

    /// Resolve the program named by the config, falling back to the
    /// embedded one.
    pub fn load(config: &ShaderConfig) -> Result<Self> {
        let source = match &config.path {
            Some(path) => Self::from_file(path)?,
            None => Self::embedded(),
        };
        source.validate()?;
        Ok(source)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let origin = path.display().to_string();
        let code = std::fs::read_to_string(path).map_err(|e| EyeError::MissingShaderSource {
            origin: origin.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            origin,
            code: Cow::Owned(code),
        })
    }

    fn validate(&self) -> Result<()> {
        for entry in ENTRY_POINTS {
            if !self.code.contains(&format!("fn {entry}")) {
                return Err(EyeError::MissingShaderSource {
                    origin: self.origin.clone(),
                    reason: format!("no `{entry}` entry point"),
                });
            }
        }
        Ok(())
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Fullscreen ray-marched eye pair.
///
/// Rendering is split in two: [`RenderSurface::render`] stages the uniform
/// block on the CPU, [`EyeRenderer::upload`] copies it to the GPU and
/// [`EyeRenderer::draw`] records the draw into a pass the caller owns, so an
/// overlay can share the pass.
pub struct EyeRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    staged: EyeUniforms,
}

impl EyeRenderer {
    /// Build the pipeline from an already validated [`ShaderSource`].
    ///
    /// Nothing is uploaded here. The uniform buffer is filled by
    /// [`EyeRenderer::upload`] from whatever the last
    /// [`RenderSurface::render`] staged, and starts out holding zeros.
    pub fn new(
        device: &wgpu::Device,
        target_format: wgpu::TextureFormat,
        source: &ShaderSource,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("iris_shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(source.code().to_owned())),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("iris_bind_group_layout"),
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
            label: Some("iris_uniform_buffer"),
            size: std::mem::size_of::<EyeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("iris_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("iris_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("iris_render_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        log::info!(
            "iris renderer ready ({}, {:?})",
            source.origin(),
            target_format
        );

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            staged: EyeUniforms::default(),
        }
    }

    pub fn staged(&self) -> &EyeUniforms {
        &self.staged
    }

    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.staged));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

impl RenderSurface for EyeRenderer {
    fn render(&mut self, state: &EyeState, camera: &Camera) {
        self.staged = EyeUniforms::from_state(state, Some(camera));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use crate::params::{Rgb, DEMON_BASE_COLOR_1};

    #[test]
    fn embedded_shader_has_both_entry_points() {
        let source = ShaderSource::load(&ShaderConfig::default()).unwrap();
        assert!(source.code().contains("fn vs_main"));
        assert!(source.code().contains("fn fs_main"));
    }

    #[test]
    fn missing_file_is_a_missing_shader_source() {
        let config = ShaderConfig {
            path: Some("/nonexistent/iris.wgsl".into()),
        };
        let err = ShaderSource::load(&config).unwrap_err();
        assert!(matches!(err, EyeError::MissingShaderSource { .. }));
    }

    #[test]
    fn program_without_fragment_stage_is_rejected() {
        let path = std::env::temp_dir().join("demon-eye-vertex-only.wgsl");
        std::fs::write(&path, "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(); }").unwrap();
        let err = ShaderSource::load(&ShaderConfig { path: Some(path.clone()) }).unwrap_err();
        let _ = std::fs::remove_file(&path);
        match err {
            EyeError::MissingShaderSource { reason, .. } => assert!(reason.contains("fs_main")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn uniforms_mirror_state() {
        let mut state = EyeState::default();
        state.params.shrink = -0.9;
        state.params.apply_demon_palette(Rgb::from_rgb8(DEMON_BASE_COLOR_1), Rgb([0.0; 3]));
        state.rig.set_gaze(0.25, -0.5);
        let mut camera = Camera::new(&CameraConfig::default(), state.rig.center_x());
        camera.set_viewport(1600, 800);

        let u = EyeUniforms::from_state(&state, Some(&camera));
        assert_eq!(u.iris[0], -0.9);
        assert_eq!(u.flags[0], 1.0);
        assert_eq!(&u.pose[..2], &[0.25, -0.5]);
        assert_eq!(u.left_eye, [96.0, 0.0, 0.0, 30.0]);
        assert_eq!(u.camera[..3], [48.0, 0.0, 600.0]);
        assert_eq!(u.viewport[2], 2.0);
        assert_eq!(std::mem::size_of::<EyeUniforms>(), 160);
    }
}
