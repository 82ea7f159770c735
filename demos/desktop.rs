use std::sync::Arc;

use demon_eye::gui::iris_control_panel;
use demon_eye::{EyeConfig, EyeRenderer, EyeScene, FrameLoop, PointerEvent, ShaderSource};
use winit::application::ApplicationHandler;
use winit::event::{
    ElementState, KeyEvent, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

/// Pixels per wheel "line" on mice that report line deltas.
const LINE_HEIGHT: f32 = 40.0;

struct App {
    config: EyeConfig,
    shader: ShaderSource,
    state: Option<AppState>,
}

struct AppState {
    window: Arc<Window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    renderer: EyeRenderer,
    scene: EyeScene,
    frames: FrameLoop,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Demon Eye")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720)),
        ) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let config = &self.config;
        let shader = &self.shader;
        let state = pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let surface = instance.create_surface(window.clone()).unwrap();

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .unwrap();

            let (device, queue) = adapter
                .request_device(
                    &wgpu::DeviceDescriptor {
                        label: Some("demon_eye_device"),
                        ..Default::default()
                    },
                    None,
                )
                .await
                .unwrap();

            let size = window.inner_size();
            let caps = surface.get_capabilities(&adapter);
            let format = caps.formats[0];

            let surface_config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: size.width.max(1),
                height: size.height.max(1),
                present_mode: wgpu::PresentMode::AutoVsync,
                alpha_mode: caps.alpha_modes[0],
                view_formats: vec![],
                desired_maximum_frame_latency: 2,
            };
            surface.configure(&device, &surface_config);

            let renderer = EyeRenderer::new(&device, format, shader);
            let mut scene = EyeScene::new(config);
            scene.resize(surface_config.width, surface_config.height);

            // egui setup
            let egui_ctx = egui::Context::default();
            let egui_state = egui_winit::State::new(
                egui_ctx.clone(),
                egui_ctx.viewport_id(),
                &window,
                Some(window.scale_factor() as f32),
                None,
                None,
            );
            let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

            AppState {
                window,
                device,
                queue,
                surface,
                surface_config,
                renderer,
                scene,
                frames: FrameLoop::new(),
                egui_ctx,
                egui_state,
                egui_renderer,
            }
        });

        self.state = Some(state);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        // Pass events to egui first
        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        if egui_response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                state.surface_config.width = new_size.width.max(1);
                state.surface_config.height = new_size.height.max(1);
                state
                    .surface
                    .configure(&state.device, &state.surface_config);
                state.scene.resize(new_size.width, new_size.height);
                state.window.request_redraw();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(pos) => -pos.y as f32,
                };
                state.scene.handle_pointer(PointerEvent::Wheel { delta_y });
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                state.scene.handle_pointer(PointerEvent::Click);
            }
            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started => state.scene.handle_pointer(PointerEvent::Click),
                TouchPhase::Moved => state.scene.handle_pointer(PointerEvent::TouchMove {
                    x: touch.location.x as f32,
                    y: touch.location.y as f32,
                }),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                let output = match state.surface.get_current_texture() {
                    Ok(output) => output,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state
                            .surface
                            .configure(&state.device, &state.surface_config);
                        return;
                    }
                    Err(e) => {
                        log::warn!("surface error: {e:?}");
                        return;
                    }
                };

                // Animations first, then stage what they wrote.
                let tick = state.frames.frame(&mut state.scene, &mut state.renderer);
                if tick.gaze.turned_demon {
                    state.window.set_title("Demon Eye (awake)");
                }

                // --- egui frame ---
                let raw_input = state.egui_state.take_egui_input(&state.window);
                let readout = state.scene.shrink_readout();
                let full_output = state.egui_ctx.run(raw_input, |ctx| {
                    iris_control_panel(ctx, state.scene.params_mut(), readout);
                });

                state
                    .egui_state
                    .handle_platform_output(&state.window, full_output.platform_output);

                let paint_jobs = state
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                for (id, delta) in &full_output.textures_delta.set {
                    state
                        .egui_renderer
                        .update_texture(&state.device, &state.queue, *id, delta);
                }

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [state.surface_config.width, state.surface_config.height],
                    pixels_per_point: state.window.scale_factor() as f32,
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                let mut encoder =
                    state
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("demon_eye_encoder"),
                        });

                state.egui_renderer.update_buffers(
                    &state.device,
                    &state.queue,
                    &mut encoder,
                    &paint_jobs,
                    &screen_descriptor,
                );

                state.renderer.upload(&state.queue);

                // Eyes and panel share one pass
                {
                    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("demon_eye_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        timestamp_writes: None,
                        occlusion_query_set: None,
                    });

                    state.renderer.draw(&mut pass);

                    state.egui_renderer.render(
                        &mut pass.forget_lifetime(),
                        &paint_jobs,
                        &screen_descriptor,
                    );
                }

                for id in &full_output.textures_delta.free {
                    state.egui_renderer.free_texture(id);
                }

                state.queue.submit(std::iter::once(encoder.finish()));
                output.present();

                state.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match EyeConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => EyeConfig::default(),
    };

    // A missing program is fatal before any window opens.
    let shader = match ShaderSource::load(&config.shader) {
        Ok(shader) => shader,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let event_loop = EventLoop::new().unwrap();
    let mut app = App {
        config,
        shader,
        state: None,
    };
    event_loop.run_app(&mut app).unwrap();
}
