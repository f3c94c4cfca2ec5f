//! wgpu + egui implementation of [`SceneBackend`]

use std::sync::Arc;

use winit::event::WindowEvent;
use winit::window::Window;

use orbitview_core::{Error, Result};
use orbitview_gpu::{DrawCommand, GpuMesh, MeshBuffers, OverlayPass, RenderConfig, SceneRenderer};
use orbitview_layout::VisualMesh;

use crate::overlay::{project_labels, OverlayModel, ScreenLabel};
use crate::scene::{Frame, SceneBackend};

const PANEL_MARGIN: f32 = 12.0;
const LABEL_FONT_SIZE: f32 = 12.0;

/// egui state and renderer drawn as a second pass over the scene
pub struct EguiOverlay {
    context: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    paint_jobs: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    /// Textures egui dropped last frame, freed once that frame is drawn
    free_after_frame: Vec<egui::TextureId>,
    screen: egui_wgpu::ScreenDescriptor,
}

impl EguiOverlay {
    pub fn new(window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let context = egui::Context::default();
        let state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, format, None, 1);
        let size = window.inner_size();

        Self {
            context,
            state,
            renderer,
            paint_jobs: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            free_after_frame: Vec::new(),
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: window.scale_factor() as f32,
            },
        }
    }

    /// Forward a window event; returns whether egui consumed it
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Lay out labels and panels for this frame
    pub fn build(&mut self, window: &Window, labels: &[ScreenLabel], model: Option<&OverlayModel>) {
        let raw_input = self.state.take_egui_input(window);
        let output = self.context.run(raw_input, |ctx| {
            draw_labels(ctx, labels);
            if let Some(model) = model {
                draw_panels(ctx, model);
            }
        });
        self.state.handle_platform_output(window, output.platform_output);

        self.paint_jobs = self.context.tessellate(output.shapes, output.pixels_per_point);
        self.textures_delta.append(output.textures_delta);
        let size = window.inner_size();
        self.screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: output.pixels_per_point,
        };
    }
}

impl OverlayPass for EguiOverlay {
    fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        surface_size: [u32; 2],
    ) -> Vec<wgpu::CommandBuffer> {
        self.screen.size_in_pixels = surface_size;
        for id in self.free_after_frame.drain(..) {
            self.renderer.free_texture(&id);
        }
        let delta = std::mem::take(&mut self.textures_delta);
        for (id, image_delta) in &delta.set {
            self.renderer.update_texture(device, queue, *id, image_delta);
        }
        self.free_after_frame = delta.free;
        self.renderer
            .update_buffers(device, queue, encoder, &self.paint_jobs, &self.screen)
    }

    fn paint<'rp>(&'rp self, render_pass: &mut wgpu::RenderPass<'rp>) {
        self.renderer.render(render_pass, &self.paint_jobs, &self.screen);
    }
}

fn draw_labels(ctx: &egui::Context, labels: &[ScreenLabel]) {
    let painter = ctx.layer_painter(egui::LayerId::background());
    let pixels_per_point = ctx.pixels_per_point();
    for label in labels {
        let anchor = egui::pos2(
            label.position[0] / pixels_per_point,
            label.position[1] / pixels_per_point,
        );
        let mut text = label.title.clone();
        for line in &label.lines {
            text.push('\n');
            text.push_str(line);
        }
        painter.text(
            anchor,
            egui::Align2::CENTER_BOTTOM,
            text,
            egui::FontId::proportional(LABEL_FONT_SIZE),
            egui::Color32::WHITE,
        );
    }
}

fn draw_panels(ctx: &egui::Context, model: &OverlayModel) {
    if model.no_data {
        egui::Area::new(egui::Id::new("no-data"))
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .interactable(false)
            .show(ctx, |ui| {
                ui.heading("No data");
            });
        return;
    }

    summary_panel(
        ctx,
        "transactions-summary",
        egui::Align2::LEFT_TOP,
        egui::vec2(PANEL_MARGIN, PANEL_MARGIN),
        &model.transactions.rows(&model.clock),
    );
    summary_panel(
        ctx,
        "counter-summary",
        egui::Align2::RIGHT_TOP,
        egui::vec2(-PANEL_MARGIN, PANEL_MARGIN),
        &model.counters.rows(),
    );
}

fn summary_panel(
    ctx: &egui::Context,
    id: &'static str,
    align: egui::Align2,
    offset: egui::Vec2,
    rows: &[(&'static str, String)],
) {
    egui::Area::new(egui::Id::new(id))
        .anchor(align, offset)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                egui::Grid::new(id).num_columns(2).show(ui, |ui| {
                    for (name, value) in rows {
                        ui.label(*name);
                        ui.strong(value.as_str());
                        ui.end_row();
                    }
                });
            });
        });
}

/// Scene backend rendering into a winit window
pub struct GpuSceneBackend {
    window: Arc<Window>,
    config: RenderConfig,
    renderer: Option<SceneRenderer<'static>>,
    overlay: Option<EguiOverlay>,
}

impl GpuSceneBackend {
    pub fn new(window: Arc<Window>, config: RenderConfig) -> Self {
        Self {
            window,
            config,
            renderer: None,
            overlay: None,
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Forward a window event to the overlay; returns whether it was consumed
    pub fn on_window_event(&mut self, event: &WindowEvent) -> bool {
        match self.overlay.as_mut() {
            Some(overlay) => overlay.on_window_event(&self.window, event),
            None => false,
        }
    }

    fn renderer(&self) -> Result<&SceneRenderer<'static>> {
        self.renderer
            .as_ref()
            .ok_or_else(|| Error::Visualization("scene backend is not attached".to_string()))
    }
}

impl SceneBackend for GpuSceneBackend {
    type Mesh = MeshBuffers;

    fn attach(&mut self, width: u32, height: u32) -> Result<()> {
        let renderer = pollster::block_on(SceneRenderer::new(
            self.window.clone(),
            width,
            height,
            self.config.clone(),
        ))?;
        self.overlay = Some(EguiOverlay::new(
            &self.window,
            renderer.device(),
            renderer.surface_format(),
        ));
        self.renderer = Some(renderer);
        Ok(())
    }

    fn create_mesh(&mut self, mesh: &VisualMesh) -> Result<MeshBuffers> {
        Ok(self.renderer()?.upload(&GpuMesh::from_visual(mesh)))
    }

    fn release_mesh(&mut self, mesh: MeshBuffers) {
        mesh.release();
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.resize(width, height);
        }
    }

    fn draw(&mut self, frame: &Frame<'_, MeshBuffers>) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };

        let [width, height] = renderer.size();
        let labels = project_labels(&frame.labels, frame.camera, [width as f32, height as f32]);
        let commands: Vec<DrawCommand<'_>> = frame
            .meshes
            .iter()
            .map(|instance| DrawCommand {
                mesh: instance.mesh,
                model: instance.model,
            })
            .collect();

        let overlay = match self.overlay.as_mut() {
            Some(overlay) => {
                overlay.build(&self.window, &labels, frame.overlay);
                Some(overlay as &mut dyn OverlayPass)
            }
            None => None,
        };

        renderer.render(frame.camera.view_projection(), &commands, overlay)
    }

    fn detach(&mut self) {
        self.overlay = None;
        if self.renderer.take().is_some() {
            log::info!("scene renderer released");
        }
    }
}
