//! Window host for a topology panel

use std::sync::Arc;
use std::time::Instant;

use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use orbitview_core::{DataFrame, Error, PanelOptions, Result};
use orbitview_gpu::RenderConfig;

use crate::backend::GpuSceneBackend;
use crate::panel::TopologyPanel;

/// Pixels of wheel scroll counted as one line
const PIXELS_PER_LINE: f64 = 50.0;

/// Supplies frame sets to the viewer over time
pub trait FrameSource {
    /// New frames to show, if any are due at `now`
    fn poll(&mut self, now: Instant) -> Option<Vec<DataFrame>>;
}

/// A fixed frame set delivered once
pub struct StaticFrames(Option<Vec<DataFrame>>);

impl StaticFrames {
    pub fn new(frames: Vec<DataFrame>) -> Self {
        Self(Some(frames))
    }
}

impl FrameSource for StaticFrames {
    fn poll(&mut self, _now: Instant) -> Option<Vec<DataFrame>> {
        self.0.take()
    }
}

/// Window settings
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub options: PanelOptions,
    pub render: RenderConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "orbitview".to_string(),
            width: 1200.0,
            height: 800.0,
            options: PanelOptions::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Pointer state for orbit input
#[derive(Debug, Default)]
struct PointerState {
    dragging: bool,
    last_position: Option<PhysicalPosition<f64>>,
}

/// Open a window and run a panel fed by `source` until the window closes
pub fn run(config: ViewerConfig, mut source: impl FrameSource + 'static) -> Result<()> {
    let event_loop = EventLoop::new()
        .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .build(&event_loop)
            .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
    );

    let backend = GpuSceneBackend::new(window.clone(), config.render.clone());
    let mut panel = TopologyPanel::new(backend, config.options.clone());
    if let Some(frames) = source.poll(Instant::now()) {
        panel.on_data(&frames)?;
    }
    let size = window.inner_size();
    panel.mount(size.width, size.height)?;

    let mut pointer = PointerState::default();
    let mut last_frame = Instant::now();

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => {
                    let consumed = panel.scene_mut().backend_mut().on_window_event(&event);

                    match event {
                        WindowEvent::CloseRequested => {
                            panel.unmount();
                            target.exit();
                        }
                        WindowEvent::Resized(size) => {
                            panel.on_resize(size.width, size.height);
                        }
                        WindowEvent::MouseInput {
                            state,
                            button: MouseButton::Left,
                            ..
                        } if !consumed => {
                            pointer.dragging = state == ElementState::Pressed;
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            if let (true, Some(last)) = (pointer.dragging, pointer.last_position) {
                                if let Some(controls) = panel.controls_mut() {
                                    controls.rotate((position.x - last.x) as f32, (position.y - last.y) as f32);
                                }
                            }
                            pointer.last_position = Some(position);
                        }
                        WindowEvent::MouseWheel { delta, .. } if !consumed => {
                            let lines = match delta {
                                MouseScrollDelta::LineDelta(_, y) => y,
                                MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
                            };
                            if let Some(controls) = panel.controls_mut() {
                                controls.zoom(lines);
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            if let Some(frames) = source.poll(now) {
                                if let Err(e) = panel.on_data(&frames) {
                                    log::error!("failed to apply data: {}", e);
                                }
                            }
                            let dt = now.duration_since(last_frame).as_secs_f32();
                            last_frame = now;
                            if let Err(e) = panel.render_frame(dt) {
                                log::error!("render error: {}", e);
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    window.request_redraw();
                }
                Event::LoopExiting => {
                    panel.unmount();
                }
                _ => {}
            }
        })
        .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))?;

    Ok(())
}
