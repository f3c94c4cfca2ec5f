//! Panel entry point: the surface a host drives with data, options and sizes

use orbitview_core::{parse_nodes, DataFrame, NodeRecord, OptionDescriptor, PanelOptions, Result};

use crate::camera::OrbitControls;
use crate::overlay::OverlayModel;
use crate::scene::{LifecycleState, SceneBackend, SceneManager};

/// Options the panel exposes to its host
pub fn option_registry() -> Vec<OptionDescriptor> {
    PanelOptions::registry()
}

/// What the host should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelView {
    /// The frame set was empty or held no node records; no 3D visuals are held
    NoData,
    Scene,
}

/// A topology panel: parsed data, overlay state and one scene
pub struct TopologyPanel<B: SceneBackend> {
    scene: SceneManager<B>,
    options: PanelOptions,
    nodes: Vec<NodeRecord>,
    /// Node list and layer count of the last rebuild request
    built: Option<(Vec<NodeRecord>, u32)>,
    overlay: OverlayModel,
    view: PanelView,
}

impl<B: SceneBackend> TopologyPanel<B> {
    pub fn new(backend: B, options: PanelOptions) -> Self {
        Self::with_scene(SceneManager::new(backend), options)
    }

    pub fn with_scene(scene: SceneManager<B>, options: PanelOptions) -> Self {
        Self {
            scene,
            options,
            nodes: Vec::new(),
            built: None,
            overlay: OverlayModel {
                no_data: true,
                ..OverlayModel::default()
            },
            view: PanelView::NoData,
        }
    }

    pub fn view(&self) -> PanelView {
        self.view
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    pub fn overlay(&self) -> &OverlayModel {
        &self.overlay
    }

    pub fn scene(&self) -> &SceneManager<B> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneManager<B> {
        &mut self.scene
    }

    pub fn controls_mut(&mut self) -> Option<&mut OrbitControls> {
        self.scene.controls_mut()
    }

    /// Mount the scene and start the clock
    pub fn mount(&mut self, width: u32, height: u32) -> Result<()> {
        let result = self.scene.mount(width, height);
        if result.is_err() {
            // a deferred build may have failed part way
            self.built = None;
        }
        if self.scene.is_mounted() {
            self.overlay.clock.start();
            self.overlay.clock.tick();
        }
        result
    }

    /// Take a new frame set from the host
    pub fn on_data(&mut self, frames: &[DataFrame]) -> Result<()> {
        self.nodes = parse_nodes(frames);
        self.overlay.update_aggregates(frames);
        self.view = if frames.is_empty() || self.nodes.is_empty() {
            PanelView::NoData
        } else {
            PanelView::Scene
        };
        self.overlay.no_data = self.view == PanelView::NoData;
        log::debug!("panel received {} frames, {} nodes", frames.len(), self.nodes.len());
        self.sync_scene()
    }

    /// Apply new options; only a layer count change rebuilds
    pub fn on_options(&mut self, options: PanelOptions) -> Result<()> {
        options.validate()?;
        self.options = options;
        self.sync_scene()
    }

    /// Resize only; visuals are never rebuilt here
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
    }

    /// Advance the clock and draw one frame
    pub fn render_frame(&mut self, dt: f32) -> Result<()> {
        self.overlay.clock.tick();
        self.scene.render_frame(dt, Some(&self.overlay))
    }

    /// Stop the clock and tear the scene down
    pub fn unmount(&mut self) {
        self.overlay.clock.stop();
        self.scene.unmount();
    }

    pub fn state(&self) -> LifecycleState {
        self.scene.state()
    }

    fn sync_scene(&mut self) -> Result<()> {
        if self.view == PanelView::NoData {
            self.built = None;
            self.scene.clear();
            return Ok(());
        }
        let layer_count = self.options.number_of_layers;
        let unchanged = self
            .built
            .as_ref()
            .is_some_and(|(nodes, layers)| *layers == layer_count && *nodes == self.nodes);
        if unchanged {
            log::trace!("node list and layer count unchanged, skipping rebuild");
            return Ok(());
        }
        self.built = None;
        self.scene.update(&self.nodes, layer_count)?;
        self.built = Some((self.nodes.clone(), layer_count));
        Ok(())
    }
}
