//! Scene lifecycle management
//!
//! A [`SceneManager`] owns everything a mounted topology view needs: camera,
//! orbit controls, the live scene objects and their animation state. The
//! backend that actually holds GPU resources sits behind [`SceneBackend`].
//!
//! Every data update is a full rebuild: all existing objects are released
//! (children and label anchors included) before the new set is created.
//! Backend mesh handles are moved into [`SceneBackend::release_mesh`], so a
//! handle can only ever be released once.

use crate::camera::{Camera, OrbitControls};
use crate::overlay::OverlayModel;
use nalgebra::{Matrix4, Vector3};
use orbitview_core::{NodeRecord, Point3f, Result, Transform3D};
use orbitview_layout::{describe_scene, LabelBlock, LayoutConfig, SpinGroup, VisualMesh, VisualStyle};

/// Rotation of the whole node set, radians per second
pub const ORBIT_SPEED: f32 = 0.05;
/// In-place spin of center nodes and the core, radians per second
pub const SPIN_SPEED: f32 = 0.5;
/// Gap between the top of a node and its label
const LABEL_CLEARANCE: f32 = 0.6;

/// Where a manager is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Unmounted,
    Mounting,
    Mounted,
    Updating,
    Unmounting,
}

/// The rendering side of a scene
pub trait SceneBackend {
    /// Handle to one uploaded mesh
    type Mesh;

    /// Allocate the render surface
    fn attach(&mut self, width: u32, height: u32) -> Result<()>;

    /// Upload a mesh descriptor
    fn create_mesh(&mut self, mesh: &VisualMesh) -> Result<Self::Mesh>;

    /// Free an uploaded mesh
    fn release_mesh(&mut self, mesh: Self::Mesh);

    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame
    fn draw(&mut self, frame: &Frame<'_, Self::Mesh>) -> Result<()>;

    /// Release the render surface; must tolerate a partial attach
    fn detach(&mut self);
}

/// A mesh with its world transform for this frame
pub struct MeshInstance<'a, M> {
    pub mesh: &'a M,
    pub model: Matrix4<f32>,
}

/// A label anchored at a world position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel<'a> {
    pub block: &'a LabelBlock,
    pub world: Point3f,
}

/// Everything a backend needs to draw one frame
pub struct Frame<'a, M> {
    pub camera: &'a Camera,
    pub meshes: Vec<MeshInstance<'a, M>>,
    pub labels: Vec<PlacedLabel<'a>>,
    pub overlay: Option<&'a OverlayModel>,
}

/// Label attachment of a scene object
#[derive(Debug, Clone)]
struct LabelAnchor {
    block: LabelBlock,
    offset: Vector3<f32>,
}

/// A node in the scene tree
struct SceneObject<M> {
    name: String,
    mesh: Option<M>,
    local: Transform3D,
    spins: bool,
    label: Option<LabelAnchor>,
    children: Vec<SceneObject<M>>,
}

impl<M> SceneObject<M> {
    fn group(name: impl Into<String>, local: Transform3D) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            local,
            spins: false,
            label: None,
            children: Vec::new(),
        }
    }

    fn mesh_count(&self) -> usize {
        usize::from(self.mesh.is_some()) + self.children.iter().map(SceneObject::mesh_count).sum::<usize>()
    }

    /// Release this object and everything below it; returns the meshes freed
    fn dispose<B: SceneBackend<Mesh = M>>(self, backend: &mut B) -> usize {
        let mut released = 0;
        for child in self.children {
            released += child.dispose(backend);
        }
        if let Some(mesh) = self.mesh {
            backend.release_mesh(mesh);
            released += 1;
        }
        log::trace!("disposed {} ({} meshes)", self.name, released);
        released
    }

    fn collect<'a>(
        &'a self,
        parent: &Matrix4<f32>,
        spin: &Matrix4<f32>,
        meshes: &mut Vec<MeshInstance<'a, M>>,
        labels: &mut Vec<PlacedLabel<'a>>,
    ) {
        let anchor = parent * self.local.matrix;
        let world = if self.spins { anchor * spin } else { anchor };
        if let Some(mesh) = &self.mesh {
            meshes.push(MeshInstance { mesh, model: world });
        }
        if let Some(label) = &self.label {
            let position = anchor.transform_point(&(Point3f::origin() + label.offset));
            labels.push(PlacedLabel {
                block: &label.block,
                world: position,
            });
        }
        // children follow the parent's placement, not its spin
        for child in &self.children {
            child.collect(&anchor, spin, meshes, labels);
        }
    }
}

/// Cosmetic rotation state, reset on every rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    pub orbit_angle: f32,
    pub spin_angle: f32,
}

impl AnimationState {
    pub fn advance(&mut self, dt: f32) {
        self.orbit_angle = (self.orbit_angle + ORBIT_SPEED * dt) % std::f32::consts::TAU;
        self.spin_angle = (self.spin_angle + SPIN_SPEED * dt) % std::f32::consts::TAU;
    }
}

/// Live state of a mounted scene
struct SceneResources<M> {
    camera: Camera,
    controls: OrbitControls,
    nodes: Vec<SceneObject<M>>,
    rings: Vec<SceneObject<M>>,
    animation: AnimationState,
}

impl<M> SceneResources<M> {
    fn new(width: u32, height: u32) -> Self {
        let mut camera = Camera::default();
        camera.set_viewport(width, height);
        let mut controls = OrbitControls::default();
        controls.update(&mut camera);
        Self {
            camera,
            controls,
            nodes: Vec::new(),
            rings: Vec::new(),
            animation: AnimationState::default(),
        }
    }

    fn mesh_count(&self) -> usize {
        self.nodes
            .iter()
            .chain(self.rings.iter())
            .map(SceneObject::mesh_count)
            .sum()
    }

    fn dispose_objects<B: SceneBackend<Mesh = M>>(&mut self, backend: &mut B) -> usize {
        self.nodes
            .drain(..)
            .chain(self.rings.drain(..))
            .map(|object| object.dispose(backend))
            .sum()
    }
}

#[derive(Debug, Clone)]
struct PendingUpdate {
    nodes: Vec<NodeRecord>,
    layer_count: u32,
}

/// Owns one scene and drives it through its lifecycle
pub struct SceneManager<B: SceneBackend> {
    backend: B,
    state: LifecycleState,
    layout: LayoutConfig,
    style: VisualStyle,
    resources: Option<SceneResources<B::Mesh>>,
    pending: Option<PendingUpdate>,
    attached: bool,
    mounted_once: bool,
    size: (u32, u32),
}

impl<B: SceneBackend> SceneManager<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, LayoutConfig::default(), VisualStyle::default())
    }

    pub fn with_config(backend: B, layout: LayoutConfig, style: VisualStyle) -> Self {
        Self {
            backend,
            state: LifecycleState::Unmounted,
            layout,
            style,
            resources: None,
            pending: None,
            attached: false,
            mounted_once: false,
            size: (0, 0),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.state == LifecycleState::Mounted
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.resources.as_ref().map(|r| &r.camera)
    }

    pub fn controls_mut(&mut self) -> Option<&mut OrbitControls> {
        self.resources.as_mut().map(|r| &mut r.controls)
    }

    pub fn animation(&self) -> Option<AnimationState> {
        self.resources.as_ref().map(|r| r.animation)
    }

    /// Number of backend meshes currently held by the scene
    pub fn attached_count(&self) -> usize {
        self.resources.as_ref().map_or(0, SceneResources::mesh_count)
    }

    /// Attach the backend and set up camera and controls.
    ///
    /// Only the first successful call does anything. An update requested
    /// before mounting is applied here.
    pub fn mount(&mut self, width: u32, height: u32) -> Result<()> {
        if self.mounted_once {
            log::debug!("scene already mounted, ignoring mount");
            return Ok(());
        }

        self.state = LifecycleState::Mounting;
        if let Err(e) = self.backend.attach(width, height) {
            log::error!("failed to attach scene backend: {}", e);
            self.backend.detach();
            self.state = LifecycleState::Unmounted;
            return Err(e);
        }
        self.attached = true;
        self.mounted_once = true;
        self.size = (width, height);
        self.resources = Some(SceneResources::new(width, height));
        self.state = LifecycleState::Mounted;
        log::info!("scene mounted at {}x{}", width, height);

        match self.pending.take() {
            Some(pending) => self.rebuild(&pending.nodes, pending.layer_count),
            None => Ok(()),
        }
    }

    /// Replace every visual with a fresh build of `nodes`.
    ///
    /// Before mount the request is kept and the latest one is applied by
    /// [`SceneManager::mount`].
    pub fn update(&mut self, nodes: &[NodeRecord], layer_count: u32) -> Result<()> {
        if self.state != LifecycleState::Mounted {
            log::debug!("scene not mounted, deferring update of {} nodes", nodes.len());
            self.pending = Some(PendingUpdate {
                nodes: nodes.to_vec(),
                layer_count,
            });
            return Ok(());
        }
        self.rebuild(nodes, layer_count)
    }

    fn rebuild(&mut self, nodes: &[NodeRecord], layer_count: u32) -> Result<()> {
        let Some(resources) = self.resources.as_mut() else {
            return Ok(());
        };
        self.state = LifecycleState::Updating;

        let released = resources.dispose_objects(&mut self.backend);
        resources.animation = AnimationState::default();

        let config = self.layout.clone().with_layer_count(layer_count);
        let description = describe_scene(nodes, &config, &self.style);
        // partially built objects stay in `resources` so the next rebuild frees them
        let result = Self::build_objects(&mut self.backend, resources, description);
        self.state = LifecycleState::Mounted;

        log::debug!(
            "rebuilt scene: released {} meshes, {} nodes, {} attached",
            released,
            nodes.len(),
            resources.mesh_count()
        );
        result
    }

    fn build_objects(
        backend: &mut B,
        resources: &mut SceneResources<B::Mesh>,
        description: orbitview_layout::SceneDescription,
    ) -> Result<()> {
        for ring in description.rings {
            let mut object = SceneObject::group(format!("ring-{}", ring.guide.layer), Transform3D::identity());
            object.mesh = Some(backend.create_mesh(&ring.mesh)?);
            resources.rings.push(object);
        }

        for placed in description.nodes {
            let visual = placed.visual;
            let mut object = SceneObject::group(
                visual.node_id.clone(),
                Transform3D::translation(placed.position.coords),
            );
            object.spins = visual.spin == SpinGroup::Center;
            object.label = Some(LabelAnchor {
                block: visual.label,
                offset: Vector3::new(0.0, visual.radius + LABEL_CLEARANCE, 0.0),
            });
            object.mesh = Some(backend.create_mesh(&visual.body)?);
            let core = visual.core;
            resources.nodes.push(object);

            if let Some(core) = core {
                let mut core_object = SceneObject::group(format!("{}-core", visual.node_id), Transform3D::identity());
                core_object.spins = true;
                let handle = backend.create_mesh(&core)?;
                core_object.mesh = Some(handle);
                if let Some(parent) = resources.nodes.last_mut() {
                    parent.children.push(core_object);
                }
            }
        }
        Ok(())
    }

    /// Release every visual while staying mounted; drops any deferred update
    pub fn clear(&mut self) {
        self.pending = None;
        if let Some(resources) = self.resources.as_mut() {
            let released = resources.dispose_objects(&mut self.backend);
            resources.animation = AnimationState::default();
            log::debug!("cleared scene, released {} meshes", released);
        }
    }

    /// Resize the surface and camera projection; visuals are untouched
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        if let Some(resources) = self.resources.as_mut() {
            self.backend.resize(width, height);
            resources.camera.set_viewport(width, height);
            log::debug!("scene resized to {}x{}", width, height);
        }
    }

    /// Advance the animation by `dt` seconds and draw
    pub fn render_frame(&mut self, dt: f32, overlay: Option<&OverlayModel>) -> Result<()> {
        if self.state != LifecycleState::Mounted {
            return Ok(());
        }
        let Some(resources) = self.resources.as_mut() else {
            return Ok(());
        };

        resources.animation.advance(dt);
        resources.controls.update(&mut resources.camera);

        let resources = &*resources;
        let orbit = Transform3D::rotation_y(resources.animation.orbit_angle).matrix;
        let spin = Transform3D::rotation_y(resources.animation.spin_angle).matrix;
        let mut meshes = Vec::new();
        let mut labels = Vec::new();
        for object in resources.rings.iter().chain(resources.nodes.iter()) {
            object.collect(&orbit, &spin, &mut meshes, &mut labels);
        }

        let frame = Frame {
            camera: &resources.camera,
            meshes,
            labels,
            overlay,
        };
        self.backend.draw(&frame)
    }

    /// Release every visual and the render surface. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        if self.state == LifecycleState::Unmounted && !self.attached {
            return;
        }
        self.state = LifecycleState::Unmounting;

        if let Some(mut resources) = self.resources.take() {
            let released = resources.dispose_objects(&mut self.backend);
            log::debug!("released {} meshes on unmount", released);
        }
        if self.attached {
            self.backend.detach();
            self.attached = false;
        }
        self.pending = None;
        self.state = LifecycleState::Unmounted;
        log::info!("scene unmounted");
    }
}

impl<B: SceneBackend> Drop for SceneManager<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}
