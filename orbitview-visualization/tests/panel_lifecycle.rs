use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use orbitview_core::{DataFrame, Error, FieldValue, PanelOptions, Result};
use orbitview_layout::VisualMesh;
use orbitview_visualization::{option_registry, Frame, LifecycleState, PanelView, SceneBackend, TopologyPanel};

/// Creation/release log shared with the test after the backend is moved
#[derive(Default)]
struct Ledger {
    next_id: u64,
    live: BTreeSet<u64>,
    created: usize,
    released: usize,
    resizes: usize,
    frames: usize,
    drawn_meshes: Vec<usize>,
    last_summary: Option<String>,
    last_no_data: Option<bool>,
    /// Fail the create call made when this many meshes exist
    fail_at: Option<usize>,
}

struct Recorded(u64);

struct RecordingBackend(Rc<RefCell<Ledger>>);

impl SceneBackend for RecordingBackend {
    type Mesh = Recorded;

    fn attach(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    fn create_mesh(&mut self, _mesh: &VisualMesh) -> Result<Recorded> {
        let mut ledger = self.0.borrow_mut();
        if ledger.fail_at == Some(ledger.created) {
            ledger.fail_at = None;
            return Err(Error::Gpu("device lost".to_string()));
        }
        ledger.next_id += 1;
        ledger.created += 1;
        let id = ledger.next_id;
        ledger.live.insert(id);
        Ok(Recorded(id))
    }

    fn release_mesh(&mut self, mesh: Recorded) {
        let mut ledger = self.0.borrow_mut();
        assert!(ledger.live.remove(&mesh.0), "mesh released twice");
        ledger.released += 1;
    }

    fn resize(&mut self, _width: u32, _height: u32) {
        self.0.borrow_mut().resizes += 1;
    }

    fn draw(&mut self, frame: &Frame<'_, Recorded>) -> Result<()> {
        let mut ledger = self.0.borrow_mut();
        ledger.frames += 1;
        ledger.drawn_meshes.push(frame.meshes.len());
        ledger.last_no_data = frame.overlay.map(|overlay| overlay.no_data);
        ledger.last_summary = frame
            .overlay
            .map(|overlay| overlay.counters.rows()[0].1.clone());
        Ok(())
    }

    fn detach(&mut self) {}
}

fn node_frame(rows: &[(&str, &str, i64)]) -> DataFrame {
    DataFrame::named("nodes")
        .with_field("id", rows.iter().map(|r| r.0).collect::<Vec<_>>())
        .with_field("label", rows.iter().map(|r| r.1).collect::<Vec<_>>())
        .with_field("layerOrder", rows.iter().map(|r| r.2).collect::<Vec<_>>())
        .with_field(
            "isCenter",
            rows.iter().map(|r| FieldValue::Bool(r.2 == 0)).collect::<Vec<_>>(),
        )
}

fn aggregate_frame(ccu: f64) -> DataFrame {
    DataFrame::named("aggregates")
        .with_field("sumCcu", vec![ccu])
        .with_field("sumTransactions", vec![12_345.0])
}

fn panel() -> (TopologyPanel<RecordingBackend>, Rc<RefCell<Ledger>>) {
    let ledger = Rc::new(RefCell::new(Ledger::default()));
    let panel = TopologyPanel::new(RecordingBackend(ledger.clone()), PanelOptions::default());
    (panel, ledger)
}

#[test]
fn test_registry_exposes_layer_count() {
    let registry = option_registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry[0].key, "numberOfLayers");
    assert_eq!(registry[0].default, 3);
}

#[test]
fn test_empty_frames_show_no_data() {
    let (mut panel, _ledger) = panel();
    panel.on_data(&[]).unwrap();
    assert_eq!(panel.view(), PanelView::NoData);

    // aggregate frames alone carry no nodes
    panel.on_data(&[aggregate_frame(5.0)]).unwrap();
    assert_eq!(panel.view(), PanelView::NoData);
    assert!(panel.overlay().no_data);
}

#[test]
fn test_data_before_mount_is_built_on_mount() {
    let (mut panel, ledger) = panel();
    panel
        .on_data(&[node_frame(&[("hub", "Hub", 0), ("a", "A", 1)]), aggregate_frame(1_500.0)])
        .unwrap();
    assert_eq!(panel.view(), PanelView::Scene);
    assert_eq!(ledger.borrow().created, 0);

    panel.mount(800, 600).unwrap();
    // hub body + core + a + 3 rings
    assert_eq!(ledger.borrow().live.len(), 6);
    assert_eq!(panel.state(), LifecycleState::Mounted);
}

#[test]
fn test_identical_data_does_not_rebuild() {
    let (mut panel, ledger) = panel();
    panel.mount(800, 600).unwrap();
    let frames = vec![node_frame(&[("hub", "Hub", 0), ("a", "A", 1), ("b", "B", 2)])];

    panel.on_data(&frames).unwrap();
    let created = ledger.borrow().created;
    panel.on_data(&frames).unwrap();
    assert_eq!(ledger.borrow().created, created);

    panel.on_data(&[node_frame(&[("hub", "Hub", 0)])]).unwrap();
    let ledger = ledger.borrow();
    assert!(ledger.created > created);
    // hub body + core + 3 rings
    assert_eq!(ledger.live.len(), 5);
}

#[test]
fn test_layer_option_change_rebuilds_rings() {
    let (mut panel, ledger) = panel();
    panel.mount(800, 600).unwrap();
    panel.on_data(&[node_frame(&[("a", "A", 1)])]).unwrap();
    assert_eq!(ledger.borrow().live.len(), 1 + 3);

    panel.on_options(PanelOptions::with_layers(6).unwrap()).unwrap();
    assert_eq!(ledger.borrow().live.len(), 1 + 6);
    assert_eq!(panel.scene().attached_count(), 7);

    assert!(panel.on_options(PanelOptions { number_of_layers: 0 }).is_err());
    assert_eq!(panel.options().number_of_layers, 6);
}

#[test]
fn test_resize_does_not_touch_visuals() {
    let (mut panel, ledger) = panel();
    panel.mount(800, 600).unwrap();
    panel.on_data(&[node_frame(&[("a", "A", 1)])]).unwrap();
    let created = ledger.borrow().created;

    panel.on_resize(1280, 720);
    assert_eq!(ledger.borrow().created, created);
    assert_eq!(ledger.borrow().resizes, 1);
}

#[test]
fn test_frames_carry_formatted_summaries() {
    let (mut panel, ledger) = panel();
    panel.mount(800, 600).unwrap();
    panel
        .on_data(&[node_frame(&[("a", "A", 1)]), aggregate_frame(1_500.0)])
        .unwrap();
    panel.render_frame(0.016).unwrap();

    let ledger = ledger.borrow();
    assert_eq!(ledger.frames, 1);
    assert_eq!(ledger.last_summary.as_deref(), Some("1.5K"));
}

#[test]
fn test_unmount_releases_every_visual_once() {
    let (mut panel, ledger) = panel();
    panel.mount(800, 600).unwrap();
    for round in 0..5 {
        let label = format!("Node {round}");
        panel
            .on_data(&[node_frame(&[("hub", "Hub", 0), ("n", label.as_str(), 1 + round)])])
            .unwrap();
    }
    panel.unmount();
    panel.unmount();

    let ledger = ledger.borrow();
    assert!(ledger.live.is_empty());
    assert_eq!(ledger.created, ledger.released);
    assert!(!panel.overlay().clock.is_running());
    assert_eq!(panel.state(), LifecycleState::Unmounted);
}

#[test]
fn test_no_data_draws_no_scene() {
    let (mut panel, ledger) = panel();
    panel.mount(800, 600).unwrap();
    panel
        .on_data(&[node_frame(&[("hub", "Hub", 0), ("a", "A", 1)])])
        .unwrap();
    assert_eq!(ledger.borrow().live.len(), 6);

    panel.on_data(&[]).unwrap();
    assert_eq!(panel.view(), PanelView::NoData);
    assert!(ledger.borrow().live.is_empty());

    panel.render_frame(0.016).unwrap();
    {
        let ledger = ledger.borrow();
        assert_eq!(ledger.drawn_meshes, vec![0]);
        assert_eq!(ledger.last_no_data, Some(true));
    }

    // a layer change while empty still shows no rings
    panel.on_options(PanelOptions::with_layers(5).unwrap()).unwrap();
    assert!(ledger.borrow().live.is_empty());

    panel.on_data(&[node_frame(&[("a", "A", 1)])]).unwrap();
    assert_eq!(panel.view(), PanelView::Scene);
    assert_eq!(ledger.borrow().live.len(), 1 + 5);
}

#[test]
fn test_no_data_on_mount_draws_no_scene() {
    let (mut panel, ledger) = panel();
    panel.mount(800, 600).unwrap();
    panel.render_frame(0.016).unwrap();
    assert_eq!(ledger.borrow().drawn_meshes, vec![0]);
    assert_eq!(ledger.borrow().created, 0);
}

#[test]
fn test_failed_rebuild_is_retried_with_same_data() {
    let (mut panel, ledger) = panel();
    panel.mount(800, 600).unwrap();
    ledger.borrow_mut().fail_at = Some(4);
    let frames = vec![node_frame(&[("hub", "Hub", 0), ("a", "A", 1)])];

    assert!(panel.on_data(&frames).is_err());
    assert_eq!(ledger.borrow().live.len(), 4);

    panel.on_data(&frames).unwrap();
    let ledger = ledger.borrow();
    // hub body + core + a + 3 rings
    assert_eq!(ledger.live.len(), 6);
    assert_eq!(panel.scene().attached_count(), 6);
}

#[test]
fn test_failed_build_on_mount_is_retried() {
    let (mut panel, ledger) = panel();
    let frames = vec![node_frame(&[("hub", "Hub", 0), ("a", "A", 1)])];
    panel.on_data(&frames).unwrap();
    ledger.borrow_mut().fail_at = Some(2);

    assert!(panel.mount(800, 600).is_err());
    assert_eq!(panel.state(), LifecycleState::Mounted);

    panel.on_data(&frames).unwrap();
    assert_eq!(ledger.borrow().live.len(), 6);
}
