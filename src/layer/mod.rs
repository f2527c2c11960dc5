//! The overlay render layer.
//!
//! Implements the host's custom-layer contract: builds the scene against the
//! host's live GL context on attach, composes the host projection with every
//! placed object's matrix on each frame, and tears everything down on
//! remove. Also owns the path animator and the asynchronous mesh loads whose
//! lifetimes are bounded by attach/detach.

use crate::geo::{placement_matrix, GeographicAnchor, LocalOffset};
use crate::host::{CameraEase, CustomRenderLayer, RenderFrameInput, RenderingMode, SharedCamera};
use crate::path::{PathAnimator, PathPoint, TickFn, DEFAULT_TICK_PERIOD};
use crate::render::SceneRenderer;
use crate::scene::{geometry, MeshLoadChannel, MeshLoadResult, SceneObjectRole, SceneObjectSet};
use std::cell::RefCell;
use std::f64::consts::FRAC_PI_2;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use web_time::Instant;

/// Where a placed object's mesh comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Built-in procedural mesh for the role, built synchronously on attach.
    Procedural,
    /// JSON mesh document loaded asynchronously from disk.
    File(PathBuf),
}

/// A statically placed overlay object.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAsset {
    pub role: SceneObjectRole,
    pub source: AssetSource,
    pub anchor: GeographicAnchor,
    pub offset: LocalOffset,
}

/// Configuration for an [`OverlayLayer`].
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayerConfig {
    /// Unique layer id within the host's style.
    pub id: String,
    /// Declared rendering mode, informational to the host.
    pub rendering_mode: RenderingMode,
    /// Statically placed objects (the moving marker is configured via
    /// `path` + `marker_offset` instead).
    pub objects: Vec<PlacedAsset>,
    /// Placement applied to the marker at each path point.
    pub marker_offset: LocalOffset,
    /// Pre-interpolated playback path; empty disables marker and playback.
    pub path: Vec<PathPoint>,
    /// Tick period, which is also the camera ease duration.
    pub tick_period: Duration,
}

impl OverlayLayerConfig {
    /// A route overlay: a waypoint beam at the destination plus path
    /// playback toward it.
    pub fn new(waypoint: GeographicAnchor, path: Vec<PathPoint>) -> Self {
        Self {
            id: "route-overlay".to_string(),
            rendering_mode: RenderingMode::TwoD,
            objects: vec![PlacedAsset {
                role: SceneObjectRole::Beam,
                source: AssetSource::Procedural,
                anchor: waypoint,
                offset: LocalOffset {
                    translation_m: [0.7, 0.7, 0.3],
                    rotation_rad: [0.0, 0.0, FRAC_PI_2],
                    scale: 3.0,
                },
            }],
            marker_offset: LocalOffset::default(),
            path,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}

/// Lifecycle of the layer as driven by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerState {
    #[default]
    Detached,
    Attaching,
    Attached,
}

/// A custom render layer drawing georeferenced 3D objects over the basemap.
pub struct OverlayLayer {
    config: OverlayLayerConfig,
    state: LayerState,
    objects: Rc<RefCell<SceneObjectSet>>,
    scene: Option<SceneRenderer>,
    loader: MeshLoadChannel,
    animator: Option<PathAnimator>,
    /// Attach generation; bumped on every attach and detach so in-flight
    /// load completions from a previous lifetime are dropped on arrival.
    generation: u64,
}

impl OverlayLayer {
    pub fn new(config: OverlayLayerConfig) -> Self {
        Self {
            config,
            state: LayerState::default(),
            objects: Rc::new(RefCell::new(SceneObjectSet::new())),
            scene: None,
            loader: MeshLoadChannel::new(),
            animator: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> LayerState {
        self.state
    }

    /// Roles currently registered (asynchronous loads may still be pending).
    pub fn object_roles(&self) -> Vec<SceneObjectRole> {
        self.objects.borrow().roles()
    }

    pub fn is_playing(&self) -> bool {
        self.animator.as_ref().is_some_and(PathAnimator::is_active)
    }

    fn marker_matrix(point: &PathPoint, offset: &LocalOffset) -> glam::DMat4 {
        let anchor = GeographicAnchor {
            coord: point.coord,
            altitude: point.altitude,
        };
        placement_matrix(&anchor, offset)
    }

    fn drain_finished_loads(&self, gl: &glow::Context, scene: &SceneRenderer) {
        while let Some(result) = self.loader.try_recv() {
            if result.generation() != self.generation {
                log::debug!("layer {}: dropping stale mesh load", self.config.id);
                continue;
            }
            match result {
                MeshLoadResult::Loaded { role, mesh, .. } => {
                    let Some(placed) = self.config.objects.iter().find(|p| p.role == role) else {
                        log::warn!(
                            "layer {}: loaded mesh for unconfigured role {}",
                            self.config.id,
                            role.label()
                        );
                        continue;
                    };
                    match scene.upload_mesh(gl, &mesh) {
                        Ok(gpu) => {
                            let matrix = placement_matrix(&placed.anchor, &placed.offset);
                            if let Some(old) = self.objects.borrow_mut().register(role, gpu, matrix)
                            {
                                scene.destroy_mesh(gl, &old.mesh);
                            }
                            log::info!("layer {}: {} mesh ready", self.config.id, role.label());
                        }
                        Err(e) => {
                            log::error!(
                                "layer {}: failed to upload {} mesh: {}",
                                self.config.id,
                                role.label(),
                                e
                            );
                        }
                    }
                }
                MeshLoadResult::Failed { role, error, .. } => {
                    // Degrades to one fewer object drawn.
                    log::error!(
                        "layer {}: failed to load {} mesh: {}",
                        self.config.id,
                        role.label(),
                        error
                    );
                }
            }
        }
    }
}

/// Tick callback: recompute the marker's placement at the new path point.
///
/// Before the marker is registered (or after teardown) the update is a
/// skipped no-op, never an error.
fn marker_tick_fn(objects: Rc<RefCell<SceneObjectSet>>, offset: LocalOffset) -> TickFn {
    Box::new(move |point| {
        let matrix = OverlayLayer::marker_matrix(point, &offset);
        if !objects
            .borrow_mut()
            .set_matrix(SceneObjectRole::Marker, matrix)
        {
            log::debug!("path tick with no marker registered; skipped");
        }
    })
}

/// Ease callback: ask the host to recenter on the new path point.
fn camera_ease_fn(camera: SharedCamera, duration: Duration) -> TickFn {
    Box::new(move |point| {
        camera
            .borrow_mut()
            .ease_to(CameraEase::essential(point.coord, duration));
    })
}

impl CustomRenderLayer for OverlayLayer {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn rendering_mode(&self) -> RenderingMode {
        self.config.rendering_mode
    }

    fn on_add(&mut self, camera: &SharedCamera, gl: &glow::Context) {
        if self.state != LayerState::Detached {
            log::warn!("layer {}: on_add while already attached", self.config.id);
            return;
        }
        self.state = LayerState::Attaching;
        self.generation += 1;

        // Shares the host's context; no surface of its own is created.
        let scene = match SceneRenderer::new(gl) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("layer {}: renderer setup failed: {}", self.config.id, e);
                self.state = LayerState::Detached;
                return;
            }
        };

        for placed in &self.config.objects {
            match &placed.source {
                AssetSource::Procedural => {
                    match scene.upload_mesh(gl, &geometry::for_role(placed.role)) {
                        Ok(mesh) => {
                            let matrix = placement_matrix(&placed.anchor, &placed.offset);
                            self.objects.borrow_mut().register(placed.role, mesh, matrix);
                        }
                        Err(e) => {
                            log::error!(
                                "layer {}: failed to upload {} mesh: {}",
                                self.config.id,
                                placed.role.label(),
                                e
                            );
                        }
                    }
                }
                AssetSource::File(path) => {
                    // Does not block attach; registers when it lands.
                    self.loader
                        .load_file(placed.role, path.clone(), self.generation);
                }
            }
        }

        if let Some(first) = self.config.path.first() {
            match scene.upload_mesh(gl, &geometry::marker()) {
                Ok(mesh) => {
                    let matrix = Self::marker_matrix(first, &self.config.marker_offset);
                    self.objects
                        .borrow_mut()
                        .register(SceneObjectRole::Marker, mesh, matrix);
                }
                Err(e) => {
                    log::error!(
                        "layer {}: failed to upload marker mesh: {}",
                        self.config.id,
                        e
                    );
                }
            }

            let mut animator = PathAnimator::new(
                self.config.path.clone(),
                self.config.tick_period,
                marker_tick_fn(Rc::clone(&self.objects), self.config.marker_offset),
                camera_ease_fn(Rc::clone(camera), self.config.tick_period),
            );
            animator.start(Instant::now());
            self.animator = Some(animator);
        }

        self.scene = Some(scene);
        self.state = LayerState::Attached;
        log::info!(
            "layer {}: attached with {} object(s), {} load(s) pending",
            self.config.id,
            self.objects.borrow().len(),
            self.loader.pending_loads()
        );
    }

    fn render(&mut self, gl: &glow::Context, frame: &RenderFrameInput) {
        if self.state != LayerState::Attached {
            return;
        }
        let Some(scene) = self.scene.as_ref() else {
            return;
        };

        self.drain_finished_loads(gl, scene);

        if let Some(animator) = self.animator.as_mut() {
            animator.update(Instant::now());
        }
        if self.animator.as_ref().is_some_and(|a| !a.is_active()) {
            self.animator = None;
        }

        // The host matrix is fresh this frame; fold it into every object.
        let host_projection = frame.projection();
        scene.draw(gl, &self.objects.borrow(), &host_projection);
    }

    fn on_remove(&mut self, gl: &glow::Context) {
        if self.state == LayerState::Detached {
            return;
        }

        if let Some(mut animator) = self.animator.take() {
            animator.stop();
        }
        // In-flight load completions for the old generation become inert.
        self.generation += 1;

        let mut objects = self.objects.borrow_mut();
        if let Some(scene) = self.scene.take() {
            for role in SceneObjectRole::ALL {
                if let Some(entry) = objects.take(role) {
                    scene.destroy_mesh(gl, &entry.mesh);
                }
            }
            scene.destroy(gl);
        }
        drop(objects);

        self.state = LayerState::Detached;
        log::info!("layer {}: detached", self.config.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::MercatorCoord;
    use crate::host::MapCamera;
    use crate::render::GpuMesh;
    use glam::DMat4;

    #[derive(Default)]
    struct RecordingCamera {
        eases: Vec<CameraEase>,
    }

    impl MapCamera for RecordingCamera {
        fn ease_to(&mut self, ease: CameraEase) {
            self.eases.push(ease);
        }
    }

    fn path_of(count: usize) -> Vec<PathPoint> {
        (0..count)
            .map(|i| PathPoint::new(30.0 + i as f64 * 0.001, 50.0))
            .collect()
    }

    #[test]
    fn test_config_places_waypoint_beam() {
        let config = OverlayLayerConfig::new(GeographicAnchor::new(30.5107, 50.4174), path_of(3));
        assert_eq!(config.objects.len(), 1);
        let beam = &config.objects[0];
        assert_eq!(beam.role, SceneObjectRole::Beam);
        assert_eq!(beam.source, AssetSource::Procedural);
        assert_eq!(beam.offset.translation_m, [0.7, 0.7, 0.3]);
        assert_eq!(beam.offset.scale, 3.0);
        assert_eq!(config.tick_period, Duration::from_millis(300));
    }

    #[test]
    fn test_new_layer_starts_detached() {
        let layer = OverlayLayer::new(OverlayLayerConfig::new(
            GeographicAnchor::new(0.0, 0.0),
            Vec::new(),
        ));
        assert_eq!(layer.state(), LayerState::Detached);
        assert!(layer.object_roles().is_empty());
        assert!(!layer.is_playing());
    }

    #[test]
    fn test_marker_matrix_tracks_path_point() {
        let point = PathPoint::new(30.5107, 50.4174);
        let m = OverlayLayer::marker_matrix(&point, &LocalOffset::default());
        let mc = MercatorCoord::from_lng_lat(point.coord, 0.0);
        assert!((m.w_axis.x - mc.x).abs() < 1e-15);
        assert!((m.w_axis.y - mc.y).abs() < 1e-15);
    }

    #[test]
    fn test_tick_updates_registered_marker() {
        let objects = Rc::new(RefCell::new(SceneObjectSet::new()));
        objects
            .borrow_mut()
            .register(SceneObjectRole::Marker, GpuMesh::fake(), DMat4::IDENTITY);

        let mut tick = marker_tick_fn(Rc::clone(&objects), LocalOffset::default());
        let point = PathPoint::new(10.0, 20.0);
        tick(&point);

        let expected = OverlayLayer::marker_matrix(&point, &LocalOffset::default());
        assert_eq!(
            objects.borrow().get(SceneObjectRole::Marker).unwrap().matrix,
            expected
        );
    }

    #[test]
    fn test_tick_without_marker_is_a_no_op() {
        let objects = Rc::new(RefCell::new(SceneObjectSet::new()));
        let mut tick = marker_tick_fn(Rc::clone(&objects), LocalOffset::default());
        // Must not panic or register anything.
        tick(&PathPoint::new(10.0, 20.0));
        assert!(objects.borrow().is_empty());
    }

    #[test]
    fn test_ease_requests_are_essential_and_linear() {
        let camera = Rc::new(RefCell::new(RecordingCamera::default()));
        let shared: SharedCamera = camera.clone();
        let mut ease = camera_ease_fn(Rc::clone(&shared), Duration::from_millis(300));

        ease(&PathPoint::new(30.0, 50.0));

        let recorded = &camera.borrow().eases;
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].essential);
        assert_eq!(recorded[0].duration, Duration::from_millis(300));
        assert_eq!(recorded[0].center, geo_types::Coord { x: 30.0, y: 50.0 });
    }

    #[test]
    fn test_identity_host_matrix_composes_to_object_matrix() {
        let frame = RenderFrameInput::new(DMat4::IDENTITY.to_cols_array());
        let config = OverlayLayerConfig::new(GeographicAnchor::new(30.5107, 50.4174), Vec::new());
        let object = placement_matrix(&config.objects[0].anchor, &config.objects[0].offset);
        // Exact equality: folding an identity host matrix must not perturb
        // the object's own matrix.
        assert_eq!(frame.projection() * object, object);
    }

    #[test]
    fn test_detach_during_playback_stops_ticks() {
        let period = Duration::from_millis(300);
        let objects = Rc::new(RefCell::new(SceneObjectSet::new()));
        objects
            .borrow_mut()
            .register(SceneObjectRole::Marker, GpuMesh::fake(), DMat4::IDENTITY);
        let camera = Rc::new(RefCell::new(RecordingCamera::default()));
        let shared: SharedCamera = camera.clone();

        let mut animator = PathAnimator::new(
            path_of(5),
            period,
            marker_tick_fn(Rc::clone(&objects), LocalOffset::default()),
            camera_ease_fn(Rc::clone(&shared), period),
        );

        let start = Instant::now();
        animator.start(start);
        animator.update(start + period);
        animator.update(start + 2 * period);
        assert_eq!(camera.borrow().eases.len(), 2);

        // Detach: stop playback, then tear the registry down.
        animator.stop();
        objects.borrow_mut().take(SceneObjectRole::Marker);

        for i in 3u32..8 {
            animator.update(start + i * period);
        }
        // No 3rd tick, nothing re-registered into the torn-down set.
        assert_eq!(camera.borrow().eases.len(), 2);
        assert!(objects.borrow().is_empty());
        assert_eq!(animator.cursor(), 2);
    }
}
