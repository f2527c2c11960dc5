//! Interface boundary with the host basemap engine.
//!
//! The host owns the tiles, the gestures, the GL context, and the frame
//! clock. This crate plugs into it from two directions: the host drives a
//! [`CustomRenderLayer`] through attach/render/remove, and the overlay asks
//! the host to move its camera through [`MapCamera`].

use geo_types::Coord;
use glam::DMat4;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Declared rendering mode of a custom layer. Informational to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingMode {
    #[default]
    TwoD,
    ThreeD,
}

impl RenderingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderingMode::TwoD => "2d",
            RenderingMode::ThreeD => "3d",
        }
    }
}

/// Per-frame input handed to a custom layer by the host.
///
/// The projection matrix is recomputed by the host every frame from current
/// camera state (center, zoom, pitch, bearing). It must be read fresh on
/// every render call; caching it across frames renders with a stale camera.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrameInput {
    /// Host camera projection matrix, column-major.
    pub projection_matrix: [f64; 16],
}

impl RenderFrameInput {
    pub fn new(projection_matrix: [f64; 16]) -> Self {
        Self { projection_matrix }
    }

    /// The host matrix as a double-precision matrix.
    pub fn projection(&self) -> DMat4 {
        DMat4::from_cols_array(&self.projection_matrix)
    }
}

/// Easing curve for a camera motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
        }
    }
}

/// A request for the host to animate its camera center to a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraEase {
    /// Target geographic center (`x` = lon, `y` = lat, degrees).
    pub center: Coord<f64>,
    pub duration: Duration,
    pub easing: Easing,
    /// Required motion: the host must not skip it under reduced-motion
    /// settings.
    pub essential: bool,
}

impl CameraEase {
    /// A linear, non-skippable ease, the form path playback uses.
    pub fn essential(center: Coord<f64>, duration: Duration) -> Self {
        Self {
            center,
            duration,
            easing: Easing::Linear,
            essential: true,
        }
    }
}

/// Host camera control consumed by the overlay.
pub trait MapCamera {
    fn ease_to(&mut self, ease: CameraEase);
}

/// Shared handle to the host camera.
///
/// The host hands this out at attach time; the overlay keeps a clone for the
/// path animator's lifetime. Everything runs on the host's render thread, so
/// `Rc<RefCell<_>>` is the whole synchronization story.
pub type SharedCamera = Rc<RefCell<dyn MapCamera>>;

/// The host's custom-render-layer contract.
///
/// The host invokes `on_add` once with a live GL context, `render` once per
/// drawn frame, and may invoke `on_remove` at any time, including while
/// asynchronous work started in `on_add` is still in flight.
pub trait CustomRenderLayer {
    /// Unique layer id within the host's style.
    fn id(&self) -> &str;

    fn rendering_mode(&self) -> RenderingMode;

    /// Called once when the layer is added to the host map.
    fn on_add(&mut self, camera: &SharedCamera, gl: &glow::Context);

    /// Called on every drawn frame while attached.
    fn render(&mut self, gl: &glow::Context, frame: &RenderFrameInput);

    /// Called when the layer is removed; must release everything the layer
    /// owns and leave the host context untouched.
    fn on_remove(&mut self, gl: &glow::Context);
}
