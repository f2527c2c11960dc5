#![warn(clippy::all)]

//! Perspective-correct 3D overlays for tiled Mercator basemaps.
//!
//! The host basemap engine owns the GL context and the frame clock; this
//! crate registers as a custom render layer and draws georeferenced 3D
//! objects that stay pinned to the map as the camera orbits, pans, tilts,
//! and animates along a route.
//!
//! The pipeline has three fixed parts:
//!
//! - [`geo`] converts a geographic anchor plus real-world-meter offsets into
//!   a local-to-world matrix in the host's normalized Mercator space,
//!   including the latitude-dependent meter conversion and the flipped-Y
//!   scale correction.
//! - [`scene`] keeps the placed objects (procedural or asynchronously
//!   loaded meshes) in a registry keyed by a closed role enumeration.
//! - [`layer`] implements the host's custom-layer contract: per frame it
//!   multiplies the host's fresh projection matrix with every object's fixed
//!   matrix and draws the whole set in one pass through the shared context.
//!
//! [`path`] drives a movable marker along a pre-interpolated route while
//! asking the host camera to ease along with it.

pub mod geo;
pub mod host;
pub mod layer;
pub mod path;
pub mod render;
pub mod route;
pub mod scene;

pub use geo::{placement_matrix, GeographicAnchor, LocalOffset, MercatorCoord};
pub use host::{
    CameraEase, CustomRenderLayer, Easing, MapCamera, RenderFrameInput, RenderingMode, SharedCamera,
};
pub use layer::{AssetSource, LayerState, OverlayLayer, OverlayLayerConfig, PlacedAsset};
pub use path::{PathAnimator, PathPoint, DEFAULT_TICK_PERIOD};
pub use render::{GpuMesh, SceneRenderer};
pub use scene::{Material, MeshData, SceneObjectRole, SceneObjectSet};
