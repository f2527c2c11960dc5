//! Procedural mesh builders.
//!
//! Everything here is authored in real-world meters, +Z up, around a local
//! origin that the placement matrix later pins to a geographic anchor.

use super::mesh::{Material, MeshData};
use super::registry::SceneObjectRole;

/// The built-in mesh for a role.
pub fn for_role(role: SceneObjectRole) -> MeshData {
    match role {
        SceneObjectRole::Beam => beam(),
        SceneObjectRole::Marker => marker(),
        SceneObjectRole::PhotoDisc => photo_disc(),
        SceneObjectRole::Arrow => arrow(),
    }
}

/// A tapered translucent light beam rising from the ground.
///
/// Square cross-section, narrow at the base and wide at the top, fading from
/// opaque at the bottom ring to fully transparent at the top ring. Only the
/// four side walls are generated; the beam is never seen end-on.
pub fn beam() -> MeshData {
    const BEAM_HEIGHT: f32 = 10.0;
    const BEAM_BOTTOM: f32 = 0.5;
    const BEAM_TOP: f32 = 4.0;

    let h = BEAM_HEIGHT;
    let b = BEAM_BOTTOM / 2.0;
    let t = BEAM_TOP / 2.0;

    let positions = vec![
        // bottom ring
        [-b, -b, 0.0],
        [b, -b, 0.0],
        [b, b, 0.0],
        [-b, b, 0.0],
        // top ring
        [-t, -t, h],
        [t, -t, h],
        [t, t, h],
        [-t, t, h],
    ];

    let mut colors = vec![[1.0, 1.0, 1.0, 1.0]; 4];
    colors.extend(vec![[1.0, 1.0, 1.0, 0.0]; 4]);

    let indices = vec![
        0, 1, 5, 0, 5, 4, // south wall
        1, 2, 6, 1, 6, 5, // east wall
        2, 3, 7, 2, 7, 6, // north wall
        3, 0, 4, 3, 4, 7, // west wall
    ];

    MeshData {
        positions,
        colors,
        indices,
        material: Material::translucent(),
    }
}

/// The moving position marker: a small octahedron floating above the path.
pub fn marker() -> MeshData {
    const MARKER_RADIUS: f32 = 1.2;
    const MARKER_HEIGHT: f32 = 2.5;

    let r = MARKER_RADIUS;
    let z = MARKER_HEIGHT;
    let color = [0.196, 0.784, 1.0, 1.0];

    let positions = vec![
        [0.0, 0.0, z + r], // apex
        [r, 0.0, z],
        [0.0, r, z],
        [-r, 0.0, z],
        [0.0, -r, z],
        [0.0, 0.0, z - r], // tip
    ];

    let indices = vec![
        0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 1, // upper faces
        5, 2, 1, 5, 3, 2, 5, 4, 3, 5, 1, 4, // lower faces
    ];

    MeshData {
        positions,
        colors: vec![color; 6],
        indices,
        material: Material::default(),
    }
}

/// An upright photo disc: a filled circle standing in the X-Z plane.
pub fn photo_disc() -> MeshData {
    const DISC_RADIUS: f32 = 1.5;
    const DISC_HEIGHT: f32 = 3.0;
    const DISC_SEGMENTS: u16 = 24;

    let color = [1.0, 0.706, 0.314, 1.0];

    let mut positions = vec![[0.0, 0.0, DISC_HEIGHT]];
    let mut indices = Vec::with_capacity(DISC_SEGMENTS as usize * 3);

    for i in 0..DISC_SEGMENTS {
        let angle = (i as f32) / (DISC_SEGMENTS as f32) * std::f32::consts::TAU;
        positions.push([
            DISC_RADIUS * angle.cos(),
            0.0,
            DISC_HEIGHT + DISC_RADIUS * angle.sin(),
        ]);

        let rim = i + 1;
        let next_rim = (i + 1) % DISC_SEGMENTS + 1;
        indices.extend_from_slice(&[0, rim, next_rim]);
    }

    let vertex_count = positions.len();
    MeshData {
        positions,
        colors: vec![color; vertex_count],
        indices,
        material: Material {
            double_sided: true,
            ..Material::default()
        },
    }
}

/// A flat heading arrow lying just above the ground, pointing along +X.
pub fn arrow() -> MeshData {
    const SHAFT_LENGTH: f32 = 3.0;
    const SHAFT_WIDTH: f32 = 0.8;
    const HEAD_LENGTH: f32 = 1.5;
    const HEAD_WIDTH: f32 = 2.0;
    const LIFT: f32 = 0.05;

    let hw = SHAFT_WIDTH / 2.0;
    let color = [0.392, 1.0, 0.392, 1.0];

    let positions = vec![
        [0.0, -hw, LIFT],
        [SHAFT_LENGTH, -hw, LIFT],
        [SHAFT_LENGTH, hw, LIFT],
        [0.0, hw, LIFT],
        [SHAFT_LENGTH, -HEAD_WIDTH / 2.0, LIFT],
        [SHAFT_LENGTH + HEAD_LENGTH, 0.0, LIFT],
        [SHAFT_LENGTH, HEAD_WIDTH / 2.0, LIFT],
    ];

    let indices = vec![
        0, 1, 2, 0, 2, 3, // shaft
        4, 5, 6, // head
    ];

    MeshData {
        positions,
        colors: vec![color; 7],
        indices,
        material: Material {
            double_sided: true,
            ..Material::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beam_shape() {
        let mesh = beam();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.positions.len(), 8);
        assert_eq!(mesh.indices.len(), 24);

        // Bottom ring opaque, top ring fully transparent.
        for color in &mesh.colors[..4] {
            assert_eq!(color[3], 1.0);
        }
        for color in &mesh.colors[4..] {
            assert_eq!(color[3], 0.0);
        }
    }

    #[test]
    fn test_beam_tapers_outward() {
        let mesh = beam();
        let bottom_extent = mesh.positions[0][0].abs();
        let top_extent = mesh.positions[4][0].abs();
        assert!(top_extent > bottom_extent);
        // Base sits on the ground plane.
        assert_eq!(mesh.positions[0][2], 0.0);
    }

    #[test]
    fn test_beam_material_is_translucent() {
        let material = beam().material;
        assert!(material.transparent);
        assert!(!material.depth_write);
        assert!(material.double_sided);
    }

    #[test]
    fn test_all_builders_produce_valid_meshes() {
        for (name, mesh) in [
            ("beam", beam()),
            ("marker", marker()),
            ("photo_disc", photo_disc()),
            ("arrow", arrow()),
        ] {
            assert!(mesh.validate().is_ok(), "invalid {} mesh", name);
        }
    }

    #[test]
    fn test_disc_is_a_closed_fan() {
        let mesh = photo_disc();
        assert_eq!(mesh.indices.len() % 3, 0);
        // Every triangle starts at the center vertex.
        for triangle in mesh.indices.chunks(3) {
            assert_eq!(triangle[0], 0);
        }
        // The last triangle wraps back to the first rim vertex.
        assert_eq!(*mesh.indices.last().unwrap(), 1);
    }
}
