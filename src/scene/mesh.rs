//! CPU-side mesh data and materials.
//!
//! Geometry is authored in real-world meters with per-vertex RGBA color.
//! `MeshData` is the exchange format between the procedural builders, the
//! asynchronous file loader, and the GPU upload step.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Interleaved vertex as uploaded to the GPU (28 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Byte stride of one interleaved [`Vertex`].
pub const VERTEX_STRIDE: i32 = std::mem::size_of::<Vertex>() as i32;

/// Fixed-function material flags for a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Alpha-blend against whatever the host already drew this frame.
    pub transparent: bool,
    /// Write to the shared depth buffer. Translucent geometry keeps this off
    /// so it never occludes the host's own 3D content.
    pub depth_write: bool,
    /// Draw back faces as well (no culling).
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            transparent: false,
            depth_write: true,
            double_sided: false,
        }
    }
}

impl Material {
    /// Translucent, non-depth-writing, double-sided: the combination used
    /// for see-through markers layered over the basemap.
    pub fn translucent() -> Self {
        Self {
            transparent: true,
            depth_write: false,
            double_sided: true,
        }
    }
}

/// A complete mesh: positions and colors in parallel arrays plus a u16
/// triangle index list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u16>,
    #[serde(default)]
    pub material: Material,
}

impl MeshData {
    /// Checks internal consistency before GPU upload.
    pub fn validate(&self) -> Result<(), String> {
        if self.positions.is_empty() {
            return Err("mesh has no vertices".to_string());
        }
        if self.colors.len() != self.positions.len() {
            return Err(format!(
                "mesh has {} colors for {} positions",
                self.colors.len(),
                self.positions.len()
            ));
        }
        if self.indices.is_empty() || self.indices.len() % 3 != 0 {
            return Err(format!(
                "mesh index count {} is not a positive multiple of 3",
                self.indices.len()
            ));
        }
        let vertex_count = self.positions.len();
        if let Some(&out_of_range) = self
            .indices
            .iter()
            .find(|&&i| (i as usize) >= vertex_count)
        {
            return Err(format!(
                "mesh index {} out of range (vertex count: {})",
                out_of_range, vertex_count
            ));
        }
        Ok(())
    }

    /// Interleaves positions and colors for upload.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(self.colors.iter())
            .map(|(&position, &color)| Vertex { position, color })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            colors: vec![[1.0, 1.0, 1.0, 1.0]; 3],
            indices: vec![0, 1, 2],
            material: Material::default(),
        }
    }

    #[test]
    fn test_valid_mesh_passes() {
        assert!(triangle().validate().is_ok());
    }

    #[test]
    fn test_color_count_mismatch_rejected() {
        let mut mesh = triangle();
        mesh.colors.pop();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_index_out_of_range_rejected() {
        let mut mesh = triangle();
        mesh.indices = vec![0, 1, 3];
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_partial_triangle_rejected() {
        let mut mesh = triangle();
        mesh.indices = vec![0, 1];
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_vertices_interleave_in_order() {
        let mesh = triangle();
        let vertices = mesh.vertices();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[2].color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_mesh_serde_round_trip() {
        let mesh = triangle();
        let json = serde_json::to_string(&mesh).unwrap();
        let back: MeshData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.positions, mesh.positions);
        assert_eq!(back.indices, mesh.indices);
        assert_eq!(back.material, mesh.material);
    }
}
