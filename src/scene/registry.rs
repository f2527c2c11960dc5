//! Placed-object registry.
//!
//! Maps each overlay object role to its GPU mesh and fixed local-to-world
//! matrix. Roles form a closed set so adding one is a compile-time event,
//! not a stringly-keyed lookup.

use crate::render::GpuMesh;
use glam::DMat4;

/// Role of a placed overlay object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneObjectRole {
    /// Waypoint beam at the route destination.
    Beam,
    /// Moving position marker driven along the path.
    Marker,
    /// Photo disc displayed at a point of interest.
    PhotoDisc,
    /// Heading arrow at the route start.
    Arrow,
}

impl SceneObjectRole {
    pub const ALL: [SceneObjectRole; 4] = [
        SceneObjectRole::Beam,
        SceneObjectRole::Marker,
        SceneObjectRole::PhotoDisc,
        SceneObjectRole::Arrow,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SceneObjectRole::Beam => "beam",
            SceneObjectRole::Marker => "marker",
            SceneObjectRole::PhotoDisc => "photo-disc",
            SceneObjectRole::Arrow => "arrow",
        }
    }
}

/// One registered object: the GPU mesh and its local-to-world matrix.
///
/// The matrix is recomputed only when the object's anchor or offset changes;
/// per-frame camera math happens outside the registry.
#[derive(Debug)]
pub struct SceneObjectEntry {
    pub mesh: GpuMesh,
    pub matrix: DMat4,
}

/// Collection of all placed overlay objects, one optional slot per role.
///
/// Slots stay unset while an asynchronous load is pending or after it failed;
/// iteration silently skips them.
#[derive(Debug, Default)]
pub struct SceneObjectSet {
    beam: Option<SceneObjectEntry>,
    marker: Option<SceneObjectEntry>,
    photo_disc: Option<SceneObjectEntry>,
    arrow: Option<SceneObjectEntry>,
}

impl SceneObjectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an object under `role`, replacing any previous entry.
    ///
    /// Returns the replaced entry so its GPU resources can be released.
    pub fn register(
        &mut self,
        role: SceneObjectRole,
        mesh: GpuMesh,
        matrix: DMat4,
    ) -> Option<SceneObjectEntry> {
        self.slot_mut(role).replace(SceneObjectEntry { mesh, matrix })
    }

    pub fn get(&self, role: SceneObjectRole) -> Option<&SceneObjectEntry> {
        self.slot(role).as_ref()
    }

    /// Replaces the matrix of a registered object.
    ///
    /// Returns false when the role is unset (load still pending or failed),
    /// which callers treat as a skipped update rather than an error.
    pub fn set_matrix(&mut self, role: SceneObjectRole, matrix: DMat4) -> bool {
        match self.slot_mut(role) {
            Some(entry) => {
                entry.matrix = matrix;
                true
            }
            None => false,
        }
    }

    /// Removes and returns the entry for `role`. Teardown only.
    pub fn take(&mut self, role: SceneObjectRole) -> Option<SceneObjectEntry> {
        self.slot_mut(role).take()
    }

    /// Visits every registered entry exactly once, skipping unset slots.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObjectEntry> {
        [
            self.beam.as_ref(),
            self.marker.as_ref(),
            self.photo_disc.as_ref(),
            self.arrow.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Roles that currently have a registered entry.
    pub fn roles(&self) -> Vec<SceneObjectRole> {
        SceneObjectRole::ALL
            .into_iter()
            .filter(|role| self.get(*role).is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn slot(&self, role: SceneObjectRole) -> &Option<SceneObjectEntry> {
        match role {
            SceneObjectRole::Beam => &self.beam,
            SceneObjectRole::Marker => &self.marker,
            SceneObjectRole::PhotoDisc => &self.photo_disc,
            SceneObjectRole::Arrow => &self.arrow,
        }
    }

    fn slot_mut(&mut self, role: SceneObjectRole) -> &mut Option<SceneObjectEntry> {
        match role {
            SceneObjectRole::Beam => &mut self.beam,
            SceneObjectRole::Marker => &mut self.marker,
            SceneObjectRole::PhotoDisc => &mut self.photo_disc,
            SceneObjectRole::Arrow => &mut self.arrow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::GpuMesh;

    #[test]
    fn test_empty_set_visits_nothing() {
        let set = SceneObjectSet::new();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        assert!(set.roles().is_empty());
    }

    #[test]
    fn test_iteration_visits_registered_roles_once() {
        let mut set = SceneObjectSet::new();
        set.register(SceneObjectRole::Beam, GpuMesh::fake(), DMat4::IDENTITY);
        set.register(
            SceneObjectRole::Arrow,
            GpuMesh::fake(),
            DMat4::from_translation(glam::DVec3::X),
        );

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.roles(),
            vec![SceneObjectRole::Beam, SceneObjectRole::Arrow]
        );
        // Unset slots are skipped, not visited as errors.
        assert!(set.get(SceneObjectRole::Marker).is_none());
        assert!(set.get(SceneObjectRole::PhotoDisc).is_none());
    }

    #[test]
    fn test_register_overwrites() {
        let mut set = SceneObjectSet::new();
        let first = DMat4::from_translation(glam::DVec3::X);
        let second = DMat4::from_translation(glam::DVec3::Y);

        assert!(set
            .register(SceneObjectRole::Marker, GpuMesh::fake(), first)
            .is_none());
        let replaced = set.register(SceneObjectRole::Marker, GpuMesh::fake(), second);
        assert!(replaced.is_some());
        assert_eq!(replaced.unwrap().matrix, first);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(SceneObjectRole::Marker).unwrap().matrix, second);
    }

    #[test]
    fn test_set_matrix_on_unset_role_is_skipped() {
        let mut set = SceneObjectSet::new();
        assert!(!set.set_matrix(SceneObjectRole::Marker, DMat4::IDENTITY));

        set.register(SceneObjectRole::Marker, GpuMesh::fake(), DMat4::IDENTITY);
        let moved = DMat4::from_translation(glam::DVec3::Z);
        assert!(set.set_matrix(SceneObjectRole::Marker, moved));
        assert_eq!(set.get(SceneObjectRole::Marker).unwrap().matrix, moved);
    }

    #[test]
    fn test_take_empties_slot() {
        let mut set = SceneObjectSet::new();
        set.register(SceneObjectRole::Beam, GpuMesh::fake(), DMat4::IDENTITY);
        assert!(set.take(SceneObjectRole::Beam).is_some());
        assert!(set.take(SceneObjectRole::Beam).is_none());
        assert!(set.is_empty());
    }
}
