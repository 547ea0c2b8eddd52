//! Einstufige Editier-Sitzung: Staging, Vorschau-Punkte und Rücksprungpunkt.

use super::{PointArena, Structure, StructureId};
use glam::DVec3;
use indexmap::{IndexMap, IndexSet};

/// Zustand von Punkten und Strukturen vor der ersten Änderung eines Editierschritts
#[derive(Debug, Clone)]
pub(crate) struct Checkpoint {
    pub(crate) points: PointArena,
    pub(crate) structures: IndexMap<StructureId, Structure>,
}

/// Ein Editierschritt zwischen zwei `commit`/`dismiss`-Aufrufen.
///
/// Der Checkpoint wird beim ersten mutierenden Zugriff angelegt und beim
/// Verwerfen wiederhergestellt.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    staged: IndexSet<StructureId>,
    preview_points: Vec<DVec3>,
    checkpoint: Option<Checkpoint>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true`, wenn der Schritt bereits Änderungen enthält
    pub fn is_dirty(&self) -> bool {
        self.checkpoint.is_some()
    }

    pub fn staged(&self) -> &IndexSet<StructureId> {
        &self.staged
    }

    pub fn is_staged(&self, id: StructureId) -> bool {
        self.staged.contains(&id)
    }

    pub(crate) fn stage(&mut self, id: StructureId) {
        self.staged.insert(id);
    }

    pub(crate) fn unstage(&mut self, id: StructureId) {
        self.staged.shift_remove(&id);
    }

    pub fn preview_points(&self) -> &[DVec3] {
        &self.preview_points
    }

    pub(crate) fn set_preview_points(&mut self, positions: Vec<DVec3>) {
        self.preview_points = positions;
    }

    /// Legt den Checkpoint an, falls der Schritt noch keinen hat
    pub(crate) fn ensure_checkpoint(
        &mut self,
        points: &PointArena,
        structures: &IndexMap<StructureId, Structure>,
    ) {
        if self.checkpoint.is_none() {
            self.checkpoint = Some(Checkpoint {
                points: points.clone(),
                structures: structures.clone(),
            });
        }
    }

    pub(crate) fn take_checkpoint(&mut self) -> Option<Checkpoint> {
        self.checkpoint.take()
    }

    /// Beendet den Schritt ohne Wiederherstellung
    pub(crate) fn clear(&mut self) {
        self.staged.clear();
        self.preview_points.clear();
        self.checkpoint = None;
    }
}
