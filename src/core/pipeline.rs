//! Die zentrale Pipeline-Datenstruktur mit Punkten, Strukturen, Selektion und Sitzung.

mod merge;

pub use merge::MergeResult;

use super::{
    EditSession, PointArena, PointId, SelectionMode, SpatialIndex, SpatialMatch, Structure,
    StructureId, StructureKind,
};
use super::point::Point;
use glam::DVec3;
use indexmap::{IndexMap, IndexSet};

/// Metadaten aus dem Kopf einer PCF-Datei (Schlüssel/Wert in Original-Reihenfolge)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineMeta {
    pub header: Vec<(String, String)>,
}

/// Container für das gesamte Rohrnetz
#[derive(Debug, Clone)]
pub struct Pipeline {
    points: PointArena,
    structures: IndexMap<StructureId, Structure>,
    next_structure_id: u64,
    selected_points: IndexSet<PointId>,
    selected_structures: IndexSet<StructureId>,
    session: EditSession,
    /// Kopfdaten für den PCF-Export
    pub meta: PipelineMeta,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Erstellt eine neue leere Pipeline
    pub fn new() -> Self {
        Self {
            points: PointArena::new(),
            structures: IndexMap::new(),
            next_structure_id: 1,
            selected_points: IndexSet::new(),
            selected_structures: IndexSet::new(),
            session: EditSession::new(),
            meta: PipelineMeta::default(),
        }
    }

    /// Sichert den Zustand vor der ersten Änderung des laufenden Schritts
    fn touch(&mut self) {
        self.session
            .ensure_checkpoint(&self.points, &self.structures);
    }

    // --- Punkte ---

    pub fn points(&self) -> &PointArena {
        &self.points
    }

    /// Mutabler Zugriff auf die Arena (legt vorher den Checkpoint an)
    pub(crate) fn points_mut(&mut self) -> &mut PointArena {
        self.touch();
        &mut self.points
    }

    /// Gleichzeitiger Zugriff auf Punkte und Strukturen (legt vorher den Checkpoint an)
    pub(crate) fn split_mut(
        &mut self,
    ) -> (&mut PointArena, &mut IndexMap<StructureId, Structure>) {
        self.touch();
        (&mut self.points, &mut self.structures)
    }

    /// Fügt einen Punkt hinzu
    pub fn add_point(&mut self, position: DVec3) -> PointId {
        self.touch();
        self.points.insert(position)
    }

    /// Fügt mehrere Punkte in Reihenfolge hinzu
    pub fn add_points(&mut self, positions: impl IntoIterator<Item = DVec3>) -> Vec<PointId> {
        positions
            .into_iter()
            .map(|position| self.add_point(position))
            .collect()
    }

    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(id)
    }

    pub fn position(&self, id: PointId) -> Option<DVec3> {
        self.points.position(id)
    }

    /// Setzt eine Punkt-Position ohne Neuberechnung der Krümmungen
    pub fn set_point_position(&mut self, id: PointId, position: DVec3) -> bool {
        if !self.points.contains(id) {
            return false;
        }
        self.touch();
        self.points.set_position(id, position)
    }

    /// Zuletzt hinzugefügter, noch vorhandener Punkt
    pub fn last_point(&self) -> Option<PointId> {
        self.points.last_id()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Entfernt einen Punkt samt aller Strukturen, die ihn referenzieren
    pub fn remove_point(&mut self, id: PointId) -> bool {
        if !self.points.contains(id) {
            return false;
        }
        self.touch();
        for structure_id in self.structures_at_point(id) {
            self.remove_structure(structure_id);
        }
        self.points.remove(id);
        self.selected_points.shift_remove(&id);
        true
    }

    /// Entfernt mehrere Punkte; gibt die Anzahl tatsächlich entfernter zurück
    pub fn remove_points(&mut self, ids: &[PointId]) -> usize {
        ids.iter().filter(|&&id| self.remove_point(id)).count()
    }

    /// `true`, wenn mindestens eine Struktur den Punkt referenziert
    pub fn is_referenced(&self, id: PointId) -> bool {
        self.structures.values().any(|s| s.contains_point(id))
    }

    // --- Strukturen ---

    /// Fügt eine Struktur hinzu und markiert sie als staged.
    ///
    /// Gibt `None` zurück, wenn ein referenzierter Punkt fehlt.
    pub fn add_structure(&mut self, mut structure: Structure) -> Option<StructureId> {
        if let Some(missing) = structure
            .points()
            .into_iter()
            .find(|p| !self.points.contains(*p))
        {
            log::warn!(
                "{} verweist auf fehlenden Punkt {}, nicht hinzugefügt",
                structure.kind,
                missing
            );
            return None;
        }

        self.touch();
        let id = StructureId(self.next_structure_id);
        self.next_structure_id += 1;
        structure.staged = true;
        structure.selected = false;
        self.structures.insert(id, structure);
        self.session.stage(id);
        Some(id)
    }

    pub fn add_structures(&mut self, structures: impl IntoIterator<Item = Structure>) -> Vec<StructureId> {
        structures
            .into_iter()
            .filter_map(|structure| self.add_structure(structure))
            .collect()
    }

    pub fn structure(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(&id)
    }

    /// Mutabler Zugriff auf eine Struktur (legt vorher den Checkpoint an)
    pub fn structure_mut(&mut self, id: StructureId) -> Option<&mut Structure> {
        if !self.structures.contains_key(&id) {
            return None;
        }
        self.touch();
        self.structures.get_mut(&id)
    }

    /// Alle Strukturen in Einfüge-Reihenfolge
    pub fn structures(&self) -> impl Iterator<Item = (StructureId, &Structure)> {
        self.structures.iter().map(|(id, s)| (*id, s))
    }

    pub fn structure_ids(&self) -> Vec<StructureId> {
        self.structures.keys().copied().collect()
    }

    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }

    /// Entfernt eine Struktur und die Punkte, die danach von keiner Struktur mehr genutzt werden
    pub fn remove_structure(&mut self, id: StructureId) -> Option<Structure> {
        if !self.structures.contains_key(&id) {
            return None;
        }
        self.touch();
        let removed = self.structures.shift_remove(&id)?;
        self.selected_structures.shift_remove(&id);
        self.session.unstage(id);

        for point in removed.points() {
            if !self.is_referenced(point) {
                self.points.remove(point);
                self.selected_points.shift_remove(&point);
            }
        }
        Some(removed)
    }

    pub fn remove_structures(&mut self, ids: &[StructureId]) -> usize {
        ids.iter()
            .filter(|&&id| self.remove_structure(id).is_some())
            .count()
    }

    /// Alle Strukturen einer Art
    pub fn structures_of_type(&self, kind: StructureKind) -> Vec<StructureId> {
        self.structures
            .iter()
            .filter(|(_, s)| s.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Alle Strukturen, die den Punkt referenzieren
    pub fn structures_at_point(&self, point: PointId) -> Vec<StructureId> {
        self.structures
            .iter()
            .filter(|(_, s)| s.contains_point(point))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ersetzt `old` durch `new` in einer Struktur; `new` muss existieren
    pub fn replace_point_in_structure(
        &mut self,
        id: StructureId,
        old: PointId,
        new: PointId,
    ) -> bool {
        if !self.points.contains(new) {
            return false;
        }
        let references_old = self
            .structures
            .get(&id)
            .is_some_and(|s| s.contains_point(old));
        if !references_old {
            return false;
        }
        self.touch();
        self.structures
            .get_mut(&id)
            .is_some_and(|s| s.replace_point(old, new))
    }

    // --- Selektion ---

    pub fn selected_points(&self) -> &IndexSet<PointId> {
        &self.selected_points
    }

    pub fn selected_structures(&self) -> &IndexSet<StructureId> {
        &self.selected_structures
    }

    /// Ändert die Punkt-Auswahl; unbekannte IDs werden ignoriert
    pub fn select_points(&mut self, ids: impl IntoIterator<Item = PointId>, mode: SelectionMode) {
        let ids: Vec<PointId> = ids
            .into_iter()
            .filter(|id| self.points.contains(*id))
            .collect();
        mode.apply(&mut self.selected_points, ids);
    }

    /// Ändert die Struktur-Auswahl und hält die `selected`-Flags synchron
    pub fn select_structures(
        &mut self,
        ids: impl IntoIterator<Item = StructureId>,
        mode: SelectionMode,
    ) {
        let ids: Vec<StructureId> = ids
            .into_iter()
            .filter(|id| self.structures.contains_key(id))
            .collect();
        mode.apply(&mut self.selected_structures, ids);
        self.sync_selection_flags();
    }

    pub fn clear_selection(&mut self) {
        self.selected_points.clear();
        self.selected_structures.clear();
        self.sync_selection_flags();
    }

    fn sync_selection_flags(&mut self) {
        for (id, structure) in self.structures.iter_mut() {
            structure.selected = self.selected_structures.contains(id);
        }
    }

    // --- Sitzung ---

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Strukturen des laufenden Schritts
    pub fn staged_structures(&self) -> Vec<StructureId> {
        self.session.staged().iter().copied().collect()
    }

    pub fn has_pending_changes(&self) -> bool {
        self.session.is_dirty()
    }

    /// Übernimmt den laufenden Schritt
    pub fn commit(&mut self) {
        let staged = self.session.staged().len();
        for id in self.session.staged() {
            if let Some(structure) = self.structures.get_mut(id) {
                structure.staged = false;
            }
        }
        self.session.clear();
        if staged > 0 {
            log::info!("{} Strukturen übernommen", staged);
        }
    }

    /// Verwirft den laufenden Schritt und stellt den Zustand davor wieder her
    pub fn dismiss(&mut self) {
        let staged = self.session.staged().len();
        if let Some(checkpoint) = self.session.take_checkpoint() {
            let discarded = std::mem::replace(&mut self.points, checkpoint.points);
            self.points.keep_id_counter_from(&discarded);
            self.structures = checkpoint.structures;
        }
        self.session.clear();

        let points = &self.points;
        self.selected_points.retain(|id| points.contains(*id));
        let structures = &self.structures;
        self.selected_structures
            .retain(|id| structures.contains_key(id));
        self.sync_selection_flags();
        if staged > 0 {
            log::info!("{} Strukturen verworfen", staged);
        }
    }

    pub fn preview_points(&self) -> &[DVec3] {
        self.session.preview_points()
    }

    /// Setzt Vorschau-Positionen (ohne Punkte oder Strukturen anzulegen)
    pub fn set_preview_points(&mut self, positions: Vec<DVec3>) {
        self.session.set_preview_points(positions);
    }

    pub fn clear_preview(&mut self) {
        self.session.set_preview_points(Vec::new());
    }

    // --- Räumliche Abfragen ---

    /// Baut einen Spatial-Index über den aktuellen Punkten
    pub fn spatial_index(&self) -> SpatialIndex {
        SpatialIndex::from_points(&self.points)
    }

    pub fn nearest_point(&self, position: DVec3) -> Option<SpatialMatch> {
        self.spatial_index().nearest(position)
    }

    pub fn points_within_radius(&self, position: DVec3, radius: f64) -> Vec<SpatialMatch> {
        self.spatial_index().within_radius(position, radius)
    }
}
