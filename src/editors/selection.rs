//! Selektions-Operationen auf Punkten und Strukturen.

use crate::core::{Pipeline, PointId, SelectionMode, StructureId};
use indexmap::IndexSet;

/// Wählt Punkte mit Modifier-Tasten (Strg = hinzufügen, Alt = entfernen, beide = umschalten)
pub fn select_points(pipeline: &mut Pipeline, ids: &[PointId], ctrl: bool, alt: bool) {
    pipeline.select_points(ids.iter().copied(), SelectionMode::from_modifiers(ctrl, alt));
}

/// Wählt Strukturen mit Modifier-Tasten
pub fn select_structures(pipeline: &mut Pipeline, ids: &[StructureId], ctrl: bool, alt: bool) {
    pipeline.select_structures(ids.iter().copied(), SelectionMode::from_modifiers(ctrl, alt));
}

pub fn clear_selection(pipeline: &mut Pipeline) {
    pipeline.clear_selection();
}

pub fn select_all_structures(pipeline: &mut Pipeline) {
    let ids = pipeline.structure_ids();
    pipeline.select_structures(ids, SelectionMode::Replace);
}

/// Ersetzt die Punkt-Auswahl durch alle Punkte der selektierten Strukturen
pub fn select_points_of_selected_structures(pipeline: &mut Pipeline) {
    let points: IndexSet<PointId> = pipeline
        .selected_structures()
        .iter()
        .filter_map(|id| pipeline.structure(*id))
        .flat_map(|s| s.points())
        .collect();
    pipeline.select_points(points, SelectionMode::Replace);
}

/// Ersetzt die Struktur-Auswahl durch alle Strukturen an selektierten Punkten
pub fn select_structures_at_selected_points(pipeline: &mut Pipeline) {
    let structures: IndexSet<StructureId> = pipeline
        .selected_points()
        .iter()
        .flat_map(|p| pipeline.structures_at_point(*p))
        .collect();
    pipeline.select_structures(structures, SelectionMode::Replace);
}
