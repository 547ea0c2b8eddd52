//! Punkt-Operationen: Anhängen, Abtrennen, Verschieben, Zusammenführen.

use super::main_editor::recalculate_curvatures;
use crate::core::point::coincidence_key;
use crate::core::{MergeResult, Pipeline, PointId, COINCIDENCE_DECIMALS};
use glam::DVec3;

/// Führt alle zu `point` koinzidenten Punkte in `point` zusammen.
///
/// Punkte, die mit `point` eine Struktur teilen, bleiben getrennt.
/// Gibt die entfernten Punkte zurück.
pub fn attach_point(pipeline: &mut Pipeline, point: PointId) -> Vec<PointId> {
    let Some(position) = pipeline.position(point) else {
        return Vec::new();
    };
    let key = coincidence_key(position, COINCIDENCE_DECIMALS);
    let candidates: Vec<PointId> = pipeline
        .points()
        .iter()
        .filter(|p| p.id != point && coincidence_key(p.position, COINCIDENCE_DECIMALS) == key)
        .map(|p| p.id)
        .collect();

    let merged: Vec<PointId> = candidates
        .into_iter()
        .filter(|&other| pipeline.merge_point_into(other, point).is_some())
        .collect();

    if merged.is_empty() {
        log::debug!("Kein koinzidenter Punkt an {}", point);
    } else {
        recalculate_curvatures(pipeline);
        log::info!("{} Punkte an {} angehängt", merged.len(), point);
    }
    merged
}

/// Gibt jeder weiteren Struktur am Punkt eine eigene Kopie des Punkts.
///
/// Die erste Struktur behält den ursprünglichen Punkt. Gibt die neuen Punkte zurück.
pub fn detach_point(pipeline: &mut Pipeline, point: PointId) -> Vec<PointId> {
    let Some(position) = pipeline.position(point) else {
        return Vec::new();
    };
    let structures = pipeline.structures_at_point(point);
    if structures.len() < 2 {
        log::debug!("Punkt {} hat nichts zum Abtrennen", point);
        return Vec::new();
    }

    let mut created = Vec::with_capacity(structures.len() - 1);
    for id in &structures[1..] {
        let copy = pipeline.add_point(position);
        pipeline.replace_point_in_structure(*id, point, copy);
        created.push(copy);
    }

    recalculate_curvatures(pipeline);
    log::info!("{} von {} Strukturen abgetrennt", created.len(), point);
    created
}

/// Verschiebt einen Punkt und führt anschließend die Krümmungen nach
pub fn move_point(pipeline: &mut Pipeline, point: PointId, position: DVec3) -> bool {
    if !pipeline.set_point_position(point, position) {
        return false;
    }
    recalculate_curvatures(pipeline);
    true
}

/// Verschiebt alle selektierten Punkte um `delta`
pub fn move_selected_points(pipeline: &mut Pipeline, delta: DVec3) -> usize {
    let selected: Vec<PointId> = pipeline.selected_points().iter().copied().collect();
    let mut moved = 0;
    for point in selected {
        if let Some(position) = pipeline.position(point) {
            pipeline.set_point_position(point, position + delta);
            moved += 1;
        }
    }
    if moved > 0 {
        recalculate_curvatures(pipeline);
    }
    moved
}

/// Führt alle koinzidenten Punkte zusammen (idempotent)
pub fn merge_coincident_points(pipeline: &mut Pipeline) -> MergeResult {
    let result = pipeline.merge_coincident_points(COINCIDENCE_DECIMALS);
    if result.had_duplicates() {
        recalculate_curvatures(pipeline);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Section, SelectionMode, Structure, StructureKind};
    use crate::editors::main_editor::add_bend;
    use approx::assert_abs_diff_eq;

    fn pipe(pipeline: &mut Pipeline, a: PointId, b: PointId) {
        pipeline.add_structure(Structure::linear(StructureKind::Pipe, a, b, Section::default()));
    }

    #[test]
    fn test_attach_point_fuehrt_koinzidente_zusammen() {
        let mut pipeline = Pipeline::new();
        let p = pipeline.add_point(DVec3::new(1.0, 2.0, 3.0));
        let p1 = pipeline.add_point(DVec3::new(1.0, 2.0, 3.0));
        let p2 = pipeline.add_point(DVec3::new(1.0000002, 2.0, 3.0));
        let a = pipeline.add_point(DVec3::ZERO);
        let b = pipeline.add_point(DVec3::ONE);
        pipe(&mut pipeline, a, p1);
        pipe(&mut pipeline, p2, b);

        let merged = attach_point(&mut pipeline, p);

        assert_eq!(merged, vec![p1, p2]);
        assert!(!pipeline.points().contains(p1));
        assert!(!pipeline.points().contains(p2));
        assert_eq!(pipeline.structures_at_point(p).len(), 2);
    }

    #[test]
    fn test_detach_point_trennt_strukturen() {
        let mut pipeline = Pipeline::new();
        let [a, m, b] = [DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0)].map(|p| pipeline.add_point(p));
        pipe(&mut pipeline, a, m);
        pipe(&mut pipeline, m, b);

        let created = detach_point(&mut pipeline, m);

        assert_eq!(created.len(), 1);
        assert_eq!(pipeline.structures_at_point(m).len(), 1);
        assert_eq!(pipeline.structures_at_point(created[0]).len(), 1);
        assert_eq!(pipeline.position(created[0]), Some(DVec3::X));

        // Wieder anhängen stellt die Verbindung her
        let merged = attach_point(&mut pipeline, m);
        assert_eq!(merged, created);
        assert_eq!(pipeline.structures_at_point(m).len(), 2);
    }

    #[test]
    fn test_detach_einzelner_struktur_ist_noop() {
        let mut pipeline = Pipeline::new();
        let a = pipeline.add_point(DVec3::ZERO);
        let b = pipeline.add_point(DVec3::X);
        pipe(&mut pipeline, a, b);

        assert!(detach_point(&mut pipeline, b).is_empty());
        assert_eq!(pipeline.point_count(), 2);
    }

    #[test]
    fn test_move_point_fuehrt_kruemmung_nach() {
        let mut pipeline = Pipeline::new();
        let [a, c, b] = [DVec3::new(-1.0, 0.0, 0.0), DVec3::ZERO, DVec3::Y].map(|p| pipeline.add_point(p));
        pipe(&mut pipeline, a, c);
        pipe(&mut pipeline, c, b);
        pipeline.select_points([c], SelectionMode::Replace);
        let bend = add_bend(&mut pipeline, 0.1, false)[0];

        assert!(move_point(&mut pipeline, b, DVec3::new(1.0, 1.0, 0.0)));

        let joint = *pipeline.structure(bend).unwrap().as_curved().unwrap();
        let center = joint.center(pipeline.points()).unwrap();
        let (start, end) = joint.positions(pipeline.points()).unwrap();
        assert_abs_diff_eq!(center.distance(start), 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(center.distance(end), 0.1, epsilon = 1e-9);
        assert!(!move_point(&mut pipeline, PointId(999), DVec3::ZERO));
    }

    #[test]
    fn test_move_selected_points() {
        let mut pipeline = Pipeline::new();
        let a = pipeline.add_point(DVec3::ZERO);
        let b = pipeline.add_point(DVec3::X);
        pipeline.select_points([a, b], SelectionMode::Replace);

        assert_eq!(move_selected_points(&mut pipeline, DVec3::Z), 2);
        assert_eq!(pipeline.position(b), Some(DVec3::new(1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_merge_coincident_points_idempotent() {
        let mut pipeline = Pipeline::new();
        let a = pipeline.add_point(DVec3::ZERO);
        let b = pipeline.add_point(DVec3::X);
        let b2 = pipeline.add_point(DVec3::X);
        let c = pipeline.add_point(DVec3::Y);
        pipe(&mut pipeline, a, b);
        pipe(&mut pipeline, b2, c);

        let first = merge_coincident_points(&mut pipeline);
        let second = merge_coincident_points(&mut pipeline);

        assert_eq!(first.removed_points, 1);
        assert_eq!(second, MergeResult::default());
    }
}
