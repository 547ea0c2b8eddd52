//! Verbinden selektierter Punkte mit geraden Strukturen (optional mit Bögen).

use super::main_editor::{add_bend, recalculate_curvatures};
use crate::core::{
    Pipeline, PointId, Section, SelectionMode, Structure, StructureId, StructureKind,
    GEOMETRY_TOLERANCE,
};

/// Legt je aufeinanderfolgendem Paar selektierter Punkte eine Struktur `kind` an.
///
/// Zusammenfallende Paare werden übersprungen.
pub fn generic_structure_connection(
    pipeline: &mut Pipeline,
    kind: StructureKind,
    section: Section,
) -> Vec<StructureId> {
    if !kind.is_linear() {
        log::debug!("{} kann nicht als Verbindung angelegt werden", kind);
        return Vec::new();
    }
    let selected: Vec<PointId> = pipeline.selected_points().iter().copied().collect();
    if selected.len() < 2 {
        log::debug!("Mindestens zwei Punkte für eine Verbindung nötig");
        return Vec::new();
    }

    let mut created = Vec::new();
    for pair in selected.windows(2) {
        let (Some(a), Some(b)) = (pipeline.position(pair[0]), pipeline.position(pair[1])) else {
            continue;
        };
        if a.distance(b) <= GEOMETRY_TOLERANCE {
            log::debug!("{} und {} fallen zusammen, übersprungen", pair[0], pair[1]);
            continue;
        }
        if let Some(id) =
            pipeline.add_structure(Structure::linear(kind, pair[0], pair[1], section))
        {
            created.push(id);
        }
    }

    if !created.is_empty() {
        recalculate_curvatures(pipeline);
        log::info!("{} × {} verbunden", created.len(), kind);
    }
    created
}

pub fn connect_pipes(pipeline: &mut Pipeline, section: Section) -> Vec<StructureId> {
    generic_structure_connection(pipeline, StructureKind::Pipe, section)
}

pub fn connect_beams(pipeline: &mut Pipeline, section: Section) -> Vec<StructureId> {
    generic_structure_connection(pipeline, StructureKind::Beam, section)
}

pub fn connect_flanges(pipeline: &mut Pipeline, section: Section) -> Vec<StructureId> {
    generic_structure_connection(pipeline, StructureKind::Flange, section)
}

pub fn connect_valves(pipeline: &mut Pipeline, section: Section) -> Vec<StructureId> {
    generic_structure_connection(pipeline, StructureKind::Valve, section)
}

/// Verbindet die selektierten Punkte mit Rohren und setzt an allen inneren Punkten Bögen.
///
/// Die Punkt-Auswahl bleibt danach unverändert.
pub fn connect_bent_pipes(
    pipeline: &mut Pipeline,
    section: Section,
    curvature_radius: f64,
) -> Vec<StructureId> {
    if curvature_radius.is_nan() || curvature_radius <= 0.0 {
        log::debug!("Ungültiger Krümmungsradius: {}", curvature_radius);
        return Vec::new();
    }

    let selection: Vec<PointId> = pipeline.selected_points().iter().copied().collect();
    let mut created = connect_pipes(pipeline, section);
    if created.is_empty() || selection.len() < 3 {
        return created;
    }

    let interior = selection[1..selection.len() - 1].to_vec();
    pipeline.select_points(interior, SelectionMode::Replace);
    created.extend(add_bend(pipeline, curvature_radius, false));
    pipeline.select_points(selection, SelectionMode::Replace);
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn selected_points(positions: &[DVec3]) -> Pipeline {
        let mut pipeline = Pipeline::new();
        let ids = pipeline.add_points(positions.iter().copied());
        pipeline.select_points(ids, SelectionMode::Replace);
        pipeline
    }

    #[test]
    fn test_verbindet_aufeinanderfolgende_paare() {
        let mut pipeline = selected_points(&[DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0)]);

        let created = connect_pipes(&mut pipeline, Section::tube(0.1, 0.005));

        assert_eq!(created.len(), 2);
        let first = pipeline.structure(created[0]).unwrap();
        let second = pipeline.structure(created[1]).unwrap();
        assert_eq!(first.points()[1], second.points()[0]);
        assert_eq!(first.kind, StructureKind::Pipe);
    }

    #[test]
    fn test_zusammenfallende_punkte_werden_uebersprungen() {
        let mut pipeline = selected_points(&[DVec3::ZERO, DVec3::ZERO, DVec3::Y]);

        let created = connect_beams(&mut pipeline, Section::default());

        assert_eq!(created.len(), 1);
        assert_eq!(
            pipeline.structure(created[0]).unwrap().kind,
            StructureKind::Beam
        );
    }

    #[test]
    fn test_weniger_als_zwei_punkte() {
        let mut pipeline = selected_points(&[DVec3::ZERO]);

        assert!(connect_flanges(&mut pipeline, Section::default()).is_empty());
        assert!(generic_structure_connection(&mut pipeline, StructureKind::Bend, Section::default()).is_empty());
    }

    #[test]
    fn test_connect_bent_pipes() {
        let mut pipeline = selected_points(&[
            DVec3::ZERO,
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 2.0, 0.0),
            DVec3::new(2.0, 2.0, 2.0),
        ]);
        let selection_before = pipeline.selected_points().clone();

        let created = connect_bent_pipes(&mut pipeline, Section::tube(0.1, 0.005), 0.3);

        assert_eq!(created.len(), 5);
        assert_eq!(pipeline.structures_of_type(StructureKind::Bend).len(), 2);
        assert_eq!(pipeline.selected_points(), &selection_before);
    }

    #[test]
    fn test_connect_bent_pipes_ungueltiger_radius() {
        let mut pipeline = selected_points(&[DVec3::ZERO, DVec3::X, DVec3::Y]);

        assert!(connect_bent_pipes(&mut pipeline, Section::default(), 0.0).is_empty());
        assert_eq!(pipeline.structure_count(), 0);
    }

    #[test]
    fn test_connect_valves() {
        let mut pipeline = selected_points(&[DVec3::ZERO, DVec3::Z]);

        let created = connect_valves(&mut pipeline, Section::tube(0.2, 0.01));

        assert_eq!(pipeline.structure(created[0]).unwrap().kind, StructureKind::Valve);
    }
}
