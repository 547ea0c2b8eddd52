//! Haupt-Editor: Strukturen per Delta anlegen, Krümmungen einfügen und nachführen.

use crate::core::structure::curved_joint::{half_angle, is_solvable_half_angle, tangent_length};
use crate::core::{
    CurvedJoint, Geometry, GeometryFamily, Pipeline, PointId, Section, SelectionMode, Structure,
    StructureId, StructureKind, GEOMETRY_TOLERANCE,
};
use crate::shared::options::{DEFAULT_DIAMETER, DEFAULT_THICKNESS};
use glam::DVec3;

/// Legt für jeden selektierten Punkt (sonst den zuletzt angelegten) einen neuen Punkt
/// bei `punkt + deltas` an und verbindet beide mit einer geraden Struktur.
///
/// Die neuen Endpunkte werden anschließend selektiert.
pub fn add_structure_deltas(
    pipeline: &mut Pipeline,
    kind: StructureKind,
    deltas: DVec3,
    section: Section,
) -> Vec<StructureId> {
    if !kind.is_linear() {
        log::debug!("{} kann nicht per Delta angelegt werden", kind);
        return Vec::new();
    }
    if deltas.length() <= GEOMETRY_TOLERANCE {
        log::debug!("Delta ohne Länge, keine Struktur angelegt");
        return Vec::new();
    }

    let origins: Vec<PointId> = if pipeline.selected_points().is_empty() {
        pipeline.last_point().into_iter().collect()
    } else {
        pipeline.selected_points().iter().copied().collect()
    };
    if origins.is_empty() {
        log::debug!("Kein Ausgangspunkt für {} vorhanden", kind);
        return Vec::new();
    }

    let mut created = Vec::with_capacity(origins.len());
    let mut new_ends = Vec::with_capacity(origins.len());
    for origin in origins {
        let Some(position) = pipeline.position(origin) else {
            continue;
        };
        let end = pipeline.add_point(position + deltas);
        if let Some(id) = pipeline.add_structure(Structure::linear(kind, origin, end, section)) {
            created.push(id);
            new_ends.push(end);
        }
    }

    if !created.is_empty() {
        pipeline.select_points(new_ends, SelectionMode::Replace);
        recalculate_curvatures(pipeline);
        log::info!("{} × {} angelegt", created.len(), kind);
    }
    created
}

/// Richtungen, in denen die angrenzenden Strukturen den Punkt verlassen.
///
/// Berücksichtigt gerade Strukturen (zum anderen Ende) und nicht kollabierte
/// Krümmungen (zur Ecke). Strukturen in `exclude` werden übersprungen.
pub fn get_point_tangency(
    pipeline: &Pipeline,
    point: PointId,
    exclude: &[StructureId],
) -> Vec<(StructureId, DVec3)> {
    pipeline
        .structures_at_point(point)
        .into_iter()
        .filter(|id| !exclude.contains(id))
        .filter_map(|id| {
            let structure = pipeline.structure(id)?;
            let tangency = match &structure.geometry {
                Geometry::Linear(line) => line.tangency_at(pipeline.points(), point),
                Geometry::Curved(joint) => joint.tangency_at(pipeline.points(), point),
                Geometry::Arc(_) | Geometry::Point(_) => None,
            }?;
            Some((id, tangency))
        })
        .collect()
}

/// Fügt an jedem selektierten Punkt einen Bogen ein
pub fn add_bend(
    pipeline: &mut Pipeline,
    curvature_radius: f64,
    allow_dangling: bool,
) -> Vec<StructureId> {
    add_joints(pipeline, StructureKind::Bend, curvature_radius, allow_dangling)
}

/// Fügt an jedem selektierten Punkt einen Winkel (Elbow) ein
pub fn add_elbow(
    pipeline: &mut Pipeline,
    curvature_radius: f64,
    allow_dangling: bool,
) -> Vec<StructureId> {
    add_joints(pipeline, StructureKind::Elbow, curvature_radius, allow_dangling)
}

fn add_joints(
    pipeline: &mut Pipeline,
    kind: StructureKind,
    curvature_radius: f64,
    allow_dangling: bool,
) -> Vec<StructureId> {
    if curvature_radius.is_nan() || curvature_radius <= 0.0 {
        log::debug!("Ungültiger Krümmungsradius: {}", curvature_radius);
        return Vec::new();
    }

    let targets: Vec<PointId> = pipeline.selected_points().iter().copied().collect();
    let created: Vec<StructureId> = targets
        .into_iter()
        .filter_map(|point| {
            add_joint_at_point(pipeline, point, kind, curvature_radius, allow_dangling)
        })
        .collect();

    if !created.is_empty() {
        recalculate_curvatures(pipeline);
        log::info!("{} × {} eingefügt (r = {})", created.len(), kind, curvature_radius);
    }
    created
}

/// Fügt eine Krümmung am Punkt ein oder expandiert eine dort kollabierte.
///
/// Der zweite Nachbar wird auf einen neuen Punkt umgehängt; die Krümmung
/// verbindet den ursprünglichen Punkt mit dem neuen.
pub(crate) fn add_joint_at_point(
    pipeline: &mut Pipeline,
    point: PointId,
    kind: StructureKind,
    curvature_radius: f64,
    allow_dangling: bool,
) -> Option<StructureId> {
    if curvature_radius.is_nan() || curvature_radius <= 0.0 || !kind.is_curved() {
        return None;
    }
    let position = pipeline.position(point)?;

    for id in pipeline.structures_at_point(point) {
        let Some(joint) = pipeline.structure(id).and_then(Structure::as_curved) else {
            continue;
        };
        if !joint.is_collapsed(pipeline.points()) {
            log::debug!("Punkt {} hat bereits eine Krümmung ({})", point, id);
            return None;
        }
        let structure = pipeline.structure_mut(id)?;
        structure.kind = kind;
        if let Some(joint) = structure.as_curved_mut() {
            joint.curvature_radius = curvature_radius;
            joint.auto = true;
        }
        log::debug!("Kollabierte Krümmung {} an {} reaktiviert", id, point);
        return Some(id);
    }

    let tangencies = get_point_tangency(pipeline, point, &[]);
    if tangencies.len() > 2 {
        log::debug!("Punkt {} hat {} Nachbarn, keine Krümmung", point, tangencies.len());
        return None;
    }
    let dangling = tangencies.len() < 2;
    if dangling && !allow_dangling {
        log::debug!("Punkt {} ist offen, Krümmung nicht erlaubt", point);
        return None;
    }

    let (vec_a, vec_b) = match tangencies.as_slice() {
        [(_, a), (_, b)] => (*a, *b),
        [(_, a)] => (*a, a.any_orthonormal_vector()),
        _ => (DVec3::X, DVec3::Y),
    };

    let half = half_angle(vec_a, vec_b);
    if !is_solvable_half_angle(half) {
        log::debug!("Winkel von 0° oder 180° an {}, keine Krümmung", point);
        return None;
    }
    let distance = tangent_length(curvature_radius, half);
    for (id, _) in &tangencies {
        let length = pipeline
            .structure(*id)
            .and_then(|s| s.arc_length(pipeline.points()).ok())
            .unwrap_or(0.0);
        if distance >= length {
            log::debug!(
                "Tangentenlänge {:.4} überschreitet Länge von {} ({:.4})",
                distance,
                id,
                length
            );
            return None;
        }
    }

    let section = joint_section(pipeline, tangencies.first().map(|(id, _)| *id));

    let detached = pipeline.add_point(position);
    if let Some((second, _)) = tangencies.get(1) {
        pipeline.replace_point_in_structure(*second, point, detached);
    }

    let mut joint = CurvedJoint::new(point, detached, position, curvature_radius);
    if let Err(e) = joint.normalize_values_vector(pipeline.points_mut(), vec_a, vec_b) {
        log::warn!("Krümmung an {} nicht lösbar: {}", point, e);
        if let Some((second, _)) = tangencies.get(1) {
            pipeline.replace_point_in_structure(*second, detached, point);
        }
        pipeline.remove_point(detached);
        return None;
    }
    joint.auto = !dangling;

    pipeline.add_structure(Structure::curved(kind, joint, section))
}

/// Querschnitt einer neuen Krümmung: vom Nachbarn übernommen, sonst Standard-Rohr
fn joint_section(pipeline: &Pipeline, neighbour: Option<StructureId>) -> Section {
    let inherited = neighbour
        .and_then(|id| pipeline.structure(id))
        .and_then(|s| Some(Section::tube(s.section.diameter()?, s.section.thickness()?)));
    inherited.unwrap_or_else(|| Section::tube(DEFAULT_DIAMETER, DEFAULT_THICKNESS))
}

/// Richtung von der Ecke zum Referenzpunkt des einzigen Nachbarn an `point`.
///
/// Gerade Nachbarn liefern ihr anderes Ende, Krümmungen ihre Ecke.
/// Auflager zählen nicht als Nachbarn.
fn neighbour_direction(
    pipeline: &Pipeline,
    joint_id: StructureId,
    point: PointId,
    corner: DVec3,
) -> Option<DVec3> {
    let neighbours: Vec<&Structure> = neighbours_at(pipeline, joint_id, point);
    let [neighbour] = neighbours.as_slice() else {
        return None;
    };
    let reference = match &neighbour.geometry {
        Geometry::Linear(line) => pipeline.position(line.other_end(point)?)?,
        Geometry::Curved(joint) => joint.corner,
        Geometry::Arc(_) | Geometry::Point(_) => return None,
    };
    (reference - corner).try_normalize()
}

fn neighbours_at(pipeline: &Pipeline, joint_id: StructureId, point: PointId) -> Vec<&Structure> {
    pipeline
        .structures_at_point(point)
        .into_iter()
        .filter(|id| *id != joint_id)
        .filter_map(|id| pipeline.structure(id))
        .filter(|s| s.kind.family() != GeometryFamily::Point)
        .collect()
}

fn auto_joints(pipeline: &Pipeline) -> Vec<(StructureId, CurvedJoint)> {
    pipeline
        .structures()
        .filter_map(|(id, s)| s.as_curved().filter(|j| j.auto).map(|j| (id, *j)))
        .collect()
}

/// Führt alle automatischen Krümmungen ihren Nachbarn nach.
///
/// Krümmungen mit zwei lösbaren Nachbarn werden normalisiert (auch kollabierte),
/// alle übrigen kollabieren. Gibt die Anzahl normalisierter Krümmungen zurück.
pub fn recalculate_curvatures(pipeline: &mut Pipeline) -> usize {
    collapse_overloaded_bends(pipeline);

    let mut normalized = 0;
    for (id, joint) in auto_joints(pipeline) {
        let dir_a = neighbour_direction(pipeline, id, joint.start, joint.corner);
        let dir_b = neighbour_direction(pipeline, id, joint.end, joint.corner);
        let was_collapsed = joint.is_collapsed(pipeline.points());

        let (Some(dir_a), Some(dir_b)) = (dir_a, dir_b) else {
            if !was_collapsed {
                match joint.collapse(pipeline.points_mut()) {
                    Ok(()) => log::debug!("Krümmung {} ohne beidseitige Nachbarn kollabiert", id),
                    Err(e) => log::warn!("Krümmung {} nicht kollabierbar: {}", id, e),
                }
            }
            continue;
        };

        let (points, structures) = pipeline.split_mut();
        let Some(target) = structures.get_mut(&id).and_then(Structure::as_curved_mut) else {
            continue;
        };
        match target.normalize_values_vector(points, dir_a, dir_b) {
            Ok(()) => normalized += 1,
            Err(e) => {
                if let Err(collapse_err) = target.collapse(points) {
                    log::warn!("Krümmung {} nicht kollabierbar: {}", id, collapse_err);
                } else if !was_collapsed {
                    log::warn!("Krümmung {} kollabiert: {}", id, e);
                }
            }
        }
    }
    normalized
}

/// Kollabiert automatische Krümmungen mit mehr als einem Nachbarn an Start oder Ende
pub fn collapse_overloaded_bends(pipeline: &mut Pipeline) -> usize {
    let overloaded: Vec<(StructureId, CurvedJoint)> = auto_joints(pipeline)
        .into_iter()
        .filter(|(id, joint)| {
            neighbours_at(pipeline, *id, joint.start).len() > 1
                || neighbours_at(pipeline, *id, joint.end).len() > 1
        })
        .filter(|(_, joint)| !joint.is_collapsed(pipeline.points()))
        .collect();

    for (id, joint) in &overloaded {
        match joint.collapse(pipeline.points_mut()) {
            Ok(()) => log::debug!("Überladene Krümmung {} kollabiert", id),
            Err(e) => log::warn!("Überladene Krümmung {} nicht kollabierbar: {}", id, e),
        }
    }
    overloaded.len()
}

/// Kollabiert die selektierten Krümmungen und schaltet sie auf manuell
pub fn collapse_selected_bends(pipeline: &mut Pipeline) -> usize {
    let selected: Vec<StructureId> = pipeline
        .selected_structures()
        .iter()
        .copied()
        .filter(|id| {
            pipeline
                .structure(*id)
                .is_some_and(|s| s.as_curved().is_some())
        })
        .collect();

    for id in &selected {
        let (points, structures) = pipeline.split_mut();
        if let Some(joint) = structures.get_mut(id).and_then(Structure::as_curved_mut) {
            if let Err(e) = joint.collapse(points) {
                log::warn!("Krümmung {} nicht kollabierbar: {}", id, e);
            }
            joint.auto = false;
        }
    }
    if !selected.is_empty() {
        log::info!("{} Krümmungen kollabiert", selected.len());
    }
    selected.len()
}

/// Entfernt alle selektierten Strukturen und führt die Krümmungen nach
pub fn remove_selected_structures(pipeline: &mut Pipeline) -> usize {
    let selected: Vec<StructureId> = pipeline.selected_structures().iter().copied().collect();
    if selected.is_empty() {
        log::debug!("Nichts zum Löschen selektiert");
        return 0;
    }
    let removed = pipeline.remove_structures(&selected);
    recalculate_curvatures(pipeline);
    log::info!("{} Strukturen entfernt", removed);
    removed
}
