//! Teilen von Strukturen an Parametern, gleichmäßig oder per Projektion.
//!
//! Alle Positionen und Teilgeometrien werden vorab geplant; schlägt eine
//! Berechnung fehl, bleibt die Pipeline unverändert.

use super::main_editor::recalculate_curvatures;
use crate::core::structure::curved_joint::corner_from_center;
use crate::core::{
    ArcStructure, CurvedJoint, Geometry, GeometryResult, LinearStructure, Pipeline, PointId,
    Structure, StructureId, GEOMETRY_TOLERANCE,
};
use glam::DVec3;

/// Geometrie eines geplanten Teilstücks
#[derive(Debug, Clone, Copy)]
enum PlannedPiece {
    Linear,
    Curved { corner: DVec3, curvature_radius: f64 },
    Arc { mid: DVec3 },
}

/// Geplante Teilung einer Struktur
#[derive(Debug, Clone)]
struct DividePlan {
    original: StructureId,
    interior: Vec<DVec3>,
    pieces: Vec<PlannedPiece>,
}

/// Teilt jede selektierte Struktur beim Parameter `t ∈ (0,1)`
pub fn divide_structures(pipeline: &mut Pipeline, t: f64) -> Vec<StructureId> {
    if !is_interior(t) {
        log::debug!("Teilungsparameter {} liegt nicht in (0,1)", t);
        return Vec::new();
    }
    let targets = selected_targets(pipeline);
    divide_all(pipeline, targets.into_iter().map(|id| (id, vec![t])).collect())
}

/// Teilt jede selektierte Struktur in `divisions + 1` gleich parametrisierte Stücke
pub fn divide_structures_evenly(pipeline: &mut Pipeline, divisions: usize) -> Vec<StructureId> {
    if divisions == 0 {
        return Vec::new();
    }
    let params = even_parameters(divisions);
    let targets = selected_targets(pipeline);
    divide_all(
        pipeline,
        targets.into_iter().map(|id| (id, params.clone())).collect(),
    )
}

/// Teilt selektierte gerade Strukturen im Abstand der Projektion von `(dx,dy,dz)`
/// auf die Segmentachse, gemessen ab Start (oder ab Ende bei `invert_origin`).
///
/// Liegt der Teilungspunkt einer Struktur außerhalb, passiert nichts (`None`).
pub fn divide_structures_by_projection(
    pipeline: &mut Pipeline,
    dx: f64,
    dy: f64,
    dz: f64,
    invert_origin: bool,
) -> Option<Vec<StructureId>> {
    let requests = projection_requests(pipeline, DVec3::new(dx, dy, dz), invert_origin)?;
    Some(divide_all(pipeline, requests))
}

/// Vorschau zu [`divide_structures`]: setzt nur die Vorschau-Punkte
pub fn preview_divide_structures(pipeline: &mut Pipeline, t: f64) -> Vec<DVec3> {
    if !is_interior(t) {
        pipeline.clear_preview();
        return Vec::new();
    }
    let targets = selected_targets(pipeline);
    preview(pipeline, targets.into_iter().map(|id| (id, vec![t])).collect())
}

/// Vorschau zu [`divide_structures_evenly`]
pub fn preview_divide_structures_evenly(pipeline: &mut Pipeline, divisions: usize) -> Vec<DVec3> {
    if divisions == 0 {
        pipeline.clear_preview();
        return Vec::new();
    }
    let params = even_parameters(divisions);
    let targets = selected_targets(pipeline);
    preview(
        pipeline,
        targets.into_iter().map(|id| (id, params.clone())).collect(),
    )
}

/// Vorschau zu [`divide_structures_by_projection`]
pub fn preview_divide_structures_by_projection(
    pipeline: &mut Pipeline,
    dx: f64,
    dy: f64,
    dz: f64,
    invert_origin: bool,
) -> Option<Vec<DVec3>> {
    let Some(requests) = projection_requests(pipeline, DVec3::new(dx, dy, dz), invert_origin)
    else {
        pipeline.clear_preview();
        return None;
    };
    Some(preview(pipeline, requests))
}

fn is_interior(t: f64) -> bool {
    t > GEOMETRY_TOLERANCE && t < 1.0 - GEOMETRY_TOLERANCE
}

/// `t_i = (i+1)/(divisions+1)`
fn even_parameters(divisions: usize) -> Vec<f64> {
    (0..divisions)
        .map(|i| (i + 1) as f64 / (divisions + 1) as f64)
        .collect()
}

/// Selektierte Strukturen, die geteilt werden können (keine Auflager)
fn selected_targets(pipeline: &Pipeline) -> Vec<StructureId> {
    pipeline
        .selected_structures()
        .iter()
        .copied()
        .filter(|id| {
            pipeline
                .structure(*id)
                .is_some_and(|s| !matches!(s.geometry, Geometry::Point(_)))
        })
        .collect()
}

fn projection_requests(
    pipeline: &Pipeline,
    offset: DVec3,
    invert_origin: bool,
) -> Option<Vec<(StructureId, Vec<f64>)>> {
    let mut requests = Vec::new();
    for id in pipeline.selected_structures().iter().copied() {
        let Some(line) = pipeline.structure(id).and_then(Structure::as_linear) else {
            continue;
        };
        let direction = line.direction(pipeline.points()).ok()?;
        let length = line.arc_length(pipeline.points()).ok()?;
        let along = offset.dot(direction) / length;
        let t = if invert_origin { 1.0 - along } else { along };
        if !is_interior(t) {
            log::debug!("Projektion liegt außerhalb von {} (t = {:.4})", id, t);
            return None;
        }
        requests.push((id, vec![t]));
    }
    if requests.is_empty() {
        log::debug!("Keine gerade Struktur für die Projektion selektiert");
        return None;
    }
    Some(requests)
}

fn plan_division(
    pipeline: &Pipeline,
    id: StructureId,
    params: &[f64],
) -> GeometryResult<Option<DividePlan>> {
    let Some(structure) = pipeline.structure(id) else {
        return Ok(None);
    };
    let points = pipeline.points();
    let interior = params
        .iter()
        .map(|&t| structure.interpolate(points, t))
        .collect::<GeometryResult<Vec<DVec3>>>()?;

    let pieces = match &structure.geometry {
        Geometry::Linear(_) => vec![PlannedPiece::Linear; params.len() + 1],
        Geometry::Curved(joint) => {
            let center = joint.center(points)?;
            let (start, end) = joint.positions(points)?;
            let chain: Vec<DVec3> = std::iter::once(start)
                .chain(interior.iter().copied())
                .chain(std::iter::once(end))
                .collect();
            chain
                .windows(2)
                .map(|pair| {
                    let (corner, curvature_radius) = corner_from_center(center, pair[0], pair[1])?;
                    Ok(PlannedPiece::Curved {
                        corner,
                        curvature_radius,
                    })
                })
                .collect::<GeometryResult<Vec<_>>>()?
        }
        Geometry::Arc(arc) => {
            let bounds: Vec<f64> = std::iter::once(0.0)
                .chain(params.iter().copied())
                .chain(std::iter::once(1.0))
                .collect();
            bounds
                .windows(2)
                .map(|pair| {
                    Ok(PlannedPiece::Arc {
                        mid: arc.interpolate(points, (pair[0] + pair[1]) * 0.5)?,
                    })
                })
                .collect::<GeometryResult<Vec<_>>>()?
        }
        Geometry::Point(_) => return Ok(None),
    };

    Ok(Some(DividePlan {
        original: id,
        interior,
        pieces,
    }))
}

fn plan_all(pipeline: &Pipeline, requests: &[(StructureId, Vec<f64>)]) -> Option<Vec<DividePlan>> {
    let mut plans = Vec::with_capacity(requests.len());
    for (id, params) in requests {
        match plan_division(pipeline, *id, params) {
            Ok(Some(plan)) => plans.push(plan),
            Ok(None) => {}
            Err(e) => {
                log::warn!("Teilung von {} abgebrochen: {}", id, e);
                return None;
            }
        }
    }
    Some(plans)
}

fn divide_all(pipeline: &mut Pipeline, requests: Vec<(StructureId, Vec<f64>)>) -> Vec<StructureId> {
    let Some(plans) = plan_all(pipeline, &requests) else {
        return Vec::new();
    };
    if plans.is_empty() {
        log::debug!("Keine teilbare Struktur selektiert");
        return Vec::new();
    }

    let mut created = Vec::new();
    for plan in plans {
        created.extend(apply_plan(pipeline, plan));
    }
    recalculate_curvatures(pipeline);
    log::info!("{} Teilstücke erzeugt", created.len());
    created
}

fn apply_plan(pipeline: &mut Pipeline, plan: DividePlan) -> Vec<StructureId> {
    let Some(original) = pipeline.structure(plan.original).cloned() else {
        return Vec::new();
    };
    let ends = original.points();
    let (Some(&first), Some(&last)) = (ends.first(), ends.last()) else {
        return Vec::new();
    };

    let interior_ids = pipeline.add_points(plan.interior);
    let chain: Vec<PointId> = std::iter::once(first)
        .chain(interior_ids)
        .chain(std::iter::once(last))
        .collect();

    let mut created = Vec::with_capacity(plan.pieces.len());
    for (pair, piece) in chain.windows(2).zip(plan.pieces) {
        let geometry = match piece {
            PlannedPiece::Linear => Geometry::Linear(LinearStructure::new(pair[0], pair[1])),
            PlannedPiece::Curved {
                corner,
                curvature_radius,
            } => {
                let mut joint = CurvedJoint::new(pair[0], pair[1], corner, curvature_radius);
                joint.auto = false;
                Geometry::Curved(joint)
            }
            PlannedPiece::Arc { mid } => Geometry::Arc(ArcStructure::new(pair[0], pair[1], mid)),
        };
        let mut structure = Structure::new(original.kind, geometry, original.section);
        structure.color = original.color;
        structure.tag = original.tag.clone();
        structure.extra_info = original.extra_info.clone();
        if let Some(id) = pipeline.add_structure(structure) {
            created.push(id);
        }
    }

    pipeline.remove_structure(plan.original);
    created
}

fn preview(pipeline: &mut Pipeline, requests: Vec<(StructureId, Vec<f64>)>) -> Vec<DVec3> {
    let positions: Vec<DVec3> = plan_all(pipeline, &requests)
        .unwrap_or_default()
        .into_iter()
        .flat_map(|plan| plan.interior)
        .collect();
    pipeline.set_preview_points(positions.clone());
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Section, SelectionMode, StructureKind};
    use crate::editors::main_editor::add_bend;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn straight_pipe(length: f64) -> (Pipeline, StructureId) {
        let mut pipeline = Pipeline::new();
        let a = pipeline.add_point(DVec3::ZERO);
        let b = pipeline.add_point(DVec3::new(length, 0.0, 0.0));
        let id = pipeline
            .add_structure(Structure::linear(StructureKind::Pipe, a, b, Section::tube(0.1, 0.005)))
            .unwrap();
        pipeline.select_structures([id], SelectionMode::Replace);
        (pipeline, id)
    }

    #[test]
    fn test_gleichmaessige_teilung_eines_rohrs() {
        let (mut pipeline, original) = straight_pipe(3.0);

        let pieces = divide_structures_evenly(&mut pipeline, 3);

        assert_eq!(pieces.len(), 4);
        assert!(pipeline.structure(original).is_none());
        for id in &pieces {
            let length = pipeline.structure(*id).unwrap().arc_length(pipeline.points()).unwrap();
            assert_relative_eq!(length, 0.75, epsilon = 1e-12);
        }
        let xs: Vec<f64> = pipeline.points().iter().map(|p| p.position.x).collect();
        assert_eq!(pipeline.point_count(), 5);
        for expected in [0.75, 1.5, 2.25] {
            assert!(xs.iter().any(|x| (x - expected).abs() < 1e-12));
        }
    }

    #[test]
    fn test_teilstuecke_bilden_kette() {
        let (mut pipeline, _) = straight_pipe(2.0);

        let pieces = divide_structures_evenly(&mut pipeline, 2);

        for pair in pieces.windows(2) {
            let first = pipeline.structure(pair[0]).unwrap().points();
            let second = pipeline.structure(pair[1]).unwrap().points();
            assert_eq!(first[1], second[0]);
        }
    }

    #[test]
    fn test_ungueltiger_parameter_ist_noop() {
        let (mut pipeline, original) = straight_pipe(1.0);

        assert!(divide_structures(&mut pipeline, 0.0).is_empty());
        assert!(divide_structures(&mut pipeline, 1.0).is_empty());
        assert!(divide_structures(&mut pipeline, 1.5).is_empty());
        assert!(pipeline.structure(original).is_some());
    }

    #[test]
    fn test_projektion_ab_start_und_ende() {
        let (mut pipeline, _) = straight_pipe(4.0);
        let pieces = divide_structures_by_projection(&mut pipeline, 1.0, 3.0, 0.0, false)
            .expect("Teilung erwartet");
        let first = pipeline.structure(pieces[0]).unwrap();
        assert_relative_eq!(first.arc_length(pipeline.points()).unwrap(), 1.0);

        let (mut pipeline, _) = straight_pipe(4.0);
        let pieces = divide_structures_by_projection(&mut pipeline, 1.0, 0.0, 0.0, true)
            .expect("Teilung erwartet");
        let first = pipeline.structure(pieces[0]).unwrap();
        assert_relative_eq!(first.arc_length(pipeline.points()).unwrap(), 3.0);
    }

    #[test]
    fn test_projektion_ausserhalb_liefert_none() {
        let (mut pipeline, original) = straight_pipe(1.0);

        assert!(divide_structures_by_projection(&mut pipeline, 2.0, 0.0, 0.0, false).is_none());
        assert!(divide_structures_by_projection(&mut pipeline, -0.5, 0.0, 0.0, false).is_none());
        assert!(pipeline.structure(original).is_some());
        assert_eq!(pipeline.point_count(), 2);
    }

    #[test]
    fn test_kruemmung_halbieren_behaelt_mittelpunkt() {
        let mut pipeline = Pipeline::new();
        let ids = [DVec3::new(-1.0, 0.0, 0.0), DVec3::ZERO, DVec3::Y].map(|p| pipeline.add_point(p));
        let section = Section::tube(0.1, 0.005);
        pipeline.add_structure(Structure::linear(StructureKind::Pipe, ids[0], ids[1], section));
        pipeline.add_structure(Structure::linear(StructureKind::Pipe, ids[1], ids[2], section));
        pipeline.select_points([ids[1]], SelectionMode::Replace);
        let bend = add_bend(&mut pipeline, 0.2, false)[0];
        let center = pipeline
            .structure(bend)
            .and_then(Structure::as_curved)
            .unwrap()
            .center(pipeline.points())
            .unwrap();
        pipeline.select_structures([bend], SelectionMode::Replace);

        let halves = divide_structures(&mut pipeline, 0.5);

        assert_eq!(halves.len(), 2);
        let mut total = 0.0;
        for id in halves {
            let joint = *pipeline.structure(id).unwrap().as_curved().unwrap();
            assert!(!joint.auto);
            assert_relative_eq!(joint.curvature_radius, 0.2, epsilon = 1e-9);
            let own_center = joint.center(pipeline.points()).unwrap();
            assert_abs_diff_eq!(own_center.distance(center), 0.0, epsilon = 1e-9);
            total += joint.arc_length(pipeline.points()).unwrap();
        }
        assert_relative_eq!(total, 0.2 * std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_bogen_teilen() {
        let mut pipeline = Pipeline::new();
        let a = pipeline.add_point(DVec3::new(1.0, 0.0, 0.0));
        let b = pipeline.add_point(DVec3::new(-1.0, 0.0, 0.0));
        let arc = pipeline
            .add_structure(Structure::arc(a, b, DVec3::Y, Section::default()))
            .unwrap();
        pipeline.select_structures([arc], SelectionMode::Replace);

        let pieces = divide_structures_evenly(&mut pipeline, 1);

        assert_eq!(pieces.len(), 2);
        let split = pipeline.structure(pieces[0]).unwrap().points()[1];
        let position = pipeline.position(split).unwrap();
        assert_abs_diff_eq!(position.distance(DVec3::Y), 0.0, epsilon = 1e-9);
        for id in pieces {
            let length = pipeline.structure(id).unwrap().arc_length(pipeline.points()).unwrap();
            assert_relative_eq!(length, std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_kollabierte_kruemmung_bricht_ohne_aenderung_ab() {
        let (mut pipeline, pipe) = straight_pipe(1.0);
        let corner = DVec3::new(3.0, 0.0, 0.0);
        let s = pipeline.add_point(corner);
        let e = pipeline.add_point(corner);
        let joint = pipeline
            .add_structure(Structure::curved(
                StructureKind::Bend,
                CurvedJoint::new(s, e, corner, 0.1),
                Section::default(),
            ))
            .unwrap();
        pipeline.select_structures([pipe, joint], SelectionMode::Replace);
        let structures_before = pipeline.structure_count();

        assert!(divide_structures(&mut pipeline, 0.5).is_empty());
        assert_eq!(pipeline.structure_count(), structures_before);
        assert!(pipeline.structure(pipe).is_some());
    }

    #[test]
    fn test_vorschau_legt_nichts_an() {
        let (mut pipeline, _) = straight_pipe(3.0);

        let preview = preview_divide_structures_evenly(&mut pipeline, 2);

        assert_eq!(preview.len(), 2);
        assert_relative_eq!(preview[0].x, 1.0, epsilon = 1e-12);
        assert_eq!(pipeline.preview_points(), preview.as_slice());
        assert_eq!(pipeline.structure_count(), 1);
        assert_eq!(pipeline.point_count(), 2);
    }
}
