//! Umwandeln von Strukturen in eine andere Art, an Ort und Stelle (ID bleibt erhalten).
//!
//! Unterstützte Wandlungen:
//! - gerade ↔ gerade (Querschnitt wird passend geraten)
//! - Bogen ↔ Winkel
//! - Bogen/Winkel ↔ Kreisbogen

use super::main_editor::recalculate_curvatures;
use crate::core::structure::curved_joint::corner_from_center;
use crate::core::{
    ArcStructure, BeamSection, CurvedJoint, Geometry, Pipeline, Section, Structure, StructureId,
    StructureKind,
};

/// Wandelt alle selektierten Strukturen in `kind` um.
///
/// Nicht unterstützte Wandlungen werden übersprungen. Gibt die umgewandelten IDs zurück.
pub fn morph_structures(pipeline: &mut Pipeline, kind: StructureKind) -> Vec<StructureId> {
    let selected: Vec<StructureId> = pipeline.selected_structures().iter().copied().collect();
    let morphed: Vec<StructureId> = selected
        .into_iter()
        .filter(|id| morph_structure(pipeline, *id, kind))
        .collect();

    if !morphed.is_empty() {
        recalculate_curvatures(pipeline);
        log::info!("{} Strukturen in {} umgewandelt", morphed.len(), kind);
    }
    morphed
}

/// Wandelt eine einzelne Struktur um; `false` bei nicht unterstützter Wandlung
pub fn morph_structure(pipeline: &mut Pipeline, id: StructureId, kind: StructureKind) -> bool {
    let Some(structure) = pipeline.structure(id) else {
        return false;
    };
    if structure.kind == kind {
        return false;
    }
    let Some(geometry) = morph_geometry(pipeline, structure, kind) else {
        log::debug!("{} ({}) lässt sich nicht in {} umwandeln", id, structure.kind, kind);
        return false;
    };
    let section = morph_section(structure.section, kind);

    let Some(target) = pipeline.structure_mut(id) else {
        return false;
    };
    target.kind = kind;
    target.geometry = geometry;
    target.section = section;
    true
}

fn morph_geometry(pipeline: &Pipeline, structure: &Structure, kind: StructureKind) -> Option<Geometry> {
    let points = pipeline.points();
    match (&structure.geometry, kind) {
        (Geometry::Linear(_), k) if k.is_linear() => Some(structure.geometry),
        (Geometry::Curved(_), k) if k.is_curved() => Some(structure.geometry),
        (Geometry::Curved(joint), StructureKind::ArcBend) => {
            if joint.is_collapsed(points) {
                return None;
            }
            let mid = joint.interpolate(points, 0.5).ok()?;
            Some(Geometry::Arc(ArcStructure::new(joint.start, joint.end, mid)))
        }
        (Geometry::Arc(arc), k) if k.is_curved() => {
            let (start, end) = arc.positions(points).ok()?;
            let center = match arc.center(points) {
                Ok(center) => center,
                Err(e) => {
                    log::warn!("Kreisbogen ohne Mittelpunkt: {}", e);
                    return None;
                }
            };
            let (corner, radius) = corner_from_center(center, start, end).ok()?;
            let mut joint = CurvedJoint::new(arc.start, arc.end, corner, radius);
            joint.auto = false;
            Some(Geometry::Curved(joint))
        }
        _ => None,
    }
}

/// Rät einen passenden Querschnitt für die Ziel-Art
pub(crate) fn morph_section(section: Section, kind: StructureKind) -> Section {
    let Some(diameter) = section.diameter() else {
        return section;
    };
    let thickness = section.thickness().unwrap_or(0.0);
    match kind {
        StructureKind::Beam => match section {
            Section::Beam(_) => section,
            _ => Section::Beam(BeamSection::Rectangular {
                width: diameter,
                height: diameter,
                thickness,
            }),
        },
        StructureKind::Reducer => match section {
            Section::Reducer { .. } => section,
            _ => Section::Reducer {
                initial_diameter: diameter,
                final_diameter: diameter,
                thickness,
            },
        },
        StructureKind::Support => Section::None,
        _ => Section::tube(diameter, thickness),
    }
}
