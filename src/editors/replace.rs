//! Austausch selektierter gerader Strukturen gegen eine andere gerade Art.

use crate::core::{Pipeline, Section, Structure, StructureId, StructureKind};

/// Ersetzt jede selektierte gerade Struktur durch eine Struktur `kind` über denselben Punkten.
///
/// Die neuen Strukturen übernehmen den Platz in der Auswahl.
pub fn replace_structures(
    pipeline: &mut Pipeline,
    kind: StructureKind,
    section: Section,
) -> Vec<StructureId> {
    if !kind.is_linear() {
        log::debug!("Ersetzen durch {} nicht möglich", kind);
        return Vec::new();
    }

    let targets: Vec<(StructureId, Structure)> = pipeline
        .selected_structures()
        .iter()
        .filter_map(|id| pipeline.structure(*id).map(|s| (*id, s.clone())))
        .filter(|(_, s)| s.kind.is_linear())
        .collect();

    let mut replaced = Vec::with_capacity(targets.len());
    for (old_id, old) in targets {
        let mut structure = Structure::new(kind, old.geometry, section);
        structure.color = old.color;
        structure.tag = old.tag;
        structure.extra_info = old.extra_info;
        let Some(new_id) = pipeline.add_structure(structure) else {
            continue;
        };
        pipeline.remove_structure(old_id);
        replaced.push(new_id);
    }

    if !replaced.is_empty() {
        pipeline.select_structures(replaced.iter().copied(), crate::core::SelectionMode::Join);
        log::info!("{} Strukturen durch {} ersetzt", replaced.len(), kind);
    }
    replaced
}
