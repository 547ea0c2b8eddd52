//! Zusammenführen koinzidenter Punkte (gleiche Position auf N Nachkommastellen).

use super::Pipeline;
use crate::core::point::coincidence_key;
use crate::core::{PointId, StructureId};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet};

impl Pipeline {
    /// `true`, wenn eine Struktur beide Punkte referenziert.
    ///
    /// Solche Punkte werden nie zusammengeführt: eine kollabierte Krümmung
    /// behält so getrennte Start- und Endpunkte.
    pub fn shares_structure(&self, a: PointId, b: PointId) -> bool {
        self.structures
            .values()
            .any(|s| s.contains_point(a) && s.contains_point(b))
    }

    /// Zählt zusammenführbare Punkte, ohne sie zu entfernen.
    ///
    /// Gibt die Anzahl der Duplikate und der betroffenen Positionen zurück.
    pub fn count_coincident_points(&self, decimals: u32) -> (usize, usize) {
        let remap = self.plan_merge(decimals);
        let groups: IndexSet<PointId> = remap.values().copied().collect();
        (remap.len(), groups.len())
    }

    /// Führt alle koinzidenten Punkte zusammen.
    ///
    /// Der älteste Punkt einer Position überlebt, alle Referenzen werden auf ihn
    /// umgeleitet. Danach bleiben nur Punkte übrig, die noch eine Struktur
    /// referenziert. Mehrfache Anwendung ändert nichts mehr.
    pub fn merge_coincident_points(&mut self, decimals: u32) -> MergeResult {
        let remap = self.plan_merge(decimals);
        let mut result = MergeResult::default();

        if !remap.is_empty() {
            result.removed_points = remap.len();
            result.duplicate_groups = remap.values().copied().collect::<IndexSet<_>>().len();
            result.remapped_references = self.apply_remap(&remap);
            log::info!(
                "{} koinzidente Punkte in {} Positionen zusammengeführt, {} Referenzen umgeleitet",
                result.removed_points,
                result.duplicate_groups,
                result.remapped_references
            );
        }

        result.removed_orphans = self.remove_unreferenced_points();
        if result.removed_orphans > 0 {
            log::info!("{} unreferenzierte Punkte entfernt", result.removed_orphans);
        }
        result
    }

    /// Entfernt alle Punkte ohne referenzierende Struktur (auch aus der Auswahl)
    fn remove_unreferenced_points(&mut self) -> usize {
        let referenced: HashSet<PointId> = self
            .structures
            .values()
            .flat_map(|structure| structure.points())
            .collect();
        let before = self.points.len();
        if self.points.ids().all(|id| referenced.contains(&id)) {
            return 0;
        }

        self.touch();
        self.points.retain(|point| referenced.contains(&point.id));
        self.selected_points.retain(|id| referenced.contains(id));
        before - self.points.len()
    }

    /// Führt `duplicate` in `survivor` zusammen, sofern keine Struktur beide nutzt.
    ///
    /// Gibt die Anzahl umgeleiteter Referenzen zurück, `None` bei Konflikt
    /// oder fehlenden Punkten.
    pub fn merge_point_into(&mut self, duplicate: PointId, survivor: PointId) -> Option<usize> {
        if duplicate == survivor
            || !self.points.contains(duplicate)
            || !self.points.contains(survivor)
            || self.shares_structure(duplicate, survivor)
        {
            return None;
        }
        let remap = HashMap::from([(duplicate, survivor)]);
        Some(self.apply_remap(&remap))
    }

    /// Plant die Zusammenführung: Duplikat → Überlebender
    fn plan_merge(&self, decimals: u32) -> HashMap<PointId, PointId> {
        let mut grid: IndexMap<(i64, i64, i64), Vec<PointId>> = IndexMap::new();
        for point in self.points.iter() {
            grid.entry(coincidence_key(point.position, decimals))
                .or_default()
                .push(point.id);
        }

        // Strukturen je Punkt, wächst beim Planen mit den Zusammenführungen
        let mut owners: HashMap<PointId, IndexSet<StructureId>> = HashMap::new();
        for (id, structure) in &self.structures {
            for point in structure.points() {
                owners.entry(point).or_default().insert(*id);
            }
        }

        let mut remap: HashMap<PointId, PointId> = HashMap::new();
        for (_cell, ids) in grid {
            if ids.len() <= 1 {
                continue;
            }
            let mut survivors: Vec<PointId> = Vec::new();
            for id in ids {
                let own = owners.get(&id).cloned().unwrap_or_default();
                let target = survivors.iter().copied().find(|survivor| {
                    owners
                        .get(survivor)
                        .map_or(true, |theirs| theirs.is_disjoint(&own))
                });
                match target {
                    Some(survivor) => {
                        remap.insert(id, survivor);
                        owners.entry(survivor).or_default().extend(own);
                    }
                    None => survivors.push(id),
                }
            }
        }
        remap
    }

    /// Leitet Referenzen um, entfernt die Duplikate und passt die Auswahl an
    fn apply_remap(&mut self, remap: &HashMap<PointId, PointId>) -> usize {
        self.touch();
        let mut remapped_references = 0;
        for structure in self.structures.values_mut() {
            for point in structure.points() {
                if let Some(&survivor) = remap.get(&point) {
                    if structure.replace_point(point, survivor) {
                        remapped_references += 1;
                    }
                }
            }
        }

        for duplicate in remap.keys() {
            self.points.remove(*duplicate);
        }

        self.selected_points = self
            .selected_points
            .iter()
            .map(|id| remap.get(id).copied().unwrap_or(*id))
            .collect();

        remapped_references
    }
}

/// Ergebnis einer Punkt-Zusammenführung.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    /// Anzahl entfernter Duplikat-Punkte
    pub removed_points: usize,
    /// Anzahl umgeleiteter Struktur-Referenzen
    pub remapped_references: usize,
    /// Anzahl der Positionen mit Duplikaten
    pub duplicate_groups: usize,
    /// Anzahl entfernter Punkte ohne referenzierende Struktur
    pub removed_orphans: usize,
}

impl MergeResult {
    /// Prüft ob Duplikate gefunden und zusammengeführt wurden.
    pub fn had_duplicates(&self) -> bool {
        self.removed_points > 0
    }
}
