//! Punkte des Rohrnetzes: Identität über `PointId`, Koordinaten in der Punkt-Arena.

use super::{GeometryError, GeometryResult};
use glam::DVec3;
use indexmap::IndexMap;
use std::fmt;

/// Stabile Identität eines Punkts.
///
/// Gleichheit und Hashing laufen über die ID, nicht über die Koordinaten:
/// zwei Strukturen, die dieselbe `PointId` halten, teilen sich den Punkt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub u64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Ein Punkt im Rohrnetz (Koordinaten in Metern)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Identität des Punkts
    pub id: PointId,
    /// Position in Weltkoordinaten
    pub position: DVec3,
}

impl Point {
    /// Erstellt einen neuen Punkt
    pub fn new(id: PointId, position: DVec3) -> Self {
        Self { id, position }
    }
}

/// Quantisierter Koordinatenschlüssel für den Koinzidenz-Test.
///
/// Zwei Punkte sind zusammenführbar, wenn ihre auf `decimals` Nachkommastellen
/// gerundeten Koordinaten übereinstimmen.
pub fn coincidence_key(position: DVec3, decimals: u32) -> (i64, i64, i64) {
    let scale = 10f64.powi(decimals as i32);
    (
        (position.x * scale).round() as i64,
        (position.y * scale).round() as i64,
        (position.z * scale).round() as i64,
    )
}

/// Arena aller Punkte einer Pipeline.
///
/// Die Einfüge-Reihenfolge bleibt stabil (auch nach dem Entfernen einzelner Punkte),
/// IDs werden nie wiederverwendet.
#[derive(Debug, Clone)]
pub struct PointArena {
    points: IndexMap<PointId, Point>,
    next_id: u64,
}

impl Default for PointArena {
    fn default() -> Self {
        Self::new()
    }
}

impl PointArena {
    /// Erstellt eine leere Arena
    pub fn new() -> Self {
        Self {
            points: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Legt einen neuen Punkt an und gibt seine ID zurück
    pub fn insert(&mut self, position: DVec3) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        self.points.insert(id, Point::new(id, position));
        id
    }

    /// Entfernt einen Punkt (Reihenfolge der übrigen bleibt erhalten)
    pub fn remove(&mut self, id: PointId) -> Option<Point> {
        self.points.shift_remove(&id)
    }

    /// Behält nur die Punkte, für die `keep` true liefert
    pub fn retain(&mut self, mut keep: impl FnMut(&Point) -> bool) {
        self.points.retain(|_, point| keep(point));
    }

    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.get(&id)
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.points.contains_key(&id)
    }

    /// Position eines Punkts, falls vorhanden
    pub fn position(&self, id: PointId) -> Option<DVec3> {
        self.points.get(&id).map(|p| p.position)
    }

    /// Position eines Punkts oder `GeometryError::MissingPoint`
    pub fn require(&self, id: PointId) -> GeometryResult<DVec3> {
        self.position(id).ok_or(GeometryError::MissingPoint(id))
    }

    /// Setzt die Position eines Punkts. Gibt `false` zurück, wenn der Punkt fehlt.
    pub fn set_position(&mut self, id: PointId, position: DVec3) -> bool {
        match self.points.get_mut(&id) {
            Some(point) => {
                point.position = position;
                true
            }
            None => false,
        }
    }

    /// Iterator über alle Punkte in stabiler Reihenfolge
    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.values()
    }

    /// Iterator über alle Punkt-IDs in stabiler Reihenfolge
    pub fn ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.points.keys().copied()
    }

    /// Zuletzt hinzugefügter (noch vorhandener) Punkt
    pub fn last_id(&self) -> Option<PointId> {
        self.points.last().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Übernimmt den ID-Zähler einer anderen Arena, falls dieser weiter ist.
    ///
    /// Wird beim Zurückrollen eines Editierschritts benötigt, damit
    /// verworfene IDs nicht erneut vergeben werden.
    pub(crate) fn keep_id_counter_from(&mut self, other: &PointArena) {
        self.next_id = self.next_id.max(other.next_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut arena = PointArena::new();
        let a = arena.insert(DVec3::ZERO);
        arena.remove(a);
        let b = arena.insert(DVec3::ZERO);

        assert_ne!(a, b);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn order_is_stable_after_remove() {
        let mut arena = PointArena::new();
        let a = arena.insert(DVec3::X);
        let b = arena.insert(DVec3::Y);
        let c = arena.insert(DVec3::Z);
        arena.remove(b);

        let ids: Vec<PointId> = arena.ids().collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(arena.last_id(), Some(c));
    }

    #[test]
    fn coincidence_key_rounds_to_decimals() {
        let a = coincidence_key(DVec3::new(1.0000001, 2.0, -0.0), 6);
        let b = coincidence_key(DVec3::new(1.0, 2.0000004, 0.0), 6);
        let c = coincidence_key(DVec3::new(1.00001, 2.0, 0.0), 6);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn require_reports_missing_point() {
        let arena = PointArena::new();
        assert_eq!(
            arena.require(PointId(42)),
            Err(GeometryError::MissingPoint(PointId(42)))
        );
    }
}
