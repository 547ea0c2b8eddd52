//! Spatial-Index (KD-Tree) für schnelle Punkt-Abfragen.

use glam::{DQuat, DVec3, EulerRot};
use indexmap::IndexMap;
use kiddo::{KdTree, SquaredEuclidean};

use crate::core::{PointArena, PointId};

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// ID des gefundenen Punkts
    pub point_id: PointId,
    /// Euklidische Distanz zum Suchpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index über allen Punkten einer Pipeline.
///
/// Der Baum speichert jede exakte Position nur einmal und arbeitet in einem
/// gedrehten Koordinatensystem: achsparallele Rohrnetze hätten sonst viele
/// identische Werte auf einer Achse, die der KD-Tree nicht aufteilen kann.
/// Distanzen sind gegenüber der Drehung invariant.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 3>,
    /// Punkt-IDs je Baum-Eintrag, in Einfüge-Reihenfolge
    buckets: Vec<Vec<PointId>>,
}

fn index_frame(position: DVec3) -> [f64; 3] {
    let rotated = DQuat::from_euler(EulerRot::XYZ, 0.318, 0.747, 1.129) * position;
    // -0.0 und 0.0 auf denselben Wert bringen
    [rotated.x + 0.0, rotated.y + 0.0, rotated.z + 0.0]
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 3]>::new()).into(),
            buckets: Vec::new(),
        }
    }

    /// Baut einen neuen Index aus der Punkt-Arena.
    pub fn from_points(points: &PointArena) -> Self {
        let mut slots: IndexMap<[u64; 3], usize> = IndexMap::new();
        let mut entries: Vec<[f64; 3]> = Vec::new();
        let mut buckets: Vec<Vec<PointId>> = Vec::new();

        for point in points.iter() {
            let key = [
                (point.position.x + 0.0).to_bits(),
                (point.position.y + 0.0).to_bits(),
                (point.position.z + 0.0).to_bits(),
            ];
            match slots.get(&key) {
                Some(&slot) => buckets[slot].push(point.id),
                None => {
                    slots.insert(key, entries.len());
                    entries.push(index_frame(point.position));
                    buckets.push(vec![point.id]);
                }
            }
        }

        let tree: KdTree<f64, 3> = (&entries).into();
        Self { tree, buckets }
    }

    /// Anzahl indexierter Punkte
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Findet den nächsten Punkt zur Position (bei exakt gleicher Lage den ältesten).
    pub fn nearest(&self, query: DVec3) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&index_frame(query));
        let point_id = *self.buckets.get(result.item as usize)?.first()?;

        Some(SpatialMatch {
            point_id,
            distance: result.distance.sqrt(),
        })
    }

    /// Findet alle Punkte innerhalb eines Radius, sortiert nach Distanz.
    pub fn within_radius(&self, query: DVec3, radius: f64) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() || radius.is_nan() {
            return Vec::new();
        }

        let mut results = self
            .tree
            .within::<SquaredEuclidean>(&index_frame(query), radius * radius)
            .into_iter()
            .filter_map(|entry| {
                let bucket = self.buckets.get(entry.item as usize)?;
                let distance = entry.distance.sqrt();
                Some(bucket.iter().map(move |&point_id| SpatialMatch {
                    point_id,
                    distance,
                }))
            })
            .flatten()
            .collect::<Vec<_>>();

        results.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.point_id.cmp(&b.point_id))
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_points() -> (PointArena, [PointId; 3]) {
        let mut points = PointArena::new();
        let a = points.insert(DVec3::new(0.0, 0.0, 0.0));
        let b = points.insert(DVec3::new(10.0, 0.0, 0.0));
        let c = points.insert(DVec3::new(4.0, 3.0, 0.0));
        (points, [a, b, c])
    }

    #[test]
    fn nearest_returns_expected_point() {
        let (points, [_, _, c]) = sample_points();
        let index = SpatialIndex::from_points(&points);
        let nearest = index
            .nearest(DVec3::new(3.9, 2.9, 0.0))
            .expect("Treffer erwartet");

        assert_eq!(nearest.point_id, c);
        assert!(nearest.distance < 0.2);
    }

    #[test]
    fn radius_query_returns_sorted_matches() {
        let (points, [a, _, c]) = sample_points();
        let index = SpatialIndex::from_points(&points);
        let matches = index.within_radius(DVec3::ZERO, 6.0);

        let ids: Vec<PointId> = matches.iter().map(|m| m.point_id).collect();
        assert_eq!(ids, vec![a, c]);
        assert_relative_eq!(matches[1].distance, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn coincident_points_share_one_entry() {
        let mut points = PointArena::new();
        let a = points.insert(DVec3::new(1.0, 2.0, 3.0));
        let b = points.insert(DVec3::new(1.0, 2.0, 3.0));
        let index = SpatialIndex::from_points(&points);

        assert_eq!(index.len(), 2);
        assert_eq!(index.nearest(DVec3::new(1.0, 2.0, 3.1)).unwrap().point_id, a);
        let ids: Vec<PointId> = index
            .within_radius(DVec3::new(1.0, 2.0, 3.0), 0.01)
            .into_iter()
            .map(|m| m.point_id)
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn planar_grid_is_indexable() {
        let mut points = PointArena::new();
        for i in 0..20 {
            for j in 0..20 {
                points.insert(DVec3::new(i as f64, j as f64, 0.0));
            }
        }
        let index = SpatialIndex::from_points(&points);

        let nearest = index.nearest(DVec3::new(7.1, 3.2, 0.0)).unwrap();
        assert_eq!(points.position(nearest.point_id), Some(DVec3::new(7.0, 3.0, 0.0)));
    }

    #[test]
    fn empty_index_has_no_entries() {
        let index = SpatialIndex::empty();

        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.nearest(DVec3::ZERO).is_none());
    }
}
