//! Gerade Strukturen zwischen zwei Punkten (Rohr, Flansch, Ventil, Reduzierung, Träger, ...).

use crate::core::{GeometryError, GeometryResult, PointArena, PointId, GEOMETRY_TOLERANCE};
use glam::DVec3;

/// Gerades Segment von `start` nach `end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearStructure {
    pub start: PointId,
    pub end: PointId,
}

impl LinearStructure {
    pub fn new(start: PointId, end: PointId) -> Self {
        Self { start, end }
    }

    pub fn points(&self) -> [PointId; 2] {
        [self.start, self.end]
    }

    /// Ersetzt `old` durch `new` in allen Rollen. Gibt `true` zurück, wenn ersetzt wurde.
    pub fn replace_point(&mut self, old: PointId, new: PointId) -> bool {
        let mut replaced = false;
        if self.start == old {
            self.start = new;
            replaced = true;
        }
        if self.end == old {
            self.end = new;
            replaced = true;
        }
        replaced
    }

    /// Der jeweils andere Endpunkt
    pub fn other_end(&self, point: PointId) -> Option<PointId> {
        if point == self.start {
            Some(self.end)
        } else if point == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    /// Start- und Endposition
    pub fn positions(&self, points: &PointArena) -> GeometryResult<(DVec3, DVec3)> {
        Ok((points.require(self.start)?, points.require(self.end)?))
    }

    /// Euklidische Länge
    pub fn arc_length(&self, points: &PointArena) -> GeometryResult<f64> {
        let (start, end) = self.positions(points)?;
        Ok(start.distance(end))
    }

    /// Einheitsvektor von `start` nach `end`
    pub fn direction(&self, points: &PointArena) -> GeometryResult<DVec3> {
        let (start, end) = self.positions(points)?;
        let delta = end - start;
        if delta.length() <= GEOMETRY_TOLERANCE {
            return Err(GeometryError::DegenerateGeometry("Segment ohne Länge"));
        }
        Ok(delta / delta.length())
    }

    /// Lineare Interpolation; `t` wird nicht geklemmt (Werte außerhalb [0,1] extrapolieren).
    pub fn interpolate(&self, points: &PointArena, t: f64) -> GeometryResult<DVec3> {
        let (start, end) = self.positions(points)?;
        Ok(lerp(start, end, t))
    }

    /// Richtung, in der die Struktur den Punkt `point` verlässt
    pub fn tangency_at(&self, points: &PointArena, point: PointId) -> Option<DVec3> {
        let other = self.other_end(point)?;
        let from = points.position(point)?;
        let to = points.position(other)?;
        (to - from).try_normalize()
    }
}

/// `start·(1−t) + end·t`: exakt `start` bei t=0 und exakt `end` bei t=1
pub fn lerp(start: DVec3, end: DVec3, t: f64) -> DVec3 {
    start * (1.0 - t) + end * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn arena_with(start: DVec3, end: DVec3) -> (PointArena, LinearStructure) {
        let mut points = PointArena::new();
        let a = points.insert(start);
        let b = points.insert(end);
        (points, LinearStructure::new(a, b))
    }

    #[test]
    fn interpolate_hits_endpoints_exactly() {
        let start = DVec3::new(0.1, 0.7, -3.3);
        let end = DVec3::new(0.3, 1.9, 12.123456789);
        let (points, line) = arena_with(start, end);

        assert_eq!(line.interpolate(&points, 0.0).unwrap(), start);
        assert_eq!(line.interpolate(&points, 1.0).unwrap(), end);
    }

    #[test]
    fn interpolate_extrapolates_outside_unit_interval() {
        let (points, line) = arena_with(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0));

        let beyond = line.interpolate(&points, 1.5).unwrap();
        let before = line.interpolate(&points, -0.5).unwrap();

        assert_relative_eq!(beyond.x, 3.0);
        assert_relative_eq!(before.x, -1.0);
    }

    #[test]
    fn arc_length_is_euclidean_distance() {
        let (points, line) = arena_with(DVec3::ZERO, DVec3::new(3.0, 4.0, 0.0));
        assert_relative_eq!(line.arc_length(&points).unwrap(), 5.0);
    }

    #[test]
    fn tangency_points_into_the_segment() {
        let (points, line) = arena_with(DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0));

        assert_eq!(line.tangency_at(&points, line.start), Some(DVec3::Z));
        assert_eq!(line.tangency_at(&points, line.end), Some(-DVec3::Z));
        assert_eq!(line.tangency_at(&points, PointId(99)), None);
    }

    #[test]
    fn zero_length_direction_is_degenerate() {
        let (points, line) = arena_with(DVec3::ONE, DVec3::ONE);
        assert!(matches!(
            line.direction(&points),
            Err(GeometryError::DegenerateGeometry(_))
        ));
    }
}
