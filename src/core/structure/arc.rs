//! Kreisbögen durch drei Punkte (Start, Bogenmitte, Ende).

use super::linear::lerp;
use crate::core::{GeometryError, GeometryResult, PointArena, PointId, GEOMETRY_TOLERANCE};
use glam::{DQuat, DVec3};

/// Kreisbogen; `mid` ist ein eigener Punkt auf dem Bogen, keine geteilte Punkt-ID
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcStructure {
    pub start: PointId,
    pub end: PointId,
    pub mid: DVec3,
}

/// Gelöste Kreisgeometrie eines Bogens
#[derive(Debug, Clone, Copy)]
struct Circle {
    center: DVec3,
    axis: DVec3,
    radius: f64,
    sweep: f64,
}

impl ArcStructure {
    pub fn new(start: PointId, end: PointId, mid: DVec3) -> Self {
        Self { start, end, mid }
    }

    /// Bogen, der bei `start_pos` mit Richtung `tangent` beginnt und bei `end_pos` endet.
    ///
    /// Liegt das Ende auf der Tangente, wird der Bogen zur Sehne (Mitte = Sehnenmitte).
    pub fn from_tangency(
        start: PointId,
        start_pos: DVec3,
        tangent: DVec3,
        end: PointId,
        end_pos: DVec3,
    ) -> Self {
        let chord = end_pos - start_pos;
        let chord_mid = (start_pos + end_pos) * 0.5;
        let Some(t) = tangent.try_normalize() else {
            return Self::new(start, end, chord_mid);
        };

        let along = chord.dot(t);
        let perp = chord - t * along;
        if perp.length() <= GEOMETRY_TOLERANCE {
            return Self::new(start, end, chord_mid);
        }
        let normal = perp / perp.length();

        let radius = chord.length_squared() / (2.0 * chord.dot(normal));
        let center = start_pos + normal * radius;
        let a = start_pos - center;
        let b = end_pos - center;
        let mid = match (a + b).try_normalize() {
            // Großer Bogen, wenn das Ende hinter dem Start liegt
            Some(bisector) if along < 0.0 => center - bisector * radius,
            Some(bisector) => center + bisector * radius,
            // Halbkreis
            None => center + t * radius,
        };
        Self::new(start, end, mid)
    }

    pub fn points(&self) -> [PointId; 2] {
        [self.start, self.end]
    }

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

    pub fn positions(&self, points: &PointArena) -> GeometryResult<(DVec3, DVec3)> {
        Ok((points.require(self.start)?, points.require(self.end)?))
    }

    /// Mittelpunkt des Umkreises von Start, Mitte und Ende
    pub fn center(&self, points: &PointArena) -> GeometryResult<DVec3> {
        let (start, end) = self.positions(points)?;
        circumcenter(start, self.mid, end)
    }

    pub fn radius(&self, points: &PointArena) -> GeometryResult<f64> {
        let (start, _) = self.positions(points)?;
        Ok(self.center(points)?.distance(start))
    }

    /// `true`, wenn Start, Mitte und Ende auf einer Geraden liegen
    pub fn is_straight(&self, points: &PointArena) -> GeometryResult<bool> {
        let (start, end) = self.positions(points)?;
        Ok(circumcenter(start, self.mid, end).is_err())
    }

    fn circle(&self, start: DVec3, end: DVec3) -> GeometryResult<Circle> {
        let center = circumcenter(start, self.mid, end)?;
        let a = start - center;
        let m = self.mid - center;
        let b = end - center;
        let axis = a
            .cross(m)
            .try_normalize()
            .or_else(|| m.cross(b).try_normalize())
            .ok_or(GeometryError::DegenerateGeometry("Bogen ohne Normale"))?;
        Ok(Circle {
            center,
            axis,
            radius: a.length(),
            sweep: a.angle_between(m) + m.angle_between(b),
        })
    }

    /// Bogenlänge `r·φ`; ein gerader Bogen hat die Sehnenlänge
    pub fn arc_length(&self, points: &PointArena) -> GeometryResult<f64> {
        let (start, end) = self.positions(points)?;
        match self.circle(start, end) {
            Ok(circle) => Ok(circle.radius * circle.sweep),
            Err(_) => Ok(start.distance(end)),
        }
    }

    /// Punkt auf dem Bogen beim Parameter `t` (0 = Start, 1 = Ende)
    pub fn interpolate(&self, points: &PointArena, t: f64) -> GeometryResult<DVec3> {
        let (start, end) = self.positions(points)?;
        match self.circle(start, end) {
            Ok(circle) => {
                let rotation = DQuat::from_axis_angle(circle.axis, circle.sweep * t);
                Ok(circle.center + rotation * (start - circle.center))
            }
            Err(_) => Ok(lerp(start, end, t)),
        }
    }

    /// Richtung, in der der Bogen den Punkt `point` verlässt
    pub fn tangency_at(&self, points: &PointArena, point: PointId) -> Option<DVec3> {
        let (start, end) = self.positions(points).ok()?;
        let circle = match self.circle(start, end) {
            Ok(circle) => circle,
            Err(_) => {
                return if point == self.start {
                    (end - start).try_normalize()
                } else if point == self.end {
                    (start - end).try_normalize()
                } else {
                    None
                };
            }
        };
        if point == self.start {
            circle.axis.cross(start - circle.center).try_normalize()
        } else if point == self.end {
            (-circle.axis.cross(end - circle.center)).try_normalize()
        } else {
            None
        }
    }
}

/// Umkreismittelpunkt über die Gram-Matrix der Kanten `mid−start` und `end−start`
pub fn circumcenter(start: DVec3, mid: DVec3, end: DVec3) -> GeometryResult<DVec3> {
    let v1 = mid - start;
    let v2 = end - start;
    let g11 = v1.dot(v1);
    let g12 = v1.dot(v2);
    let g22 = v2.dot(v2);
    let det = g11 * g22 - g12 * g12;
    if det <= GEOMETRY_TOLERANCE * g11 * g22 || det <= f64::EPSILON {
        return Err(GeometryError::DegenerateGeometry(
            "kollineare Punkte im Bogen",
        ));
    }
    let alpha = g22 * (g11 - g12) / (2.0 * det);
    let beta = g11 * (g22 - g12) / (2.0 * det);
    Ok(start + v1 * alpha + v2 * beta)
}
