//! Krümmungen (Bogen, Winkel): Ecke + Krümmungsradius, optional automatisch nachgeführt.
//!
//! Geometrie einer Krümmung:
//! - `corner` ist der Schnittpunkt der beiden angrenzenden Tangenten
//! - `start`/`end` liegen im Abstand `r·cos(h)/sin(h)` von der Ecke auf den Tangenten,
//!   wobei `h` der halbe eingeschlossene Winkel ist
//! - der Mittelpunkt ergibt sich aus einem 3×3-Gleichungssystem (siehe [`solve_center`])

use crate::core::{GeometryError, GeometryResult, PointArena, PointId, GEOMETRY_TOLERANCE};
use glam::{DMat3, DQuat, DVec3};
use std::f64::consts::{FRAC_PI_2, PI};

/// Krümmung zwischen zwei geraden Nachbarn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvedJoint {
    /// Tangentenpunkt auf der Seite des ersten Nachbarn
    pub start: PointId,
    /// Tangentenpunkt auf der Seite des zweiten Nachbarn
    pub end: PointId,
    /// Schnittpunkt der Tangenten (eigene Koordinate, kein geteilter Punkt)
    pub corner: DVec3,
    pub curvature_radius: f64,
    /// `true` = Start/Ende folgen automatisch den Tangenten der Nachbarn
    pub auto: bool,
}

impl CurvedJoint {
    /// Erstellt eine automatische Krümmung
    pub fn new(start: PointId, end: PointId, corner: DVec3, curvature_radius: f64) -> Self {
        Self {
            start,
            end,
            corner,
            curvature_radius,
            auto: true,
        }
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

    /// `true`, wenn Start, Ecke und Ende zusammenfallen
    pub fn is_collapsed(&self, points: &PointArena) -> bool {
        match self.positions(points) {
            Ok((start, end)) => {
                start.distance(self.corner) <= GEOMETRY_TOLERANCE
                    && end.distance(self.corner) <= GEOMETRY_TOLERANCE
            }
            Err(_) => false,
        }
    }

    /// Mittelpunkt des Kreisbogens
    pub fn center(&self, points: &PointArena) -> GeometryResult<DVec3> {
        let (start, end) = self.positions(points)?;
        solve_center(start, self.corner, end)
    }

    /// Setzt Start und Ende auf die Tangenten `vec_a`/`vec_b` (Richtungen ab der Ecke).
    ///
    /// Schaltet die Krümmung in den Automatik-Modus.
    pub fn normalize_values_vector(
        &mut self,
        points: &mut PointArena,
        vec_a: DVec3,
        vec_b: DVec3,
    ) -> GeometryResult<()> {
        if self.curvature_radius <= 0.0 {
            return Err(GeometryError::DegenerateGeometry("Krümmungsradius <= 0"));
        }
        let a = vec_a
            .try_normalize()
            .ok_or(GeometryError::DegenerateGeometry("Tangente ohne Richtung"))?;
        let b = vec_b
            .try_normalize()
            .ok_or(GeometryError::DegenerateGeometry("Tangente ohne Richtung"))?;

        let half = half_angle(a, b);
        if !is_solvable_half_angle(half) {
            return Err(GeometryError::DegenerateGeometry(
                "Winkel von 0° oder 180° zwischen den Tangenten",
            ));
        }
        let distance = tangent_length(self.curvature_radius, half);

        points.require(self.start)?;
        points.require(self.end)?;
        points.set_position(self.start, self.corner + a * distance);
        points.set_position(self.end, self.corner + b * distance);
        self.auto = true;
        Ok(())
    }

    /// Berechnet die Ecke aus einem festen Mittelpunkt neu (manueller Modus).
    ///
    /// Der Krümmungsradius wird auf den Abstand Mittelpunkt→Start gesetzt.
    pub fn update_corner_from_center(
        &mut self,
        points: &PointArena,
        center: DVec3,
    ) -> GeometryResult<()> {
        let (start, end) = self.positions(points)?;
        let (corner, radius) = corner_from_center(center, start, end)?;
        self.corner = corner;
        self.curvature_radius = radius;
        self.auto = false;
        Ok(())
    }

    /// Lässt die Krümmung auf ihre Ecke zusammenfallen
    pub fn collapse(&self, points: &mut PointArena) -> GeometryResult<()> {
        points.require(self.start)?;
        points.require(self.end)?;
        points.set_position(self.start, self.corner);
        points.set_position(self.end, self.corner);
        Ok(())
    }

    /// Bogenlänge; eine kollabierte Krümmung hat Länge 0
    pub fn arc_length(&self, points: &PointArena) -> GeometryResult<f64> {
        if self.is_collapsed(points) {
            return Ok(0.0);
        }
        let (start, end) = self.positions(points)?;
        let u = (start - self.corner)
            .try_normalize()
            .ok_or(GeometryError::DegenerateGeometry("Start liegt auf der Ecke"))?;
        let v = (end - self.corner)
            .try_normalize()
            .ok_or(GeometryError::DegenerateGeometry("Ende liegt auf der Ecke"))?;
        let half = half_angle(u, v);
        Ok(self.curvature_radius * (PI - 2.0 * half))
    }

    /// Punkt auf dem Bogen beim Parameter `t` (Drehung um die Bogennormale)
    pub fn interpolate(&self, points: &PointArena, t: f64) -> GeometryResult<DVec3> {
        if self.is_collapsed(points) {
            return Err(GeometryError::DegenerateGeometry("kollabierte Krümmung"));
        }
        let (start, end) = self.positions(points)?;
        let center = solve_center(start, self.corner, end)?;
        let a = start - center;
        let b = end - center;
        let axis = a
            .cross(b)
            .try_normalize()
            .ok_or(GeometryError::DegenerateGeometry("Bogen ohne Normale"))?;
        let sweep = a.angle_between(b);
        Ok(center + DQuat::from_axis_angle(axis, sweep * t) * a)
    }

    /// Richtung, in der die Krümmung den Punkt `point` verlässt (zur Ecke hin)
    pub fn tangency_at(&self, points: &PointArena, point: PointId) -> Option<DVec3> {
        if self.is_collapsed(points) {
            return None;
        }
        if point != self.start && point != self.end {
            return None;
        }
        let from = points.position(point)?;
        (self.corner - from).try_normalize()
    }
}

/// Halber eingeschlossener Winkel zwischen zwei Einheitsvektoren: `asin(|a−b|/2)`
pub fn half_angle(vec_a: DVec3, vec_b: DVec3) -> f64 {
    ((vec_a - vec_b).length() * 0.5).clamp(0.0, 1.0).asin()
}

/// Ein Bogen ist nur für eingeschlossene Winkel echt zwischen 0° und 180° lösbar
pub fn is_solvable_half_angle(half: f64) -> bool {
    half > GEOMETRY_TOLERANCE && half < FRAC_PI_2 - GEOMETRY_TOLERANCE
}

/// Abstand Ecke→Tangentenpunkt: `r·cos(h)/sin(h)`
pub fn tangent_length(curvature_radius: f64, half: f64) -> f64 {
    curvature_radius * half.cos() / half.sin()
}

/// Löst `[u; v; n]·C = [u·start, v·end, n·start]` nach dem Mittelpunkt `C`.
///
/// `u`/`v` sind die Einheitsvektoren Ecke→Start und Ecke→Ende, `n = u×v`.
/// Parallele `u`/`v` ergeben ein singuläres System.
pub fn solve_center(start: DVec3, corner: DVec3, end: DVec3) -> GeometryResult<DVec3> {
    let u = (start - corner)
        .try_normalize()
        .ok_or(GeometryError::DegenerateGeometry("Start fällt mit der Ecke zusammen"))?;
    let v = (end - corner)
        .try_normalize()
        .ok_or(GeometryError::DegenerateGeometry("Ende fällt mit der Ecke zusammen"))?;
    let n = u.cross(v);
    if n.length() <= GEOMETRY_TOLERANCE {
        return Err(GeometryError::DegenerateGeometry(
            "parallele Tangenten an der Ecke",
        ));
    }

    let system = DMat3::from_cols(u, v, n).transpose();
    let rhs = DVec3::new(u.dot(start), v.dot(end), n.dot(start));
    Ok(system.inverse() * rhs)
}

/// Ecke und Radius aus Mittelpunkt und Tangentenpunkten.
///
/// Die Ecke liegt auf der Winkelhalbierenden im Abstand `r²·√(2/(a·b+r²))`
/// vom Mittelpunkt (`a`, `b` = Mittelpunkt→Start/Ende).
pub fn corner_from_center(center: DVec3, start: DVec3, end: DVec3) -> GeometryResult<(DVec3, f64)> {
    let a = start - center;
    let b = end - center;
    let radius = a.length();
    if radius <= GEOMETRY_TOLERANCE {
        return Err(GeometryError::DegenerateGeometry(
            "Mittelpunkt liegt auf dem Bogen",
        ));
    }
    let denominator = a.dot(b) + radius * radius;
    if denominator <= GEOMETRY_TOLERANCE * radius * radius {
        return Err(GeometryError::DegenerateGeometry(
            "Halbkreis: Ecke liegt im Unendlichen",
        ));
    }
    let bisector = (a + b)
        .try_normalize()
        .ok_or(GeometryError::DegenerateGeometry("keine Winkelhalbierende"))?;
    let distance = radius * radius * (2.0 / denominator).sqrt();
    Ok((center + bisector * distance, radius))
}

/// Krümmungsradius aus Ecke und Tangentenpunkten (z.B. beim Import)
pub fn radius_from_geometry(start: DVec3, corner: DVec3, end: DVec3) -> GeometryResult<f64> {
    let u = (start - corner)
        .try_normalize()
        .ok_or(GeometryError::DegenerateGeometry("Start fällt mit der Ecke zusammen"))?;
    let v = (end - corner)
        .try_normalize()
        .ok_or(GeometryError::DegenerateGeometry("Ende fällt mit der Ecke zusammen"))?;
    let half = half_angle(u, v);
    if !is_solvable_half_angle(half) {
        return Err(GeometryError::DegenerateGeometry(
            "Winkel von 0° oder 180° zwischen den Tangenten",
        ));
    }
    Ok(start.distance(corner) * half.tan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn joint_at(corner: DVec3, radius: f64) -> (PointArena, CurvedJoint) {
        let mut points = PointArena::new();
        let start = points.insert(corner);
        let end = points.insert(corner);
        (points, CurvedJoint::new(start, end, corner, radius))
    }

    #[test]
    fn normalize_right_angle_offsets_by_radius() {
        let (mut points, mut joint) = joint_at(DVec3::ZERO, 0.1);
        joint
            .normalize_values_vector(&mut points, -DVec3::X, DVec3::Y)
            .unwrap();

        let start = points.position(joint.start).unwrap();
        let end = points.position(joint.end).unwrap();
        assert_abs_diff_eq!(start.x, -0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(end.y, 0.1, epsilon = 1e-12);
        assert!(joint.auto);
    }

    #[test]
    fn normalized_joint_is_equidistant_from_center() {
        let corner = DVec3::new(1.0, -2.0, 0.5);
        let (mut points, mut joint) = joint_at(corner, 0.35);
        let vec_a = DVec3::new(1.0, 2.0, 3.0).normalize();
        let vec_b = DVec3::new(-2.0, 0.5, 1.0).normalize();
        joint
            .normalize_values_vector(&mut points, vec_a, vec_b)
            .unwrap();

        let center = joint.center(&points).unwrap();
        let (start, end) = joint.positions(&points).unwrap();
        assert_relative_eq!(center.distance(start), 0.35, epsilon = 1e-9);
        assert_relative_eq!(center.distance(end), 0.35, epsilon = 1e-9);
    }

    #[test]
    fn row_normalisation_order_does_not_change_center() {
        // Ungeteilte Zeilen (Ecke→Start/Ende ohne Normierung) liefern dieselbe Lösung
        let start = DVec3::new(0.3, 0.1, 0.0);
        let corner = DVec3::new(1.0, 0.0, 0.2);
        let end = DVec3::new(1.4, 0.9, 0.6);

        let u = start - corner;
        let v = end - corner;
        let n = u.cross(v);
        let raw = DMat3::from_cols(u, v, n).transpose().inverse()
            * DVec3::new(u.dot(start), v.dot(end), n.dot(start));

        let normalised = solve_center(start, corner, end).unwrap();
        assert_abs_diff_eq!(raw.distance(normalised), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn parallel_tangencies_are_degenerate() {
        let result = solve_center(DVec3::X, DVec3::ZERO, DVec3::X * 2.0);
        assert!(matches!(result, Err(GeometryError::DegenerateGeometry(_))));

        let (mut points, mut joint) = joint_at(DVec3::ZERO, 0.1);
        let straight = joint.normalize_values_vector(&mut points, -DVec3::X, DVec3::X);
        assert!(straight.is_err());
        assert!(joint.is_collapsed(&points));
    }

    #[test]
    fn update_corner_from_center_restores_corner() {
        let (mut points, mut joint) = joint_at(DVec3::ZERO, 0.2);
        joint
            .normalize_values_vector(&mut points, -DVec3::X, DVec3::new(1.0, 1.0, 0.0))
            .unwrap();
        let center = joint.center(&points).unwrap();

        let mut moved = joint;
        moved.corner = DVec3::new(5.0, 5.0, 5.0);
        moved.update_corner_from_center(&points, center).unwrap();

        assert_abs_diff_eq!(moved.corner.length(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(moved.curvature_radius, 0.2, epsilon = 1e-9);
        assert!(!moved.auto);
    }

    #[test]
    fn half_circle_corner_is_degenerate() {
        let result = corner_from_center(DVec3::ZERO, DVec3::X, -DVec3::X);
        assert!(matches!(result, Err(GeometryError::DegenerateGeometry(_))));
    }

    #[test]
    fn collapse_with_missing_point_reports_error_and_keeps_positions() {
        let (mut points, mut joint) = joint_at(DVec3::ZERO, 0.1);
        joint
            .normalize_values_vector(&mut points, -DVec3::X, DVec3::Y)
            .unwrap();
        let start_before = points.position(joint.start).unwrap();
        points.remove(joint.end);

        assert_eq!(
            joint.collapse(&mut points),
            Err(GeometryError::MissingPoint(joint.end))
        );
        assert_eq!(points.position(joint.start), Some(start_before));
    }

    #[test]
    fn collapsed_joint_has_zero_length() {
        let (points, joint) = joint_at(DVec3::new(1.0, 1.0, 1.0), 0.5);

        assert!(joint.is_collapsed(&points));
        assert_eq!(joint.arc_length(&points).unwrap(), 0.0);
        assert!(joint.interpolate(&points, 0.5).is_err());
        assert_eq!(joint.tangency_at(&points, joint.start), None);
    }

    #[test]
    fn quarter_bend_length_and_midpoint() {
        let (mut points, mut joint) = joint_at(DVec3::ZERO, 1.0);
        joint
            .normalize_values_vector(&mut points, -DVec3::X, DVec3::Y)
            .unwrap();

        assert_relative_eq!(
            joint.arc_length(&points).unwrap(),
            FRAC_PI_2,
            epsilon = 1e-12
        );

        let center = joint.center(&points).unwrap();
        let mid = joint.interpolate(&points, 0.5).unwrap();
        assert_relative_eq!(mid.distance(center), 1.0, epsilon = 1e-9);
        // Bogenmitte liegt auf der Winkelhalbierenden Richtung Ecke
        assert_relative_eq!(mid.x, -mid.y, epsilon = 1e-9);
        let at_start = joint.interpolate(&points, 0.0).unwrap();
        assert_abs_diff_eq!(
            at_start.distance(points.position(joint.start).unwrap()),
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn radius_from_geometry_inverts_normalisation() {
        let (mut points, mut joint) = joint_at(DVec3::new(2.0, 0.0, 0.0), 0.4);
        joint
            .normalize_values_vector(&mut points, DVec3::Y, DVec3::new(1.0, 0.0, 1.0))
            .unwrap();
        let (start, end) = joint.positions(&points).unwrap();

        let radius = radius_from_geometry(start, joint.corner, end).unwrap();
        assert_relative_eq!(radius, 0.4, epsilon = 1e-9);
    }
}
