//! Strukturen des Rohrnetzes: geschlossene Menge an Bauteil-Arten über geteilten Punkten.
//!
//! Eine Struktur besteht aus
//! - ihrer Art ([`StructureKind`]),
//! - der Geometrie-Familie samt Punkt-Referenzen ([`Geometry`]),
//! - dem Querschnitt ([`Section`]) und den Editor-Flags.

pub mod arc;
pub mod curved_joint;
pub mod linear;

pub use arc::ArcStructure;
pub use curved_joint::CurvedJoint;
pub use linear::LinearStructure;

use super::{GeometryResult, PointArena, PointId, Section};
use glam::DVec3;
use std::fmt;

/// Stabile Identität einer Struktur innerhalb einer Pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructureId(pub u64);

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Geometrie-Familie einer Struktur-Art
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryFamily {
    /// Gerades Segment (Start, Ende)
    Linear,
    /// Krümmung über Ecke + Radius
    Curved,
    /// Kreisbogen durch drei Punkte
    Arc,
    /// Einzelner Punkt
    Point,
}

/// Bauteil-Art
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureKind {
    Pipe,
    Flange,
    Valve,
    Reducer,
    ExpansionJoint,
    Beam,
    Bend,
    Elbow,
    ArcBend,
    Support,
}

impl StructureKind {
    /// Alle Arten in fester Reihenfolge
    pub const ALL: [StructureKind; 10] = [
        StructureKind::Pipe,
        StructureKind::Flange,
        StructureKind::Valve,
        StructureKind::Reducer,
        StructureKind::ExpansionJoint,
        StructureKind::Beam,
        StructureKind::Bend,
        StructureKind::Elbow,
        StructureKind::ArcBend,
        StructureKind::Support,
    ];

    pub fn family(self) -> GeometryFamily {
        match self {
            StructureKind::Pipe
            | StructureKind::Flange
            | StructureKind::Valve
            | StructureKind::Reducer
            | StructureKind::ExpansionJoint
            | StructureKind::Beam => GeometryFamily::Linear,
            StructureKind::Bend | StructureKind::Elbow => GeometryFamily::Curved,
            StructureKind::ArcBend => GeometryFamily::Arc,
            StructureKind::Support => GeometryFamily::Point,
        }
    }

    pub fn is_linear(self) -> bool {
        self.family() == GeometryFamily::Linear
    }

    pub fn is_curved(self) -> bool {
        self.family() == GeometryFamily::Curved
    }

    /// Anzeigename
    pub fn name(self) -> &'static str {
        match self {
            StructureKind::Pipe => "Pipe",
            StructureKind::Flange => "Flange",
            StructureKind::Valve => "Valve",
            StructureKind::Reducer => "Reducer",
            StructureKind::ExpansionJoint => "ExpansionJoint",
            StructureKind::Beam => "Beam",
            StructureKind::Bend => "Bend",
            StructureKind::Elbow => "Elbow",
            StructureKind::ArcBend => "ArcBend",
            StructureKind::Support => "Support",
        }
    }

    /// Abschnitts-Schlüsselwort im PCF-Format; `None` = wird nicht geschrieben
    pub fn pcf_keyword(self) -> Option<&'static str> {
        match self {
            StructureKind::Pipe => Some("PIPE"),
            StructureKind::Flange => Some("FLANGE"),
            StructureKind::Valve => Some("VALVE"),
            StructureKind::Reducer => Some("REDUCER-CONCENTRIC"),
            StructureKind::Bend => Some("BEND"),
            StructureKind::Elbow => Some("ELBOW"),
            StructureKind::ExpansionJoint
            | StructureKind::Beam
            | StructureKind::ArcBend
            | StructureKind::Support => None,
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometrie einer Struktur samt Punkt-Referenzen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Linear(LinearStructure),
    Curved(CurvedJoint),
    Arc(ArcStructure),
    Point(PointId),
}

impl Geometry {
    pub fn family(&self) -> GeometryFamily {
        match self {
            Geometry::Linear(_) => GeometryFamily::Linear,
            Geometry::Curved(_) => GeometryFamily::Curved,
            Geometry::Arc(_) => GeometryFamily::Arc,
            Geometry::Point(_) => GeometryFamily::Point,
        }
    }

    /// Referenzierte Punkte in Rollen-Reihenfolge
    pub fn points(&self) -> Vec<PointId> {
        match self {
            Geometry::Linear(line) => line.points().to_vec(),
            Geometry::Curved(joint) => joint.points().to_vec(),
            Geometry::Arc(arc) => arc.points().to_vec(),
            Geometry::Point(point) => vec![*point],
        }
    }

    pub fn replace_point(&mut self, old: PointId, new: PointId) -> bool {
        match self {
            Geometry::Linear(line) => line.replace_point(old, new),
            Geometry::Curved(joint) => joint.replace_point(old, new),
            Geometry::Arc(arc) => arc.replace_point(old, new),
            Geometry::Point(point) => {
                if *point == old {
                    *point = new;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn arc_length(&self, points: &PointArena) -> GeometryResult<f64> {
        match self {
            Geometry::Linear(line) => line.arc_length(points),
            Geometry::Curved(joint) => joint.arc_length(points),
            Geometry::Arc(arc) => arc.arc_length(points),
            Geometry::Point(_) => Ok(0.0),
        }
    }

    pub fn interpolate(&self, points: &PointArena, t: f64) -> GeometryResult<DVec3> {
        match self {
            Geometry::Linear(line) => line.interpolate(points, t),
            Geometry::Curved(joint) => joint.interpolate(points, t),
            Geometry::Arc(arc) => arc.interpolate(points, t),
            Geometry::Point(point) => points.require(*point),
        }
    }

    pub fn tangency_at(&self, points: &PointArena, point: PointId) -> Option<DVec3> {
        match self {
            Geometry::Linear(line) => line.tangency_at(points, point),
            Geometry::Curved(joint) => joint.tangency_at(points, point),
            Geometry::Arc(arc) => arc.tangency_at(points, point),
            Geometry::Point(_) => None,
        }
    }
}

/// Eine Struktur im Rohrnetz
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub kind: StructureKind,
    pub geometry: Geometry,
    pub section: Section,
    /// Synchron mit der Struktur-Selektion der Pipeline
    pub selected: bool,
    /// Im aktuellen Editierschritt hinzugefügt, noch nicht committed
    pub staged: bool,
    /// Optionale Anzeigefarbe (RGBA)
    pub color: Option<[f32; 4]>,
    pub tag: Option<String>,
    /// Offene Metadaten, vom Kernel nicht interpretiert
    pub extra_info: serde_json::Map<String, serde_json::Value>,
}

impl Structure {
    /// Erstellt eine Struktur; Art und Geometrie-Familie müssen zusammenpassen.
    pub fn new(kind: StructureKind, geometry: Geometry, section: Section) -> Self {
        debug_assert_eq!(kind.family(), geometry.family());
        Self {
            kind,
            geometry,
            section,
            selected: false,
            staged: false,
            color: None,
            tag: None,
            extra_info: serde_json::Map::new(),
        }
    }

    pub fn linear(kind: StructureKind, start: PointId, end: PointId, section: Section) -> Self {
        Self::new(
            kind,
            Geometry::Linear(LinearStructure::new(start, end)),
            section,
        )
    }

    pub fn curved(kind: StructureKind, joint: CurvedJoint, section: Section) -> Self {
        Self::new(kind, Geometry::Curved(joint), section)
    }

    pub fn arc(start: PointId, end: PointId, mid: DVec3, section: Section) -> Self {
        Self::new(
            StructureKind::ArcBend,
            Geometry::Arc(ArcStructure::new(start, end, mid)),
            section,
        )
    }

    pub fn support(point: PointId) -> Self {
        Self::new(StructureKind::Support, Geometry::Point(point), Section::None)
    }

    pub fn points(&self) -> Vec<PointId> {
        self.geometry.points()
    }

    pub fn contains_point(&self, point: PointId) -> bool {
        self.points().contains(&point)
    }

    pub fn replace_point(&mut self, old: PointId, new: PointId) -> bool {
        self.geometry.replace_point(old, new)
    }

    pub fn arc_length(&self, points: &PointArena) -> GeometryResult<f64> {
        self.geometry.arc_length(points)
    }

    pub fn interpolate(&self, points: &PointArena, t: f64) -> GeometryResult<DVec3> {
        self.geometry.interpolate(points, t)
    }

    pub fn tangency_at(&self, points: &PointArena, point: PointId) -> Option<DVec3> {
        self.geometry.tangency_at(points, point)
    }

    pub fn as_linear(&self) -> Option<&LinearStructure> {
        match &self.geometry {
            Geometry::Linear(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_curved(&self) -> Option<&CurvedJoint> {
        match &self.geometry {
            Geometry::Curved(joint) => Some(joint),
            _ => None,
        }
    }

    pub fn as_curved_mut(&mut self) -> Option<&mut CurvedJoint> {
        match &mut self.geometry {
            Geometry::Curved(joint) => Some(joint),
            _ => None,
        }
    }

    pub fn as_arc(&self) -> Option<&ArcStructure> {
        match &self.geometry {
            Geometry::Arc(arc) => Some(arc),
            _ => None,
        }
    }

    /// `true` für Krümmungen, die auf ihre Ecke zusammengefallen sind
    pub fn is_collapsed_joint(&self, points: &PointArena) -> bool {
        self.as_curved()
            .is_some_and(|joint| joint.is_collapsed(points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_families_and_keywords() {
        assert!(StructureKind::Pipe.is_linear());
        assert!(StructureKind::Elbow.is_curved());
        assert_eq!(StructureKind::ArcBend.family(), GeometryFamily::Arc);
        assert_eq!(StructureKind::Reducer.pcf_keyword(), Some("REDUCER-CONCENTRIC"));
        assert_eq!(StructureKind::Beam.pcf_keyword(), None);
    }

    #[test]
    fn replace_point_rewires_every_role() {
        let mut points = PointArena::new();
        let a = points.insert(DVec3::ZERO);
        let b = points.insert(DVec3::X);
        let c = points.insert(DVec3::Y);

        let mut pipe = Structure::linear(StructureKind::Pipe, a, b, Section::tube(0.1, 0.01));
        assert!(pipe.replace_point(b, c));
        assert!(!pipe.replace_point(b, c));
        assert_eq!(pipe.points(), vec![a, c]);

        let mut support = Structure::support(a);
        assert!(support.replace_point(a, b));
        assert_eq!(support.arc_length(&points).unwrap(), 0.0);
        assert_eq!(support.interpolate(&points, 0.3).unwrap(), DVec3::X);
    }

    #[test]
    fn collapsed_joint_flag() {
        let mut points = PointArena::new();
        let a = points.insert(DVec3::ONE);
        let b = points.insert(DVec3::ONE);
        let joint = CurvedJoint::new(a, b, DVec3::ONE, 0.2);
        let bend = Structure::curved(StructureKind::Bend, joint, Section::default());

        assert!(bend.is_collapsed_joint(&points));
        assert!(!Structure::support(a).is_collapsed_joint(&points));
    }
}
