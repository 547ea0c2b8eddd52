//! Core-Domänentypen: Punkte, Strukturen, Pipeline, Editier-Sitzung, Spatial-Index.

pub mod error;
pub mod pipeline;
/// Core-Datenmodelle des Rohrnetzes
///
/// - Point / PointArena: geteilte 3D-Punkte mit stabiler ID
/// - Structure: Bauteil (gerade, gekrümmt, Bogen, Auflager) über diesen Punkten
/// - Section: Querschnitt eines Bauteils
pub mod point;
pub mod section;
pub mod selection;
pub mod session;
pub mod spatial;
pub mod structure;

pub use error::{GeometryError, GeometryResult};
pub use pipeline::{MergeResult, Pipeline, PipelineMeta};
pub use point::{coincidence_key, Point, PointArena, PointId};
pub use section::{BeamSection, Section};
pub use selection::SelectionMode;
pub use session::EditSession;
pub use spatial::{SpatialIndex, SpatialMatch};
pub use structure::{
    ArcStructure, CurvedJoint, Geometry, GeometryFamily, LinearStructure, Structure, StructureId,
    StructureKind,
};

/// Nachkommastellen für den Koinzidenz-Test zweier Punkte
pub const COINCIDENCE_DECIMALS: u32 = 6;

/// Absolute Toleranz für Längen und Winkel in Geometrie-Lösungen
pub const GEOMETRY_TOLERANCE: f64 = 1e-6;
