//! Pipeline-Kernel Library.
//! Geometrie- und Topologie-Kern für das Editieren von 3D-Rohrleitungsnetzen,
//! als Library exportiert für Tests, Binary und Wiederverwendung.

pub mod core;
pub mod editors;
pub mod pcf;
pub mod shared;

pub use core::{
    ArcStructure, BeamSection, CurvedJoint, Geometry, GeometryError, GeometryFamily,
    GeometryResult, LinearStructure, MergeResult, Pipeline, PipelineMeta, Point, PointArena,
    PointId, Section, SelectionMode, SpatialIndex, SpatialMatch, Structure, StructureId,
    StructureKind,
};
pub use editors::{Anchor, PipelineEditor};
pub use pcf::{load_pcf_file, parse_pcf, parse_pcf_scaled, save_pcf_file, write_pcf, write_pcf_scaled};
pub use shared::KernelOptions;
