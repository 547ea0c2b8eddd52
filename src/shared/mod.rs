//! Geteilte Typen für modul-übergreifende Verträge.
//!
//! Enthält die Laufzeit-Optionen, die Editoren, PCF-Codec und Binary
//! gemeinsam nutzen.

pub mod options;

pub use options::KernelOptions;
pub use options::{CONFIG_FILE_NAME, DEFAULT_CURVATURE_RADIUS, SNAP_RADIUS};
