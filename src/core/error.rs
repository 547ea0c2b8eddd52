//! Fehlerarten der Geometrie-Berechnungen.

use super::PointId;
use thiserror::Error;

/// Fehler bei geometrischen Lösungen (Mittelpunkt, Ecke, Interpolation).
///
/// Editoren behandeln diese Fehler als No-Op und protokollieren sie;
/// nur die direkten Geometrie-APIs geben sie nach außen.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Singuläres Gleichungssystem (parallele Tangenten, kollineare Punkte, Nullvektor)
    #[error("degenerierte Geometrie: {0}")]
    DegenerateGeometry(&'static str),
    /// Referenzierter Punkt existiert nicht in der Arena
    #[error("Punkt {0} existiert nicht")]
    MissingPoint(PointId),
}

/// Ergebnis-Typ der Geometrie-APIs
pub type GeometryResult<T> = Result<T, GeometryError>;
