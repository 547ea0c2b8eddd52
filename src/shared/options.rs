//! Zentrale Konfiguration des Pipeline-Kernels.
//!
//! `KernelOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use crate::core::Section;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Geometrie ───────────────────────────────────────────────────────

/// Nachkommastellen für den Koinzidenz-Test beim Zusammenführen von Punkten.
pub const COINCIDENCE_DECIMALS: u32 = crate::core::COINCIDENCE_DECIMALS;
/// Absolute Toleranz für Längen- und Winkelvergleiche.
pub const TOLERANCE: f64 = crate::core::GEOMETRY_TOLERANCE;

// ── Werkzeuge ───────────────────────────────────────────────────────

/// Snap-Radius (Meter): Anker rastet auf einen existierenden Punkt innerhalb dieses Radius ein.
pub const SNAP_RADIUS: f64 = 1e-3;
/// Dürfen Bögen an offenen Enden eingefügt werden?
pub const ALLOW_DANGLING_BENDS: bool = false;

// ── Querschnitt ─────────────────────────────────────────────────────

/// Standard-Außendurchmesser neuer Rohre (Meter).
pub const DEFAULT_DIAMETER: f64 = 0.1;
/// Standard-Wandstärke neuer Rohre (Meter).
pub const DEFAULT_THICKNESS: f64 = 0.005;
/// Standard-Krümmungsradius neuer Bögen (Meter).
pub const DEFAULT_CURVATURE_RADIUS: f64 = 0.3;

// ── PCF ─────────────────────────────────────────────────────────────

/// Umrechnung Dateieinheit → Meter (PCF: Millimeter).
pub const PCF_UNIT_FACTOR: f64 = 1000.0;

/// Dateiname der Optionen-Datei neben der Binary.
pub const CONFIG_FILE_NAME: &str = "pipeline_kernel.toml";

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Kernel-Optionen.
/// Wird als `pipeline_kernel.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KernelOptions {
    // ── Geometrie ───────────────────────────────────────────────
    /// Nachkommastellen des Koinzidenz-Tests
    pub coincidence_decimals: u32,
    /// Toleranz für Geometrie-Vergleiche
    pub tolerance: f64,

    // ── Werkzeuge ───────────────────────────────────────────────
    /// Snap-Radius in Metern
    pub snap_radius: f64,
    /// Bögen an offenen Enden erlauben
    pub allow_dangling_bends: bool,

    // ── Querschnitt ─────────────────────────────────────────────
    pub default_diameter: f64,
    pub default_thickness: f64,
    pub default_curvature_radius: f64,

    // ── PCF ─────────────────────────────────────────────────────
    /// Faktor Dateieinheit → Meter
    pub pcf_unit_factor: f64,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            coincidence_decimals: COINCIDENCE_DECIMALS,
            tolerance: TOLERANCE,

            snap_radius: SNAP_RADIUS,
            allow_dangling_bends: ALLOW_DANGLING_BENDS,

            default_diameter: DEFAULT_DIAMETER,
            default_thickness: DEFAULT_THICKNESS,
            default_curvature_radius: DEFAULT_CURVATURE_RADIUS,

            pcf_unit_factor: PCF_UNIT_FACTOR,
        }
    }
}

impl KernelOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| PathBuf::from("pipeline-kernel"))
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(CONFIG_FILE_NAME)
    }

    /// Rohrquerschnitt aus Standard-Durchmesser und -Wandstärke
    pub fn default_section(&self) -> Section {
        Section::tube(self.default_diameter, self.default_thickness)
    }
}
