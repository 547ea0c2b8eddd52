//! PCF Import/Export (Piping Component File).
//!
//! Das Format besteht aus Kopfzeilen `SCHLÜSSEL WERT`, gefolgt von Abschnitten
//! (`PIPE`, `BEND`, `FLANGE`, ...) mit eingerückten Attributen (`END-POINT x y z d`,
//! `CENTRE-POINT x y z`, `R2_WALL_THK t`). Längen stehen in Millimetern.

pub mod parser;
pub mod writer;

pub use parser::{parse_pcf, parse_pcf_scaled};
pub use writer::{write_pcf, write_pcf_scaled};

use crate::core::Pipeline;
use anyhow::{Context, Result};
use std::path::Path;

/// Liest eine PCF-Datei; Längen werden durch `unit_factor` geteilt
pub fn load_pcf_file(path: &Path, unit_factor: f64) -> Result<Pipeline> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("PCF-Datei nicht lesbar: {}", path.display()))?;
    let pipeline = parse_pcf_scaled(&content, unit_factor)
        .with_context(|| format!("PCF-Datei fehlerhaft: {}", path.display()))?;
    log::info!("PCF geladen: {}", path.display());
    Ok(pipeline)
}

/// Schreibt eine Pipeline als PCF-Datei; Längen werden mit `unit_factor` multipliziert
pub fn save_pcf_file(pipeline: &Pipeline, path: &Path, unit_factor: f64) -> Result<()> {
    let content = write_pcf_scaled(pipeline, unit_factor)?;
    std::fs::write(path, content)
        .with_context(|| format!("PCF-Datei nicht schreibbar: {}", path.display()))?;
    log::info!("PCF gespeichert nach: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StructureKind;

    #[test]
    fn test_datei_speichern_und_laden() {
        let content = "UNITS-BORE MM\nPIPE\n    END-POINT 0 0 0 100\n    END-POINT 1000 0 0 100\n";
        let pipeline = parse_pcf(content).expect("gültiges PCF erwartet");
        let path = std::env::temp_dir().join(format!("pipeline_kernel_{}.pcf", std::process::id()));

        save_pcf_file(&pipeline, &path, 1000.0).expect("Speichern erwartet");
        let loaded = load_pcf_file(&path, 1000.0).expect("Laden erwartet");
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.structures_of_type(StructureKind::Pipe).len(), 1);
        assert_eq!(loaded.meta, pipeline.meta);
    }

    #[test]
    fn test_fehlende_datei_liefert_fehler() {
        let result = load_pcf_file(Path::new("/nicht/vorhanden.pcf"), 1000.0);
        assert!(result.is_err());
    }
}
