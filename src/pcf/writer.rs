//! Writer für PCF-Dateien.

use crate::core::{Geometry, Pipeline, Structure};
use crate::shared::options::PCF_UNIT_FACTOR;
use anyhow::{bail, Result};
use glam::DVec3;
use std::fmt::Write;

/// Kopfzeilen, wenn die Pipeline keine eigenen mitbringt
const DEFAULT_HEADER: [(&str, &str); 6] = [
    ("ISOGEN-FILES", "ISOGEN.FLS"),
    ("UNITS-BORE", "MM"),
    ("UNITS-CO-ORDS", "MM"),
    ("UNITS-WEIGHT", "KGS"),
    ("UNITS-BOLT-DIA", "MM"),
    ("UNITS-BOLT-LENGTH", "MM"),
];

/// Schreibt eine Pipeline (Meter) als PCF (Millimeter)
pub fn write_pcf(pipeline: &Pipeline) -> Result<String> {
    write_pcf_scaled(pipeline, PCF_UNIT_FACTOR)
}

/// Schreibt eine Pipeline als PCF; alle Längen werden mit `unit_factor` multipliziert.
///
/// Arten ohne PCF-Schlüsselwort und kollabierte Krümmungen werden nicht geschrieben.
pub fn write_pcf_scaled(pipeline: &Pipeline, unit_factor: f64) -> Result<String> {
    if !(unit_factor.is_finite() && unit_factor > 0.0) {
        bail!("Ungültiger Einheiten-Faktor: {}", unit_factor);
    }
    let mut output = String::new();

    if pipeline.meta.header.is_empty() {
        for (key, value) in DEFAULT_HEADER {
            writeln!(output, "{} {}", key, value)?;
        }
    } else {
        for (key, value) in &pipeline.meta.header {
            writeln!(output, "{} {}", key, value)?;
        }
    }

    let mut written = 0usize;
    let mut skipped = 0usize;
    for (id, structure) in pipeline.structures() {
        let Some(keyword) = section_keyword(structure) else {
            skipped += 1;
            continue;
        };
        if structure.is_collapsed_joint(pipeline.points()) {
            log::debug!("Kollabierte Krümmung {} nicht geschrieben", id);
            skipped += 1;
            continue;
        }

        writeln!(output, "{}", keyword)?;
        write_structure(&mut output, pipeline, structure, unit_factor)?;
        written += 1;
    }

    log::info!(
        "PCF geschrieben: {} Strukturen ({} übersprungen)",
        written,
        skipped
    );
    Ok(output)
}

fn section_keyword(structure: &Structure) -> Option<&'static str> {
    let keyword = structure.kind.pcf_keyword()?;
    let blind = structure
        .extra_info
        .get("blind")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);
    if blind && keyword == "FLANGE" {
        Some("FLANGE-BLIND")
    } else {
        Some(keyword)
    }
}

fn write_structure(
    output: &mut String,
    pipeline: &Pipeline,
    structure: &Structure,
    unit_factor: f64,
) -> Result<()> {
    let points = pipeline.points();
    let (start, end) = match &structure.geometry {
        Geometry::Linear(line) => line.positions(points)?,
        Geometry::Curved(joint) => joint.positions(points)?,
        Geometry::Arc(arc) => arc.positions(points)?,
        Geometry::Point(_) => return Ok(()),
    };
    let start_diameter = structure.section.diameter().unwrap_or(0.0);
    let end_diameter = structure.section.final_diameter().unwrap_or(0.0);

    write_end_point(output, start, start_diameter, unit_factor)?;
    write_end_point(output, end, end_diameter, unit_factor)?;
    if let Some(joint) = structure.as_curved() {
        let corner = joint.corner * unit_factor;
        writeln!(
            output,
            "    CENTRE-POINT {} {} {}",
            format_value(corner.x),
            format_value(corner.y),
            format_value(corner.z)
        )?;
    }
    if let Some(thickness) = structure.section.thickness() {
        writeln!(
            output,
            "    R2_WALL_THK {}",
            format_value(thickness * unit_factor)
        )?;
    }
    Ok(())
}

fn write_end_point(output: &mut String, position: DVec3, diameter: f64, unit_factor: f64) -> Result<()> {
    let p = position * unit_factor;
    writeln!(
        output,
        "    END-POINT {} {} {} {}",
        format_value(p.x),
        format_value(p.y),
        format_value(p.z),
        format_value(diameter * unit_factor)
    )?;
    Ok(())
}

/// Vier Nachkommastellen, ohne negatives Vorzeichen bei Null
fn format_value(value: f64) -> String {
    let text = format!("{:.4}", value);
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}
