//! Parser für PCF-Dateien (Piping Component File).

use crate::core::structure::curved_joint::radius_from_geometry;
use crate::core::{
    CurvedJoint, Pipeline, PointId, Section, Structure, StructureKind, COINCIDENCE_DECIMALS,
};
use crate::shared::options::{DEFAULT_THICKNESS, PCF_UNIT_FACTOR};
use anyhow::{bail, Context, Result};
use glam::DVec3;

/// Parsed eine PCF-Datei (Millimeter) in eine Pipeline (Meter)
pub fn parse_pcf(content: &str) -> Result<Pipeline> {
    parse_pcf_scaled(content, PCF_UNIT_FACTOR)
}

/// Parsed eine PCF-Datei; alle Längen werden durch `unit_factor` geteilt.
///
/// Koinzidente Endpunkte werden danach zusammengeführt und der Import committed.
pub fn parse_pcf_scaled(content: &str, unit_factor: f64) -> Result<Pipeline> {
    if !(unit_factor.is_finite() && unit_factor > 0.0) {
        bail!("Ungültiger Einheiten-Faktor: {}", unit_factor);
    }

    let mut pipeline = Pipeline::new();
    let mut current: Option<SectionBlock> = None;
    let mut skipping = false;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim_end();
        if line.trim().is_empty() {
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        if indented {
            if skipping {
                continue;
            }
            let Some(block) = current.as_mut() else {
                log::warn!("Zeile {}: Attribut ohne Abschnitt ignoriert", line_no);
                continue;
            };
            block
                .read_attribute(line.trim(), unit_factor)
                .with_context(|| format!("Fehler in Zeile {}", line_no))?;
            continue;
        }

        if let Some(block) = current.take() {
            block.finish(&mut pipeline)?;
        }
        skipping = false;

        let (keyword, rest) = split_key_value(line);
        if let Some((kind, blind)) = section_kind(keyword) {
            current = Some(SectionBlock::new(kind, blind, keyword, line_no));
        } else if pipeline.structure_count() == 0 && !rest.is_empty() {
            pipeline
                .meta
                .header
                .push((keyword.to_string(), rest.to_string()));
        } else {
            log::warn!("Zeile {}: Unbekannter Abschnitt '{}' übersprungen", line_no, keyword);
            skipping = true;
        }
    }
    if let Some(block) = current.take() {
        block.finish(&mut pipeline)?;
    }

    let merged = pipeline.merge_coincident_points(COINCIDENCE_DECIMALS);
    pin_dangling_joints(&mut pipeline);
    pipeline.commit();

    log::info!(
        "PCF gelesen: {} Strukturen, {} Punkte ({} Endpunkte zusammengeführt)",
        pipeline.structure_count(),
        pipeline.point_count(),
        merged.removed_points
    );
    Ok(pipeline)
}

/// Krümmungen ohne Nachbarn auf beiden Seiten behalten ihre Geometrie aus der Datei
fn pin_dangling_joints(pipeline: &mut Pipeline) {
    let dangling: Vec<_> = pipeline
        .structures()
        .filter_map(|(id, s)| s.as_curved().map(|joint| (id, *joint)))
        .filter(|&(id, joint)| {
            joint.points().into_iter().any(|p| {
                pipeline
                    .structures_at_point(p)
                    .into_iter()
                    .filter(|other| *other != id)
                    .count()
                    != 1
            })
        })
        .map(|(id, _)| id)
        .collect();

    for id in dangling {
        if let Some(joint) = pipeline.structure_mut(id).and_then(Structure::as_curved_mut) {
            joint.auto = false;
        }
    }
}

fn split_key_value(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((key, value)) => (key, value.trim()),
        None => (line, ""),
    }
}

/// Abschnitts-Schlüsselwort → Art (+ Blindflansch-Markierung)
fn section_kind(keyword: &str) -> Option<(StructureKind, bool)> {
    if keyword == "FLANGE-BLIND" {
        return Some((StructureKind::Flange, true));
    }
    StructureKind::ALL
        .into_iter()
        .find(|kind| kind.pcf_keyword() == Some(keyword))
        .map(|kind| (kind, false))
}

/// Ein angefangener Abschnitt, bis zum nächsten Schlüsselwort
struct SectionBlock {
    kind: StructureKind,
    blind: bool,
    keyword: String,
    line_no: usize,
    end_points: Vec<(DVec3, Option<f64>)>,
    centre_point: Option<DVec3>,
    wall_thickness: Option<f64>,
}

impl SectionBlock {
    fn new(kind: StructureKind, blind: bool, keyword: &str, line_no: usize) -> Self {
        Self {
            kind,
            blind,
            keyword: keyword.to_string(),
            line_no,
            end_points: Vec::with_capacity(2),
            centre_point: None,
            wall_thickness: None,
        }
    }

    fn read_attribute(&mut self, line: &str, unit_factor: f64) -> Result<()> {
        let (key, rest) = split_key_value(line);
        match key {
            "END-POINT" => {
                let values = parse_numbers(rest)?;
                if values.len() < 3 {
                    bail!("END-POINT braucht mindestens 3 Koordinaten");
                }
                let position = DVec3::new(values[0], values[1], values[2]) / unit_factor;
                let diameter = values.get(3).map(|d| d / unit_factor);
                self.end_points.push((position, diameter));
            }
            "CENTRE-POINT" => {
                let values = parse_numbers(rest)?;
                if values.len() < 3 {
                    bail!("CENTRE-POINT braucht 3 Koordinaten");
                }
                self.centre_point = Some(DVec3::new(values[0], values[1], values[2]) / unit_factor);
            }
            "R2_WALL_THK" => {
                let value: f64 = rest
                    .split_whitespace()
                    .next()
                    .context("R2_WALL_THK ohne Wert")?
                    .parse()
                    .context("R2_WALL_THK ist keine Zahl")?;
                self.wall_thickness = Some(value / unit_factor);
            }
            other => log::debug!("Attribut '{}' in {} ignoriert", other, self.keyword),
        }
        Ok(())
    }

    fn finish(self, pipeline: &mut Pipeline) -> Result<()> {
        let [(start, start_diameter), (end, end_diameter)] = self.end_points[..] else {
            bail!(
                "{} in Zeile {}: 2 END-POINT erwartet, {} gefunden",
                self.keyword,
                self.line_no,
                self.end_points.len()
            );
        };
        let thickness = self.wall_thickness.unwrap_or(DEFAULT_THICKNESS);
        let diameter = start_diameter.or(end_diameter).unwrap_or(0.0);
        let section = if self.kind == StructureKind::Reducer {
            Section::Reducer {
                initial_diameter: diameter,
                final_diameter: end_diameter.unwrap_or(diameter),
                thickness,
            }
        } else {
            Section::tube(diameter, thickness)
        };

        let structure = if self.kind.is_curved() {
            let corner = self.centre_point.with_context(|| {
                format!("{} in Zeile {}: CENTRE-POINT fehlt", self.keyword, self.line_no)
            })?;
            let radius = match radius_from_geometry(start, corner, end) {
                Ok(radius) => radius,
                Err(e) => {
                    log::warn!(
                        "{} in Zeile {} übersprungen: {}",
                        self.keyword,
                        self.line_no,
                        e
                    );
                    return Ok(());
                }
            };
            let [a, b] = add_end_points(pipeline, start, end);
            Structure::curved(self.kind, CurvedJoint::new(a, b, corner, radius), section)
        } else {
            let [a, b] = add_end_points(pipeline, start, end);
            let mut structure = Structure::linear(self.kind, a, b, section);
            if self.blind {
                structure
                    .extra_info
                    .insert("blind".to_string(), serde_json::Value::Bool(true));
            }
            structure
        };

        pipeline.add_structure(structure);
        Ok(())
    }
}

fn add_end_points(pipeline: &mut Pipeline, start: DVec3, end: DVec3) -> [PointId; 2] {
    [pipeline.add_point(start), pipeline.add_point(end)]
}

fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .with_context(|| format!("'{}' ist keine Zahl", token))
        })
        .collect()
}
