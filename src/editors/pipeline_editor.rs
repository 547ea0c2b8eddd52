//! Sequentielle Konstruktion ab einem Anker ("Schildkröten-Grafik").
//!
//! Jede `add_*`-Operation verlängert das Netz vom Anker aus um die aktuellen
//! Deltas und setzt den Anker auf den neuen Endpunkt. Bögen werden am Anker
//! eingefügt: existiert dort schon eine Krümmung, wird sie umgewandelt; ist der
//! Anker ein offenes Ende, entsteht ein kollabierter Platzhalter, den das nächste
//! Segment aufzieht.

use super::main_editor::{add_joint_at_point, get_point_tangency, recalculate_curvatures};
use super::morph::{morph_section, morph_structure};
use crate::core::{
    CurvedJoint, Pipeline, PointId, Section, Structure, StructureId, StructureKind,
};
use crate::shared::KernelOptions;
use glam::DVec3;

/// Anker: entweder ein existierender Punkt oder eine freie Position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Existierender Punkt der Pipeline
    ExistingPoint(PointId),
    /// Freie Position (Punkt wird beim nächsten Segment angelegt)
    NewPosition(DVec3),
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor::NewPosition(DVec3::ZERO)
    }
}

/// Rastet auf den nächsten Punkt innerhalb von `snap_radius` ein, sonst freie Position
pub fn snap_to_point(pipeline: &Pipeline, position: DVec3, snap_radius: f64) -> Anchor {
    match pipeline.nearest_point(position) {
        Some(hit) if hit.distance <= snap_radius => Anchor::ExistingPoint(hit.point_id),
        _ => Anchor::NewPosition(position),
    }
}

/// Editier-Sitzung mit Anker-Cursor über einer eigenen Pipeline
#[derive(Debug, Clone)]
pub struct PipelineEditor {
    pub pipeline: Pipeline,
    anchor: Anchor,
    /// Zuletzt bekannte Anker-Position, falls der Anker-Punkt wegfällt
    last_anchor_position: DVec3,
    /// Versatz des nächsten Segments relativ zum Anker
    pub deltas: DVec3,
    /// Querschnitt der nächsten Segmente
    pub section: Section,
    pub curvature_radius: f64,
    pub options: KernelOptions,
}

impl Default for PipelineEditor {
    fn default() -> Self {
        Self::new(KernelOptions::default())
    }
}

impl PipelineEditor {
    /// Erstellt eine leere Sitzung mit Anker im Ursprung
    pub fn new(options: KernelOptions) -> Self {
        Self::with_pipeline(Pipeline::new(), options)
    }

    /// Setzt die Sitzung auf eine bestehende Pipeline; der Anker steht auf dem letzten Punkt
    pub fn with_pipeline(pipeline: Pipeline, options: KernelOptions) -> Self {
        let anchor = pipeline
            .last_point()
            .map(Anchor::ExistingPoint)
            .unwrap_or_default();
        let mut editor = Self {
            pipeline,
            anchor: Anchor::default(),
            last_anchor_position: DVec3::ZERO,
            deltas: DVec3::ZERO,
            section: options.default_section(),
            curvature_radius: options.default_curvature_radius,
            options,
        };
        editor.place_anchor(anchor);
        editor
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Welt-Position des Ankers
    pub fn anchor_position(&self) -> DVec3 {
        match self.anchor {
            Anchor::ExistingPoint(id) => self
                .pipeline
                .position(id)
                .unwrap_or(self.last_anchor_position),
            Anchor::NewPosition(position) => position,
        }
    }

    fn place_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
        self.last_anchor_position = self.anchor_position();
    }

    /// Ersetzt einen verschwundenen Anker-Punkt (z.B. nach dem Zusammenführen)
    /// durch den Punkt an der zuletzt bekannten Position
    fn resolve_anchor(&mut self) {
        if let Anchor::ExistingPoint(id) = self.anchor {
            if !self.pipeline.points().contains(id) {
                let anchor =
                    snap_to_point(&self.pipeline, self.last_anchor_position, self.options.snap_radius);
                log::debug!("Anker-Punkt {} entfallen, weiter bei {:?}", id, anchor);
                self.anchor = anchor;
            }
        }
    }

    /// Setzt den Anker auf einen existierenden Punkt
    pub fn set_anchor_point(&mut self, point: PointId) -> bool {
        if !self.pipeline.points().contains(point) {
            log::debug!("Anker-Punkt {} existiert nicht", point);
            return false;
        }
        self.place_anchor(Anchor::ExistingPoint(point));
        true
    }

    /// Setzt den Anker auf eine Position (rastet auf nahe Punkte ein)
    pub fn set_anchor_position(&mut self, position: DVec3) -> Anchor {
        self.place_anchor(snap_to_point(&self.pipeline, position, self.options.snap_radius));
        self.anchor
    }

    /// Legt für einen freien Anker den Punkt an
    fn anchor_point(&mut self) -> PointId {
        self.resolve_anchor();
        match self.anchor {
            Anchor::ExistingPoint(id) => id,
            Anchor::NewPosition(position) => {
                let id = self.pipeline.add_point(position);
                self.place_anchor(Anchor::ExistingPoint(id));
                id
            }
        }
    }

    fn add_linear(&mut self, kind: StructureKind, section: Section) -> Option<StructureId> {
        if self.deltas.length() <= self.options.tolerance {
            log::debug!("Delta ohne Länge, kein {} angelegt", kind);
            return None;
        }
        let origin = self.anchor_point();
        let end = self.pipeline.add_point(self.anchor_position() + self.deltas);
        let id = self
            .pipeline
            .add_structure(Structure::linear(kind, origin, end, section))?;
        self.place_anchor(Anchor::ExistingPoint(end));
        recalculate_curvatures(&mut self.pipeline);
        log::debug!("{} {} von {} nach {}", kind, id, origin, end);
        Some(id)
    }

    pub fn add_pipe(&mut self) -> Option<StructureId> {
        self.add_linear(StructureKind::Pipe, self.section)
    }

    pub fn add_flange(&mut self) -> Option<StructureId> {
        self.add_linear(StructureKind::Flange, self.section)
    }

    pub fn add_valve(&mut self) -> Option<StructureId> {
        self.add_linear(StructureKind::Valve, self.section)
    }

    pub fn add_expansion_joint(&mut self) -> Option<StructureId> {
        self.add_linear(StructureKind::ExpansionJoint, self.section)
    }

    /// Träger mit dem aktuellen Trägerprofil (oder einem aus dem Durchmesser geratenen)
    pub fn add_beam(&mut self) -> Option<StructureId> {
        let section = morph_section(self.section, StructureKind::Beam);
        self.add_linear(StructureKind::Beam, section)
    }

    /// Übergang vom aktuellen auf `final_diameter`; folgende Segmente nutzen den neuen Durchmesser
    pub fn add_reducer(&mut self, final_diameter: f64) -> Option<StructureId> {
        let initial_diameter = self
            .section
            .diameter()
            .unwrap_or(self.options.default_diameter);
        let thickness = self
            .section
            .thickness()
            .unwrap_or(self.options.default_thickness);
        let section = Section::Reducer {
            initial_diameter,
            final_diameter,
            thickness,
        };
        let id = self.add_linear(StructureKind::Reducer, section)?;
        self.section = Section::tube(final_diameter, thickness);
        Some(id)
    }

    pub fn add_bend(&mut self) -> Option<StructureId> {
        self.add_joint(StructureKind::Bend)
    }

    pub fn add_elbow(&mut self) -> Option<StructureId> {
        self.add_joint(StructureKind::Elbow)
    }

    fn add_joint(&mut self, kind: StructureKind) -> Option<StructureId> {
        let radius = self.curvature_radius;
        if radius.is_nan() || radius <= 0.0 {
            log::debug!("Ungültiger Krümmungsradius: {}", radius);
            return None;
        }
        let point = self.anchor_point();

        let existing = self
            .pipeline
            .structures_at_point(point)
            .into_iter()
            .find(|id| {
                self.pipeline
                    .structure(*id)
                    .is_some_and(|s| s.as_curved().is_some())
            });
        if let Some(id) = existing {
            morph_structure(&mut self.pipeline, id, kind);
            if let Some(joint) = self
                .pipeline
                .structure_mut(id)
                .and_then(Structure::as_curved_mut)
            {
                joint.curvature_radius = radius;
            }
            recalculate_curvatures(&mut self.pipeline);
            log::debug!("Krümmung {} am Anker als {} übernommen", id, kind);
            return Some(id);
        }

        let tangencies = get_point_tangency(&self.pipeline, point, &[]).len();
        if tangencies >= 2 {
            let id = add_joint_at_point(&mut self.pipeline, point, kind, radius, false)?;
            recalculate_curvatures(&mut self.pipeline);
            return Some(id);
        }

        // Offene Bögen mit Hilfstangente: der Anker wandert ans Bogenende
        if tangencies == 1 && self.options.allow_dangling_bends {
            if let Some(id) = add_joint_at_point(&mut self.pipeline, point, kind, radius, true) {
                if let Some(end) = self
                    .pipeline
                    .structure(id)
                    .and_then(Structure::as_curved)
                    .map(|joint| joint.end)
                {
                    self.place_anchor(Anchor::ExistingPoint(end));
                }
                log::debug!("Offener {} {} an {}", kind, id, point);
                return Some(id);
            }
        }

        // Offenes Ende: kollabierter Platzhalter, das nächste Segment zieht ihn auf
        let position = self.anchor_position();
        let placeholder = self.pipeline.add_point(position);
        let joint = CurvedJoint::new(point, placeholder, position, radius);
        let section = Section::tube(
            self.section
                .diameter()
                .unwrap_or(self.options.default_diameter),
            self.section
                .thickness()
                .unwrap_or(self.options.default_thickness),
        );
        let id = self
            .pipeline
            .add_structure(Structure::curved(kind, joint, section))?;
        self.place_anchor(Anchor::ExistingPoint(placeholder));
        log::debug!("Platzhalter-{} {} an {}", kind, id, point);
        Some(id)
    }

    /// Bogen am Anker (falls dort ein Segment endet) gefolgt von einem Rohr
    pub fn add_bent_pipe(&mut self) -> Vec<StructureId> {
        let mut created = Vec::new();
        self.resolve_anchor();
        let has_neighbour = match self.anchor {
            Anchor::ExistingPoint(id) => !get_point_tangency(&self.pipeline, id, &[]).is_empty(),
            Anchor::NewPosition(_) => false,
        };
        if has_neighbour && self.deltas.length() > self.options.tolerance {
            created.extend(self.add_bend());
        }
        created.extend(self.add_pipe());
        created
    }

    /// Übernimmt den laufenden Schritt
    pub fn commit(&mut self) {
        self.pipeline.commit();
    }

    /// Verwirft den laufenden Schritt; der Anker fällt auf einen noch vorhandenen Punkt zurück
    pub fn dismiss(&mut self) {
        self.pipeline.dismiss();
        if let Anchor::ExistingPoint(id) = self.anchor {
            if !self.pipeline.points().contains(id) {
                let fallback = self
                    .pipeline
                    .last_point()
                    .map(Anchor::ExistingPoint)
                    .unwrap_or_default();
                self.place_anchor(fallback);
            }
        }
    }

    /// Leert die Pipeline; Anker zurück in den Ursprung
    pub fn reset(&mut self) {
        self.pipeline = Pipeline::new();
        self.place_anchor(Anchor::default());
        self.deltas = DVec3::ZERO;
        log::info!("Pipeline zurückgesetzt");
    }
}
