//! Querschnitts-Beschreibungen der Strukturen (alle Maße in Metern).

/// Querschnitt eines Trägers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BeamSection {
    /// Rechteckiges Hohlprofil
    Rectangular {
        width: f64,
        height: f64,
        thickness: f64,
    },
    /// Rundes Hohlprofil
    Circular { diameter: f64, thickness: f64 },
    /// I-Profil
    IBeam {
        height: f64,
        width: f64,
        web_thickness: f64,
        flange_thickness: f64,
    },
}

impl BeamSection {
    /// Äußere Höhe des Profils
    pub fn height(&self) -> f64 {
        match *self {
            BeamSection::Rectangular { height, .. } | BeamSection::IBeam { height, .. } => height,
            BeamSection::Circular { diameter, .. } => diameter,
        }
    }

    /// Äußere Breite des Profils
    pub fn width(&self) -> f64 {
        match *self {
            BeamSection::Rectangular { width, .. } | BeamSection::IBeam { width, .. } => width,
            BeamSection::Circular { diameter, .. } => diameter,
        }
    }

    /// Maßgebliche Wandstärke (beim I-Profil die Flanschdicke)
    pub fn thickness(&self) -> f64 {
        match *self {
            BeamSection::Rectangular { thickness, .. } | BeamSection::Circular { thickness, .. } => {
                thickness
            }
            BeamSection::IBeam {
                flange_thickness, ..
            } => flange_thickness,
        }
    }
}

/// Querschnitt einer Struktur
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Section {
    /// Kein Querschnitt (z.B. Auflager)
    #[default]
    None,
    /// Rohrquerschnitt (Außendurchmesser + Wandstärke)
    Tube { diameter: f64, thickness: f64 },
    /// Konzentrischer Übergang zwischen zwei Durchmessern
    Reducer {
        initial_diameter: f64,
        final_diameter: f64,
        thickness: f64,
    },
    /// Trägerprofil
    Beam(BeamSection),
}

impl Section {
    /// Kurzform für einen Rohrquerschnitt
    pub fn tube(diameter: f64, thickness: f64) -> Self {
        Section::Tube {
            diameter,
            thickness,
        }
    }

    /// Durchmesser am Start der Struktur (Träger: Profilhöhe)
    pub fn diameter(&self) -> Option<f64> {
        match *self {
            Section::None => None,
            Section::Tube { diameter, .. } => Some(diameter),
            Section::Reducer {
                initial_diameter, ..
            } => Some(initial_diameter),
            Section::Beam(beam) => Some(beam.height()),
        }
    }

    /// Durchmesser am Ende der Struktur
    pub fn final_diameter(&self) -> Option<f64> {
        match *self {
            Section::Reducer { final_diameter, .. } => Some(final_diameter),
            _ => self.diameter(),
        }
    }

    /// Wandstärke
    pub fn thickness(&self) -> Option<f64> {
        match *self {
            Section::None => None,
            Section::Tube { thickness, .. } | Section::Reducer { thickness, .. } => Some(thickness),
            Section::Beam(beam) => Some(beam.thickness()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reducer_reports_both_diameters() {
        let section = Section::Reducer {
            initial_diameter: 0.2,
            final_diameter: 0.1,
            thickness: 0.01,
        };

        assert_eq!(section.diameter(), Some(0.2));
        assert_eq!(section.final_diameter(), Some(0.1));
        assert_eq!(section.thickness(), Some(0.01));
    }

    #[test]
    fn beam_diameter_is_profile_height() {
        let section = Section::Beam(BeamSection::Rectangular {
            width: 0.1,
            height: 0.3,
            thickness: 0.01,
        });

        assert_eq!(section.diameter(), Some(0.3));
        assert_eq!(Section::None.diameter(), None);
    }
}
