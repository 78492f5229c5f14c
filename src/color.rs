use crate::error::{RemixError, RemixResult};

/// Color grade parameters applied to the primary video stream.
///
/// Ranges follow the grading model: brightness and warmth are zero-centered,
/// contrast and saturation are centered on the neutral value 1.0.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorGrade {
    /// -1.0 ..= 1.0
    pub brightness: f32,
    /// 0.5 ..= 2.0
    pub contrast: f32,
    /// 0.0 ..= 2.0
    pub saturation: f32,
    /// -1.0 ..= 1.0
    pub warmth: f32,
    /// Named lookup-table preset, resolved by the execution engine.
    pub lut: Option<String>,
}

impl Default for ColorGrade {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            warmth: 0.0,
            lut: None,
        }
    }
}

impl ColorGrade {
    pub fn validate(&self) -> RemixResult<()> {
        if !(-1.0..=1.0).contains(&self.brightness) {
            return Err(RemixError::validation(format!(
                "brightness {} out of range [-1, 1]",
                self.brightness
            )));
        }
        if !(0.5..=2.0).contains(&self.contrast) {
            return Err(RemixError::validation(format!(
                "contrast {} out of range [0.5, 2]",
                self.contrast
            )));
        }
        if !(0.0..=2.0).contains(&self.saturation) {
            return Err(RemixError::validation(format!(
                "saturation {} out of range [0, 2]",
                self.saturation
            )));
        }
        if !(-1.0..=1.0).contains(&self.warmth) {
            return Err(RemixError::validation(format!(
                "warmth {} out of range [-1, 1]",
                self.warmth
            )));
        }
        Ok(())
    }
}

/// Per-channel shadow/midtone shifts fed to the engine's color balance stage,
/// plus the base color of the gradient masks.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ColorScheme {
    pub name: &'static str,
    /// (r, g, b) shadow shifts, each in -1.0..=1.0.
    pub shadows: (f32, f32, f32),
    /// (r, g, b) midtone shifts, each in -1.0..=1.0.
    pub midtones: (f32, f32, f32),
    /// Gradient mask base color.
    pub gradient_rgb: [u8; 3],
}

/// The fixed palette the cyclic variant selection rotates through.
pub const COLOR_SCHEMES: &[ColorScheme] = &[
    ColorScheme {
        name: "warm",
        shadows: (0.15, 0.08, -0.10),
        midtones: (0.10, 0.05, -0.08),
        gradient_rgb: [0x1a, 0x12, 0x10],
    },
    ColorScheme {
        name: "cool",
        shadows: (-0.05, 0.02, 0.12),
        midtones: (-0.04, 0.01, 0.08),
        gradient_rgb: [0x10, 0x14, 0x18],
    },
    ColorScheme {
        name: "vintage",
        shadows: (0.08, 0.05, -0.05),
        midtones: (0.06, 0.03, -0.04),
        gradient_rgb: [0x18, 0x14, 0x10],
    },
    ColorScheme {
        name: "fresh",
        shadows: (-0.02, 0.10, 0.02),
        midtones: (-0.01, 0.06, 0.01),
        gradient_rgb: [0x10, 0x18, 0x14],
    },
    ColorScheme {
        name: "golden",
        shadows: (0.12, 0.10, -0.08),
        midtones: (0.08, 0.06, -0.05),
        gradient_rgb: [0x16, 0x14, 0x10],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grade_is_neutral_and_valid() {
        let g = ColorGrade::default();
        assert!(g.validate().is_ok());
        assert_eq!(g.contrast, 1.0);
        assert_eq!(g.brightness, 0.0);
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        let g = ColorGrade {
            brightness: 1.5,
            ..ColorGrade::default()
        };
        assert!(g.validate().is_err());

        let g = ColorGrade {
            contrast: 0.2,
            ..ColorGrade::default()
        };
        assert!(g.validate().is_err());

        let g = ColorGrade {
            saturation: 2.5,
            ..ColorGrade::default()
        };
        assert!(g.validate().is_err());
    }

    #[test]
    fn palette_has_five_distinct_schemes() {
        assert_eq!(COLOR_SCHEMES.len(), 5);
        for (i, a) in COLOR_SCHEMES.iter().enumerate() {
            for b in &COLOR_SCHEMES[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }
}
