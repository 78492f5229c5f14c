use std::path::PathBuf;

use crate::{
    catalog::{AssetCatalog, OverlayCategory},
    color::{COLOR_SCHEMES, ColorScheme},
    error::RemixResult,
    placement::Anchor,
};

/// The five canonical composition orderings. Every variant index maps onto
/// one of these; the per-shape differences (flicker, mirror, crop, grade
/// strength) are parameters of the shape, not separate pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionShape {
    /// Base grade plus the looped full-frame flicker overlay.
    GradeFlicker,
    /// Base grade only.
    Grade,
    /// Horizontal mirror plus a slight playback-rate change (audio tempo
    /// adjusted inversely).
    MirrorSpeed,
    /// Small edge crop rescaled back to the original dimensions, plus the
    /// flicker overlay.
    CropRescaleFlicker,
    /// Stronger saturation/contrast grade, no flicker.
    HighContrast,
}

impl CompositionShape {
    pub const ALL: [CompositionShape; 5] = [
        CompositionShape::GradeFlicker,
        CompositionShape::Grade,
        CompositionShape::MirrorSpeed,
        CompositionShape::CropRescaleFlicker,
        CompositionShape::HighContrast,
    ];

    pub fn for_variant(variant_index: usize) -> CompositionShape {
        Self::ALL[variant_index % Self::ALL.len()]
    }

    pub fn uses_flicker(self) -> bool {
        matches!(
            self,
            CompositionShape::GradeFlicker | CompositionShape::CropRescaleFlicker
        )
    }

    pub fn changes_speed(self) -> bool {
        self == CompositionShape::MirrorSpeed
    }

    /// Power-law falloff exponent for the gradient masks; tuned per shape so
    /// sibling variants do not share a byte-identical mask.
    pub fn mask_exponent(self) -> f32 {
        match self {
            CompositionShape::GradeFlicker => 0.50,
            CompositionShape::Grade => 0.52,
            CompositionShape::MirrorSpeed => 0.55,
            CompositionShape::CropRescaleFlicker => 0.50,
            CompositionShape::HighContrast => 0.48,
        }
    }
}

/// A sticker layer: which asset, where, and how large relative to the frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StickerPlacement {
    pub asset_path: PathBuf,
    pub anchor: Anchor,
    pub custom_xy: Option<(i64, i64)>,
    /// Rendered width as a fraction of frame width.
    pub width_frac: f32,
    /// 0.0 ..= 1.0
    pub opacity: f32,
    pub margin_px: u32,
}

/// Tuning for the looped flicker overlay bands.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FlickerSpec {
    pub clip_path: PathBuf,
    pub band_h: u32,
    pub brightness: f32,
    pub contrast: f32,
    pub opacity: f32,
}

/// Video/audio rate pair for the mirror+speed shape. The audio tempo is the
/// inverse of the video rate so total duration stays consistent without the
/// audio being re-pitched out of natural range.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SpeedSpec {
    pub video_rate: f32,
    pub audio_rate: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct MaskSpec {
    pub top_h: u32,
    pub bottom_h: u32,
    pub exponent: f32,
}

/// Grade applied to the primary stream, already specialized per shape.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GradeSpec {
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
}

/// Fully-derived rendering recipe for one (video, variant) pair. Pure
/// function of its inputs given fixed catalog contents; never shared across
/// jobs.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VariantRecipe {
    pub video_index: usize,
    pub variant_index: usize,
    pub width: u32,
    pub height: u32,
    pub shape: CompositionShape,
    pub scheme_index: usize,
    pub scheme: ColorScheme,
    pub sticker_set_index: usize,
    pub grade: GradeSpec,
    pub speed: Option<SpeedSpec>,
    /// Crop margin as a fraction of each edge, applied then rescaled back.
    pub crop_margin_frac: Option<f32>,
    pub flicker: Option<FlickerSpec>,
    pub masks: MaskSpec,
    pub stickers: Vec<StickerPlacement>,
}

/// One entry in the ordered composition plan. Later steps composite over
/// earlier ones.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum CompositionStep {
    Grade,
    Mirror,
    SpeedChange,
    CropRescale,
    FlickerOverlay,
    TopMask,
    BottomMask,
    Sticker(usize),
}

const FLICKER_BAND_FRAC: f32 = 0.28;
const MASK_TOP_FRAC: f32 = 0.32;
const MASK_BOTTOM_FRAC: f32 = 0.30;
const CROP_MARGIN_FRAC: f32 = 0.02;
const STICKER_MARGIN_PX: u32 = 15;

/// The fixed sticker-set rotation: file name (within the catalog sticker
/// dir), width fraction, anchor. Four layers per set, layered in order.
const STICKER_SETS: &[&[(&str, f32, Anchor)]] = &[
    &[
        ("banner_1.png", 0.17, Anchor::TopLeft),
        ("pattern_1.png", 0.13, Anchor::TopRight),
        ("bird_1.png", 0.11, Anchor::BottomLeft),
        ("flower_1.png", 0.12, Anchor::BottomRight),
    ],
    &[
        ("banner_2.png", 0.18, Anchor::TopCenter),
        ("fish_1.png", 0.13, Anchor::TopLeft),
        ("pattern_2.png", 0.12, Anchor::BottomRight),
        ("bird_2.png", 0.11, Anchor::BottomLeft),
    ],
    &[
        ("banner_3.png", 0.16, Anchor::TopRight),
        ("flower_2.png", 0.14, Anchor::TopLeft),
        ("fish_2.png", 0.12, Anchor::BottomLeft),
        ("pattern_3.png", 0.13, Anchor::BottomRight),
    ],
    &[
        ("banner_4.png", 0.18, Anchor::TopLeft),
        ("bird_1.png", 0.14, Anchor::TopRight),
        ("pattern_4.png", 0.12, Anchor::BottomLeft),
        ("flower_1.png", 0.13, Anchor::BottomRight),
    ],
    &[
        ("banner_5.png", 0.17, Anchor::TopCenter),
        ("pattern_1.png", 0.14, Anchor::TopLeft),
        ("fish_1.png", 0.12, Anchor::BottomRight),
        ("bird_2.png", 0.11, Anchor::BottomLeft),
    ],
];

pub fn sticker_set_count() -> usize {
    STICKER_SETS.len()
}

/// Derive the full recipe for one (video, variant) pair.
///
/// Selection is cyclic, not random: scheme index and sticker-set index are
/// `(video_index + variant_index) mod len`, so neighbors in the batch never
/// share a combination at the same variant slot and the same pair always
/// reproduces the same recipe.
pub fn build_recipe(
    video_index: usize,
    variant_index: usize,
    width: u32,
    height: u32,
    catalog: &AssetCatalog,
) -> RemixResult<VariantRecipe> {
    let shape = CompositionShape::for_variant(variant_index);
    let scheme_index = (video_index + variant_index) % COLOR_SCHEMES.len();
    let sticker_set_index = (video_index + variant_index) % STICKER_SETS.len();
    let scheme = COLOR_SCHEMES[scheme_index].clone();

    let grade = match shape {
        CompositionShape::GradeFlicker => GradeSpec {
            brightness: None,
            contrast: None,
            saturation: Some(0.92),
        },
        CompositionShape::Grade => GradeSpec {
            brightness: None,
            contrast: Some(1.05),
            saturation: Some(0.88),
        },
        CompositionShape::MirrorSpeed => GradeSpec {
            brightness: None,
            contrast: None,
            saturation: Some(0.90),
        },
        CompositionShape::CropRescaleFlicker => GradeSpec {
            brightness: None,
            contrast: Some(1.06),
            saturation: Some(0.93),
        },
        CompositionShape::HighContrast => GradeSpec {
            brightness: Some(0.02),
            contrast: Some(1.10),
            saturation: Some(0.95),
        },
    };

    let speed = shape.changes_speed().then_some(SpeedSpec {
        video_rate: 0.97,
        audio_rate: 1.03,
    });

    let crop_margin_frac =
        (shape == CompositionShape::CropRescaleFlicker).then_some(CROP_MARGIN_FRAC);

    // The flicker layer degrades to nothing when no overlay clip exists.
    let flicker = if shape.uses_flicker() {
        catalog
            .first_overlay(&[
                OverlayCategory::Sparkle,
                OverlayCategory::Particles,
                OverlayCategory::Light,
            ])
            .ok()
            .map(|clip_path| FlickerSpec {
                clip_path,
                band_h: frac_px(height, FLICKER_BAND_FRAC),
                brightness: 0.22,
                contrast: 1.30,
                opacity: if shape == CompositionShape::CropRescaleFlicker {
                    0.45
                } else {
                    0.50
                },
            })
    } else {
        None
    };

    let masks = MaskSpec {
        top_h: frac_px(height, MASK_TOP_FRAC),
        bottom_h: frac_px(height, MASK_BOTTOM_FRAC),
        exponent: shape.mask_exponent(),
    };

    let stickers = STICKER_SETS[sticker_set_index]
        .iter()
        .map(|(name, width_frac, anchor)| StickerPlacement {
            asset_path: catalog.sticker_path(name),
            anchor: *anchor,
            custom_xy: None,
            width_frac: *width_frac,
            opacity: 1.0,
            margin_px: STICKER_MARGIN_PX,
        })
        .collect();

    Ok(VariantRecipe {
        video_index,
        variant_index,
        width,
        height,
        shape,
        scheme_index,
        scheme,
        sticker_set_index,
        grade,
        speed,
        crop_margin_frac,
        flicker,
        masks,
        stickers,
    })
}

impl VariantRecipe {
    /// The ordered composition plan: base adjustments, then the flicker
    /// overlay, then the gradient masks, then each sticker in selection
    /// order (later stickers occlude earlier ones).
    pub fn steps(&self) -> Vec<CompositionStep> {
        let mut steps = Vec::new();

        if self.shape == CompositionShape::MirrorSpeed {
            steps.push(CompositionStep::Mirror);
        }
        if self.crop_margin_frac.is_some() {
            steps.push(CompositionStep::CropRescale);
        }
        steps.push(CompositionStep::Grade);
        if self.speed.is_some() {
            steps.push(CompositionStep::SpeedChange);
        }
        if self.flicker.is_some() {
            steps.push(CompositionStep::FlickerOverlay);
        }
        steps.push(CompositionStep::TopMask);
        steps.push(CompositionStep::BottomMask);
        for i in 0..self.stickers.len() {
            steps.push(CompositionStep::Sticker(i));
        }
        steps
    }
}

fn frac_px(dim: u32, frac: f32) -> u32 {
    (dim as f32 * frac) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AssetCatalog {
        // No files need to exist: recipe derivation only resolves paths.
        AssetCatalog::new("target/recipe_tests/assets")
    }

    #[test]
    fn recipe_is_deterministic() {
        let cat = catalog();
        let a = build_recipe(3, 2, 1080, 1920, &cat).unwrap();
        let b = build_recipe(3, 2, 1080, 1920, &cat).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn scheme_selection_cycles_without_repeats() {
        let cat = catalog();
        let mut seen = Vec::new();
        for variant in 0..5 {
            let r = build_recipe(7, variant, 1080, 1920, &cat).unwrap();
            assert_eq!(r.scheme_index, (7 + variant) % COLOR_SCHEMES.len());
            seen.push(r.scheme_index);
        }
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 5.min(COLOR_SCHEMES.len()));
    }

    #[test]
    fn neighbors_differ_at_the_same_variant_slot() {
        let cat = catalog();
        let a = build_recipe(0, 1, 1080, 1920, &cat).unwrap();
        let b = build_recipe(1, 1, 1080, 1920, &cat).unwrap();
        assert_ne!(a.scheme_index, b.scheme_index);
        assert_ne!(a.sticker_set_index, b.sticker_set_index);
    }

    #[test]
    fn variant_indices_map_to_the_five_shapes() {
        assert_eq!(
            CompositionShape::for_variant(0),
            CompositionShape::GradeFlicker
        );
        assert_eq!(CompositionShape::for_variant(2), CompositionShape::MirrorSpeed);
        assert_eq!(
            CompositionShape::for_variant(4),
            CompositionShape::HighContrast
        );
        assert_eq!(
            CompositionShape::for_variant(5),
            CompositionShape::GradeFlicker
        );
    }

    #[test]
    fn mirror_speed_pairs_inverse_audio_rate() {
        let cat = catalog();
        let r = build_recipe(0, 2, 1080, 1920, &cat).unwrap();
        let speed = r.speed.unwrap();
        assert!(speed.video_rate < 1.0);
        assert!(speed.audio_rate > 1.0);
        // Rates stay close to inverse so duration drift is bounded.
        assert!((speed.video_rate * speed.audio_rate - 1.0).abs() < 0.01);
    }

    #[test]
    fn flicker_degrades_when_catalog_has_no_overlays() {
        let cat = catalog();
        let r = build_recipe(0, 0, 1080, 1920, &cat).unwrap();
        assert_eq!(r.shape, CompositionShape::GradeFlicker);
        assert!(r.flicker.is_none());
    }

    #[test]
    fn steps_end_with_masks_then_stickers_in_order() {
        let cat = catalog();
        let r = build_recipe(0, 4, 1080, 1920, &cat).unwrap();
        let steps = r.steps();
        let n = steps.len();
        assert_eq!(steps[n - 6], CompositionStep::TopMask);
        assert_eq!(steps[n - 5], CompositionStep::BottomMask);
        assert_eq!(steps[n - 4], CompositionStep::Sticker(0));
        assert_eq!(steps[n - 1], CompositionStep::Sticker(3));
    }

    #[test]
    fn mask_exponents_stay_in_band() {
        for shape in CompositionShape::ALL {
            let e = shape.mask_exponent();
            assert!((0.48..=0.58).contains(&e));
        }
    }
}
