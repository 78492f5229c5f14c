use std::sync::LazyLock;

use crate::color::ColorGrade;

/// Content-type tag a source video is classified as. Closed set; unknown
/// string tags fall back to [`ContentType::General`] at the lookup boundary.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    DigitalHuman,
    Handwriting,
    Emotional,
    Knowledge,
    Music,
    Gaming,
    Food,
    Travel,
    Fitness,
    Product,
    Health,
    General,
}

impl ContentType {
    pub const ALL: [ContentType; 12] = [
        ContentType::DigitalHuman,
        ContentType::Handwriting,
        ContentType::Emotional,
        ContentType::Knowledge,
        ContentType::Music,
        ContentType::Gaming,
        ContentType::Food,
        ContentType::Travel,
        ContentType::Fitness,
        ContentType::Product,
        ContentType::Health,
        ContentType::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::DigitalHuman => "digital_human",
            ContentType::Handwriting => "handwriting",
            ContentType::Emotional => "emotional",
            ContentType::Knowledge => "knowledge",
            ContentType::Music => "music",
            ContentType::Gaming => "gaming",
            ContentType::Food => "food",
            ContentType::Travel => "travel",
            ContentType::Fitness => "fitness",
            ContentType::Product => "product",
            ContentType::Health => "health",
            ContentType::General => "general",
        }
    }

    pub fn parse(tag: &str) -> Option<ContentType> {
        ContentType::ALL.into_iter().find(|ct| ct.as_str() == tag)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    VeryFast,
    Fast,
    Medium,
    Slow,
    VerySlow,
    Variable,
}

/// Canonical timing parameters for a pace class.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PaceParams {
    pub clip_min_sec: f32,
    pub clip_max_sec: f32,
    pub transition_sec: f32,
    pub cuts_per_minute: u32,
}

pub fn pace_params(pace: Pace) -> PaceParams {
    match pace {
        Pace::VeryFast => PaceParams {
            clip_min_sec: 0.5,
            clip_max_sec: 1.0,
            transition_sec: 0.1,
            cuts_per_minute: 60,
        },
        Pace::Fast => PaceParams {
            clip_min_sec: 1.0,
            clip_max_sec: 2.0,
            transition_sec: 0.2,
            cuts_per_minute: 30,
        },
        Pace::Medium => PaceParams {
            clip_min_sec: 3.0,
            clip_max_sec: 5.0,
            transition_sec: 0.3,
            cuts_per_minute: 15,
        },
        Pace::Slow => PaceParams {
            clip_min_sec: 5.0,
            clip_max_sec: 10.0,
            transition_sec: 0.5,
            cuts_per_minute: 8,
        },
        Pace::VerySlow => PaceParams {
            clip_min_sec: 10.0,
            clip_max_sec: 20.0,
            transition_sec: 1.0,
            cuts_per_minute: 4,
        },
        Pace::Variable => PaceParams {
            clip_min_sec: 2.0,
            clip_max_sec: 8.0,
            transition_sec: 0.4,
            cuts_per_minute: 12,
        },
    }
}

pub fn pace_label(pace: Pace) -> &'static str {
    match pace {
        Pace::VeryFast => "very fast (0.5-1s per cut)",
        Pace::Fast => "fast (1-2s per cut)",
        Pace::Medium => "medium (3-5s per cut)",
        Pace::Slow => "slow (5-10s per cut)",
        Pace::VerySlow => "very slow (10s+ per cut)",
        Pace::Variable => "variable",
    }
}

/// Multiplicative effect-intensity presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Light,
    Medium,
    Strong,
    Extreme,
}

impl Intensity {
    pub fn factor(self) -> f32 {
        match self {
            Intensity::Light => 0.5,
            Intensity::Medium => 1.0,
            Intensity::Strong => 1.5,
            Intensity::Extreme => 2.0,
        }
    }
}

/// Complete parameter bundle governing pacing, decoration density and color
/// treatment for one content-type category.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EditingStrategy {
    pub content_type: ContentType,
    pub name: &'static str,
    pub description: &'static str,

    pub pace: Pace,
    pub clip_duration_min: f32,
    pub clip_duration_max: f32,
    pub transition_duration: f32,

    pub sticker_count: u32,
    pub sticker_size_range: (u32, u32),
    pub mask_top_height: u32,
    pub mask_bottom_height: u32,
    pub particle_count: u32,
    pub border_enabled: bool,
    pub border_width: u32,

    pub transitions: &'static [&'static str],
    pub flash_enabled: bool,
    pub flash_type: &'static str,

    pub color: ColorGrade,

    pub beat_sync: bool,
    pub speed_adjust: f32,

    pub aspect_ratio: &'static str,
    pub blur_background: bool,
    pub pip_enabled: bool,
    pub ui_template: Option<&'static str>,
}

impl EditingStrategy {
    fn base(content_type: ContentType, name: &'static str, description: &'static str) -> Self {
        Self {
            content_type,
            name,
            description,
            pace: Pace::Medium,
            clip_duration_min: 3.0,
            clip_duration_max: 5.0,
            transition_duration: 0.3,
            sticker_count: 10,
            sticker_size_range: (60, 120),
            mask_top_height: 150,
            mask_bottom_height: 150,
            particle_count: 20,
            border_enabled: false,
            border_width: 0,
            transitions: &["fade"],
            flash_enabled: false,
            flash_type: "white",
            color: ColorGrade {
                brightness: 0.0,
                contrast: 1.0,
                saturation: 1.0,
                warmth: 0.0,
                lut: None,
            },
            beat_sync: false,
            speed_adjust: 1.0,
            aspect_ratio: "9:16",
            blur_background: false,
            pip_enabled: false,
            ui_template: None,
        }
    }
}

// General first; `strategy_for` falls back to the head of the table.
static STRATEGIES: LazyLock<Vec<EditingStrategy>> = LazyLock::new(|| {
    vec![
        EditingStrategy {
            pace: Pace::Medium,
            clip_duration_min: 3.0,
            clip_duration_max: 5.0,
            transition_duration: 0.4,
            sticker_count: 15,
            sticker_size_range: (60, 120),
            mask_top_height: 180,
            mask_bottom_height: 200,
            particle_count: 35,
            transitions: &["fade", "dissolve", "wipeleft"],
            color: ColorGrade {
                brightness: 0.02,
                contrast: 1.03,
                saturation: 1.05,
                ..ColorGrade::default()
            },
            ..EditingStrategy::base(
                ContentType::General,
                "general",
                "balanced defaults usable for most videos",
            )
        },
        EditingStrategy {
            pace: Pace::Slow,
            clip_duration_min: 5.0,
            clip_duration_max: 10.0,
            transition_duration: 0.5,
            sticker_count: 8,
            sticker_size_range: (40, 80),
            mask_top_height: 120,
            mask_bottom_height: 120,
            particle_count: 15,
            transitions: &["fade"],
            color: ColorGrade {
                brightness: 0.01,
                contrast: 1.02,
                ..ColorGrade::default()
            },
            ui_template: Some("follow_guide"),
            ..EditingStrategy::base(
                ContentType::DigitalHuman,
                "talking head",
                "clean and unobtrusive, keeps the speaker in focus",
            )
        },
        EditingStrategy {
            pace: Pace::Medium,
            clip_duration_min: 3.0,
            clip_duration_max: 5.0,
            transition_duration: 0.4,
            sticker_count: 20,
            sticker_size_range: (80, 150),
            mask_top_height: 220,
            mask_bottom_height: 240,
            particle_count: 50,
            border_enabled: true,
            border_width: 25,
            transitions: &["wipeleft", "wiperight", "dissolve"],
            color: ColorGrade {
                brightness: 0.03,
                contrast: 1.05,
                saturation: 1.1,
                ..ColorGrade::default()
            },
            ..EditingStrategy::base(
                ContentType::Handwriting,
                "handwriting",
                "heavily decorated, large sticker coverage",
            )
        },
        EditingStrategy {
            pace: Pace::Variable,
            clip_duration_min: 2.0,
            clip_duration_max: 8.0,
            transition_duration: 0.5,
            sticker_count: 15,
            sticker_size_range: (60, 120),
            mask_top_height: 200,
            mask_bottom_height: 200,
            particle_count: 40,
            transitions: &["fadeblack", "fadewhite", "circlecrop"],
            flash_enabled: true,
            color: ColorGrade {
                brightness: 0.02,
                contrast: 1.05,
                saturation: 1.08,
                ..ColorGrade::default()
            },
            ..EditingStrategy::base(
                ContentType::Emotional,
                "emotional",
                "cinematic mood with varied rhythm",
            )
        },
        EditingStrategy {
            pace: Pace::Medium,
            clip_duration_min: 4.0,
            clip_duration_max: 8.0,
            transition_duration: 0.3,
            sticker_count: 6,
            sticker_size_range: (40, 80),
            mask_top_height: 100,
            mask_bottom_height: 100,
            particle_count: 10,
            transitions: &["slideleft", "slideright"],
            color: ColorGrade {
                brightness: 0.02,
                contrast: 1.03,
                ..ColorGrade::default()
            },
            speed_adjust: 1.1,
            ui_template: Some("progress_bar"),
            ..EditingStrategy::base(
                ContentType::Knowledge,
                "knowledge",
                "clear and structured, easy to follow",
            )
        },
        EditingStrategy {
            pace: Pace::VeryFast,
            clip_duration_min: 0.5,
            clip_duration_max: 2.0,
            transition_duration: 0.15,
            sticker_count: 10,
            sticker_size_range: (60, 100),
            mask_top_height: 150,
            mask_bottom_height: 150,
            particle_count: 60,
            transitions: &["fade", "pixelize", "radial"],
            flash_enabled: true,
            color: ColorGrade {
                contrast: 1.1,
                saturation: 1.2,
                ..ColorGrade::default()
            },
            beat_sync: true,
            ui_template: Some("music_player"),
            ..EditingStrategy::base(
                ContentType::Music,
                "music",
                "beat-driven cuts with strong visual punch",
            )
        },
        EditingStrategy {
            pace: Pace::Fast,
            clip_duration_min: 1.0,
            clip_duration_max: 3.0,
            transition_duration: 0.2,
            sticker_count: 12,
            sticker_size_range: (60, 120),
            mask_top_height: 100,
            mask_bottom_height: 150,
            particle_count: 30,
            transitions: &["fade", "pixelize"],
            color: ColorGrade {
                contrast: 1.08,
                saturation: 1.15,
                ..ColorGrade::default()
            },
            ui_template: Some("rec_indicator"),
            ..EditingStrategy::base(
                ContentType::Gaming,
                "gaming",
                "high energy, playful, stream-like",
            )
        },
        EditingStrategy {
            pace: Pace::Slow,
            clip_duration_min: 2.0,
            clip_duration_max: 5.0,
            transition_duration: 0.5,
            sticker_count: 5,
            sticker_size_range: (40, 80),
            mask_top_height: 80,
            mask_bottom_height: 80,
            particle_count: 10,
            transitions: &["fade", "dissolve"],
            color: ColorGrade {
                warmth: 0.1,
                saturation: 1.05,
                ..ColorGrade::default()
            },
            ..EditingStrategy::base(
                ContentType::Food,
                "food",
                "immersive and warm, sensory focus",
            )
        },
        EditingStrategy {
            pace: Pace::Medium,
            clip_duration_min: 2.0,
            clip_duration_max: 5.0,
            transition_duration: 0.4,
            sticker_count: 8,
            sticker_size_range: (50, 100),
            mask_top_height: 100,
            mask_bottom_height: 100,
            particle_count: 20,
            transitions: &["dissolve", "fade"],
            color: ColorGrade {
                lut: Some("cinematic".to_string()),
                ..ColorGrade::default()
            },
            aspect_ratio: "2.35:1",
            ..EditingStrategy::base(
                ContentType::Travel,
                "travel",
                "cinematic scenery with a story arc",
            )
        },
        EditingStrategy {
            pace: Pace::Fast,
            clip_duration_min: 0.5,
            clip_duration_max: 2.0,
            transition_duration: 0.2,
            sticker_count: 8,
            sticker_size_range: (50, 100),
            mask_top_height: 120,
            mask_bottom_height: 120,
            particle_count: 35,
            transitions: &["fade"],
            flash_enabled: true,
            color: ColorGrade {
                contrast: 1.1,
                saturation: 1.1,
                ..ColorGrade::default()
            },
            beat_sync: true,
            ..EditingStrategy::base(
                ContentType::Fitness,
                "fitness",
                "high energy and motivational",
            )
        },
        EditingStrategy {
            pace: Pace::Medium,
            clip_duration_min: 2.0,
            clip_duration_max: 4.0,
            transition_duration: 0.3,
            sticker_count: 5,
            sticker_size_range: (40, 80),
            mask_top_height: 80,
            mask_bottom_height: 100,
            particle_count: 10,
            transitions: &["slideleft", "slideright", "fade"],
            color: ColorGrade {
                brightness: 0.02,
                ..ColorGrade::default()
            },
            blur_background: true,
            ..EditingStrategy::base(
                ContentType::Product,
                "product",
                "showcase-first, clean and professional",
            )
        },
        EditingStrategy {
            pace: Pace::Slow,
            clip_duration_min: 4.0,
            clip_duration_max: 8.0,
            transition_duration: 0.5,
            sticker_count: 12,
            sticker_size_range: (60, 110),
            mask_top_height: 180,
            mask_bottom_height: 200,
            particle_count: 30,
            transitions: &["fade", "dissolve"],
            color: ColorGrade {
                brightness: 0.02,
                saturation: 1.05,
                ..ColorGrade::default()
            },
            ..EditingStrategy::base(
                ContentType::Health,
                "health",
                "calm and natural, trust-building",
            )
        },
    ]
});

/// Total lookup: every content type resolves to a strategy; the table always
/// carries a `general` entry that unknown types fall back to.
pub fn strategy_for(content_type: ContentType) -> &'static EditingStrategy {
    let table = &*STRATEGIES;
    table
        .iter()
        .find(|s| s.content_type == content_type)
        .unwrap_or(&table[0])
}

/// String-tag adapter for the external boundary; unrecognized tags resolve to
/// the `general` strategy.
pub fn strategy_by_name(tag: &str) -> &'static EditingStrategy {
    match ContentType::parse(tag) {
        Some(ct) => strategy_for(ct),
        None => strategy_for(ContentType::General),
    }
}

pub fn all_strategies() -> &'static [EditingStrategy] {
    &STRATEGIES
}

/// Derive a new strategy with decoration density and grade scaled by the
/// intensity factor. Integer fields truncate after multiplication.
/// Zero-centered grade fields (brightness, warmth) scale around 0;
/// neutral-centered fields (contrast, saturation) scale around 1.0.
pub fn scale_intensity(strategy: &EditingStrategy, intensity: Intensity) -> EditingStrategy {
    let f = intensity.factor();
    let scale_u32 = |v: u32| (v as f32 * f) as u32;

    EditingStrategy {
        sticker_count: scale_u32(strategy.sticker_count),
        mask_top_height: scale_u32(strategy.mask_top_height),
        mask_bottom_height: scale_u32(strategy.mask_bottom_height),
        particle_count: scale_u32(strategy.particle_count),
        border_width: scale_u32(strategy.border_width),
        color: ColorGrade {
            brightness: strategy.color.brightness * f,
            contrast: 1.0 + (strategy.color.contrast - 1.0) * f,
            saturation: 1.0 + (strategy.color.saturation - 1.0) * f,
            warmth: strategy.color.warmth * f,
            lut: strategy.color.lut.clone(),
        },
        ..strategy.clone()
    }
}

/// Human-readable multi-line rendering of a strategy; deterministic for a
/// given strategy value.
pub fn describe(strategy: &EditingStrategy) -> String {
    let mut lines = vec![
        format!("strategy: {}", strategy.name),
        format!("description: {}", strategy.description),
        format!("pace: {}", pace_label(strategy.pace)),
        format!(
            "stickers: {} ({}-{} px)",
            strategy.sticker_count, strategy.sticker_size_range.0, strategy.sticker_size_range.1
        ),
        format!(
            "masks: top {} px / bottom {} px",
            strategy.mask_top_height, strategy.mask_bottom_height
        ),
        format!("particles: {}", strategy.particle_count),
        format!("transitions: {}", strategy.transitions.join(", ")),
        format!(
            "grade: brightness {:+.0}%, contrast {:.0}%, saturation {:.0}%",
            strategy.color.brightness * 100.0,
            strategy.color.contrast * 100.0,
            strategy.color.saturation * 100.0
        ),
    ];

    if strategy.beat_sync {
        lines.push("beat sync: on".to_string());
    }
    if strategy.flash_enabled {
        lines.push(format!("flash: {}", strategy.flash_type));
    }
    if let Some(ui) = strategy.ui_template {
        lines.push(format!("ui template: {ui}"));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_total_over_the_enum() {
        for ct in ContentType::ALL {
            let s = strategy_for(ct);
            assert_eq!(s.content_type, ct);
            assert!(s.color.validate().is_ok());
        }
    }

    #[test]
    fn unknown_tag_falls_back_to_general() {
        assert_eq!(
            strategy_by_name("definitely_not_a_type").content_type,
            ContentType::General
        );
        assert_eq!(strategy_by_name("music").content_type, ContentType::Music);
    }

    #[test]
    fn intensity_medium_is_identity() {
        let s = strategy_for(ContentType::Handwriting);
        let scaled = scale_intensity(s, Intensity::Medium);
        assert_eq!(&scaled, s);
    }

    #[test]
    fn intensity_scales_counts_with_truncation() {
        let s = strategy_for(ContentType::Emotional);
        let scaled = scale_intensity(s, Intensity::Strong);
        assert_eq!(scaled.sticker_count, (s.sticker_count as f32 * 1.5) as u32);
        assert_eq!(scaled.particle_count, (s.particle_count as f32 * 1.5) as u32);
        assert_eq!(
            scaled.mask_top_height,
            (s.mask_top_height as f32 * 1.5) as u32
        );
    }

    #[test]
    fn intensity_scales_contrast_around_neutral() {
        let s = strategy_for(ContentType::Music);
        let scaled = scale_intensity(s, Intensity::Extreme);
        let expect = 1.0 + (s.color.contrast - 1.0) * 2.0;
        assert!((scaled.color.contrast - expect).abs() < 1e-6);
        // Brightness scales around zero.
        assert!((scaled.color.brightness - s.color.brightness * 2.0).abs() < 1e-6);
    }

    #[test]
    fn light_intensity_moves_saturation_toward_neutral() {
        let s = strategy_for(ContentType::Gaming);
        let scaled = scale_intensity(s, Intensity::Light);
        assert!(scaled.color.saturation < s.color.saturation);
        assert!(scaled.color.saturation > 1.0);
    }

    #[test]
    fn describe_is_deterministic_and_names_the_strategy() {
        let s = strategy_for(ContentType::Music);
        let a = describe(s);
        let b = describe(s);
        assert_eq!(a, b);
        assert!(a.starts_with("strategy: music"));
        assert!(a.contains("beat sync: on"));
        assert!(a.contains("flash: white"));
        assert!(a.contains("ui template: music_player"));
    }

    #[test]
    fn pace_params_cover_all_paces() {
        let p = pace_params(Pace::VeryFast);
        assert_eq!(p.cuts_per_minute, 60);
        let p = pace_params(Pace::VerySlow);
        assert_eq!(p.cuts_per_minute, 4);
    }

    #[test]
    fn table_lists_one_strategy_per_content_type() {
        assert_eq!(all_strategies().len(), ContentType::ALL.len());
    }
}
