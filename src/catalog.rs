use std::path::{Path, PathBuf};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::error::{RemixError, RemixResult};

/// Category of a full-frame animated overlay clip. Categories map to
/// directory names under the overlay root; the string form exists only for
/// that filesystem boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayCategory {
    Particles,
    Light,
    Smoke,
    Sparkle,
    Snow,
    Fire,
    Abstract,
}

impl OverlayCategory {
    pub const ALL: [OverlayCategory; 7] = [
        OverlayCategory::Particles,
        OverlayCategory::Light,
        OverlayCategory::Smoke,
        OverlayCategory::Sparkle,
        OverlayCategory::Snow,
        OverlayCategory::Fire,
        OverlayCategory::Abstract,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            OverlayCategory::Particles => "particles",
            OverlayCategory::Light => "light",
            OverlayCategory::Smoke => "smoke",
            OverlayCategory::Sparkle => "sparkle",
            OverlayCategory::Snow => "snow",
            OverlayCategory::Fire => "fire",
            OverlayCategory::Abstract => "abstract",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<OverlayCategory> {
        OverlayCategory::ALL
            .into_iter()
            .find(|c| c.dir_name() == name)
    }
}

/// Blend mode used when compositing a full-frame overlay clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayBlend {
    Screen,
    Add,
    Lighten,
    Overlay,
    SoftLight,
}

impl OverlayBlend {
    pub fn filter_name(self) -> &'static str {
        match self {
            OverlayBlend::Screen => "screen",
            OverlayBlend::Add => "addition",
            OverlayBlend::Lighten => "lighten",
            OverlayBlend::Overlay => "overlay",
            OverlayBlend::SoftLight => "softlight",
        }
    }
}

/// Filesystem-backed index of sticker PNGs and overlay clips.
///
/// Layout: `<root>/stickers/*.png` (category-prefixed filenames) and
/// `<root>/overlays/<category>/*.mp4`. A missing directory yields an empty
/// selection set, not an error.
#[derive(Clone, Debug)]
pub struct AssetCatalog {
    root: PathBuf,
}

impl AssetCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sticker_dir(&self) -> PathBuf {
        self.root.join("stickers")
    }

    pub fn overlay_dir(&self, category: OverlayCategory) -> PathBuf {
        self.root.join("overlays").join(category.dir_name())
    }

    /// All sticker PNGs, optionally restricted to a filename-prefix category
    /// (`crane` matches `crane_*.png`). Sorted for deterministic selection.
    pub fn stickers(&self, category: Option<&str>) -> Vec<PathBuf> {
        list_files(&self.sticker_dir(), |name| {
            let is_png = name.ends_with(".png");
            match category {
                Some(prefix) => is_png && name.starts_with(&format!("{prefix}_")),
                None => is_png,
            }
        })
    }

    /// All overlay clips in a category. Sorted; empty when the category
    /// directory is absent.
    pub fn overlays(&self, category: OverlayCategory) -> Vec<PathBuf> {
        list_files(&self.overlay_dir(category), |name| name.ends_with(".mp4"))
    }

    /// Resolve a sticker by exact filename.
    pub fn sticker_path(&self, file_name: &str) -> PathBuf {
        self.sticker_dir().join(file_name)
    }

    /// Deterministic cyclic pick: `index % len`, None on an empty set.
    pub fn pick_cyclic<'a>(&self, items: &'a [PathBuf], index: usize) -> Option<&'a PathBuf> {
        if items.is_empty() {
            None
        } else {
            Some(&items[index % items.len()])
        }
    }

    /// Seeded random selection without replacement. Degrades to "all
    /// available" when fewer assets exist than requested.
    pub fn pick_seeded(&self, items: &[PathBuf], count: usize, seed: u64) -> Vec<PathBuf> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pool: Vec<PathBuf> = items.to_vec();
        pool.shuffle(&mut rng);
        pool.truncate(count.min(items.len()));
        pool
    }

    /// First overlay clip found across the given categories, in category
    /// order then filename order.
    pub fn first_overlay(&self, categories: &[OverlayCategory]) -> RemixResult<PathBuf> {
        for cat in categories {
            if let Some(p) = self.overlays(*cat).into_iter().next() {
                return Ok(p);
            }
        }
        Err(RemixError::catalog(format!(
            "no overlay clips found under '{}' for categories {:?}",
            self.root.join("overlays").display(),
            categories
        )))
    }
}

fn list_files(dir: &Path, keep: impl Fn(&str) -> bool) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut out: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(&keep)
        })
        .collect();
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_catalog(tag: &str) -> AssetCatalog {
        let root = PathBuf::from("target")
            .join("catalog_tests")
            .join(tag);
        let stickers = root.join("stickers");
        std::fs::create_dir_all(&stickers).unwrap();
        for name in [
            "crane_1.png",
            "crane_2.png",
            "lotus_gold.png",
            "pattern_red1.png",
            "notes.txt",
        ] {
            std::fs::write(stickers.join(name), b"png").unwrap();
        }
        let sparkle = root.join("overlays").join("sparkle");
        std::fs::create_dir_all(&sparkle).unwrap();
        std::fs::write(sparkle.join("golden.mp4"), b"mp4").unwrap();
        AssetCatalog::new(root)
    }

    #[test]
    fn stickers_filter_by_prefix_and_extension() {
        let cat = fixture_catalog("prefix");
        assert_eq!(cat.stickers(None).len(), 4);
        let cranes = cat.stickers(Some("crane"));
        assert_eq!(cranes.len(), 2);
        assert!(cranes.iter().all(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("crane_"))
        }));
    }

    #[test]
    fn missing_category_yields_empty_set() {
        let cat = fixture_catalog("missing");
        assert!(cat.overlays(OverlayCategory::Snow).is_empty());
        assert!(cat.stickers(Some("nonexistent")).is_empty());
    }

    #[test]
    fn cyclic_pick_wraps_and_handles_empty() {
        let cat = fixture_catalog("cyclic");
        let items = cat.stickers(None);
        assert_eq!(cat.pick_cyclic(&items, 0), Some(&items[0]));
        assert_eq!(cat.pick_cyclic(&items, items.len() + 1), Some(&items[1]));
        assert_eq!(cat.pick_cyclic(&[], 3), None);
    }

    #[test]
    fn seeded_pick_is_reproducible_and_degrades() {
        let cat = fixture_catalog("seeded");
        let items = cat.stickers(None);

        let a = cat.pick_seeded(&items, 2, 42);
        let b = cat.pick_seeded(&items, 2, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);

        // Request more than available: all of them, no error.
        let all = cat.pick_seeded(&items, 99, 7);
        assert_eq!(all.len(), items.len());
    }

    #[test]
    fn first_overlay_prefers_category_order() {
        let cat = fixture_catalog("overlay");
        let p = cat
            .first_overlay(&[OverlayCategory::Snow, OverlayCategory::Sparkle])
            .unwrap();
        assert!(p.ends_with("golden.mp4"));
        assert!(
            cat.first_overlay(&[OverlayCategory::Fire])
                .is_err()
        );
    }

    #[test]
    fn category_string_adapter_round_trips() {
        for c in OverlayCategory::ALL {
            assert_eq!(OverlayCategory::from_dir_name(c.dir_name()), Some(c));
        }
        assert_eq!(OverlayCategory::from_dir_name("cny"), None);
    }
}
