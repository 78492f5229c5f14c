#![forbid(unsafe_code)]

pub mod batch;
pub mod catalog;
pub mod color;
pub mod engine;
pub mod error;
pub mod filtergraph;
pub mod job;
pub mod placement;
pub mod recipe;
pub mod scratch;
pub mod segment;
pub mod strategy;

pub use batch::{BatchConfig, BatchReport, run_batch};
pub use catalog::{AssetCatalog, OverlayBlend, OverlayCategory};
pub use color::{COLOR_SCHEMES, ColorGrade, ColorScheme};
pub use engine::{FfmpegEngine, RenderEngine, VideoInfo};
pub use error::{RemixError, RemixResult};
pub use job::{CodecParams, RenderJob, build_job};
pub use recipe::{CompositionShape, VariantRecipe, build_recipe};
pub use strategy::{ContentType, EditingStrategy, Intensity, Pace, strategy_for};
