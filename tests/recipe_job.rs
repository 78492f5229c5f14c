use std::path::{Path, PathBuf};

use vidremix::{
    catalog::AssetCatalog,
    job::{CodecParams, build_job},
    recipe::{CompositionShape, build_recipe},
};

fn fixture_catalog(tag: &str) -> AssetCatalog {
    let root = PathBuf::from("target").join("recipe_itests").join(tag);
    let stickers = root.join("stickers");
    std::fs::create_dir_all(&stickers).unwrap();
    for name in [
        "banner_1.png",
        "banner_2.png",
        "banner_3.png",
        "banner_4.png",
        "banner_5.png",
        "pattern_1.png",
        "pattern_2.png",
        "pattern_3.png",
        "pattern_4.png",
        "bird_1.png",
        "bird_2.png",
        "flower_1.png",
        "flower_2.png",
        "fish_1.png",
        "fish_2.png",
    ] {
        image::RgbaImage::new(120, 60).save(stickers.join(name)).unwrap();
    }
    let sparkle = root.join("overlays").join("sparkle");
    std::fs::create_dir_all(&sparkle).unwrap();
    std::fs::write(sparkle.join("shimmer.mp4"), b"mp4").unwrap();
    AssetCatalog::new(root)
}

#[test]
fn every_variant_of_a_small_batch_produces_a_consistent_job() {
    let catalog = fixture_catalog("grid");
    for video in 0..3 {
        for variant in 0..5 {
            let recipe = build_recipe(video, variant, 1080, 1920, &catalog).unwrap();
            let job = build_job(
                &recipe,
                Path::new("in.mp4"),
                Path::new("out.mp4"),
                CodecParams::default(),
            )
            .unwrap();

            assert!(job.graph.validate(job.inputs.len()).is_ok());
            let serialized = job.graph.serialize();
            assert!(serialized.ends_with("[vout]") || serialized.ends_with("[aout]"));
            // Masks are always present; stickers all resolved.
            assert_eq!(serialized.matches("geq=a=").count(), 2);
            assert!(serialized.matches("overlay=").count() >= 6);
        }
    }
}

#[test]
fn sibling_variants_serialize_to_distinct_graphs() {
    let catalog = fixture_catalog("distinct");
    let mut graphs = Vec::new();
    for variant in 0..5 {
        let recipe = build_recipe(0, variant, 1080, 1920, &catalog).unwrap();
        let job = build_job(
            &recipe,
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            CodecParams::default(),
        )
        .unwrap();
        graphs.push(job.graph.serialize());
    }
    graphs.sort();
    graphs.dedup();
    assert_eq!(graphs.len(), 5);
}

#[test]
fn same_pair_rebuilds_the_same_job() {
    let catalog = fixture_catalog("stable");
    let build = || {
        let recipe = build_recipe(2, 3, 720, 1280, &catalog).unwrap();
        build_job(
            &recipe,
            Path::new("in.mp4"),
            Path::new("out.mp4"),
            CodecParams::default(),
        )
        .unwrap()
    };
    let a = build();
    let b = build();
    assert_eq!(a.graph.serialize(), b.graph.serialize());
    assert_eq!(a.to_ffmpeg_args(), b.to_ffmpeg_args());
}

#[test]
fn shape_rotation_covers_the_whole_cycle() {
    let catalog = fixture_catalog("shapes");
    let shapes: Vec<CompositionShape> = (0..5)
        .map(|v| build_recipe(0, v, 1080, 1920, &catalog).unwrap().shape)
        .collect();
    assert_eq!(shapes, CompositionShape::ALL.to_vec());
    // Wraps after five.
    let again = build_recipe(0, 5, 1080, 1920, &catalog).unwrap().shape;
    assert_eq!(again, shapes[0]);
}
