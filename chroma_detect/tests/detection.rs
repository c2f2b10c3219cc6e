mod common;

use chroma_detect::core_modules::histogram::{ChromaHistogram, HistogramMode, compare};
use chroma_detect::{
    BoundingBox, DetectionPipeline, Frame, ObjectImage, PipelineConfig, SearchOutcome,
};
use common::synthetic_scene::{BACKGROUND, BLUE, Patch, RED, keyed_object, scene_with_patches};

fn pipeline() -> DetectionPipeline {
    DetectionPipeline::new(PipelineConfig::default()).expect("default config is valid")
}

#[test]
fn single_patch_is_found_with_exact_bounds() {
    let scene = scene_with_patches(BACKGROUND, &[Patch::new(200, 150, 400, 330, RED)]);
    let reports = pipeline().analyze(&scene, &[ObjectImage::new("red", keyed_object(RED))]);

    assert_eq!(reports.len(), 1);
    assert!(
        reports[0].similarity > 1.0,
        "divergence {} should pass the gate",
        reports[0].similarity
    );
    assert_eq!(
        reports[0].outcome,
        SearchOutcome::Searched(vec![BoundingBox {
            x: 200,
            y: 150,
            width: 199,
            height: 179,
        }])
    );
}

#[test]
fn patch_touching_the_corner_is_clipped_to_the_border_band() {
    let scene = scene_with_patches(BACKGROUND, &[Patch::new(0, 0, 150, 120, RED)]);
    let detections = pipeline().detect(&scene, &[ObjectImage::new("red", keyed_object(RED))]);

    assert_eq!(detections.len(), 1);
    assert_eq!(
        detections[0].bounding_box,
        BoundingBox {
            x: 50,
            y: 50,
            width: 99,
            height: 69,
        }
    );
}

#[test]
fn two_separate_patches_give_two_boxes_in_scan_order() {
    let scene = scene_with_patches(
        BACKGROUND,
        &[
            Patch::new(380, 250, 560, 400, RED),
            Patch::new(80, 80, 220, 200, RED),
        ],
    );
    let detections = pipeline().detect(&scene, &[ObjectImage::new("red", keyed_object(RED))]);

    let boxes: Vec<_> = detections.iter().map(|d| d.bounding_box).collect();
    assert_eq!(
        boxes,
        vec![
            BoundingBox {
                x: 80,
                y: 80,
                width: 139,
                height: 119,
            },
            BoundingBox {
                x: 380,
                y: 250,
                width: 179,
                height: 149,
            },
        ]
    );
}

#[test]
fn speck_smaller_than_the_kernel_is_erased() {
    let scene = scene_with_patches(BACKGROUND, &[Patch::new(300, 200, 330, 230, RED)]);
    let reports = pipeline().analyze(&scene, &[ObjectImage::new("red", keyed_object(RED))]);
    assert_eq!(reports[0].outcome, SearchOutcome::Searched(Vec::new()));
}

#[test]
fn uniform_scene_with_foreign_object_yields_nothing() {
    let scene = Frame::filled(BACKGROUND);
    let reports = pipeline().analyze(&scene, &[ObjectImage::new("red", keyed_object(RED))]);

    match &reports[0].outcome {
        SearchOutcome::BelowGate => assert!(reports[0].similarity <= 1.0),
        SearchOutcome::Searched(boxes) => assert!(boxes.is_empty()),
    }
}

#[test]
fn each_object_is_labelled_and_gated_independently() {
    let scene = scene_with_patches(
        BACKGROUND,
        &[
            Patch::new(80, 80, 220, 200, RED),
            Patch::new(380, 250, 560, 400, BLUE),
        ],
    );
    let objects = [
        ObjectImage::new("blue.rgb", keyed_object(BLUE)),
        ObjectImage::new("whole-scene.rgb", scene.clone()),
        ObjectImage::new("red.rgb", keyed_object(RED)),
    ];
    let pipeline = pipeline();
    let reports = pipeline.analyze(&scene, &objects);

    assert_eq!(reports[1].outcome, SearchOutcome::BelowGate);
    assert_eq!(reports[1].similarity, 0.0);

    let detections = pipeline.detect(&scene, &objects);
    let found: Vec<_> = detections
        .iter()
        .map(|d| (d.label.as_str(), d.bounding_box.x, d.bounding_box.y))
        .collect();
    assert_eq!(found, [("blue.rgb", 380, 250), ("red.rgb", 80, 80)]);
}

#[test]
fn similarity_of_a_scene_with_itself_is_zero() {
    let scene = scene_with_patches(BACKGROUND, &[Patch::new(10, 10, 300, 200, BLUE)]);
    let histogram = ChromaHistogram::build(&scene, HistogramMode::Scene);
    assert_eq!(compare(&histogram, &histogram), 0.0);
}

#[test]
fn search_stages_expose_the_intermediate_buffers() {
    let scene = scene_with_patches(BACKGROUND, &[Patch::new(200, 150, 400, 330, RED)]);
    let pipeline = pipeline();
    let scene_histogram = pipeline.scene_histogram(&scene);
    let object_histogram = pipeline.object_histogram(&keyed_object(RED));
    let stages = pipeline.search_stages(&scene, &scene_histogram, &object_histogram);

    assert_eq!(stages.likelihood.get(300, 200), 255);
    assert_eq!(stages.likelihood.get(20, 20), 0);
    assert_eq!(stages.mask.white_count(), 200 * 180);
    assert_eq!(stages.boxes.len(), 1);
}
