mod loader;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chroma_detect::{
    DetectionPipeline, Frame, ObjectImage, ObjectReport, ParallelPipeline, PipelineConfig,
    SearchOutcome,
};
use clap::Parser;
use tracing_subscriber::prelude::*;

#[derive(Debug, Parser)]
#[command(about = "Locate objects in a scene by their colour histogram")]
pub struct Args {
    /// Scene image: raw planar `.rgb` at 640x480, or a png/jpeg of that size.
    scene: PathBuf,
    /// Object images photographed on a pure green background. Labels are the file names.
    #[arg(required = true)]
    objects: Vec<PathBuf>,
    /// JSON file overriding detector parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where to write the annotated scene. Defaults to `<scene>.detected.png`.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Also write per-object reports as JSON.
    #[arg(long)]
    json: Option<PathBuf>,
    /// TrueType/OpenType font used to draw labels next to the boxes.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Directory receiving the likelihood map and cleaned mask of every searched object.
    #[arg(long)]
    dump_masks: Option<PathBuf>,
    /// Number of objects analysed concurrently. Defaults to the CPU count.
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,chroma_finder=info,chroma_detect=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    tracing::debug!("{config:?}");

    tracing::info!("input file: {}", loader::file_label(&args.scene));
    let scene = Arc::new(loader::load_frame(&args.scene)?);
    let mut objects = Vec::with_capacity(args.objects.len());
    for path in &args.objects {
        let label = loader::file_label(path);
        tracing::info!("object file: {label}");
        objects.push(ObjectImage::new(label, loader::load_frame(path)?));
    }

    let pipeline = match args.workers {
        Some(workers) => ParallelPipeline::with_workers(config, workers)?,
        None => ParallelPipeline::new(config)?,
    };

    tracing::info!("creating and comparing histograms");
    let reports = pipeline.analyze(Arc::clone(&scene), objects.clone()).await?;

    if let Some(dir) = &args.dump_masks {
        dump_masks(
            pipeline.pipeline().clone(),
            Arc::clone(&scene),
            objects,
            reports.clone(),
            dir.clone(),
        )
        .await?;
    }
    pipeline.shutdown().await;

    let detections: Vec<_> = reports.iter().flat_map(ObjectReport::detections).collect();
    for detection in &detections {
        tracing::info!("{} at {}", detection.label, detection.bounding_box);
    }

    let font = args.font.as_deref().map(render::load_font).transpose()?;
    let annotated = render::annotate(&scene, &detections, font.as_ref());
    let output = args.output.unwrap_or_else(|| args.scene.with_extension("detected.png"));
    annotated.save(&output).with_context(|| format!("writing {output:?}"))?;
    tracing::info!("results written to {output:?}");

    if let Some(json_path) = &args.json {
        let file = std::fs::File::create(json_path)
            .with_context(|| format!("creating {json_path:?}"))?;
        serde_json::to_writer_pretty(file, &reports)?;
        tracing::info!("reports written to {json_path:?}");
    }

    Ok(())
}

/// Re-runs the search stages of every searched object on the blocking pool.
async fn dump_masks(
    pipeline: DetectionPipeline,
    scene: Arc<Frame>,
    objects: Vec<ObjectImage>,
    reports: Vec<ObjectReport>,
    dir: PathBuf,
) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || {
        write_stage_images(&pipeline, &scene, &objects, &reports, &dir)
    })
    .await
    .context("mask dump task failed")?
}

/// Saves the likelihood map and cleaned mask of every object that passed the gate.
fn write_stage_images(
    pipeline: &DetectionPipeline,
    scene: &Frame,
    objects: &[ObjectImage],
    reports: &[ObjectReport],
    dir: &Path,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {dir:?}"))?;
    let scene_histogram = pipeline.scene_histogram(scene);

    for (object, report) in objects.iter().zip(reports) {
        if report.outcome == SearchOutcome::BelowGate {
            continue;
        }
        let object_histogram = pipeline.object_histogram(&object.frame);
        let stages = pipeline.search_stages(scene, &scene_histogram, &object_histogram);

        let likelihood_path = dir.join(format!("{}.likelihood.png", object.label));
        let mask_path = dir.join(format!("{}.mask.png", object.label));
        stages
            .likelihood
            .to_gray_image()
            .save(&likelihood_path)
            .with_context(|| format!("writing {likelihood_path:?}"))?;
        stages
            .mask
            .to_gray_image()
            .save(&mask_path)
            .with_context(|| format!("writing {mask_path:?}"))?;
        tracing::debug!("dumped {likelihood_path:?} and {mask_path:?}");
    }
    Ok(())
}
