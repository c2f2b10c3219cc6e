#![doc = include_str!("../README.md")]

// THEORY:
// This file is the main entry point for the `chroma_detect` library crate. It
// exposes `DetectionPipeline` (sequential) and `ParallelPipeline` (tokio worker
// pool) together with their configuration and result types as the high-level
// interface of the engine.
//
// The engine locates a known object in a scene purely from colour statistics:
// chroma histograms gate the search, back-projection scores every pixel, and
// morphology plus a flood-fill extractor turn the scores into bounding boxes.
// The layers live in `core_modules` and stay public for callers that want to run
// individual stages.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use crate::core_modules::frame::frame::{FRAME_HEIGHT, FRAME_WIDTH, Frame};
pub use crate::core_modules::pixel::pixel::Pixel;
pub use crate::error::{DetectionError, Result};
pub use crate::parallel_pipeline::ParallelPipeline;
pub use crate::pipeline::{
    BoundingBox, Detection, DetectionPipeline, ObjectImage, ObjectReport, PipelineConfig,
    SearchOutcome,
};
