// THEORY:
// The `pipeline` module is the top-level API of the detection engine. It wires the
// layers together in the only order that makes sense:
//
//   scene histogram (once)
//     -> per object: chroma-keyed object histogram
//     -> divergence gate
//     -> back-projection -> threshold -> erosion -> dilation -> region extraction
//
// The pipeline holds nothing but its configuration. Every call takes its inputs
// and returns its outputs, so several objects can be analysed against the same
// scene in any order (or in parallel, see `parallel_pipeline`) with identical
// results.
//
// Gate polarity: `compare` is a divergence (0 = identical, 2 = disjoint), and the
// search runs when the score is *above* the gate. A scene that matches the object
// almost perfectly is therefore skipped. This is the long-standing behaviour of
// the detector and is kept as is.

use crate::core_modules::blob_detector::blob_detector;
use crate::core_modules::frame::frame::Frame;
use crate::core_modules::histogram::{self, ChromaHistogram, HistogramMode};
use crate::core_modules::likelihood::LikelihoodMap;
use crate::core_modules::morphology::{self, BinaryMask};
use crate::error::{DetectionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export key data structures for the public API.
pub use crate::core_modules::bounding_box::{BoundingBox, Detection};
pub use crate::core_modules::histogram::ChromaKey;

/// Tunable parameters of the detector. The working resolution is fixed and
/// therefore not part of the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Likelihood at or above which a pixel is foreground; also the brightness a
    /// mask pixel must exceed to seed or extend a region.
    pub likelihood_threshold: u8,
    /// Half-width K of the square (2K+1)^2 erosion/dilation window.
    pub kernel_half_width: u32,
    /// Background removal applied to object images.
    pub chroma_key: ChromaKey,
    /// Region search runs only when the histogram divergence is above this value.
    pub similarity_gate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            likelihood_threshold: 5,
            kernel_half_width: 50,
            chroma_key: ChromaKey::default(),
            similarity_gate: 1.0,
        }
    }
}

impl PipelineConfig {
    /// Loads a JSON config; missing fields fall back to the defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| DetectionError::config_load(path, e))?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| DetectionError::config_load(path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        use crate::core_modules::frame::frame::{FRAME_HEIGHT, FRAME_WIDTH};

        if 2 * self.kernel_half_width >= FRAME_WIDTH.min(FRAME_HEIGHT) {
            return Err(DetectionError::invalid_parameter(
                "kernel_half_width",
                self.kernel_half_width,
            ));
        }
        if !self.similarity_gate.is_finite() || self.similarity_gate < 0.0 {
            return Err(DetectionError::invalid_parameter(
                "similarity_gate",
                self.similarity_gate,
            ));
        }
        Ok(())
    }
}

/// A reference image of one object, photographed on the chroma-key background.
#[derive(Debug, Clone)]
pub struct ObjectImage {
    pub label: String,
    pub frame: Frame,
}

impl ObjectImage {
    pub fn new(label: impl Into<String>, frame: Frame) -> Self {
        Self {
            label: label.into(),
            frame,
        }
    }
}

/// What happened to one object after the divergence gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchOutcome {
    /// The divergence did not exceed the gate; no region search was run.
    BelowGate,
    /// The region search ran and found these boxes (possibly none).
    Searched(Vec<BoundingBox>),
}

/// The per-object result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectReport {
    pub label: String,
    /// Histogram divergence between scene and object, in [0, 2].
    pub similarity: f64,
    pub outcome: SearchOutcome,
}

impl ObjectReport {
    pub fn detections(&self) -> Vec<Detection> {
        match &self.outcome {
            SearchOutcome::BelowGate => Vec::new(),
            SearchOutcome::Searched(boxes) => boxes
                .iter()
                .map(|&bounding_box| Detection {
                    bounding_box,
                    label: self.label.clone(),
                })
                .collect(),
        }
    }
}

/// Intermediate buffers of one region search, kept for inspection.
#[derive(Debug, Clone)]
pub struct SearchStages {
    pub likelihood: LikelihoodMap,
    pub mask: BinaryMask,
    pub boxes: Vec<BoundingBox>,
}

/// The sequential detection engine.
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    config: PipelineConfig,
}

impl DetectionPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn scene_histogram(&self, scene: &Frame) -> ChromaHistogram {
        ChromaHistogram::build(scene, HistogramMode::Scene)
    }

    pub fn object_histogram(&self, object: &Frame) -> ChromaHistogram {
        ChromaHistogram::build(object, HistogramMode::Object(self.config.chroma_key))
    }

    /// Runs every object against the scene, in input order.
    pub fn analyze(&self, scene: &Frame, objects: &[ObjectImage]) -> Vec<ObjectReport> {
        let scene_histogram = self.scene_histogram(scene);
        objects
            .iter()
            .map(|object| self.analyze_object(scene, &scene_histogram, object))
            .collect()
    }

    /// All (box, label) pairs found in the scene, grouped by object in input order.
    pub fn detect(&self, scene: &Frame, objects: &[ObjectImage]) -> Vec<Detection> {
        self.analyze(scene, objects)
            .iter()
            .flat_map(ObjectReport::detections)
            .collect()
    }

    /// Gates one object on histogram divergence and searches the scene if it passes.
    pub fn analyze_object(
        &self,
        scene: &Frame,
        scene_histogram: &ChromaHistogram,
        object: &ObjectImage,
    ) -> ObjectReport {
        let object_histogram = self.object_histogram(&object.frame);
        let similarity = histogram::compare(scene_histogram, &object_histogram);

        let outcome = if similarity > self.config.similarity_gate {
            let boxes = self.locate(scene, scene_histogram, &object_histogram);
            log::info!(
                "{}: divergence {similarity:.4} above gate, {} region(s) found",
                object.label,
                boxes.len()
            );
            SearchOutcome::Searched(boxes)
        } else {
            log::info!(
                "{}: divergence {similarity:.4} not above gate {}, skipped",
                object.label,
                self.config.similarity_gate
            );
            SearchOutcome::BelowGate
        };

        ObjectReport {
            label: object.label.clone(),
            similarity,
            outcome,
        }
    }

    /// Back-projects the object and extracts the cleaned foreground regions.
    pub fn locate(
        &self,
        scene: &Frame,
        scene_histogram: &ChromaHistogram,
        object_histogram: &ChromaHistogram,
    ) -> Vec<BoundingBox> {
        self.search_stages(scene, scene_histogram, object_histogram)
            .boxes
    }

    /// Same as `locate`, but keeps the likelihood map and the cleaned mask.
    pub fn search_stages(
        &self,
        scene: &Frame,
        scene_histogram: &ChromaHistogram,
        object_histogram: &ChromaHistogram,
    ) -> SearchStages {
        let likelihood = LikelihoodMap::back_project(scene, scene_histogram, object_histogram);
        let mask = self.clean_mask(&likelihood);
        let boxes = blob_detector::extract_regions(&mask, self.config.likelihood_threshold);
        SearchStages {
            likelihood,
            mask,
            boxes,
        }
    }

    /// threshold -> erode -> dilate.
    pub fn clean_mask(&self, likelihood: &LikelihoodMap) -> BinaryMask {
        let k = self.config.kernel_half_width;
        let thresholded = BinaryMask::threshold(likelihood, self.config.likelihood_threshold);
        log::debug!("threshold kept {} pixels", thresholded.white_count());
        let eroded = morphology::erode(&thresholded, k);
        log::debug!("erosion kept {} pixels", eroded.white_count());
        let dilated = morphology::dilate(&eroded, k);
        log::debug!("dilation grew to {} pixels", dilated.white_count());
        dilated
    }
}
