// THEORY:
// The `pipeline` module is the top-level API for the engine. It wires the three
// stages together in their only valid order and hands back everything a caller
// might want to show or save.
//
// Stage order:
// 1.  **Cutout**: `mask_builder` thresholds the grid and greens out the background.
//     A copy of the grid at this point is kept as the "greened" artifact.
// 2.  **Grouping**: `cluster_finder` consumes the mask and yields the clusters.
// 3.  **Recolor**: `recolorer` evicts small clusters and paints the rest.
//
// The pipeline owns no state between images; one instance can process any number
// of grids, from any number of threads.

use crate::core_modules::cluster_finder::cluster_finder::{self, LabelOptions};
use crate::core_modules::mask_builder::{self, MaskOptions};
use crate::core_modules::pixel_grid::PixelGrid;
use crate::core_modules::recolorer::{self, RecolorOptions, RecolorSummary};
use rand::Rng;
use tracing::info;

/// Configuration for the ClusterPipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    pub mask: MaskOptions,
    pub label: LabelOptions,
    pub recolor: RecolorOptions,
}

/// The output of the pipeline for a single image.
#[derive(Debug, Clone)]
pub struct ClusterReport {
    /// The image after the cutout stage: background greened out, foreground untouched.
    pub greened: PixelGrid,
    /// The image after recoloring.
    pub clustered: PixelGrid,
    /// Number of foreground cells in the mask.
    pub foreground: usize,
    /// Size of every cluster, in seed discovery order.
    pub cluster_sizes: Vec<usize>,
    pub summary: RecolorSummary,
}

/// Runs cutout, grouping and recolor over a pixel grid.
#[derive(Debug, Clone, Default)]
pub struct ClusterPipeline {
    config: PipelineConfig,
}

impl ClusterPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn process(&self, pixels: PixelGrid) -> ClusterReport {
        self.process_with_rng(pixels, &mut rand::rng())
    }

    pub fn process_with_rng<R: Rng>(&self, mut pixels: PixelGrid, rng: &mut R) -> ClusterReport {
        // Stage 1: Cutout
        let mut mask = mask_builder::build_with(&mut pixels, &self.config.mask);
        let foreground = mask.count_foreground();
        let greened = pixels.clone();

        // Stage 2: Grouping
        let clusters = cluster_finder::label_with(&mut mask, self.config.label);

        // Stage 3: Recolor
        let summary = recolorer::recolor_with(&mut pixels, &clusters, &self.config.recolor, rng);

        info!(
            width = pixels.width(),
            height = pixels.height(),
            foreground,
            clusters = clusters.len(),
            kept = summary.kept,
            evicted = summary.evicted,
            "Processed image"
        );

        ClusterReport {
            greened,
            clustered: pixels,
            foreground,
            cluster_sizes: clusters.sizes(),
            summary,
        }
    }
}
