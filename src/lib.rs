// THEORY:
// This file is the main entry point for the `cutout_clusters` library crate.
// It defines the public API exposed to the command-line runner and to any other
// consumer that already has pixels in memory.
//
// The engine is three stages over a caller-owned pixel grid:
//   pixel grid -> mask (`mask_builder`) -> clusters (`cluster_finder`) -> recolored grid (`recolorer`)
//
// `pipeline::ClusterPipeline` runs the stages in order for one image, and
// `parallel_pipeline::BatchProcessor` runs that pipeline over many image files
// concurrently. The stage modules under `core_modules` stay public so callers can
// drive them one at a time.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;
pub mod settings;

pub use core_modules::cluster::{Cluster, ClusterCollection, Coord};
pub use core_modules::cluster_finder::cluster_finder::{LabelOptions, ScanOrder, Traversal, label, label_with};
pub use core_modules::mask::Mask;
pub use core_modules::mask_builder::{DEFAULT_THRESHOLD, MaskOptions, build, build_with};
pub use core_modules::pixel::pixel::{IntensityChannel, Pixel};
pub use core_modules::pixel_grid::PixelGrid;
pub use core_modules::recolorer::{DEFAULT_SIZE_THRESHOLD, RecolorOptions, RecolorSummary, recolor, recolor_with};
pub use error::{ClusterError, Result};
pub use pipeline::{ClusterPipeline, ClusterReport, PipelineConfig};
pub use settings::Settings;
