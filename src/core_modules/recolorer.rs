// THEORY:
// The `Recolorer` is the final stage. It takes the clusters found in the mask and
// paints them back into the pixel grid, deciding each cluster's fate by its size.
//
// Key architectural principles:
// 1.  **Size gate**: A cluster smaller than the size threshold is noise. Every one
//     of its pixels becomes the eviction sentinel, exactly like background.
// 2.  **One color per cluster**: A cluster that passes the gate gets a single random
//     opaque color, drawn once and broadcast to every member. Drawing per pixel would
//     turn a region into confetti.
// 3.  **Injectable randomness**: The random source is a parameter so seeded runs are
//     reproducible. `recolor` uses the thread-local generator.

use crate::core_modules::cluster::{Cluster, ClusterCollection};
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::pixel_grid::PixelGrid;
use crate::error::{ClusterError, Result};
use rand::Rng;
use tracing::debug;

/// Clusters with fewer cells than this are evicted.
pub const DEFAULT_SIZE_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecolorOptions {
    pub size_threshold: usize,
    /// Painted over every cell of an evicted cluster.
    pub sentinel: Pixel,
}

impl Default for RecolorOptions {
    fn default() -> Self {
        Self {
            size_threshold: DEFAULT_SIZE_THRESHOLD,
            sentinel: Pixel::EVICTED,
        }
    }
}

/// What a recolor pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecolorSummary {
    /// Clusters that received a random color.
    pub kept: usize,
    /// Clusters painted with the sentinel.
    pub evicted: usize,
    /// Pixels belonging to evicted clusters.
    pub evicted_pixels: usize,
}

/// Paints small clusters with `Pixel::EVICTED` and every other cluster with
/// its own random opaque color.
///
/// # Panics
/// Panics if a cluster coordinate lies outside `pixels`.
pub fn recolor(pixels: &mut PixelGrid, clusters: &ClusterCollection, size_threshold: usize) {
    let options = RecolorOptions {
        size_threshold,
        ..RecolorOptions::default()
    };
    recolor_with(pixels, clusters, &options, &mut rand::rng());
}

/// Like `recolor_with`, but reports clusters that do not fit the grid instead of panicking.
///
/// Clusters labeled on a mask of different dimensions are rejected even when every
/// coordinate happens to land inside `pixels`. Nothing is painted on error.
pub fn recolor_checked<R: Rng>(
    pixels: &mut PixelGrid,
    clusters: &ClusterCollection,
    options: &RecolorOptions,
    rng: &mut R,
) -> Result<RecolorSummary> {
    if let Some((mask_width, mask_height)) = clusters.dimensions() {
        if (mask_width, mask_height) != (pixels.width(), pixels.height()) {
            return Err(ClusterError::DimensionMismatch {
                mask_width,
                mask_height,
                width: pixels.width(),
                height: pixels.height(),
            });
        }
    }

    let outside = clusters
        .iter()
        .flat_map(|cluster| cluster.cells())
        .find(|coord| !pixels.contains(**coord));
    if let Some(coord) = outside {
        return Err(ClusterError::OutOfBounds {
            row: coord.row,
            col: coord.col,
            height: pixels.height(),
            width: pixels.width(),
        });
    }
    Ok(recolor_with(pixels, clusters, options, rng))
}

/// Recolors every cluster using `rng` for the kept clusters' colors.
pub fn recolor_with<R: Rng>(
    pixels: &mut PixelGrid,
    clusters: &ClusterCollection,
    options: &RecolorOptions,
    rng: &mut R,
) -> RecolorSummary {
    let mut summary = RecolorSummary::default();

    for cluster in clusters {
        let color = if cluster.size() < options.size_threshold {
            summary.evicted += 1;
            summary.evicted_pixels += cluster.size();
            options.sentinel
        } else {
            summary.kept += 1;
            random_opaque(rng)
        };
        paint(pixels, cluster, color);
    }

    debug!(
        kept = summary.kept,
        evicted = summary.evicted,
        evicted_pixels = summary.evicted_pixels,
        size_threshold = options.size_threshold,
        "Recolored clusters"
    );
    summary
}

/// One opaque color with R, G and B drawn uniformly from 0..=255.
pub fn random_opaque<R: Rng>(rng: &mut R) -> Pixel {
    Pixel::opaque(rng.random(), rng.random(), rng.random())
}

fn paint(pixels: &mut PixelGrid, cluster: &Cluster, color: Pixel) {
    for coord in cluster.cells() {
        pixels.set(*coord, color);
    }
}
