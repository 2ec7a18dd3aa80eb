// THEORY:
// The `MaskBuilder` is the first stage of the engine. It walks the pixel grid once
// and splits it into foreground and background by comparing a single intensity
// channel against a threshold.
//
// Key architectural principles:
// 1.  **One pass, two outputs**: The same pass builds the boolean `Mask` and greens
//     out the background in the source grid. Foreground pixels are left exactly as
//     they were.
// 2.  **Inclusive threshold**: A pixel whose intensity equals the threshold is
//     foreground. Only strictly dimmer pixels are evicted.
// 3.  **No cross-cell dependency**: Each cell is decided on its own, so the stage has
//     no failure modes and no ordering concerns.

use crate::core_modules::mask::Mask;
use crate::core_modules::pixel::pixel::{Channel, IntensityChannel, Pixel};
use crate::core_modules::pixel_grid::PixelGrid;
use tracing::debug;

/// Intensity at or above which a pixel counts as foreground.
pub const DEFAULT_THRESHOLD: Channel = 130;

/// Tunables for the mask stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskOptions {
    pub threshold: Channel,
    pub channel: IntensityChannel,
    /// Written over every background pixel.
    pub sentinel: Pixel,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            channel: IntensityChannel::Red,
            sentinel: Pixel::EVICTED,
        }
    }
}

/// Thresholds the first channel of every pixel. Background pixels are
/// overwritten with `Pixel::EVICTED`.
pub fn build(pixels: &mut PixelGrid, threshold: Channel) -> Mask {
    build_with(
        pixels,
        &MaskOptions {
            threshold,
            ..MaskOptions::default()
        },
    )
}

/// Thresholds the configured channel of every pixel and overwrites background
/// pixels with the configured sentinel.
pub fn build_with(pixels: &mut PixelGrid, options: &MaskOptions) -> Mask {
    let width = pixels.width();
    let height = pixels.height();

    let mut foreground = Vec::with_capacity(pixels.len());
    for pixel in pixels.pixels_mut() {
        let is_foreground = pixel.intensity(options.channel) >= options.threshold;
        if !is_foreground {
            *pixel = options.sentinel;
        }
        foreground.push(is_foreground);
    }

    let mask = Mask::from_fn(width, height, |row, col| foreground[row * width + col]);
    debug!(
        width,
        height,
        threshold = options.threshold,
        channel = ?options.channel,
        foreground = mask.count_foreground(),
        "Built foreground mask"
    );
    mask
}
