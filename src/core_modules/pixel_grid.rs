// THEORY:
// The `PixelGrid` is the caller-owned image the engine works on: a rectangular,
// row-major grid of RGBA `Pixel`s. Both the mask stage and the recolor stage
// mutate it in place; the cluster stage never touches it.
//
// Key architectural principles:
// 1.  **Row/column addressing**: Every other module speaks in `(row, col)`, so the
//     grid exposes `get`/`set` in those terms and hides the flat index math.
// 2.  **Raw buffer bridge**: Frames usually arrive as a flat RGBA8 buffer. The grid
//     slices such a buffer into pixels exactly once and refuses buffers whose length
//     does not match the declared dimensions.
// 3.  **Image crate interop**: Conversions to and from `image::RgbaImage` keep the
//     decode/encode collaborators thin.

use crate::core_modules::cluster::Coord;
use crate::core_modules::pixel::pixel::{CHANNELS, Pixel};
use crate::error::{ClusterError, Result};
use image::RgbaImage;

/// A rectangular, row-major grid of RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Creates a grid filled with a single pixel value.
    pub fn filled(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width * height],
        }
    }

    /// Builds a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                pixels.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Slices a flat RGBA8 buffer into a grid.
    pub fn from_rgba_bytes(width: usize, height: usize, buffer: &[u8]) -> Result<Self> {
        let expected = width * height * CHANNELS;
        if buffer.len() != expected {
            return Err(ClusterError::BufferLength {
                width,
                height,
                expected,
                actual: buffer.len(),
            });
        }

        let pixels = buffer.chunks_exact(CHANNELS).map(Pixel::from).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Flattens the grid back into an RGBA8 buffer.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.pixels.len() * CHANNELS);
        for pixel in &self.pixels {
            buffer.extend_from_slice(&pixel.to_array());
        }
        buffer
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Returns the pixel at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Pixel> {
        if row < self.height && col < self.width {
            Some(self.pixels[row * self.width + col])
        } else {
            None
        }
    }

    /// Overwrites the pixel at `coord`.
    ///
    /// # Panics
    /// Panics if `coord` lies outside the grid.
    pub fn set(&mut self, coord: Coord, pixel: Pixel) {
        assert!(
            self.contains(coord),
            "({}, {}) is outside the {}x{} grid",
            coord.row,
            coord.col,
            self.height,
            self.width
        );
        self.pixels[coord.row * self.width + coord.col] = pixel;
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }
}

impl From<&RgbaImage> for PixelGrid {
    fn from(image: &RgbaImage) -> Self {
        let pixels = image.pixels().map(|rgba| Pixel::from(*rgba)).collect();
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            pixels,
        }
    }
}

impl From<&PixelGrid> for RgbaImage {
    fn from(grid: &PixelGrid) -> Self {
        RgbaImage::from_fn(grid.width as u32, grid.height as u32, |x, y| {
            grid.pixels[y as usize * grid.width + x as usize].into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_buffer_of_wrong_length() {
        let err = PixelGrid::from_rgba_bytes(2, 2, &[0u8; 15]).unwrap_err();
        assert!(matches!(
            err,
            ClusterError::BufferLength {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn buffer_is_row_major() {
        // 2 wide, 1 tall: second pixel starts at byte 4.
        let buffer = [1, 2, 3, 4, 5, 6, 7, 8];
        let grid = PixelGrid::from_rgba_bytes(2, 1, &buffer).unwrap();
        assert_eq!(grid.get(0, 1), Some(Pixel::new(5, 6, 7, 8)));
        assert_eq!(grid.get(1, 0), None);
        assert_eq!(grid.to_rgba_bytes(), buffer.to_vec());
    }

    #[test]
    fn image_conversion_keeps_orientation() {
        let grid = PixelGrid::from_fn(3, 2, |row, col| Pixel::opaque(row as u8, col as u8, 0));
        let image = RgbaImage::from(&grid);
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [1, 2, 0, 255]);
        assert_eq!(PixelGrid::from(&image), grid);
    }

    #[test]
    #[should_panic]
    fn set_out_of_bounds_panics() {
        let mut grid = PixelGrid::filled(2, 2, Pixel::default());
        grid.set(Coord::new(2, 0), Pixel::EVICTED);
    }
}
