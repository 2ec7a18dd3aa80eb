pub mod image_helper {
    use crate::core_modules::pixel_grid::PixelGrid;
    use crate::error::Result;
    use image::{ImageEncoder, RgbaImage};
    use std::path::Path;

    /// Decodes any format the `image` crate understands into an RGBA pixel grid.
    pub fn load(path: impl AsRef<Path>) -> Result<PixelGrid> {
        let image = image::open(path)?.to_rgba8();
        Ok(PixelGrid::from(&image))
    }

    /// Writes the grid as an RGBA8 PNG.
    pub fn save_png(path: impl AsRef<Path>, grid: &PixelGrid) -> Result<()> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            &grid.to_rgba_bytes(),
            grid.width() as u32,
            grid.height() as u32,
            image::ExtendedColorType::Rgba8,
        )?;

        Ok(())
    }

    /// Converts the grid into an owned `RgbaImage`, e.g. for previews.
    pub fn to_image(grid: &PixelGrid) -> RgbaImage {
        RgbaImage::from(grid)
    }
}
