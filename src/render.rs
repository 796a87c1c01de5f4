//! Turns a finished [`Dataset`] into pixels: a swatch of the palette and a recolored image.
//!
//! Colors are converted back from CIELAB with clamping, see [`to_srgb8`](crate::colorspace::to_srgb8).
//! Writing the pixels to a file is left to the caller.

use crate::kmeans::{Dataset, Palette};

use palette::Srgb;

#[cfg(feature = "image")]
use {image::RgbImage, palette::cast::IntoComponents};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// A vertical strip of square blocks, one per palette color, in palette order.
///
/// # Examples
/// ```
/// # use labmeans::render::Swatch;
/// let swatch = Swatch::new().block_size(32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    /// The width and height of each color block in pixels.
    block_size: u32,
}

impl Default for Swatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Swatch {
    /// The default block size of `60` pixels.
    pub const DEFAULT_BLOCK_SIZE: u32 = 60;

    /// The maximum block size of `1024` pixels.
    pub const MAX_BLOCK_SIZE: u32 = 1024;

    /// Creates a new [`Swatch`] with the default block size.
    #[must_use]
    pub const fn new() -> Self {
        Self { block_size: Self::DEFAULT_BLOCK_SIZE }
    }

    /// Sets the width and height of each block,
    /// clamped to be within `1..=`[`Swatch::MAX_BLOCK_SIZE`].
    #[must_use]
    pub fn block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size.clamp(1, Self::MAX_BLOCK_SIZE);
        self
    }

    /// The `(width, height)` of the swatch for the given palette: `block × (block · k)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn dimensions(&self, palette: &Palette) -> (u32, u32) {
        (self.block_size, self.block_size * palette.len() as u32)
    }

    /// The swatch pixels in row-major order.
    #[must_use]
    pub fn pixels(&self, palette: &Palette) -> Vec<Srgb<u8>> {
        // blocks are stacked vertically, so each block is one contiguous run of pixels
        let block = self.block_size as usize * self.block_size as usize;
        palette
            .srgb()
            .into_iter()
            .flat_map(|color| std::iter::repeat(color).take(block))
            .collect()
    }

    /// The swatch as an [`RgbImage`].
    #[cfg(feature = "image")]
    #[must_use]
    pub fn rgbimage(&self, palette: &Palette) -> RgbImage {
        let (width, height) = self.dimensions(palette);
        let buf = self.pixels(palette).into_components();

        #[allow(clippy::unwrap_used)]
        {
            // the swatch has exactly block * block * k pixels
            RgbImage::from_vec(width, height, buf).unwrap()
        }
    }
}

/// Each pixel replaced by the color of the centroid it is assigned to, in row-major order.
#[must_use]
pub fn recolor(dataset: &Dataset) -> Vec<Srgb<u8>> {
    let palette = dataset.palette().srgb();
    dataset
        .samples()
        .iter()
        .map(|s| palette[usize::from(s.cluster())])
        .collect()
}

/// Parallel version of [`recolor`].
#[cfg(feature = "threads")]
#[must_use]
pub fn recolor_par(dataset: &Dataset) -> Vec<Srgb<u8>> {
    let palette = dataset.palette().srgb();
    let palette = palette.as_slice();
    dataset
        .samples()
        .par_iter()
        .map(|s| palette[usize::from(s.cluster())])
        .collect()
}

/// The recolored image as an [`RgbImage`] with the same dimensions as the source.
#[cfg(feature = "image")]
#[must_use]
pub fn recolored_rgbimage(dataset: &Dataset) -> RgbImage {
    into_rgbimage(dataset, recolor(dataset))
}

/// Parallel version of [`recolored_rgbimage`].
#[cfg(all(feature = "image", feature = "threads"))]
#[must_use]
pub fn recolored_rgbimage_par(dataset: &Dataset) -> RgbImage {
    into_rgbimage(dataset, recolor_par(dataset))
}

/// Packs `pixels` into an image with the dataset's dimensions.
#[cfg(feature = "image")]
fn into_rgbimage(dataset: &Dataset, pixels: Vec<Srgb<u8>>) -> RgbImage {
    let (width, height) = dataset.dimensions();
    let buf = pixels.into_components();

    #[allow(clippy::unwrap_used)]
    {
        // a dataset always has width * height samples
        RgbImage::from_vec(width, height, buf).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{colorspace::from_srgb8, kmeans::Palette};
    use palette::Lab;

    fn two_color_dataset() -> Dataset {
        let red = from_srgb8(Srgb::new(255, 0, 0));
        let blue = from_srgb8(Srgb::new(0, 0, 255));
        let palette = Palette::new(vec![red, blue]).unwrap();
        let mut dataset = Dataset::new(vec![red, blue, blue, red, red, blue], 3, 2, palette).unwrap();
        dataset.assign();
        dataset
    }

    #[test]
    fn swatch_has_one_block_per_centroid() {
        let dataset = two_color_dataset();
        let swatch = Swatch::new().block_size(4);
        assert_eq!(swatch.dimensions(dataset.palette()), (4, 8));

        let pixels = swatch.pixels(dataset.palette());
        assert_eq!(pixels.len(), 4 * 8);

        let colors = dataset.palette().srgb();
        assert!(pixels[..16].iter().all(|&p| p == colors[0]));
        assert!(pixels[16..].iter().all(|&p| p == colors[1]));
    }

    #[test]
    fn default_swatch_is_sixty_pixels_per_color() {
        let dataset = two_color_dataset();
        assert_eq!(Swatch::new().dimensions(dataset.palette()), (60, 120));
        assert_eq!(Swatch::new().block_size(0).dimensions(dataset.palette()), (1, 2));
    }

    #[test]
    fn recolor_uses_assignments() {
        let dataset = two_color_dataset();
        let pixels = recolor(&dataset);
        let colors = dataset.palette().srgb();
        let (red, blue) = (colors[0], colors[1]);
        assert_eq!(pixels, vec![red, blue, blue, red, red, blue]);
    }

    #[test]
    fn out_of_gamut_centroids_are_clamped() {
        let palette = Palette::new(vec![Lab::new(150.0, 0.0, 0.0)]).unwrap();
        let dataset = Dataset::new(vec![Lab::new(50.0, 0.0, 0.0)], 1, 1, palette).unwrap();
        assert_eq!(recolor(&dataset), vec![Srgb::new(255, 255, 255)]);
    }

    #[cfg(feature = "threads")]
    #[test]
    fn parallel_recolor_matches_serial() {
        let dataset = two_color_dataset();
        assert_eq!(recolor(&dataset), recolor_par(&dataset));
    }

    #[cfg(feature = "image")]
    #[test]
    fn images_have_expected_dimensions() {
        let dataset = two_color_dataset();
        assert_eq!(recolored_rgbimage(&dataset).dimensions(), (3, 2));
        assert_eq!(Swatch::new().rgbimage(dataset.palette()).dimensions(), (60, 120));
    }
}
