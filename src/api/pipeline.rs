//! Contains the [`ClusterPipeline`] builder struct for the high level API.

use crate::{
    colorspace::convert_color_slice,
    kmeans::{Dataset, RunSummary},
    render::{self, Swatch},
    ClusterError, ColorSlice, KmeansOptions, PaletteSize,
};

use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

#[cfg(feature = "threads")]
use crate::colorspace::convert_color_slice_par;
#[cfg(feature = "image")]
use {crate::AboveMaxLen, image::RgbImage};

/// A builder struct to cluster the colors of an image into a palette of `k` colors.
///
/// # Examples
/// To start, create a [`ClusterPipeline`] from a [`RgbImage`] (note that the `image` feature is needed):
/// ```no_run
/// # use labmeans::ClusterPipeline;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let img = image::open("some image")?.into_rgb8();
/// let pipeline = ClusterPipeline::try_from(&img)?;
/// # Ok(())
/// # }
/// ```
///
/// Then, set the number of clusters and any k-means options, and run it:
/// ```
/// # use labmeans::{ClusterPipeline, KmeansOptions};
/// # use palette::Srgb;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let srgb = vec![Srgb::new(255, 0, 0), Srgb::new(0, 0, 255)];
/// # let pipeline = ClusterPipeline::new(srgb.as_slice().try_into()?, 2, 1).unwrap();
/// let output = pipeline
///     .palette_size(2)
///     .options(KmeansOptions::new().max_iterations(10).seed(7))
///     .run()?;
///
/// let palette = output.palette();
/// let swatch = output.swatch_pixels(&Default::default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClusterPipeline<'a> {
    /// The input image as a flat slice of pixels.
    colors: ColorSlice<'a, Srgb<u8>>,
    /// The dimensions of the image.
    dimensions: (u32, u32),
    /// The number of clusters.
    k: PaletteSize,
    /// The k-means parameters.
    options: KmeansOptions,
}

impl<'a> ClusterPipeline<'a> {
    /// Creates a new [`ClusterPipeline`] with default options.
    /// Returns `None` if the length of `colors` is not equal to `width * height`.
    #[must_use]
    pub fn new(colors: ColorSlice<'a, Srgb<u8>>, width: u32, height: u32) -> Option<Self> {
        if colors.len() as u64 == u64::from(width) * u64::from(height) {
            Some(Self {
                colors,
                dimensions: (width, height),
                k: PaletteSize::default(),
                options: KmeansOptions::new(),
            })
        } else {
            None
        }
    }

    /// Sets the number of clusters, the palette size `k`.
    ///
    /// The default is `6`.
    #[must_use]
    pub fn palette_size(mut self, size: impl Into<PaletteSize>) -> Self {
        self.k = size.into();
        self
    }

    /// Sets the k-means parameters.
    #[must_use]
    pub fn options(mut self, options: KmeansOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs k-means on a single thread using a random number generator seeded
    /// from [`KmeansOptions::seed`].
    ///
    /// # Errors
    /// See [`ClusterError`]. A [`ClusterError::DegenerateInput`] carries the partial
    /// clustering, see [`ClusterError::into_partial`].
    pub fn run(&self) -> Result<ClusterOutput, ClusterError> {
        self.run_with_rng(&mut Xoroshiro128PlusPlus::seed_from_u64(self.options.seed))
    }

    /// Runs k-means on a single thread drawing random colors from `rng`.
    ///
    /// # Errors
    /// See [`ClusterError`].
    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<ClusterOutput, ClusterError> {
        self.validate()?;
        let (width, height) = self.dimensions;
        let colors = convert_color_slice(self.colors);
        let mut dataset = Dataset::initialize(colors, width, height, self.k, &self.options, rng)?;
        let summary = match dataset.run(&self.options, rng) {
            Ok(summary) => summary,
            Err(err) => return Err(err.with_partial(dataset)),
        };
        Ok(ClusterOutput { dataset, summary })
    }

    /// Runs k-means in parallel using a random number generator seeded
    /// from [`KmeansOptions::seed`].
    ///
    /// # Errors
    /// See [`ClusterError`].
    #[cfg(feature = "threads")]
    pub fn run_par(&self) -> Result<ClusterOutput, ClusterError> {
        self.run_par_with_rng(&mut Xoroshiro128PlusPlus::seed_from_u64(self.options.seed))
    }

    /// Runs k-means in parallel drawing random colors from `rng`.
    ///
    /// # Errors
    /// See [`ClusterError`].
    #[cfg(feature = "threads")]
    pub fn run_par_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ClusterOutput, ClusterError> {
        self.validate()?;
        let (width, height) = self.dimensions;
        let colors = convert_color_slice_par(self.colors);
        let mut dataset =
            Dataset::initialize_par(colors, width, height, self.k, &self.options, rng)?;
        let summary = match dataset.run_par(&self.options, rng) {
            Ok(summary) => summary,
            Err(err) => return Err(err.with_partial(dataset)),
        };
        Ok(ClusterOutput { dataset, summary })
    }

    /// Checks the configuration before any pixels are converted.
    fn validate(&self) -> Result<(), ClusterError> {
        if self.k.into_inner() == 0 {
            Err(ClusterError::ZeroClusters)
        } else if self.colors.is_empty() {
            Err(ClusterError::EmptyImage)
        } else {
            Ok(())
        }
    }
}

#[cfg(feature = "image")]
impl<'a> TryFrom<&'a RgbImage> for ClusterPipeline<'a> {
    type Error = AboveMaxLen<u32>;

    fn try_from(image: &'a RgbImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        let colors = image.try_into()?;
        #[allow(clippy::unwrap_used)]
        {
            // an RgbImage always has width * height pixels
            Ok(Self::new(colors, width, height).unwrap())
        }
    }
}

/// The result of running a [`ClusterPipeline`].
#[derive(Debug, Clone)]
pub struct ClusterOutput {
    /// The final samples, assignments, and palette.
    pub dataset: Dataset,
    /// How the run went.
    pub summary: RunSummary,
}

impl ClusterOutput {
    /// The palette colors in sRGB.
    #[must_use]
    pub fn palette(&self) -> Vec<Srgb<u8>> {
        self.dataset.palette().srgb()
    }

    /// The number of pixels assigned to each palette color.
    #[must_use]
    pub fn counts(&self) -> Vec<u32> {
        self.dataset.populations()
    }

    /// The palette index of each pixel in row-major order.
    #[must_use]
    pub fn indices(&self) -> Vec<u8> {
        self.dataset.indices()
    }

    /// The pixels of a swatch of the palette.
    #[must_use]
    pub fn swatch_pixels(&self, swatch: &Swatch) -> Vec<Srgb<u8>> {
        swatch.pixels(self.dataset.palette())
    }

    /// The pixels of the image with each pixel replaced by its palette color.
    #[must_use]
    pub fn recolored_pixels(&self) -> Vec<Srgb<u8>> {
        render::recolor(&self.dataset)
    }

    /// A swatch of the palette as an [`RgbImage`].
    #[cfg(feature = "image")]
    #[must_use]
    pub fn swatch_rgbimage(&self, swatch: &Swatch) -> RgbImage {
        swatch.rgbimage(self.dataset.palette())
    }

    /// The recolored image as an [`RgbImage`].
    #[cfg(feature = "image")]
    #[must_use]
    pub fn recolored_rgbimage(&self) -> RgbImage {
        render::recolored_rgbimage(&self.dataset)
    }

    /// Parallel version of [`ClusterOutput::recolored_rgbimage`].
    #[cfg(all(feature = "image", feature = "threads"))]
    #[must_use]
    pub fn recolored_rgbimage_par(&self) -> RgbImage {
        render::recolored_rgbimage_par(&self.dataset)
    }
}
