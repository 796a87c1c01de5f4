//! The samples, centroids, and palette that k-means operates on.

use crate::{
    colorspace::{self, LabSum},
    AboveMaxLen, ClusterError, PaletteSize, MAX_COLORS, MAX_K,
};

use palette::{Lab, Srgb};

/// One cluster center.
///
/// The index is the centroid's position in its [`Palette`] and never changes.
/// Only the color is updated, either to the mean of the cluster's members or,
/// for an empty cluster, to a new random color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    /// The position of this centroid in its palette.
    index: u8,
    /// The color of this centroid in CIELAB.
    pub color: Lab,
}

impl Centroid {
    /// The position of this centroid in its palette.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.index
    }
}

/// One source pixel: its color and the index of the centroid it belongs to.
///
/// The color is fixed once the sample is created.
/// The cluster is an index into the [`Palette`] rather than a reference,
/// so replacing a centroid's color never invalidates a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// The CIELAB color of the source pixel.
    color: Lab,
    /// The index of the centroid this sample is assigned to.
    pub(crate) cluster: u8,
}

impl Sample {
    /// The CIELAB color of the source pixel.
    #[must_use]
    pub const fn color(&self) -> Lab {
        self.color
    }

    /// The index of the centroid this sample is currently assigned to.
    #[must_use]
    pub const fn cluster(&self) -> u8 {
        self.cluster
    }
}

/// The ordered, fixed size list of `k` centroids.
///
/// Centroids are only ever changed in place, never added, removed, or reordered.
/// Convergence checks rely on this to compare palettes position by position.
#[derive(Debug, Clone, PartialEq)]
#[repr(transparent)]
pub struct Palette(Vec<Centroid>);

impl Palette {
    /// Creates a palette from the given colors, assigning each centroid its position as index.
    ///
    /// # Errors
    /// Returns an error if `colors` is empty or has more than [`MAX_COLORS`] colors.
    pub fn new(colors: Vec<Lab>) -> Result<Self, ClusterError> {
        if colors.is_empty() {
            Err(ClusterError::ZeroClusters)
        } else if colors.len() > MAX_K {
            Err(AboveMaxLen(MAX_COLORS).into())
        } else {
            #[allow(clippy::cast_possible_truncation)]
            let centroids = colors
                .into_iter()
                .enumerate()
                .map(|(i, color)| Centroid { index: i as u8, color })
                .collect();

            Ok(Self(centroids))
        }
    }

    /// The number of centroids, `k`.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The number of centroids as a [`PaletteSize`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn size(&self) -> PaletteSize {
        PaletteSize::from_clamped(self.0.len() as u16)
    }

    /// The centroids in palette order.
    #[must_use]
    pub fn centroids(&self) -> &[Centroid] {
        &self.0
    }

    /// Mutable access to the centroid colors. The palette's length cannot change through this.
    pub(crate) fn centroids_mut(&mut self) -> &mut [Centroid] {
        &mut self.0
    }

    /// A copy of the centroid colors in palette order.
    #[must_use]
    pub fn colors(&self) -> Vec<Lab> {
        self.0.iter().map(|c| c.color).collect()
    }

    /// The centroid colors converted to (clamped) sRGB.
    #[must_use]
    pub fn srgb(&self) -> Vec<Srgb<u8>> {
        self.0.iter().map(|c| colorspace::to_srgb8(c.color)).collect()
    }
}

/// The samples of an image together with the palette being refined.
///
/// This is the unit that the assignment, update, reseed, and convergence steps operate on.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// One sample per pixel in row-major order.
    pub(crate) samples: Vec<Sample>,
    /// The `k` centroids.
    pub(crate) palette: Palette,
    /// The width of the source image.
    width: u32,
    /// The height of the source image.
    height: u32,
}

impl Dataset {
    /// Creates a dataset from CIELAB pixel colors in row-major order and an initial palette.
    ///
    /// Every sample starts out assigned to centroid `0`.
    /// Run [`Dataset::assign`] before relying on the assignments.
    ///
    /// # Errors
    /// Returns an error if there are no colors, or if `width * height` does not equal the
    /// number of colors.
    pub fn new(
        colors: Vec<Lab>,
        width: u32,
        height: u32,
        palette: Palette,
    ) -> Result<Self, ClusterError> {
        if u64::from(width) * u64::from(height) != colors.len() as u64 {
            return Err(ClusterError::DimensionMismatch { width, height, len: colors.len() });
        }
        if colors.is_empty() {
            return Err(ClusterError::EmptyImage);
        }

        let samples = colors
            .into_iter()
            .map(|color| Sample { color, cluster: 0 })
            .collect();

        Ok(Self { samples, palette, width, height })
    }

    /// The samples in row-major pixel order.
    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The current palette.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The number of clusters, `k`.
    #[must_use]
    pub fn k(&self) -> usize {
        self.palette.len()
    }

    /// The `(width, height)` of the source image.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The centroid index of each sample in row-major pixel order.
    #[must_use]
    pub fn indices(&self) -> Vec<u8> {
        self.samples.iter().map(|s| s.cluster).collect()
    }

    /// The number of samples currently assigned to each centroid.
    #[must_use]
    pub fn populations(&self) -> Vec<u32> {
        let mut counts = vec![0; self.palette.len()];
        for sample in &self.samples {
            counts[usize::from(sample.cluster)] += 1;
        }
        counts
    }

    /// The indices of centroids with no samples assigned to them.
    #[must_use]
    pub fn empty_centroids(&self) -> Vec<u8> {
        empty_indices(self.populations().iter().copied())
    }

    /// The sum of the squared distances from each sample to its assigned centroid.
    #[must_use]
    pub fn total_squared_distance(&self) -> f64 {
        let centroids = self.palette.centroids();
        self.samples
            .iter()
            .map(|s| {
                let d = f64::from(colorspace::distance(
                    s.color,
                    centroids[usize::from(s.cluster)].color,
                ));
                d * d
            })
            .sum()
    }

    /// The per-cluster sums of the sample colors, indexed by centroid.
    pub(crate) fn cluster_sums(&self, samples: &[Sample]) -> Vec<LabSum> {
        let mut sums = vec![LabSum::default(); self.palette.len()];
        for sample in samples {
            sums[usize::from(sample.cluster)].add(sample.color);
        }
        sums
    }
}

/// The positions of the zero counts in `counts`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn empty_indices(counts: impl Iterator<Item = u32>) -> Vec<u8> {
    counts
        .enumerate()
        .filter(|&(_, count)| count == 0)
        .map(|(i, _)| i as u8)
        .collect()
}
