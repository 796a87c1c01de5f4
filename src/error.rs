//! The error type returned by clustering.

use crate::{kmeans::Dataset, AboveMaxLen};
use thiserror::Error;

/// Errors that can occur before or during clustering.
///
/// Every variant except [`ClusterError::DegenerateInput`] is a configuration error
/// that is reported before any clustering work is done.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// The requested number of clusters was zero.
    #[error("the number of clusters must be at least 1")]
    ZeroClusters,

    /// The requested number of clusters is above [`MAX_COLORS`](crate::MAX_COLORS).
    #[error("too many clusters: {0}")]
    TooManyClusters(#[from] AboveMaxLen<u16>),

    /// The image has more than [`MAX_PIXELS`](crate::MAX_PIXELS) pixels.
    #[error("too many pixels: {0}")]
    TooManyPixels(#[from] AboveMaxLen<u32>),

    /// The image has no pixels to cluster.
    #[error("the image has no pixels")]
    EmptyImage,

    /// `width * height` does not match the number of pixels provided.
    #[error("a {width}x{height} image cannot hold {len} pixels")]
    DimensionMismatch {
        /// The image width.
        width: u32,
        /// The image height.
        height: u32,
        /// The number of pixels provided.
        len: usize,
    },

    /// Empty clusters were still present after the maximum number of reseed attempts.
    ///
    /// This usually means the image has fewer distinct colors than `k`.
    /// Retrying with a smaller `k` will likely succeed.
    /// Alternatively, the partial clustering can be kept, see [`ClusterError::into_partial`].
    #[error("{k} clusters still had empty members after {attempts} reseed attempts, the image may have fewer than {k} distinct colors")]
    DegenerateInput {
        /// The number of clusters requested.
        k: u16,
        /// The number of reseed rounds that were tried.
        attempts: u32,
        /// The dataset as it was when reseeding gave up, if the failing call owned it.
        ///
        /// Every sample is assigned to its nearest centroid, but some centroids have no samples.
        partial: Option<Box<Dataset>>,
    },
}

impl ClusterError {
    /// Whether the caller can recover by accepting fewer clusters.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateInput { .. })
    }

    /// The partial clustering left behind by [`ClusterError::DegenerateInput`], if any.
    #[must_use]
    pub fn partial(&self) -> Option<&Dataset> {
        match self {
            Self::DegenerateInput { partial, .. } => partial.as_deref(),
            _ => None,
        }
    }

    /// Takes the partial clustering out of [`ClusterError::DegenerateInput`], if any.
    ///
    /// [`Dataset::initialize`] and the [`ClusterPipeline`](crate::ClusterPipeline) run methods
    /// attach the dataset they were working on. [`Dataset::run`] does not, since the caller
    /// still holds that dataset.
    #[must_use]
    pub fn into_partial(self) -> Option<Dataset> {
        match self {
            Self::DegenerateInput { partial, .. } => partial.map(|dataset| *dataset),
            _ => None,
        }
    }

    /// Attaches `dataset` as the partial clustering of a [`ClusterError::DegenerateInput`].
    /// Other errors are returned unchanged.
    pub(crate) fn with_partial(self, dataset: Dataset) -> Self {
        match self {
            Self::DegenerateInput { k, attempts, .. } => Self::DegenerateInput {
                k,
                attempts,
                partial: Some(Box::new(dataset)),
            },
            err => err,
        }
    }
}
