//! Lloyd's k-means in CIELAB using the CIE94 color difference.
//!
//! A run has two stages:
//! - [`Dataset::initialize`] converts pixels to samples, draws `k` random centroids,
//!   assigns every sample, and reseeds until no centroid is empty.
//! - [`Dataset::run`] then repeats update, reseed (if needed), assignment, and a convergence
//!   check until the centroids stop moving or the iteration limit is reached.
//!
//! Each step is also exposed on its own ([`Dataset::assign`], [`Dataset::update`],
//! [`Dataset::reseed`], [`converged`]) for callers that want to drive the loop themselves.
//!
//! With the `threads` feature, the `_par` variants split assignment and the
//! per-cluster sums across threads. They produce the same assignments as the serial versions.

mod assign;
mod controller;
mod convergence;
mod dataset;
mod reseed;
mod update;

pub use assign::nearest_centroid;
pub use controller::{RunSummary, Stop};
pub use convergence::converged;
pub use dataset::{Centroid, Dataset, Palette, Sample};
pub use reseed::random_color;

/// The assignment and update steps, either serial or parallel.
pub(crate) trait Steps {
    /// Assigns every sample to its nearest centroid.
    fn assign(dataset: &mut Dataset);

    /// Moves centroids to their member means and returns the empty ones.
    fn update(dataset: &mut Dataset) -> Vec<u8>;
}

/// Runs each step on the calling thread.
pub(crate) struct Serial;

impl Steps for Serial {
    fn assign(dataset: &mut Dataset) {
        dataset.assign();
    }

    fn update(dataset: &mut Dataset) -> Vec<u8> {
        dataset.update()
    }
}

/// Runs each step on the `rayon` thread pool.
#[cfg(feature = "threads")]
pub(crate) struct Parallel;

#[cfg(feature = "threads")]
impl Steps for Parallel {
    fn assign(dataset: &mut Dataset) {
        dataset.assign_par();
    }

    fn update(dataset: &mut Dataset) -> Vec<u8> {
        dataset.update_par()
    }
}
