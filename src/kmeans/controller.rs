//! Drives the steps from initialization until convergence or the iteration limit.

use super::{converged, reseed::random_colors, Dataset, Palette, Serial, Steps};
use crate::{ClusterError, KmeansOptions, PaletteSize};

#[cfg(feature = "threads")]
use super::Parallel;

use palette::Lab;
use rand::Rng;
use tracing::{debug, info};

/// Why [`Dataset::run`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// No centroid moved by more than the convergence threshold in the last iteration.
    Converged,
    /// The maximum number of iterations was reached first.
    IterationLimit,
}

/// The result of [`Dataset::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// The number of update rounds that were run.
    pub iterations: u32,
    /// Why the run stopped.
    pub stop: Stop,
    /// The total number of reseed rounds needed during the run.
    pub reseed_rounds: u32,
}

impl RunSummary {
    /// Whether the palette converged before the iteration limit.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.stop == Stop::Converged
    }
}

impl Dataset {
    /// Builds a dataset with `k` random centroids and assigns every sample.
    ///
    /// `colors` are the CIELAB pixel colors in row-major order.
    /// Empty centroids are reseeded until each one has at least one sample.
    ///
    /// # Errors
    /// Returns a configuration error if `k` is `0`, the image is empty, or the dimensions do not
    /// match the number of colors. Returns [`ClusterError::DegenerateInput`] if some centroid is
    /// still empty after [`KmeansOptions::max_reseed_attempts`] reseed rounds.
    pub fn initialize<R: Rng + ?Sized>(
        colors: Vec<Lab>,
        width: u32,
        height: u32,
        k: PaletteSize,
        options: &KmeansOptions,
        rng: &mut R,
    ) -> Result<Self, ClusterError> {
        Self::initialize_with::<Serial, R>(colors, width, height, k, options, rng)
    }

    /// Parallel version of [`Dataset::initialize`].
    ///
    /// # Errors
    /// See [`Dataset::initialize`].
    #[cfg(feature = "threads")]
    pub fn initialize_par<R: Rng + ?Sized>(
        colors: Vec<Lab>,
        width: u32,
        height: u32,
        k: PaletteSize,
        options: &KmeansOptions,
        rng: &mut R,
    ) -> Result<Self, ClusterError> {
        Self::initialize_with::<Parallel, R>(colors, width, height, k, options, rng)
    }

    /// Refines the palette until it converges or `options.max_iterations` is reached.
    ///
    /// Each iteration snapshots the palette, updates the centroids, reseeds empty ones,
    /// reassigns the samples, and compares the palette against the snapshot.
    ///
    /// # Errors
    /// Returns [`ClusterError::DegenerateInput`] if a reseed loop runs out of attempts.
    /// The dataset is still valid in that case, every sample is assigned to its nearest
    /// centroid, but some centroids may have no samples.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        options: &KmeansOptions,
        rng: &mut R,
    ) -> Result<RunSummary, ClusterError> {
        self.run_with::<Serial, R>(options, rng)
    }

    /// Parallel version of [`Dataset::run`].
    ///
    /// # Errors
    /// See [`Dataset::run`].
    #[cfg(feature = "threads")]
    pub fn run_par<R: Rng + ?Sized>(
        &mut self,
        options: &KmeansOptions,
        rng: &mut R,
    ) -> Result<RunSummary, ClusterError> {
        self.run_with::<Parallel, R>(options, rng)
    }

    /// Shared body of [`Dataset::initialize`] and [`Dataset::initialize_par`].
    fn initialize_with<S: Steps, R: Rng + ?Sized>(
        colors: Vec<Lab>,
        width: u32,
        height: u32,
        k: PaletteSize,
        options: &KmeansOptions,
        rng: &mut R,
    ) -> Result<Self, ClusterError> {
        let k = usize::from(k.into_inner());
        if k == 0 {
            return Err(ClusterError::ZeroClusters);
        }

        let palette = Palette::new(random_colors(k, rng))?;
        let mut dataset = Self::new(colors, width, height, palette)?;

        S::assign(&mut dataset);
        let empty = dataset.empty_centroids();
        let rounds =
            match dataset.reseed_until_populated::<S, R>(empty, options.max_reseed_attempts, rng) {
                Ok(rounds) => rounds,
                Err(err) => return Err(err.with_partial(dataset)),
            };

        debug!(k, samples = dataset.samples.len(), reseed_rounds = rounds, "initialized");

        Ok(dataset)
    }

    /// Shared body of [`Dataset::run`] and [`Dataset::run_par`].
    fn run_with<S: Steps, R: Rng + ?Sized>(
        &mut self,
        options: &KmeansOptions,
        rng: &mut R,
    ) -> Result<RunSummary, ClusterError> {
        let mut summary = RunSummary {
            iterations: 0,
            stop: Stop::IterationLimit,
            reseed_rounds: 0,
        };

        while summary.iterations < options.max_iterations {
            let snapshot = self.palette.colors();

            let empty = S::update(self);
            summary.iterations += 1;

            if empty.is_empty() {
                S::assign(self);
            } else {
                // the reseed loop ends on a fresh assignment
                summary.reseed_rounds +=
                    self.reseed_until_populated::<S, R>(empty, options.max_reseed_attempts, rng)?;
            }

            let done = converged(&self.palette, &snapshot, options.convergence_threshold);
            debug!(iteration = summary.iterations, converged = done, "iteration finished");

            if done {
                summary.stop = Stop::Converged;
                break;
            }
        }

        info!(
            k = self.k(),
            iterations = summary.iterations,
            converged = summary.converged(),
            reseed_rounds = summary.reseed_rounds,
            "k-means finished"
        );

        Ok(summary)
    }
}
