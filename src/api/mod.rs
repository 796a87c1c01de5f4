//! Contains the types and functions for the high level pipeline builder API.

mod pipeline;

pub use pipeline::{ClusterOutput, ClusterPipeline};

/// A builder struct to specify the parameters for k-means.
///
/// # Examples
/// ```
/// # use labmeans::KmeansOptions;
/// let options = KmeansOptions::new()
///     .max_iterations(50)
///     .convergence_threshold(1.0)
///     .seed(42);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansOptions {
    /// The maximum number of update rounds.
    pub(crate) max_iterations: u32,
    /// Centroids that move at most this CIE94 distance are considered settled.
    pub(crate) convergence_threshold: f32,
    /// The maximum number of reseed rounds before giving up on empty clusters.
    pub(crate) max_reseed_attempts: u32,
    /// The seed value for the random number generator.
    pub(crate) seed: u64,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl KmeansOptions {
    /// The default maximum number of iterations.
    pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

    /// The default convergence threshold, the low end of "perceptible at a glance".
    pub const DEFAULT_CONVERGENCE_THRESHOLD: f32 = 2.0;

    /// The default maximum number of reseed rounds.
    pub const DEFAULT_MAX_RESEED_ATTEMPTS: u32 = 100;

    /// Creates a new [`KmeansOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            convergence_threshold: Self::DEFAULT_CONVERGENCE_THRESHOLD,
            max_reseed_attempts: Self::DEFAULT_MAX_RESEED_ATTEMPTS,
            seed: 0,
        }
    }

    /// Sets the maximum number of update rounds to run.
    ///
    /// A value of `0` skips refinement entirely and keeps the initial random palette.
    ///
    /// The default is `20`.
    #[must_use]
    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the CIE94 distance up to which a centroid is considered to not have moved.
    ///
    /// Clustering stops early once no centroid moves more than this in one iteration.
    /// Values around `1.0` are imperceptible, values from `2.0` to `10.0` are perceptible at a glance.
    ///
    /// The default is `2.0`.
    #[must_use]
    pub fn convergence_threshold(mut self, threshold: f32) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Sets how many times empty clusters are reseeded before giving up with
    /// [`ClusterError::DegenerateInput`](crate::ClusterError::DegenerateInput).
    ///
    /// The default is `100`.
    #[must_use]
    pub fn max_reseed_attempts(mut self, attempts: u32) -> Self {
        self.max_reseed_attempts = attempts;
        self
    }

    /// Sets the seed value for the random number generator.
    ///
    /// This is only used by pipeline functions that do not take an explicit random source.
    ///
    /// The default seed is `0`.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the maximum number of update rounds.
    #[must_use]
    pub const fn get_max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Returns the convergence threshold.
    #[must_use]
    pub const fn get_convergence_threshold(&self) -> f32 {
        self.convergence_threshold
    }

    /// Returns the maximum number of reseed rounds.
    #[must_use]
    pub const fn get_max_reseed_attempts(&self) -> u32 {
        self.max_reseed_attempts
    }

    /// Returns the random seed.
    #[must_use]
    pub const fn get_seed(&self) -> u64 {
        self.seed
    }
}
