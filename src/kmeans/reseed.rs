//! Random replacement colors for empty centroids.

use super::{Dataset, Steps};
use crate::{colorspace, ClusterError};

use palette::{Lab, Srgb};
use rand::{prelude::Distribution, Rng};
use rand_distr::Uniform;
use tracing::{debug, warn};

/// A random color, drawn as three independent uniform sRGB channels in `[0, 1]`.
#[must_use]
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Lab {
    let channel = Uniform::new_inclusive(0.0f32, 1.0);
    let red = channel.sample(rng);
    let green = channel.sample(rng);
    let blue = channel.sample(rng);
    colorspace::to_perceptual(Srgb::new(red, green, blue))
}

/// `k` random colors.
pub(crate) fn random_colors<R: Rng + ?Sized>(k: usize, rng: &mut R) -> Vec<Lab> {
    (0..k).map(|_| random_color(rng)).collect()
}

impl Dataset {
    /// Replaces the color of each centroid in `empty` with a new random color.
    ///
    /// The palette keeps its length and order. Samples are not reassigned.
    /// Indices that are not in the palette are ignored.
    pub fn reseed<R: Rng + ?Sized>(&mut self, empty: &[u8], rng: &mut R) {
        let centroids = self.palette.centroids_mut();
        for &i in empty {
            if let Some(centroid) = centroids.get_mut(usize::from(i)) {
                centroid.color = random_color(rng);
            }
        }
    }

    /// Reseeds and reassigns until no centroid is empty.
    ///
    /// A reseeded centroid can steal every sample of another centroid,
    /// so emptiness is checked again after each reassignment.
    /// Returns the number of reseed rounds that were needed.
    ///
    /// # Errors
    /// Returns [`ClusterError::DegenerateInput`] if centroids are still empty after
    /// `max_attempts` rounds.
    pub(crate) fn reseed_until_populated<S: Steps, R: Rng + ?Sized>(
        &mut self,
        mut empty: Vec<u8>,
        max_attempts: u32,
        rng: &mut R,
    ) -> Result<u32, ClusterError> {
        let mut attempts = 0;
        while !empty.is_empty() {
            if attempts == max_attempts {
                warn!(k = self.k(), empty = empty.len(), attempts, "reseed attempts exhausted");
                return Err(ClusterError::DegenerateInput {
                    k: self.palette.size().into_inner(),
                    attempts,
                    partial: None,
                });
            }

            debug!(round = attempts + 1, empty = empty.len(), "reseeding empty centroids");
            self.reseed(&empty, rng);
            S::assign(self);
            empty = self.empty_centroids();
            attempts += 1;
        }
        Ok(attempts)
    }
}
