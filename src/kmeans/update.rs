//! The update step: each centroid moves to the mean of its members.

use super::{dataset::empty_indices, Dataset};
use crate::colorspace::LabSum;

#[cfg(feature = "threads")]
use rayon::prelude::*;

impl Dataset {
    /// Moves each centroid to the mean color of the samples assigned to it.
    ///
    /// Centroids with no assigned samples keep their color and their indices are returned.
    /// Samples are not reassigned, so run [`Dataset::assign`] afterwards.
    pub fn update(&mut self) -> Vec<u8> {
        let sums = self.cluster_sums(&self.samples);
        self.apply_sums(&sums)
    }

    /// Parallel version of [`Dataset::update`].
    ///
    /// Each thread sums a disjoint chunk of the samples and the partial sums are then merged.
    /// Emptiness is decided from the merged sums only.
    #[cfg(feature = "threads")]
    pub fn update_par(&mut self) -> Vec<u8> {
        let chunk_size = self
            .samples
            .len()
            .div_ceil(rayon::current_num_threads())
            .max(1);

        let sums = self
            .samples
            .par_chunks(chunk_size)
            .map(|chunk| self.cluster_sums(chunk))
            .reduce_with(merge_partial)
            .unwrap_or_else(|| vec![LabSum::default(); self.k()]);

        self.apply_sums(&sums)
    }

    /// Writes the mean of each non-empty cluster into its centroid
    /// and returns the indices of the empty ones.
    fn apply_sums(&mut self, sums: &[LabSum]) -> Vec<u8> {
        for (centroid, sum) in self.palette.centroids_mut().iter_mut().zip(sums) {
            if let Some(mean) = sum.mean() {
                centroid.color = mean;
            }
        }
        empty_indices(sums.iter().map(LabSum::count))
    }
}

/// Merges two sets of per-cluster partial sums.
#[cfg(feature = "threads")]
#[allow(clippy::needless_pass_by_value)]
fn merge_partial(mut sums: Vec<LabSum>, other: Vec<LabSum>) -> Vec<LabSum> {
    for (sum, other) in sums.iter_mut().zip(&other) {
        sum.merge(other);
    }
    sums
}

#[cfg(test)]
mod tests {
    use crate::{
        colorspace::{self, from_srgb8},
        kmeans::{Dataset, Palette},
        tests::*,
    };
    use palette::Lab;

    fn gray(l: f32) -> Lab {
        Lab::new(l, 0.0, 0.0)
    }

    #[test]
    fn centroids_move_to_member_mean() {
        let palette = Palette::new(vec![gray(0.0), gray(100.0)]).unwrap();
        let colors = vec![gray(10.0), gray(20.0), gray(80.0), gray(90.0)];
        let mut dataset = Dataset::new(colors, 2, 2, palette).unwrap();
        dataset.assign();

        let empty = dataset.update();
        assert!(empty.is_empty());

        let colors = dataset.palette().colors();
        assert!((colors[0].l - 15.0).abs() < 1e-5);
        assert!((colors[1].l - 85.0).abs() < 1e-5);
    }

    #[test]
    fn empty_centroids_are_reported_and_unchanged() {
        let palette = Palette::new(vec![gray(0.0), gray(50.0), gray(100.0)]).unwrap();
        let colors = vec![gray(5.0), gray(95.0)];
        let mut dataset = Dataset::new(colors, 2, 1, palette).unwrap();
        dataset.assign();

        let empty = dataset.update();
        assert_eq!(empty, vec![1]);
        assert_eq!(dataset.palette().colors()[1], gray(50.0));
        assert_eq!(dataset.k(), 3);
    }

    #[test]
    fn update_then_assign_does_not_increase_error() {
        // grays make CIE94 reduce to the lightness difference,
        // where the mean is the exact least squares center
        let colors = (0u8..64)
            .map(|i| from_srgb8(palette::Srgb::new(i * 4, i * 4, i * 4)))
            .collect();
        let palette = Palette::new(vec![gray(5.0), gray(30.0), gray(60.0), gray(95.0)]).unwrap();
        let mut dataset = Dataset::new(colors, 8, 8, palette).unwrap();
        dataset.assign();

        let mut previous = dataset.total_squared_distance();
        for _ in 0..10 {
            let _ = dataset.update();
            dataset.assign();
            let current = dataset.total_squared_distance();
            assert!(current <= previous + 1e-3, "{current} > {previous}");
            previous = current;
        }
    }

    #[cfg(feature = "threads")]
    #[test]
    fn parallel_matches_serial() {
        let colors = test_data_1024().into_iter().map(from_srgb8).collect();
        let centroids = test_data_256()[..16].iter().copied().map(from_srgb8).collect();
        let mut serial = Dataset::new(colors, 32, 32, Palette::new(centroids).unwrap()).unwrap();
        serial.assign();
        let mut parallel = serial.clone();

        assert_eq!(serial.update(), parallel.update_par());
        for (a, b) in serial
            .palette()
            .colors()
            .into_iter()
            .zip(parallel.palette().colors())
        {
            assert!(colorspace::distance(a, b) < 1e-3);
        }
    }
}
