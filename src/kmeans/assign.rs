//! The assignment step: each sample moves to its nearest centroid.

use super::{Centroid, Dataset, Sample};
use crate::colorspace;

use palette::Lab;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Returns the index of the centroid nearest to `color` under CIE94.
///
/// Ties go to the lowest index, so the result only depends on the palette order.
/// `centroids` must not be empty.
#[inline]
#[must_use]
pub fn nearest_centroid(color: Lab, centroids: &[Centroid]) -> u8 {
    let mut min_index = 0;
    let mut min_distance = f32::INFINITY;
    for centroid in centroids {
        let distance = colorspace::distance(color, centroid.color);
        if distance < min_distance {
            min_distance = distance;
            min_index = centroid.index();
        }
    }
    min_index
}

/// Reassigns each sample in `samples` to its nearest centroid.
fn assign_chunk(samples: &mut [Sample], centroids: &[Centroid]) {
    for sample in samples {
        sample.cluster = nearest_centroid(sample.color(), centroids);
    }
}

impl Dataset {
    /// Assigns every sample to its nearest centroid.
    ///
    /// The palette is left unchanged.
    pub fn assign(&mut self) {
        let Self { samples, palette, .. } = self;
        assign_chunk(samples, palette.centroids());
    }

    /// Assigns every sample to its nearest centroid in parallel.
    ///
    /// The samples are split into disjoint chunks, one per thread,
    /// and the palette is only read, so the result is identical to [`Dataset::assign`].
    #[cfg(feature = "threads")]
    pub fn assign_par(&mut self) {
        let Self { samples, palette, .. } = self;
        let centroids = palette.centroids();
        let chunk_size = samples.len().div_ceil(rayon::current_num_threads()).max(1);
        samples
            .par_chunks_mut(chunk_size)
            .for_each(|chunk| assign_chunk(chunk, centroids));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        colorspace::from_srgb8,
        kmeans::{Dataset, Palette},
        tests::*,
    };

    fn dataset() -> Dataset {
        let colors = test_data_1024().into_iter().map(from_srgb8).collect();
        let centroids = test_data_256()[..13].iter().copied().map(from_srgb8).collect();
        Dataset::new(colors, 32, 32, Palette::new(centroids).unwrap()).unwrap()
    }

    #[test]
    fn every_sample_is_nearest() {
        let mut dataset = dataset();
        dataset.assign();

        let centroids = dataset.palette().centroids();
        for sample in dataset.samples() {
            let assigned = colorspace::distance(
                sample.color(),
                centroids[usize::from(sample.cluster())].color,
            );
            for centroid in centroids {
                assert!(assigned <= colorspace::distance(sample.color(), centroid.color) + 1e-4);
            }
        }
    }

    #[test]
    fn assignments_are_in_range() {
        let mut dataset = dataset();
        dataset.assign();
        let k = dataset.k();
        assert!(dataset.samples().iter().all(|s| usize::from(s.cluster()) < k));
    }

    #[test]
    fn ties_go_to_lowest_index() {
        let color = Lab::new(50.0, 10.0, 10.0);
        let palette = Palette::new(vec![Lab::new(0.0, 0.0, 0.0), color, color, color]).unwrap();
        assert_eq!(nearest_centroid(color, palette.centroids()), 1);
    }

    #[test]
    fn assignment_does_not_touch_palette() {
        let mut dataset = dataset();
        let before = dataset.palette().clone();
        dataset.assign();
        assert_eq!(&before, dataset.palette());
        assert_eq!(before.len(), dataset.k());
    }

    #[cfg(feature = "threads")]
    #[test]
    fn parallel_matches_serial() {
        let mut serial = dataset();
        let mut parallel = serial.clone();
        serial.assign();
        parallel.assign_par();
        assert_eq!(serial.indices(), parallel.indices());
    }
}
