//! Detects when the palette has stopped moving.

use super::Palette;
use crate::colorspace;

use palette::Lab;

/// Whether no centroid moved by more than `threshold` since `snapshot` was taken.
///
/// Centroids are compared by position, index `i` of `palette` against index `i` of
/// `snapshot`. This is only valid because centroids are never reordered.
/// An empty `snapshot` means there is nothing to compare against yet,
/// so the palette is never considered converged in that case.
#[must_use]
pub fn converged(palette: &Palette, snapshot: &[Lab], threshold: f32) -> bool {
    if snapshot.is_empty() {
        return false;
    }

    debug_assert_eq!(palette.len(), snapshot.len());

    palette
        .centroids()
        .iter()
        .zip(snapshot)
        .all(|(centroid, &old)| colorspace::distance(old, centroid.color) <= threshold)
}
