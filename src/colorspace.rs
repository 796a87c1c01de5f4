//! Conversions between sRGB and CIELAB, plus the CIE94 color difference and
//! the arithmetic mean used to recompute cluster centers.
//!
//! All clustering happens in CIELAB (D65 white point, `L*` in `0..=100`).
//! Averaging sRGB directly gives perceptually wrong blends (red and green
//! average to a muddy olive), so centers are averaged per `L*a*b*` axis instead.
//! Note that the true center of a cluster under CIE94 is not, in general,
//! the arithmetic mean of its members. The mean is an accepted approximation.

use crate::ColorSlice;
use palette::{IntoColor, Lab, LinSrgb, Srgb};

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// CIE94 weighting factor for chroma (graphic arts).
const K1: f32 = 0.045;

/// CIE94 weighting factor for hue (graphic arts).
const K2: f32 = 0.015;

/// Converts normalized sRGB channels (each in `[0, 1]`) to CIELAB.
#[must_use]
pub fn to_perceptual(color: Srgb<f32>) -> Lab {
    let linear: LinSrgb = color.into_linear();
    linear.into_color()
}

/// Converts an 8-bit sRGB color to CIELAB.
#[must_use]
pub fn from_srgb8(color: Srgb<u8>) -> Lab {
    to_perceptual(color.into_format())
}

/// Converts 16-bit sRGB channels to CIELAB.
#[must_use]
pub fn from_srgb16(red: u16, green: u16, blue: u16) -> Lab {
    to_perceptual(Srgb::new(red, green, blue).into_format())
}

/// Converts a CIELAB color back to 8-bit sRGB.
///
/// Many CIELAB values have no sRGB counterpart, so each linear channel
/// is clamped to `[0, 1]` before encoding.
#[must_use]
pub fn to_srgb8(color: Lab) -> Srgb<u8> {
    let linear: LinSrgb = color.into_color();
    let linear = LinSrgb::new(
        clamp_channel(linear.red),
        clamp_channel(linear.green),
        clamp_channel(linear.blue),
    );
    linear.into_encoding()
}

/// Clamps a single channel to `[0, 1]`, mapping `NaN` to `0`.
fn clamp_channel(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// The CIE94 color difference between `reference` and `other`,
/// using the graphic arts weights (`kL = kC = kH = 1`, `K1 = 0.045`, `K2 = 0.015`).
///
/// A value of `0` means identical colors, values between `2` and `10` are
/// perceptible at a glance, and values around `100` are opposite colors.
///
/// CIE94 is not symmetric: the chroma weights are derived from `reference`.
#[must_use]
pub fn distance(reference: Lab, other: Lab) -> f32 {
    let delta_l = reference.l - other.l;

    let c1 = reference.a.hypot(reference.b);
    let c2 = other.a.hypot(other.b);
    let delta_c = c1 - c2;

    let delta_a = reference.a - other.a;
    let delta_b = reference.b - other.b;
    // squared hue difference, rounding can push it slightly below zero
    let delta_h2 = (delta_a * delta_a + delta_b * delta_b - delta_c * delta_c).max(0.0);

    let s_c = 1.0 + K1 * c1;
    let s_h = 1.0 + K2 * c1;

    let delta_c = delta_c / s_c;
    (delta_l * delta_l + delta_c * delta_c + delta_h2 / (s_h * s_h)).sqrt()
}

/// Running per-axis totals of CIELAB colors, used to compute their mean.
///
/// Totals are kept in `f64` so that summing millions of pixels does not lose precision.
/// Two partial sums over disjoint sets of colors can be combined with [`LabSum::merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabSum {
    /// Sum of `L*`.
    l: f64,
    /// Sum of `a*`.
    a: f64,
    /// Sum of `b*`.
    b: f64,
    /// Number of colors added.
    count: u32,
}

impl LabSum {
    /// Adds a color to the totals.
    pub fn add(&mut self, color: Lab) {
        self.l += f64::from(color.l);
        self.a += f64::from(color.a);
        self.b += f64::from(color.b);
        self.count += 1;
    }

    /// Combines the totals of another (disjoint) set of colors into `self`.
    pub fn merge(&mut self, other: &Self) {
        self.l += other.l;
        self.a += other.a;
        self.b += other.b;
        self.count += other.count;
    }

    /// The number of colors that have been added.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// The arithmetic mean of each axis, or `None` if no colors were added.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn mean(&self) -> Option<Lab> {
        if self.count == 0 {
            None
        } else {
            let n = f64::from(self.count);
            Some(Lab::new(
                (self.l / n) as f32,
                (self.a / n) as f32,
                (self.b / n) as f32,
            ))
        }
    }
}

impl FromIterator<Lab> for LabSum {
    fn from_iter<I: IntoIterator<Item = Lab>>(iter: I) -> Self {
        let mut sum = Self::default();
        for color in iter {
            sum.add(color);
        }
        sum
    }
}

/// The per-axis arithmetic mean of `colors`, or `None` if `colors` is empty.
#[must_use]
pub fn mean(colors: impl IntoIterator<Item = Lab>) -> Option<Lab> {
    colors.into_iter().collect::<LabSum>().mean()
}

/// Converts every color in `colors` to CIELAB.
pub(crate) fn convert_color_slice(colors: ColorSlice<Srgb<u8>>) -> Vec<Lab> {
    colors.iter().copied().map(from_srgb8).collect()
}

/// Converts every color in `colors` to CIELAB in parallel.
#[cfg(feature = "threads")]
pub(crate) fn convert_color_slice_par(colors: ColorSlice<Srgb<u8>>) -> Vec<Lab> {
    colors.par_iter().copied().map(from_srgb8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn identical_colors_have_zero_distance() {
        for &color in &test_data_256() {
            let lab = from_srgb8(color);
            assert!(distance(lab, lab).abs() < 1e-6);
        }
    }

    #[test]
    fn distance_is_non_negative() {
        let colors = test_data_256();
        for pair in colors.windows(2) {
            let d = distance(from_srgb8(pair[0]), from_srgb8(pair[1]));
            assert!(d >= 0.0 && d.is_finite());
        }
    }

    #[test]
    fn black_and_white_are_maximally_different() {
        let black = from_srgb8(Srgb::new(0, 0, 0));
        let white = from_srgb8(Srgb::new(255, 255, 255));
        let d = distance(black, white);
        assert!((d - 100.0).abs() < 0.5, "distance was {d}");
    }

    #[test]
    fn lightness_difference_is_unweighted() {
        let a = Lab::new(50.0, 0.0, 0.0);
        let b = Lab::new(53.0, 0.0, 0.0);
        assert!((distance(a, b) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn chroma_difference_is_weighted_by_reference() {
        let reference = Lab::new(50.0, 40.0, 0.0);
        let other = Lab::new(50.0, 30.0, 0.0);
        let expected = 10.0 / (1.0 + K1 * 40.0);
        assert!((distance(reference, other) - expected).abs() < 1e-4);
    }

    #[test]
    fn srgb_round_trips_through_lab() {
        for &color in &test_data_256() {
            let back = to_srgb8(from_srgb8(color));
            assert!(back.red.abs_diff(color.red) <= 1);
            assert!(back.green.abs_diff(color.green) <= 1);
            assert!(back.blue.abs_diff(color.blue) <= 1);
        }
    }

    #[test]
    fn out_of_gamut_colors_are_clamped() {
        let srgb = to_srgb8(Lab::new(100.0, 127.0, -127.0));
        assert_eq!(srgb.red, 255);
        assert_eq!(srgb.blue, 255);

        let srgb = to_srgb8(Lab::new(-20.0, 0.0, 0.0));
        assert_eq!(srgb, Srgb::new(0, 0, 0));
    }

    #[test]
    fn sixteen_bit_matches_eight_bit() {
        let eight = from_srgb8(Srgb::new(255, 0, 0));
        let sixteen = from_srgb16(u16::MAX, 0, 0);
        assert!(distance(eight, sixteen) < 1e-3);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(std::iter::empty()), None);
    }

    #[test]
    fn mean_is_per_axis() {
        let colors = [Lab::new(10.0, -20.0, 30.0), Lab::new(30.0, 20.0, -10.0)];
        let mean = mean(colors).unwrap();
        assert!((mean.l - 20.0).abs() < 1e-6);
        assert!(mean.a.abs() < 1e-6);
        assert!((mean.b - 10.0).abs() < 1e-6);
    }

    #[test]
    fn merged_sums_match_single_sum() {
        let colors = test_data_1024()
            .into_iter()
            .map(from_srgb8)
            .collect::<Vec<_>>();

        let whole = colors.iter().copied().collect::<LabSum>();

        let (left, right) = colors.split_at(300);
        let mut merged = left.iter().copied().collect::<LabSum>();
        merged.merge(&right.iter().copied().collect());

        assert_eq!(whole.count(), merged.count());
        let (a, b) = (whole.mean().unwrap(), merged.mean().unwrap());
        assert!(distance(a, b) < 1e-4);
    }
}
