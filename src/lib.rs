//! A library to reduce an image to a palette of `k` colors with k-means clustering in CIELAB.
//!
//! Pixels are converted to CIELAB and compared with the CIE94 color difference,
//! so clusters follow perceived color differences rather than raw sRGB distances.
//! The result is a palette, a per-pixel assignment into it, and helpers to render
//! a palette swatch and a recolored image.
//!
//! # Features
//! To reduce dependencies and compile times, `labmeans` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes parallel versions of the assignment and update steps via [`rayon`].
//! - `image`: enables integration with the [`image`] crate.
//!
//! # High-Level API
//! To get started with the high-level API, see [`ClusterPipeline`]:
//! ```no_run
//! # use labmeans::{ClusterPipeline, KmeansOptions, render::Swatch};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("some image")?.into_rgb8();
//!
//! let output = ClusterPipeline::try_from(&img)?
//!     .palette_size(6)
//!     .options(KmeansOptions::new().max_iterations(20).seed(42))
//!     .run_par()?;
//!
//! output.swatch_rgbimage(&Swatch::new()).save("colorswatch.png")?;
//! output.recolored_rgbimage_par().save("colorblend.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Low-Level API
//! The individual k-means steps are available on [`kmeans::Dataset`],
//! and the color conversions and CIE94 distance are in [`colorspace`].
//! All randomness comes from a caller supplied [`rand::Rng`], so runs are reproducible.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod api;
mod error;
mod types;

pub mod colorspace;
pub mod kmeans;
pub mod render;

pub use api::*;
pub use error::ClusterError;
pub use types::*;

/// The maximum supported image size in number of pixels is `u32::MAX`.
pub const MAX_PIXELS: u32 = u32::MAX;

/// The maximum supported number of clusters is `256`.
pub const MAX_COLORS: u16 = u8::MAX as u16 + 1;

/// `MAX_COLORS` as a `usize` for array and `Vec` lengths.
pub(crate) const MAX_K: usize = MAX_COLORS as usize;

#[cfg(test)]
pub(crate) mod tests {
    use palette::Srgb;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    /// A seeded random number generator for reproducible tests.
    pub fn rng(seed: u64) -> Xoroshiro128PlusPlus {
        Xoroshiro128PlusPlus::seed_from_u64(seed)
    }

    fn test_data(len: usize, seed: u64) -> Vec<Srgb<u8>> {
        let mut rng = rng(seed);
        (0..len)
            .map(|_| Srgb::new(rng.gen(), rng.gen(), rng.gen()))
            .collect()
    }

    /// 256 pseudo random colors.
    pub fn test_data_256() -> Vec<Srgb<u8>> {
        test_data(256, 256)
    }

    /// 1024 pseudo random colors, a 32x32 image.
    pub fn test_data_1024() -> Vec<Srgb<u8>> {
        test_data(1024, 1024)
    }

    /// Asserts that each channel differs by at most one.
    pub fn assert_srgb_near(expected: Srgb<u8>, actual: Srgb<u8>) {
        assert!(
            expected.red.abs_diff(actual.red) <= 1
                && expected.green.abs_diff(actual.green) <= 1
                && expected.blue.abs_diff(actual.blue) <= 1,
            "expected {expected:?}, got {actual:?}"
        );
    }
}
