#![allow(dead_code)]

use std::sync::OnceLock;

use image::RgbImage;
use labmeans::colorspace;
use palette::Lab;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// A smooth two axis gradient with some per-pixel noise, a stand-in for a photo.
pub fn gradient_image(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |x, y| {
        let noise = rng.gen_range(0..16u8);
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = 255 - r / 2 - g / 2;
        image::Rgb([r.saturating_add(noise), g.saturating_add(noise), b.saturating_sub(noise)])
    })
}

/// Converts every pixel of `image` to CIELAB.
pub fn to_lab(image: &RgbImage) -> Vec<Lab> {
    image
        .pixels()
        .map(|p| colorspace::from_srgb8(palette::Srgb::new(p.0[0], p.0[1], p.0[2])))
        .collect()
}

static IMAGES: OnceLock<Vec<(String, RgbImage)>> = OnceLock::new();

pub fn bench_images() -> &'static [(String, RgbImage)] {
    IMAGES.get_or_init(|| {
        [(256, 256), (640, 480), (1280, 720)]
            .into_iter()
            .enumerate()
            .map(|(seed, (w, h))| (format!("{w}x{h}"), gradient_image(w, h, seed as u64)))
            .collect()
    })
}
