#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::Parser;
use labmeans::{
    kmeans::{Dataset, RunSummary},
    render::{self, Swatch},
    ClusterError, ClusterPipeline, KmeansOptions, PaletteSize,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
pub struct Options {
    /// Number of colors in the palette.
    #[arg(short, long, default_value_t = PaletteSize::default(), value_parser = parse_palette_size)]
    k: PaletteSize,

    /// Maximum number of k-means iterations.
    #[arg(short, long, default_value_t = KmeansOptions::DEFAULT_MAX_ITERATIONS)]
    iterations: u32,

    /// CIE94 distance up to which centroids count as settled.
    #[arg(long, default_value_t = KmeansOptions::DEFAULT_CONVERGENCE_THRESHOLD)]
    threshold: f32,

    /// Maximum number of reseed rounds for empty clusters.
    #[arg(long, default_value_t = KmeansOptions::DEFAULT_MAX_RESEED_ATTEMPTS)]
    reseed_attempts: u32,

    /// Random seed, a random one is used if not given.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of threads, 0 uses all cores.
    #[arg(short, long, default_value_t = 0)]
    threads: u8,

    /// Swatch block size in pixels.
    #[arg(long, default_value_t = Swatch::DEFAULT_BLOCK_SIZE)]
    block_size: u32,

    /// Where to write the palette swatch.
    #[arg(long, default_value = "colorswatch.png")]
    swatch: PathBuf,

    /// Where to write the recolored image.
    #[arg(short, long, default_value = "colorblend.png")]
    output: PathBuf,

    /// Lower k and retry when the image has too few distinct colors.
    #[arg(long)]
    fallback: bool,

    /// Keep the clusters found so far when the image has too few distinct colors.
    #[arg(long, conflicts_with = "fallback")]
    accept_partial: bool,

    #[arg(long)]
    verbose: bool,

    /// The image to read. Prompts for a file name if not given.
    input: Option<PathBuf>,
}

fn parse_palette_size(s: &str) -> Result<PaletteSize, String> {
    let value: u16 = s.parse().map_err(|e| format!("{e}"))?;
    value.try_into().map_err(|e| format!("{e}"))
}

fn prompt_input() -> io::Result<PathBuf> {
    print!("enter image name: ");
    io::stdout().flush()?;
    let mut name = String::new();
    io::stdin().lock().read_line(&mut name)?;
    Ok(PathBuf::from(name.trim()))
}

fn main() -> Result<(), Box<dyn Error>> {
    let Options {
        k,
        iterations,
        threshold,
        reseed_attempts,
        seed,
        threads,
        block_size,
        swatch,
        output,
        fallback,
        accept_partial,
        verbose,
        input,
    } = Options::parse();

    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    macro_rules! log {
        ($name: literal, $val: expr) => {{
            let time = std::time::Instant::now();
            let value = $val;
            info!(elapsed_ms = time.elapsed().as_millis(), "{} finished", $name);
            value
        }};
    }

    let input = match input {
        Some(input) => input,
        None => prompt_input()?,
    };

    let image = log!("read image", image::open(&input)?.into_rgb8());

    let seed = seed.unwrap_or_else(rand::random);
    let options = KmeansOptions::new()
        .max_iterations(iterations)
        .convergence_threshold(threshold)
        .max_reseed_attempts(reseed_attempts)
        .seed(seed);

    info!(input = %input.display(), k = %k, seed, "clustering");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.into())
        .build()?;

    let mut k = k;
    let result = loop {
        let pipeline = ClusterPipeline::try_from(&image)?
            .palette_size(k)
            .options(options.clone());

        match log!("clustering", pool.install(|| pipeline.run_par())) {
            Err(err @ ClusterError::DegenerateInput { .. }) if fallback && k.into_inner() > 1 => {
                warn!(%err, "retrying with fewer clusters");
                k = PaletteSize::from_clamped(k.into_inner() - 1);
            }
            result => break result,
        }
    };

    let (dataset, summary) = match result {
        Ok(output) => (output.dataset, Some(output.summary)),
        Err(err) if accept_partial && err.is_degenerate() => {
            warn!(%err, "keeping the partial clustering");
            let dataset = err
                .into_partial()
                .ok_or("clustering gave up without a partial result")?;
            (dataset, None)
        }
        Err(err) => return Err(err.into()),
    };

    print_centroids(&dataset, summary);

    let swatch_image = Swatch::new().block_size(block_size).rgbimage(dataset.palette());
    log!("write swatch", swatch_image.save(&swatch)?);

    let recolored = pool.install(|| render::recolored_rgbimage_par(&dataset));
    log!("write recolored image", recolored.save(&output)?);

    Ok(())
}

fn print_centroids(dataset: &Dataset, summary: Option<RunSummary>) {
    match summary {
        Some(summary) => println!(
            "{} iterations, {}",
            summary.iterations,
            if summary.converged() { "converged" } else { "iteration limit reached" }
        ),
        None => println!("partial clustering, some colors have no pixels"),
    }

    let palette = dataset.palette().srgb();
    for (i, (color, count)) in palette.iter().zip(dataset.populations()).enumerate() {
        println!(
            "{i:>3}: #{:02x}{:02x}{:02x} {count:>10}",
            color.red, color.green, color.blue
        );
    }
}
