use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use histeq_rust::{Equalizer, EqualizerConfig, PixelBuffer, Strategy};
use image::RgbImage;
use tracing::info;
use tracing::level_filters::LevelFilter;

/// Histogram-equalize an RGB image and report the mean running time.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Image to read (any format the `image` crate decodes; alpha is dropped)
    input: PathBuf,
    /// Where to write the equalized image
    output: PathBuf,
    /// sequential, channel-parallel, spatial-shared, spatial-local, or all
    #[clap(long, short, default_value = "spatial-local")]
    strategy: String,
    /// Row partitions for the spatial strategies (default: thread count)
    #[clap(long, short)]
    workers: Option<u32>,
    /// Size of a dedicated thread pool (default: one thread per core)
    #[clap(long, short)]
    threads: Option<usize>,
    /// Number of timed runs to average
    #[clap(long, short, default_value_t = 1)]
    repeat: u32,
    /// Log each phase (-v) or each partition (-vv)
    #[clap(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn strategies(arg: &str) -> Result<Vec<Strategy>, Box<dyn Error>> {
    if arg.eq_ignore_ascii_case("all") {
        Ok(Strategy::ALL.to_vec())
    } else {
        Ok(vec![arg.parse::<Strategy>()?])
    }
}

/// Run `strategy` `repeat` times and return the last result with the mean ms.
fn timed(
    strategy: Strategy,
    args: &Args,
    input: &PixelBuffer,
) -> Result<(PixelBuffer, f64), Box<dyn Error>> {
    let equalizer = Equalizer::new(EqualizerConfig {
        strategy,
        workers: args.workers,
        threads: args.threads,
    })?;

    let mut output = input.allocate_like();
    let start = Instant::now();
    for _ in 0..args.repeat {
        equalizer.equalize_into(input, &mut output)?;
    }
    let mean_ms = start.elapsed().as_secs_f64() * 1000.0 / f64::from(args.repeat);
    Ok((output, mean_ms))
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    if args.repeat == 0 {
        return Err("--repeat must be at least 1".into());
    }
    let strategies = strategies(&args.strategy)?;

    let img = image::open(&args.input)?.into_rgb8();
    info!("Opened image {} ({}x{})", args.input.display(), img.width(), img.height());
    let input = PixelBuffer::from_interleaved(img.width(), img.height(), img.as_raw())?;

    let mut results = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        info!("Running {strategy}...");
        let (output, mean_ms) = timed(strategy, &args, &input)?;
        println!("Average time ({strategy}, {} runs): {mean_ms:.2} ms", args.repeat);
        results.push((strategy, output));
    }

    // every strategy must agree with the first one
    if let Some(((first, reference), rest)) = results.split_first() {
        for (strategy, output) in rest {
            if output != reference {
                return Err(format!("{strategy} output differs from {first}").into());
            }
        }
    }

    let written = results
        .iter()
        .find(|(strategy, _)| *strategy == Strategy::SpatialLocal)
        .or_else(|| results.first())
        .map(|(_, output)| output)
        .ok_or("no strategy ran")?;

    let out = RgbImage::from_raw(written.width(), written.height(), written.to_interleaved())
        .ok_or("equalized buffer does not match image dimensions")?;
    out.save(&args.output)?;
    info!("Image written to {}. Done", args.output.display());
    Ok(())
}
