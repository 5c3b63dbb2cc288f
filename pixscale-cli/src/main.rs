use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pixscale::config::JobFile;
use pixscale::pixel::{argb_from_rgba_bytes, rgba_bytes_from_argb};
use pixscale::{scale_image, scale_image_proportionally};
use pixscale::{Extent, ImageHost, MemoryHost, PixelBuffer, Rect, ScaleSize, ScaleType};

/// Image scaling CLI — nearest-neighbour and bilinear resampling of PNG/JPEG images
#[derive(Parser)]
#[command(name = "pixscale", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scale a single image
    Scale {
        /// Input image (PNG or JPEG)
        input: String,
        /// Output image; format follows the extension
        output: String,
        /// Target width in pixels (requires --height)
        #[arg(long, requires = "height", conflicts_with = "factor")]
        width: Option<u32>,
        /// Target height in pixels (requires --width)
        #[arg(long, requires = "width", conflicts_with = "factor")]
        height: Option<u32>,
        /// Uniform scale factor
        #[arg(short, long)]
        factor: Option<f64>,
        /// Resampling method: nearest, bilinear
        #[arg(short, long, default_value = "bilinear")]
        method: String,
        /// Source region as left,top,width,height
        #[arg(long)]
        rect: Option<String>,
        /// Print a JSON summary
        #[arg(long)]
        json: bool,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Run every job in a TOML job file
    Batch {
        /// Path to the job file
        jobs: String,
        /// Print a JSON summary
        #[arg(long)]
        json: bool,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Serialize)]
struct OutputResult {
    input: String,
    output: String,
    method: String,
    source: Extent,
    #[serde(skip_serializing_if = "Option::is_none")]
    rect: Option<Rect>,
    scaled: Extent,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scale {
            input,
            output,
            width,
            height,
            factor,
            method,
            rect,
            json,
            pretty,
        } => {
            let size = match (width, height, factor) {
                (Some(width), Some(height), None) => ScaleSize::Explicit { width, height },
                (None, None, Some(f)) => ScaleSize::Factor(f),
                _ => bail!("give either --width and --height, or --factor"),
            };
            let method: ScaleType = method.parse()?;
            let rect = rect.as_deref().map(parse_rect).transpose()?;
            let result = run_job(&input, &output, size, method, rect)?;
            emit(&[result], json, pretty)
        }
        Command::Batch { jobs, json, pretty } => cmd_batch(&jobs, json, pretty),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_batch(path: &str, json: bool, pretty: bool) -> Result<()> {
    let toml_str = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let file = JobFile::from_toml(&toml_str).with_context(|| format!("parsing jobs from {path}"))?;

    let mut results = Vec::with_capacity(file.jobs.len());
    for job in &file.jobs {
        let result = run_job(
            &job.input,
            &job.output,
            job.size()?,
            job.method_or(&file.defaults),
            job.rect,
        )?;
        results.push(result);
    }
    emit(&results, json, pretty)
}

fn emit(results: &[OutputResult], json: bool, pretty: bool) -> Result<()> {
    for result in results {
        if json {
            let line = if pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            println!("{line}");
        } else {
            println!(
                "{} ({}x{}) -> {} ({}x{}, {})",
                result.input,
                result.source.width,
                result.source.height,
                result.output,
                result.scaled.width,
                result.scaled.height,
                result.method,
            );
        }
    }
    Ok(())
}

/// Parse a region given as "left,top,width,height".
fn parse_rect(spec: &str) -> Result<Rect> {
    let parts = spec
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid rect '{spec}'"))?;
    match parts.as_slice() {
        &[left, top, width, height] => Ok(Rect::new(left, top, width, height)),
        _ => bail!("rect '{spec}' must have four values: left,top,width,height"),
    }
}

fn load_image(path: &str) -> Result<PixelBuffer> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image: {path}"))?
        .into_rgba8();

    let width = img.width();
    let height = img.height();
    let pixels = argb_from_rgba_bytes(img.as_raw());

    Ok(PixelBuffer::from_buf(width, height, width, pixels))
}

fn save_image(path: &str, img: &PixelBuffer) -> Result<()> {
    let bytes = rgba_bytes_from_argb(&img.to_packed());
    let rgba = image::RgbaImage::from_raw(img.width, img.height, bytes)
        .context("scaled pixel data does not match its dimensions")?;
    let dynamic = image::DynamicImage::ImageRgba8(rgba);

    // JPEG has no alpha channel.
    let saved = match image::ImageFormat::from_path(Path::new(path)) {
        Ok(image::ImageFormat::Jpeg) => dynamic.to_rgb8().save(path),
        _ => dynamic.save(path),
    };
    saved.with_context(|| format!("writing {path}"))
}

fn run_job(
    input: &str,
    output: &str,
    size: ScaleSize,
    method: ScaleType,
    rect: Option<Rect>,
) -> Result<OutputResult> {
    let mut host = MemoryHost::new();
    let source = host.add_image(load_image(input)?);
    let source_size = host.image_size(source)?;
    let placeholder = host.create_placeholder();

    info!(input, width = source_size.width, height = source_size.height, "loaded image");

    let scaled = match size {
        ScaleSize::Explicit { width, height } => {
            scale_image(&mut host, source, rect, placeholder, width, height, method)
        }
        ScaleSize::Factor(f) => scale_image_proportionally(&mut host, source, rect, placeholder, f, method),
    }
    .with_context(|| format!("scaling {input}"))?;

    let img = host
        .image(placeholder)
        .context("scaled image missing from store")?;
    save_image(output, img)?;

    info!(output, width = scaled.width, height = scaled.height, "wrote image");

    Ok(OutputResult {
        input: input.to_string(),
        output: output.to_string(),
        method: method.to_string(),
        source: source_size,
        rect,
        scaled,
    })
}
