//! Sable Texture Upload Demo
//!
//! Brings up a compute-capable Vulkan device without any window system,
//! uploads a 2D texture from an image file or a generated checkerboard,
//! and tears everything down again.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p sable-upload -- [OPTIONS]
//! ```
//!
//! ## Options
//!
//! - `--image <PATH>`: Upload the given image file (decoded to RGBA8)
//! - `--validation`: Enable Vulkan validation layers
//! - `-h, --help`: Print help message
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

use ash::vk;
use sable_gpu::{CommandPool, GpuContextBuilder, Texture2D, TextureUploadOptions};
use tracing::info;

const CHECKER_SIZE: u32 = 256;
const CHECKER_TILE: u32 = 32;

struct Options {
    image_path: Option<String>,
    validation: bool,
}

/// Parse from a slice of arguments.
fn parse_args(args: &[String]) -> Options {
    let mut options = Options {
        image_path: None,
        validation: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--image" => {
                if i + 1 < args.len() {
                    options.image_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--validation" => {
                options.validation = true;
            }
            _ => {}
        }
        i += 1;
    }

    options
}

/// RGBA8 checkerboard used when no input file is given.
fn checkerboard(size: u32, tile: u32) -> Vec<[u8; 4]> {
    let mut pixels = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / tile) + (y / tile)) % 2 == 0;
            pixels.push(if light {
                [255, 255, 255, 255]
            } else {
                [40, 40, 40, 255]
            });
        }
    }
    pixels
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }
    let options = parse_args(&args);

    let gpu = GpuContextBuilder::new()
        .app_name("Sable Upload Demo")
        .validation(options.validation)
        .build()?;

    let (pixels, width, height) = match &options.image_path {
        Some(path) => {
            let decoded = image::open(path)?.to_rgba8();
            let (width, height) = decoded.dimensions();
            info!("Decoded {} ({}x{})", path, width, height);
            (decoded.into_raw(), width, height)
        }
        None => {
            let pixels = checkerboard(CHECKER_SIZE, CHECKER_TILE);
            (
                bytemuck::cast_slice(&pixels).to_vec(),
                CHECKER_SIZE,
                CHECKER_SIZE,
            )
        }
    };

    unsafe {
        let pool = CommandPool::new(
            gpu.device(),
            gpu.compute_queue_family(),
            vk::CommandPoolCreateFlags::empty(),
        )?;

        let texture = Texture2D::from_memory(
            &gpu,
            &pool,
            &pixels,
            vk::Format::R8G8B8A8_UNORM,
            width,
            height,
            &TextureUploadOptions::default(),
        )?;

        info!(
            "Uploaded {}x{} texture ({} bytes) now in {:?}",
            texture.width,
            texture.height,
            pixels.len(),
            texture.layout,
        );

        texture.destroy(gpu.device());
        pool.destroy(gpu.device());
    }

    gpu.wait_idle()?;

    Ok(())
}

fn print_help() {
    eprintln!(
        "Sable Texture Upload Demo

USAGE:
    cargo run -p sable-upload -- [OPTIONS]

OPTIONS:
    --image <PATH>    Upload the given image file (decoded to RGBA8)
                      Default: a generated {CHECKER_SIZE}x{CHECKER_SIZE} checkerboard
    --validation      Enable Vulkan validation layers
    -h, --help        Print this help message

ENVIRONMENT:
    RUST_LOG          Set log level (e.g., info, debug, trace)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_image_path() {
        let args: Vec<String> = ["sable-upload", "--image", "input.png"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let options = parse_args(&args);
        assert_eq!(options.image_path.as_deref(), Some("input.png"));
        assert!(!options.validation);
    }

    #[test]
    fn parse_validation_flag() {
        let args: Vec<String> = ["sable-upload", "--validation"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let options = parse_args(&args);
        assert!(options.validation);
        assert!(options.image_path.is_none());
    }

    #[test]
    fn parse_ignores_unknown_flags() {
        let args: Vec<String> = ["sable-upload", "--frobnicate"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let options = parse_args(&args);
        assert!(options.image_path.is_none());
        assert!(!options.validation);
    }

    #[test]
    fn checkerboard_dimensions_and_corners() {
        let pixels = checkerboard(8, 4);
        assert_eq!(pixels.len(), 64);
        // Top-left tile is light, the tile to its right is dark
        assert_eq!(pixels[0], [255, 255, 255, 255]);
        assert_eq!(pixels[4], [40, 40, 40, 255]);
        // One tile band down, parity flips
        assert_eq!(pixels[4 * 8], [40, 40, 40, 255]);
        assert_eq!(pixels[4 * 8 + 4], [255, 255, 255, 255]);
    }
}
