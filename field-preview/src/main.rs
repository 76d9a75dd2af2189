use anyhow::{Context, Result};
use clap::Parser;
use field_preview::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    log::info!("Particle field preview starting...");
    log::info!(
        "Viewport: {}x{} @{}x, {} frames, seed {}",
        args.width,
        args.height,
        args.pixel_ratio,
        args.frames,
        args.seed
    );

    field_preview::run(&args).context("Preview failed")?;

    Ok(())
}
