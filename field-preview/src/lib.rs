//! Runs the particle field without a browser. A manual clock stands in for
//! `requestAnimationFrame` and resizes are injected at a chosen frame, so a
//! run is fully reproducible from its seed.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Parser;
use field_core::{FrameDriver, FrameScheduler, PixelBuffer, SimulationConfig, Viewport, ViewportObserver};
use field_shared::FieldSettings;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Render the particle field to PPM frames", long_about = None)]
pub struct Args {
    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 720.0)]
    pub height: f32,

    /// Device pixel ratio
    #[arg(long, default_value_t = 1.0)]
    pub pixel_ratio: f32,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Write every Nth frame; 0 writes only the last one
    #[arg(long, default_value_t = 30)]
    pub every: u32,

    /// Override the particle count from the settings
    #[arg(long)]
    pub count: Option<usize>,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Viewport to switch to, as WIDTHxHEIGHT
    #[arg(long)]
    pub resize_to: Option<Size>,

    /// Frame before which the resize happens
    #[arg(long, default_value_t = 60, requires = "resize_to")]
    pub resize_at: u32,

    #[arg(short, long, default_value = "frames")]
    pub output: PathBuf,

    /// JSON settings file, same shape as the browser settings
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|value| value.is_finite() && *value >= 0.0)
                .ok_or_else(|| format!("invalid dimension '{}'", value))
        };
        Ok(Size {
            width: parse(width)?,
            height: parse(height)?,
        })
    }
}

/// Frame requests are only answered when the preview loop fires them
#[derive(Debug, Default)]
pub struct ManualClock {
    pending: bool,
    requested: u64,
    cancelled: u64,
}

impl ManualClock {
    /// Consume the pending request, if there is one
    pub fn fire(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualClock {
    fn request_frame(&mut self) -> bool {
        self.pending = true;
        self.requested += 1;
        true
    }

    fn cancel_frame(&mut self) {
        if std::mem::take(&mut self.pending) {
            self.cancelled += 1;
        }
    }
}

/// Resize events come from the preview loop, so this only tracks the
/// subscription
#[derive(Debug, Default)]
pub struct ResizeHook {
    subscribed: bool,
}

impl ResizeHook {
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl ViewportObserver for ResizeHook {
    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }
}

pub type PreviewDriver = FrameDriver<PixelBuffer, ManualClock, ResizeHook>;

pub fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut settings = match &args.settings {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            FieldSettings::from_json(&json)
                .with_context(|| format!("Invalid settings in {}", path.display()))?
        }
        None => FieldSettings::default(),
    };
    if let Some(count) = args.count {
        settings.count = count;
    }

    SimulationConfig::try_from(&settings).context("Invalid simulation settings")
}

/// Whether frame `frame` (1-based) of `total` gets written
pub fn should_write(frame: u32, total: u32, every: u32) -> bool {
    frame == total || (every > 0 && frame % every == 0)
}

/// Binary PPM (P6). Alpha is dropped, the frame is opaque after the
/// background fill.
pub fn encode_ppm(buffer: &PixelBuffer) -> Vec<u8> {
    let header = format!("P6\n{} {}\n255\n", buffer.width(), buffer.height());
    let mut bytes = Vec::with_capacity(header.len() + buffer.pixels().len() * 3);
    bytes.extend_from_slice(header.as_bytes());
    for color in buffer.pixels() {
        bytes.extend_from_slice(&[color.r, color.g, color.b]);
    }
    bytes
}

pub fn write_ppm(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&encode_ppm(buffer))
        .and_then(|_| writer.flush())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Run the preview and return the paths of the written frames
pub fn run(args: &Args) -> Result<Vec<PathBuf>> {
    let config = load_config(args)?;
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory {}", args.output.display()))?;

    let mut driver: PreviewDriver =
        FrameDriver::new(config, PixelBuffer::new(), ManualClock::default(), ResizeHook::default());
    let mut rng = StdRng::seed_from_u64(args.seed);
    driver
        .start(Viewport::new(args.width, args.height, args.pixel_ratio), &mut rng)
        .context("Failed to start the particle field")?;

    let mut written = Vec::new();
    for frame in 1..=args.frames {
        if let Some(size) = args.resize_to.filter(|_| frame == args.resize_at) {
            log::info!("Resizing to {}x{} before frame {}", size.width, size.height, frame);
            driver.on_resize(Viewport::new(size.width, size.height, args.pixel_ratio));
        }

        if !driver.scheduler_mut().fire() {
            bail!("No frame was scheduled before frame {}", frame);
        }
        driver.tick();

        if should_write(frame, args.frames, args.every) {
            let Some(buffer) = driver.surface() else {
                bail!("Surface detached at frame {}", frame);
            };
            let path = args.output.join(format!("frame-{:05}.ppm", frame));
            write_ppm(buffer, &path)?;
            log::debug!("Wrote {}", path.display());
            written.push(path);
        }
    }

    driver.stop();
    log::info!(
        "Rendered {} frames, wrote {} to {}",
        driver.frame_count(),
        written.len(),
        args.output.display()
    );
    Ok(written)
}
