// glowfield: show the animated background in a window, or render one frame
// of it to a PNG.
//
// What you SEE:
// • Two blue glows drifting over black, leaning toward the mouse.
// • When they drift close, a bright bridge fuses them.
// • Faint grain scrolls over everything. ESC or closing the window quits.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = native::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{anyhow, bail, Context, Result};
    use clap::Parser;
    use glam::Vec2;
    use log::info;

    use glowfield::{
        CursorRing, GlowMode, HeadlessHost, Mount, Palette, RendererConfig, Viewport, WindowHost,
    };

    #[derive(Parser, Debug)]
    #[command(name = "glowfield", version, about = "Animated glow-and-grain background")]
    struct Cli {
        /// TOML file with renderer settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Logical width in px
        #[arg(long, default_value_t = 1280.0)]
        width: f32,

        /// Logical height in px
        #[arg(long, default_value_t = 720.0)]
        height: f32,

        /// Device pixel ratio
        #[arg(long, default_value_t = 1.0)]
        dpr: f32,

        /// Palette preset: ocean, teal, slate, violet or amber
        #[arg(long)]
        palette: Option<String>,

        /// Paint the gradients directly, without the blurred layer
        #[arg(long)]
        direct: bool,

        /// Draw the ring cursor
        #[arg(long)]
        cursor: bool,

        /// Seed for the grain noise
        #[arg(long)]
        seed: Option<u64>,

        /// Frames per second
        #[arg(long, default_value_t = 60)]
        fps: usize,

        /// Render headlessly and write a PNG here instead of opening a window
        #[arg(long, value_name = "PATH")]
        snapshot: Option<PathBuf>,

        /// Snapshot time in seconds
        #[arg(long, default_value_t = 0.0, value_name = "SECS")]
        at: f64,

        /// Pointer position for the snapshot, in logical px
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        pointer: Option<Vec<f32>>,
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        if cli.fps == 0 {
            bail!("--fps must be at least 1");
        }
        let config = build_config(&cli)?;
        let viewport = Viewport::new(cli.width, cli.height, cli.dpr);

        match &cli.snapshot {
            Some(path) => snapshot(&cli, config, viewport, path),
            None => interactive(&cli, config, viewport),
        }
    }

    fn build_config(cli: &Cli) -> Result<RendererConfig> {
        let mut config = match &cli.config {
            Some(path) => RendererConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => RendererConfig::default(),
        };
        if let Some(name) = &cli.palette {
            config.palette = Palette::preset(name).ok_or_else(|| {
                anyhow!(
                    "unknown palette '{name}' (expected one of: {})",
                    Palette::PRESETS.join(", ")
                )
            })?;
        }
        if cli.direct {
            config.glow.mode = GlowMode::Direct;
        }
        if cli.seed.is_some() {
            config.grain.seed = cli.seed;
        }
        config.validate().context("invalid renderer settings")?;
        Ok(config)
    }

    fn interactive(cli: &Cli, config: RendererConfig, viewport: Viewport) -> Result<()> {
        let host = WindowHost::new("glowfield", viewport, cli.fps, cli.cursor)?;
        let mut mount =
            Mount::new(host, config).ok_or_else(|| anyhow!("window has no drawing surface"))?;
        info!("running; press ESC to quit");

        while mount.host().is_open() && !mount.host().esc_pressed() {
            if !mount.pump()? {
                mount.host_mut().idle();
            }
        }
        mount.unmount();
        Ok(())
    }

    fn snapshot(cli: &Cli, config: RendererConfig, viewport: Viewport, path: &Path) -> Result<()> {
        if !(cli.at >= 0.0) {
            bail!("--at must be a non-negative number of seconds");
        }
        let host = HeadlessHost::new(viewport);
        let mut mount = Mount::new(host.clone(), config)
            .ok_or_else(|| anyhow!("headless host has no drawing surface"))?;

        let pointer = cli.pointer.as_deref().map(|p| Vec2::new(p[0], p[1]));
        if let Some(p) = pointer {
            host.pointer_move(p.x, p.y);
        }

        // Run every frame up to `at` so the pointer smoothing plays out.
        let dt = 1.0 / cli.fps as f64;
        let frames = (cli.at / dt).round() as usize + 1;
        for _ in 0..frames {
            host.advance(dt);
            mount.pump()?;
        }

        let mut frame = host
            .last_frame()
            .ok_or_else(|| anyhow!("no frame was presented"))?;
        if cli.cursor {
            let mut ring = CursorRing::default();
            if let Some(p) = pointer {
                ring.moved(p);
            }
            ring.draw(&mut frame, viewport.device_pixel_ratio);
        }

        let (w, h) = (frame.width as u32, frame.height as u32);
        let image = image::RgbImage::from_raw(w, h, frame.to_rgb8())
            .ok_or_else(|| anyhow!("frame buffer does not match {w}x{h}"))?;
        image
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;

        println!("Rendered {w}x{h} frame at t={:.2}s to {}", cli.at, path.display());
        if let Some(layout) = mount.renderer().layout() {
            for (name, glow) in ["A", "B"].iter().zip(&layout.blobs) {
                println!(
                    " - blob {name} at ({:.1}, {:.1}) radius {:.1}",
                    glow.center.x, glow.center.y, glow.radius
                );
            }
            println!(" - merge {:.3} ({} bridge glows)", layout.merge, layout.bridge.len());
        }
        mount.unmount();
        Ok(())
    }
}
