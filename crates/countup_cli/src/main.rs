//! CountUp CLI
//!
//! Animate counters in the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use countup_animation::{AnimationConfig, Animator, Easing, NumberFormat};
use countup_core::ManualFrameClock;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod terminal;

use config::{FileConfig, CONFIG_FILE_NAME};
use terminal::{run_frame_loop, TerminalDisplay};

#[derive(Parser)]
#[command(name = "countup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Animated numeric counters in the terminal", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Animate a single counter
    Run {
        /// Value to count to
        #[arg(long, allow_negative_numbers = true)]
        end: f64,

        /// Value to count from
        #[arg(long, allow_negative_numbers = true)]
        start: Option<f64>,

        /// Run time in milliseconds
        #[arg(short, long, default_value = "2000")]
        duration: f64,

        /// Delay before counting, in milliseconds
        #[arg(long, default_value = "0")]
        delay: f64,

        /// Number format (int or decimal)
        #[arg(short, long, default_value = "int")]
        format: String,

        /// Easing curve (e.g. linear, ease_out_cubic)
        #[arg(short, long, default_value = "ease_out_cubic")]
        easing: String,

        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Pause after this many milliseconds
        #[arg(long, requires = "pause_for")]
        pause_at: Option<f64>,

        /// Resume after being paused this long, in milliseconds
        #[arg(long, requires = "pause_at")]
        pause_for: Option<f64>,
    },

    /// Animate every counter in a configuration file
    File {
        /// Configuration file
        #[arg(default_value = CONFIG_FILE_NAME)]
        path: PathBuf,
    },

    /// Write an example configuration file
    Init {
        /// Where to write it
        #[arg(default_value = CONFIG_FILE_NAME)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout holds the redrawn counters
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            end,
            start,
            duration,
            delay,
            format,
            easing,
            fps,
            pause_at,
            pause_for,
        } => {
            let easing = Easing::from_name(&easing)
                .with_context(|| format!("Unknown easing '{}'", easing))?;
            let config = AnimationConfig {
                start_value: start,
                duration,
                delay,
                easing,
                format: NumberFormat::from_name(&format),
                ..AnimationConfig::to(end)
            };
            let pause = pause_at.zip(pause_for).map(|(at, length)| PauseWindow::new(at, length));
            cmd_run(config, fps, pause)
        }

        Commands::File { path } => cmd_file(&path),

        Commands::Init { path } => cmd_init(&path),
    }
}

/// A scheduled pause/resume pair, in loop time
struct PauseWindow {
    at: f64,
    length: f64,
    paused_since: Option<f64>,
    done: bool,
}

impl PauseWindow {
    fn new(at: f64, length: f64) -> Self {
        Self {
            at,
            length,
            paused_since: None,
            done: false,
        }
    }

    /// Pause or resume `animator` as the window requires
    ///
    /// Returns whether the window is still holding the animator paused.
    fn update(&mut self, animator: &Animator, now_ms: f64) -> bool {
        if self.done {
            return false;
        }
        match self.paused_since {
            None if now_ms >= self.at && !animator.is_paused() => {
                animator.pause();
                info!("Paused at {:.0}ms ({:.0}ms remaining)", now_ms, animator.remaining());
                self.paused_since = Some(now_ms);
                true
            }
            Some(since) if now_ms - since >= self.length => {
                animator.resume();
                info!("Resumed at {:.0}ms", now_ms);
                self.done = true;
                false
            }
            paused => paused.is_some(),
        }
    }
}

fn cmd_run(config: AnimationConfig, fps: u32, mut pause: Option<PauseWindow>) -> Result<()> {
    if fps == 0 {
        anyhow::bail!("--fps must be greater than zero");
    }

    let clock = Rc::new(ManualFrameClock::new());
    let mut display = TerminalDisplay::new();
    let buffer = display.add_line("", "");

    let animator = Animator::builder(buffer)
        .config(config)
        .on_complete(|value| info!("Complete at {}", value))
        .build(clock.clone())?;

    info!(
        "Counting {} -> {} over {}ms",
        animator.start_value(),
        animator.end_value(),
        animator.config().duration
    );

    animator.start();
    let mut stdout = io::stdout().lock();
    run_frame_loop(&clock, fps, |now_ms| {
        let held = match pause.as_mut() {
            Some(window) => window.update(&animator, now_ms),
            None => false,
        };
        display.draw(&mut stdout)?;
        Ok(held)
    })?;

    Ok(())
}

fn cmd_file(path: &Path) -> Result<()> {
    let config = FileConfig::load(path)?;
    if config.counters.is_empty() {
        anyhow::bail!("{} defines no [[counter]] entries", path.display());
    }

    info!(
        "Animating {} counters from {} at {}fps",
        config.counters.len(),
        path.display(),
        config.display.fps
    );

    let clock = Rc::new(ManualFrameClock::new());
    let mut display = TerminalDisplay::new();
    let mut animators = Vec::with_capacity(config.counters.len());

    for counter in config.counters {
        let buffer = display.add_line(&counter.label, "");
        let label = counter.label.clone();
        let animator = Animator::builder(buffer)
            .config(counter.animation)
            .on_complete(move |value| tracing::debug!("{} complete at {}", label, value))
            .build(clock.clone())?;
        animators.push(animator);
    }

    for animator in &animators {
        animator.start();
    }

    let mut stdout = io::stdout().lock();
    run_frame_loop(&clock, config.display.fps, |_| {
        display.draw(&mut stdout)?;
        Ok(false)
    })?;

    Ok(())
}

fn cmd_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let content = FileConfig::example().to_toml()?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Wrote {}", path.display());
    info!("Run `countup file {}` to animate it", path.display());

    Ok(())
}
