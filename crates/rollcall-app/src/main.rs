use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod attendance;
mod canvas;
mod config;
mod display;
mod logbook;
mod notify;
mod report;
mod session;

use attendance::AttendanceTracker;
use canvas::Canvas;
use config::Config;
use display::{HeadlessDisplay, TerminalDisplay};
use logbook::Logbook;
use notify::{Announcer, SpeechNotifier};
use report::{LogReporter, Reporter, WebhookReporter};
use rollcall_core::{FaceDetector, FaceEmbedder, LinearSvm, ReferenceDatabase};
use rollcall_hw::Camera;
use session::{Session, ViewLayout};

#[derive(Parser)]
#[command(name = "rollcall", about = "Real-time face recognition attendance tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an attendance session on the configured camera
    Run,
    /// List available capture devices
    Devices,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run => run(Config::from_env()),
        Commands::Devices => {
            let devices = Camera::list_devices();
            if devices.is_empty() {
                println!("no capture devices found");
            }
            for d in devices {
                println!("{}  {} ({}, bus {})", d.path, d.name, d.driver, d.bus);
            }
            Ok(())
        }
    }
}

fn run(cfg: Config) -> Result<()> {
    // Startup is fail-fast: reference data, classifier and both models must
    // be in place before a single frame is processed.
    let reference = ReferenceDatabase::load(&cfg.reference_path)
        .context("loading reference database")?;
    anyhow::ensure!(
        reference.dim() == rollcall_core::EMBEDDING_DIM,
        "reference embeddings are {}-dimensional but the embedder produces {} — re-run enrollment with the current model",
        reference.dim(),
        rollcall_core::EMBEDDING_DIM
    );
    let classifier = LinearSvm::train(&reference).context("training identity classifier")?;

    let detector = FaceDetector::load(&cfg.detector_model, cfg.detect_threshold)
        .context("loading face detector")?;
    let embedder = FaceEmbedder::load(&cfg.embedder_model).context("loading face embedder")?;

    let camera = Camera::open(&cfg.camera_device, cfg.capture_width, cfg.capture_height)
        .context("opening camera")?;
    let mut stream = camera.start().context("starting capture stream")?;

    let announcer = Announcer::spawn(
        Box::new(SpeechNotifier::new(cfg.speech_command.clone())),
        cfg.announce_queue,
    );

    let reporter: Box<dyn Reporter> = match &cfg.report_url {
        Some(url) => Box::new(WebhookReporter::new(url.clone()).context("building reporter")?),
        None => Box::new(LogReporter),
    };

    let display: Box<dyn display::Display> = if cfg.headless {
        Box::new(HeadlessDisplay::default())
    } else {
        tracing::info!("press q then Enter to quit");
        Box::new(TerminalDisplay::new())
    };

    let background =
        Canvas::load_background(&cfg.background_path, cfg.canvas_width, cfg.canvas_height);

    let session = Session {
        detector,
        embedder,
        classifier,
        tracker: AttendanceTracker::new(),
        logbook: Logbook::new(cfg.attendance_dir),
        announcer,
        reporter,
        display,
        background,
        layout: ViewLayout {
            frame_width: cfg.frame_width,
            frame_height: cfg.frame_height,
            offset_x: cfg.frame_offset_x,
            offset_y: cfg.frame_offset_y,
        },
        accept_threshold: cfg.accept_threshold,
        report_destination: cfg.report_destination,
        records: Vec::new(),
    };

    session.run(&mut stream)
}
