//! Record a small scene, round-trip it through a file, and replay it.
//!
//! ```text
//! RUST_LOG=quill_replay=trace cargo run --example replay [path.qpic]
//! ```
//!
//! With a path argument the recording is loaded from that file instead of
//! being recorded fresh.

use std::path::PathBuf;

use quill::prelude::*;
use quill_test_utils::CapturingSurface;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn record_scene() -> Result<Recording, ReplayError> {
    let mut rec = Recorder::new(FormatVersion::CURRENT);
    rec.set_pen(&Pen::solid(Color::rgb(20, 20, 160), 2.0))?;
    rec.set_brush(&Brush::solid(Color::rgb(240, 200, 40)))?;
    rec.record(&Command::DrawRect(RectF::new(10.0, 10.0, 200.0, 120.0)))?;
    rec.begin_block()?;
    rec.record(&Command::Save)?;
    rec.record(&Command::SetWMatrix {
        matrix: Transform::from_translation(40.0, 40.0),
        combine: true,
    })?;
    rec.record(&Command::DrawEllipse(RectF::new(0.0, 0.0, 60.0, 40.0)))?;
    rec.record(&Command::DrawTextItem(TextItem::new(
        PointF::new(0.0, 70.0),
        "hello, quill",
        Font::new("Sans", 11.0),
    )))?;
    rec.record(&Command::Restore)?;
    rec.end_block()?;
    rec.finish()
}

fn run(path: Option<PathBuf>) -> Result<(), ReplayError> {
    let recording = match path {
        Some(path) => {
            let mut recording = Recording::new();
            let info = recording.load_file(&path)?;
            info!(path = %path.display(), version = %info.version, "loaded recording");
            recording
        }
        None => {
            let recorded = record_scene()?;
            let dir = tempfile::tempdir()?;
            let path = dir.path().join("scene.qpic");
            recorded.save_file(&path)?;
            let mut reloaded = Recording::new();
            reloaded.load_file(&path)?;
            info!(bytes = reloaded.size(), "recorded and reloaded scene");
            reloaded
        }
    };

    info!(rect = ?recording.bounding_rect(), "bounding rect");
    let mut surface = CapturingSurface::with_dpi(Dpi::new(144.0, 144.0));
    recording.play(&mut surface, &PlayConfig::default())?;
    for call in &surface.calls {
        info!(?call, "surface");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(std::env::args_os().nth(1).map(PathBuf::from)) {
        error!(error = %e, "replay failed");
        std::process::exit(1);
    }
}
