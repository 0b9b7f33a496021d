//! Benchmark profiles for the Quill recording engine.
//!
//! Provides pre-built recordings for benchmarking and examples:
//!
//! - [`reference_profile`]: 1K primitives with pen/brush churn in one block
//! - [`stress_profile`]: 20K primitives spread over nested blocks
//! - [`scene_commands`]: the deterministic command sequence both are built from

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use quill_core::{Brush, Color, LineF, Pen, PointF, RectF};
use quill_replay::{Command, FormatVersion, Recorder, Recording, ReplayError, Resource};

/// A deterministic mix of state changes and primitives.
///
/// Every eighth command changes the pen, every sixteenth the brush; the
/// rest cycle through rectangles, lines, ellipses and polylines laid out
/// on a 64-wide grid.
pub fn scene_commands(n: usize) -> Vec<Command> {
    (0..n)
        .map(|i| {
            let x = (i % 64) as f64 * 8.0;
            let y = (i / 64) as f64 * 8.0;
            match i % 16 {
                0 => Command::SetBrush(Resource::Inline(Brush::solid(
                    Color::rgb((i % 256) as u8, 0, 0),
                ))),
                8 => Command::SetPen(Resource::Inline(Pen::solid(
                    Color::rgb(0, (i % 256) as u8, 0),
                    1.0,
                ))),
                k if k % 4 == 1 => Command::DrawRect(RectF::new(x, y, 6.0, 6.0)),
                k if k % 4 == 2 => Command::DrawLine(LineF::new(
                    PointF::new(x, y),
                    PointF::new(x + 6.0, y + 6.0),
                )),
                k if k % 4 == 3 => Command::DrawEllipse(RectF::new(x, y, 6.0, 4.0)),
                _ => Command::DrawPolyline(vec![
                    PointF::new(x, y),
                    PointF::new(x + 3.0, y + 6.0),
                    PointF::new(x + 6.0, y),
                ]),
            }
        })
        .collect()
}

/// Record `commands` in `blocks` nested blocks of equal size.
///
/// Pens and brushes go through the recorder's helpers, so a resident
/// recorder fills its tables.
pub fn build_recording(
    mut rec: Recorder,
    commands: &[Command],
    blocks: usize,
) -> Result<Recording, ReplayError> {
    let per_block = commands.len().div_ceil(blocks.max(1)).max(1);
    for chunk in commands.chunks(per_block) {
        if blocks > 1 {
            rec.begin_block()?;
        }
        for cmd in chunk {
            match cmd {
                Command::SetPen(Resource::Inline(pen)) => rec.set_pen(pen)?,
                Command::SetBrush(Resource::Inline(brush)) => rec.set_brush(brush)?,
                other => rec.record(other)?,
            }
        }
        if blocks > 1 {
            rec.end_block()?;
        }
    }
    rec.finish()
}

/// 1K primitives in the top-level block, current format, inline resources.
pub fn reference_profile() -> Result<Recording, ReplayError> {
    build_recording(
        Recorder::new(FormatVersion::CURRENT),
        &scene_commands(1_000),
        1,
    )
}

/// 20K primitives in 32 nested blocks, memory-resident.
pub fn stress_profile() -> Result<Recording, ReplayError> {
    build_recording(
        Recorder::in_memory(FormatVersion::CURRENT),
        &scene_commands(20_000),
        32,
    )
}
