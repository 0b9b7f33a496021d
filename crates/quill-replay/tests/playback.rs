//! End-to-end record/validate/replay tests.
//!
//! Each test builds a recording (through `Recorder` or by hand with the
//! raw fixtures), replays it against a `CapturingSurface`, and inspects
//! the calls the surface received.

use quill_core::{
    ClipOperation, Color, Dpi, DrawSurface, Font, Pen, PointF, Rect, RectF, Region, TextFlags, Transform,
};
use quill_replay::checksum::stamp;
use quill_replay::codec::write_region;
use quill_replay::record::encode_command;
use quill_replay::{
    check_format, decode_command_stream, Command, CommandCode, FormatVersion, PaintMetric,
    PlayConfig, Player, Recorder, Recording, ReplayError, Resource, ResourceKind,
    ResourceTables, TextItem,
};
use quill_test_utils::fixtures::{
    end, raw_recording, record, record_sample, sample_commands, sample_pen,
};
use quill_test_utils::{CapturingSurface, SurfaceCall};

const V9: FormatVersion = FormatVersion::CURRENT;

// ── Helpers ─────────────────────────────────────────────────────

fn encoded(cmd: &Command, v: FormatVersion, resident: bool) -> Vec<u8> {
    encode_command(cmd, v, resident).unwrap()
}

fn play(rec: &Recording) -> (CapturingSurface, Result<(), ReplayError>) {
    let mut surface = CapturingSurface::new();
    let result = rec.play(&mut surface, &PlayConfig::default());
    (surface, result)
}

/// Replay a hand-built buffer with explicit resource tables.
fn play_raw(
    buf: &[u8],
    tables: &ResourceTables,
    resident: bool,
    surface: &mut CapturingSurface,
) -> Result<u64, ReplayError> {
    let info = check_format(buf).unwrap();
    let config = PlayConfig::default();
    Player::new(surface, &config, tables, info.version, resident).run(buf, &info)
}

fn count_offset(v: FormatVersion) -> usize {
    if v.has_bounding_rect() {
        28
    } else {
        12
    }
}

// ── Concrete scenarios ──────────────────────────────────────────

#[test]
fn resident_pen_then_rect_replays_two_calls() {
    let pen = Pen::solid(Color::rgb(1, 2, 3), 4.0);
    let rect = RectF::new(0.0, 0.0, 10.0, 10.0);
    let mut rec = Recorder::in_memory(V9);
    rec.set_pen(&pen).unwrap();
    rec.record(&Command::DrawRect(rect)).unwrap();
    let recording = rec.finish().unwrap();
    assert_eq!(recording.resources().pens(), &[pen.clone()]);

    let mut surface = CapturingSurface::with_dpi(Dpi::new(192.0, 192.0));
    recording
        .play(&mut surface, &PlayConfig::default())
        .unwrap();

    assert_eq!(
        surface.after_setup(),
        &[SurfaceCall::SetPen(pen), SurfaceCall::DrawRect(rect)]
    );
    let scaled = surface.transform().map_rect(rect);
    assert_eq!(scaled, RectF::new(0.0, 0.0, 20.0, 20.0));
}

#[test]
fn block_without_end_runs_its_records_then_fails() {
    let pen = sample_pen();
    let mut tables = ResourceTables::new();
    assert_eq!(tables.push_pen(pen.clone()), 0);

    let mut body = encoded(&Command::SetPen(Resource::Indexed(0)), V9, true);
    body.extend(encoded(
        &Command::DrawRect(RectF::new(0.0, 0.0, 10.0, 10.0)),
        V9,
        true,
    ));
    let buf = raw_recording(V9, 2, &body);

    let mut surface = CapturingSurface::new();
    let err = play_raw(&buf, &tables, true, &mut surface).unwrap_err();
    assert!(matches!(err, ReplayError::Structure { .. }));
    assert_eq!(
        surface.after_setup(),
        &[
            SurfaceCall::SetPen(pen),
            SurfaceCall::DrawRect(RectF::new(0.0, 0.0, 10.0, 10.0)),
        ]
    );
}

#[test]
fn null_recording_plays_without_calls() {
    let rec = Recording::from_bytes(Vec::new());
    assert!(rec.is_null());
    assert_eq!(rec.size(), 0);
    let (surface, result) = play(&rec);
    assert!(result.is_ok());
    assert!(surface.calls.is_empty());
}

#[test]
fn unknown_command_is_skipped_by_length() {
    let point = PointF::new(3.0, 4.0);
    let mut body = record(99, &[1, 2, 3, 4, 5]);
    body.extend(encoded(&Command::DrawPoint(point), V9, false));
    body.extend(end());
    let rec = Recording::from_bytes(raw_recording(V9, 3, &body));

    let (surface, result) = play(&rec);
    result.unwrap();
    assert_eq!(surface.after_setup(), &[SurfaceCall::DrawPoint(point)]);
}

#[test]
fn zero_length_unknown_command_is_a_no_op() {
    let mut body = record(2, &[]);
    body.extend(encoded(&Command::Save, V9, false));
    body.extend(end());
    let rec = Recording::from_bytes(raw_recording(V9, 3, &body));

    let (surface, result) = play(&rec);
    result.unwrap();
    assert_eq!(surface.after_setup(), &[SurfaceCall::Save]);
}

#[test]
fn long_length_unknown_command_is_skipped() {
    let mut body = vec![250, 0xff, 0, 0, 1, 0];
    body.extend(std::iter::repeat(0xAB).take(256));
    body.extend(end());
    let rec = Recording::from_bytes(raw_recording(V9, 2, &body));
    let (surface, result) = play(&rec);
    result.unwrap();
    assert!(surface.after_setup().is_empty());
}

// ── Structure ───────────────────────────────────────────────────

#[test]
fn nested_blocks_replay_both_levels() {
    let mut rec = Recorder::new(V9);
    rec.record(&Command::Save).unwrap();
    rec.begin_block().unwrap();
    rec.record(&Command::DrawPoint(PointF::new(1.0, 1.0))).unwrap();
    rec.begin_block().unwrap();
    rec.record(&Command::DrawPoint(PointF::new(2.0, 2.0))).unwrap();
    rec.end_block().unwrap();
    rec.record(&Command::DrawPoint(PointF::new(3.0, 3.0))).unwrap();
    rec.end_block().unwrap();
    rec.record(&Command::Restore).unwrap();
    let recording = rec.finish().unwrap();

    let (surface, result) = play(&recording);
    result.unwrap();
    assert_eq!(
        surface.after_setup(),
        &[
            SurfaceCall::Save,
            SurfaceCall::DrawPoint(PointF::new(1.0, 1.0)),
            SurfaceCall::DrawPoint(PointF::new(2.0, 2.0)),
            SurfaceCall::DrawPoint(PointF::new(3.0, 3.0)),
            SurfaceCall::Restore,
        ]
    );
}

#[test]
fn early_end_inside_block_is_ignored() {
    // An End that is not the last counted record does not close the block.
    let mut body = end();
    body.extend(encoded(&Command::Save, V9, false));
    body.extend(end());
    let rec = Recording::from_bytes(raw_recording(V9, 3, &body));
    let (surface, result) = play(&rec);
    result.unwrap();
    assert_eq!(surface.after_setup(), &[SurfaceCall::Save]);
}

#[test]
fn truncated_stream_is_a_structure_error() {
    let mut body = encoded(&Command::Save, V9, false);
    body.extend(end());
    let rec = Recording::from_bytes(raw_recording(V9, 5, &body));
    let (_, result) = play(&rec);
    assert!(matches!(result, Err(ReplayError::Structure { .. })));
}

#[test]
fn corrupted_length_aborts_replay() {
    let rect = RectF::new(0.0, 0.0, 10.0, 10.0);
    let mut rec = Recorder::new(V9);
    rec.record(&Command::DrawRect(rect)).unwrap();
    rec.record(&Command::Save).unwrap();
    let good = rec.finish().unwrap().data().to_vec();
    let len_at = count_offset(V9) + 4 + 1;
    assert_eq!(good[len_at], 32);

    for bad_len in [31u8, 33] {
        let mut buf = good.clone();
        buf[len_at] = bad_len;
        stamp(&mut buf);
        let recording = Recording::from_bytes(buf);
        assert!(recording.check_format().is_ok());

        let (surface, result) = play(&recording);
        match result {
            Err(ReplayError::Structure { detail }) => {
                assert!(detail.contains("length mismatch"), "{detail}")
            }
            other => panic!("expected structure error, got {other:?}"),
        }
        assert!(surface.draws().is_empty());
    }
}

#[test]
fn depth_limit_is_enforced() {
    let mut rec = Recorder::new(V9);
    rec.begin_block().unwrap();
    rec.begin_block().unwrap();
    rec.record(&Command::Save).unwrap();
    rec.end_block().unwrap();
    rec.end_block().unwrap();
    let recording = rec.finish().unwrap();

    let mut surface = CapturingSurface::new();
    let ok = PlayConfig::default().with_max_block_depth(3);
    recording.play(&mut surface, &ok).unwrap();

    let shallow = PlayConfig::default().with_max_block_depth(2);
    let err = recording.play(&mut surface, &shallow).unwrap_err();
    assert!(matches!(err, ReplayError::Structure { .. }));
}

#[test]
fn invalid_config_rejected_before_replay() {
    let recording = Recorder::new(V9).finish().unwrap();
    let mut surface = CapturingSurface::new();
    let config = PlayConfig::default().with_max_block_depth(0);
    let err = recording.play(&mut surface, &config).unwrap_err();
    assert!(matches!(err, ReplayError::InvalidConfig(_)));
    assert!(surface.calls.is_empty());
}

// ── Resources ───────────────────────────────────────────────────

#[test]
fn resident_and_inline_recordings_replay_identically() {
    for major in 1..=9 {
        let v = FormatVersion::major(major);
        let mut inline = Recorder::new(v);
        record_sample(&mut inline).unwrap();
        let mut resident = Recorder::in_memory(v);
        record_sample(&mut resident).unwrap();

        let (a, ra) = play(&inline.finish().unwrap());
        let (b, rb) = play(&resident.finish().unwrap());
        ra.unwrap();
        rb.unwrap();
        assert_eq!(a.calls, b.calls, "major {major}");
        assert!(!a.draws().is_empty());
    }
}

#[test]
fn out_of_range_index_is_a_checked_error() {
    let mut rec = Recorder::in_memory(V9);
    rec.set_pen(&sample_pen()).unwrap();
    rec.record(&Command::DrawPoint(PointF::default())).unwrap();
    let recording = rec.finish().unwrap();

    let mut surface = CapturingSurface::new();
    let err = play_raw(recording.data(), &ResourceTables::new(), true, &mut surface)
        .unwrap_err();
    assert!(matches!(
        err,
        ReplayError::ResourceIndexOutOfRange {
            kind: ResourceKind::Pen,
            index: 0,
            len: 0
        }
    ));
    assert!(surface.draws().is_empty());
}

#[test]
fn indexed_record_in_inline_recording_is_rejected() {
    let mut rec = Recorder::in_memory(V9);
    rec.set_brush(&quill_core::Brush::solid(Color::WHITE)).unwrap();
    // Same bytes, but without the tables the stream reads as inline.
    let plain = Recording::from_bytes(rec.finish().unwrap().data().to_vec());
    assert!(!plain.is_memory_resident());
    let (_, result) = play(&plain);
    assert!(matches!(result, Err(ReplayError::Structure { .. })));
}

// ── Header and versions ─────────────────────────────────────────

#[test]
fn future_major_fails_validation() {
    let buf = raw_recording(FormatVersion::major(10), 1, &end());
    assert!(matches!(
        check_format(&buf),
        Err(ReplayError::UnsupportedVersion { major: 10, .. })
    ));
    let rec = Recording::from_bytes(buf);
    assert!(!rec.is_format_valid());
    let (surface, result) = play(&rec);
    assert!(result.is_err());
    assert!(surface.calls.is_empty());
}

#[test]
fn header_failures_leave_recording_invalid() {
    let good = Recorder::new(V9).finish().unwrap().data().to_vec();

    let mut magic = good.clone();
    magic[1] = b'X';
    let mut sum = good.clone();
    sum[4] ^= 0xff;
    let mut body = good.clone();
    let last = body.len() - 1;
    body[last] ^= 0x01;

    for (buf, expect_checksum) in [(magic, false), (sum, true), (body, true)] {
        let rec = Recording::from_bytes(buf);
        let err = rec.check_format().unwrap_err();
        assert_eq!(
            matches!(err, ReplayError::ChecksumMismatch { .. }),
            expect_checksum,
            "{err}"
        );
        assert!(!rec.is_format_valid());
        assert_eq!(rec.bounding_rect(), Rect::default());
    }
}

#[test]
fn set_data_revalidates() {
    let mut rec = Recording::from_bytes(b"junk".to_vec());
    assert!(rec.check_format().is_err());
    let good = Recorder::new(V9).finish().unwrap();
    rec.set_data(good.data());
    assert!(!rec.is_format_valid());
    assert_eq!(rec.format_version(), Some(V9));
    assert!(rec.is_format_valid());
}

#[test]
fn every_major_round_trips_every_command() {
    for major in 1..=9 {
        let v = FormatVersion::major(major);
        let commands = sample_commands(v);
        let mut rec = Recorder::new(v);
        for cmd in &commands {
            rec.record(cmd).unwrap();
        }
        let recording = rec.finish().unwrap();
        assert_eq!(check_format(recording.data()).unwrap().version, v);

        let decoded = decode_command_stream(recording.data(), v, false).unwrap();
        assert_eq!(decoded.len(), commands.len() + 1, "major {major}");
        assert_eq!(&decoded[..commands.len()], &commands[..], "major {major}");
        assert_eq!(decoded.last(), Some(&Command::End));

        let (_, result) = play(&recording);
        result.unwrap_or_else(|e| panic!("major {major}: {e}"));
    }
}

/// Swap every inline paint resource for a table index.
fn indexed(cmd: Command) -> Command {
    match cmd {
        Command::SetPen(_) => Command::SetPen(Resource::Indexed(0)),
        Command::SetBrush(_) => Command::SetBrush(Resource::Indexed(0)),
        Command::DrawPixmap { placement, .. } => Command::DrawPixmap {
            placement,
            pixmap: Resource::Indexed(1),
        },
        Command::DrawImage {
            placement, flags, ..
        } => Command::DrawImage {
            placement,
            image: Resource::Indexed(0),
            flags,
        },
        Command::DrawTiledPixmap { rect, offset, .. } => Command::DrawTiledPixmap {
            rect,
            pixmap: Resource::Indexed(2),
            offset,
        },
        other => other,
    }
}

#[test]
fn indexed_commands_round_trip_in_resident_recordings() {
    for major in 6..=9 {
        let v = FormatVersion::major(major);
        let commands: Vec<_> = sample_commands(v).into_iter().map(indexed).collect();
        let mut rec = Recorder::in_memory(v);
        for cmd in &commands {
            rec.record(cmd).unwrap();
        }
        let recording = rec.finish().unwrap();

        let decoded = decode_command_stream(recording.data(), v, true).unwrap();
        assert_eq!(&decoded[..commands.len()], &commands[..], "major {major}");
        assert_eq!(decoded.last(), Some(&Command::End));
        assert!(decode_command_stream(recording.data(), v, false).is_err());
    }
}

#[test]
fn legacy_region_clip_always_replaces() {
    let cmd = Command::SetClipRegion {
        region: Region::from_rect(Rect::new(0, 0, 5, 5)),
        op: ClipOperation::Intersect,
    };
    for (major, expected) in [(8, ClipOperation::Replace), (9, ClipOperation::Intersect)] {
        let mut rec = Recorder::new(FormatVersion::major(major));
        rec.record(&cmd).unwrap();
        let (surface, result) = play(&rec.finish().unwrap());
        result.unwrap();
        assert!(matches!(
            surface.after_setup(),
            [SurfaceCall::SetClipRegion { op, .. }] if *op == expected
        ));
    }
}

#[test]
fn legacy_region_clip_ignores_unknown_op_byte() {
    let v8 = FormatVersion::major(8);
    let region = Region::from_rect(Rect::new(0, 0, 5, 5));
    let mut payload = Vec::new();
    write_region(&mut payload, &region).unwrap();
    payload.push(3);
    let mut body = record(CommandCode::SetClipRegion as u8, &payload);
    body.extend(end());
    let rec = Recording::from_bytes(raw_recording(v8, 2, &body));

    let (surface, result) = play(&rec);
    result.unwrap();
    assert!(matches!(
        surface.after_setup(),
        [SurfaceCall::SetClipRegion { op: ClipOperation::Replace, .. }]
    ));

    let rec = Recording::from_bytes(raw_recording(V9, 2, &body));
    let (surface, result) = play(&rec);
    assert!(matches!(result, Err(ReplayError::Structure { .. })));
    assert!(surface.after_setup().is_empty());
}

#[test]
fn huge_window_rect_saturates_on_replay() {
    let mut rec = Recorder::new(V9);
    rec.record(&Command::SetWindow(RectF::new(-2e9, 0.0, 4e9, 10.0)))
        .unwrap();
    let (surface, result) = play(&rec.finish().unwrap());
    result.unwrap();
    assert_eq!(
        surface.after_setup(),
        &[SurfaceCall::SetWindow(Rect::new(-2_000_000_000, 0, i32::MAX, 10))]
    );
}

#[test]
fn huge_draw_extent_saturates_bounding_rect() {
    let huge = RectF::new(-2e9, 0.0, 4e9, 10.0);
    for major in [5, 9] {
        let mut rec = Recorder::new(FormatVersion::major(major));
        rec.record(&Command::DrawRect(huge)).unwrap();
        let recording = rec.finish().unwrap();
        assert_eq!(
            recording.bounding_rect(),
            Rect::new(-2_000_000_000, 0, i32::MAX, 10),
            "major {major}"
        );
        let (_, result) = play(&recording);
        result.unwrap();
    }
}

#[test]
fn text_item_scale_and_justification() {
    let mut item = TextItem::new(PointF::new(15.0, 90.0), "hi", Font::new("Sans", 10.0));
    item.scale = 2.0;
    item.justification_width = 120.0;
    let mut rec = Recorder::new(V9);
    rec.record(&Command::DrawTextItem(item)).unwrap();
    let (surface, result) = play(&rec.finish().unwrap());
    result.unwrap();

    let [SurfaceCall::DrawTextLayout {
        font, rect, flags, ..
    }] = surface.after_setup()
    else {
        panic!("unexpected calls {:?}", surface.calls);
    };
    assert_eq!(font.device_dpi, Some(Dpi::new(192.0, 192.0)));
    assert_eq!(*rect, RectF::new(15.0, 90.0 - surface.ascent, 120.0, 1.0));
    assert!(flags.contains(TextFlags::JUSTIFICATION_FORCED | TextFlags::ALIGN_JUSTIFY));
    assert!(flags.contains(TextFlags::FORCE_LEFT_TO_RIGHT));
}

#[test]
fn legacy_text_item_is_placed_at_origin() {
    let item = TextItem::new(PointF::new(15.0, 90.0), "hi", Font::new("Sans", 10.0));
    let mut rec = Recorder::new(FormatVersion::major(8));
    rec.record(&Command::DrawTextItem(item)).unwrap();
    let (surface, result) = play(&rec.finish().unwrap());
    result.unwrap();
    assert!(matches!(
        surface.after_setup(),
        [SurfaceCall::DrawTextLayout { rect, flags, .. }]
            if *rect == RectF::new(15.0, 90.0, 1.0, 1.0)
                && *flags == TextFlags::SINGLE_LINE | TextFlags::DONT_CLIP
    ));
}

#[test]
fn world_matrix_composes_with_dpi_scale() {
    let mut rec = Recorder::new(V9);
    rec.record(&Command::SetWMatrix {
        matrix: Transform::from_translation(10.0, 0.0),
        combine: false,
    })
    .unwrap();
    let recording = rec.finish().unwrap();

    let mut surface = CapturingSurface::with_dpi(Dpi::new(192.0, 96.0));
    recording
        .play(&mut surface, &PlayConfig::default())
        .unwrap();
    let p = surface.transform().map(PointF::new(1.0, 1.0));
    assert_eq!(p, PointF::new(22.0, 1.0));
}

// ── Persistence and sharing ─────────────────────────────────────

#[test]
fn file_round_trip() {
    let mut rec = Recorder::new(V9);
    record_sample(&mut rec).unwrap();
    let original = rec.finish().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.qpic");
    original.save_file(&path).unwrap();

    let mut loaded = Recording::new();
    let info = loaded.load_file(&path).unwrap();
    assert_eq!(info.version, V9);
    assert_eq!(loaded.data(), original.data());
    assert_eq!(loaded.bounding_rect(), original.bounding_rect());
}

#[test]
fn missing_file_leaves_null_recording() {
    let dir = tempfile::tempdir().unwrap();
    let mut rec = Recorder::new(V9).finish().unwrap();
    let err = rec.load_file(dir.path().join("absent.qpic")).unwrap_err();
    assert!(matches!(err, ReplayError::Io(_)));
    assert!(rec.is_null());
}

#[test]
fn stream_framing_round_trip() {
    let first = Recorder::new(V9).finish().unwrap();
    let mut rec = Recorder::new(FormatVersion::major(4));
    record_sample(&mut rec).unwrap();
    let second = rec.finish().unwrap();

    let mut stream = Vec::new();
    first.write_to(&mut stream).unwrap();
    second.write_to(&mut stream).unwrap();
    Recording::new().write_to(&mut stream).unwrap();

    let mut input = stream.as_slice();
    let mut a = Recording::new();
    let mut b = Recording::new();
    let mut c = Recording::from_bytes(vec![1, 2, 3]);
    a.read_from(&mut input).unwrap();
    b.read_from(&mut input).unwrap();
    c.read_from(&mut input).unwrap();
    assert!(input.is_empty());
    assert_eq!(a.data(), first.data());
    assert_eq!(b.data(), second.data());
    assert!(c.is_null());

    let mut short = &stream[..10];
    assert!(matches!(
        Recording::new().read_from(&mut short),
        Err(ReplayError::Io(_))
    ));
}

#[test]
fn clones_share_until_mutated() {
    let original = Recorder::new(V9).finish().unwrap();
    let mut copy = original.clone();
    assert!(!copy.is_detached());
    copy.set_bounding_rect(Rect::new(0, 0, 5, 5));
    assert!(copy.is_detached());
    assert!(original.is_detached());
    assert_eq!(copy.bounding_rect(), Rect::new(0, 0, 5, 5));
    assert_eq!(original.bounding_rect(), Rect::default());

    let mut other = original.clone();
    other.set_data(&[]);
    assert!(other.is_null());
    assert!(!original.is_null());
}

#[test]
fn metrics_follow_bounding_rect() {
    let mut rec = Recorder::new(V9);
    rec.record(&Command::DrawRect(RectF::new(0.0, 0.0, 96.0, 48.0)))
        .unwrap();
    let recording = rec.finish().unwrap();
    let config = PlayConfig::default();
    assert_eq!(recording.metric(PaintMetric::Width, &config), 96);
    assert_eq!(recording.metric(PaintMetric::Height, &config), 48);
    assert_eq!(recording.metric(PaintMetric::WidthMm, &config), 25);
    assert_eq!(recording.metric(PaintMetric::DpiX, &config), 96);
    let wide = PlayConfig::default().with_reference_dpi(Dpi::new(72.0, 72.0));
    assert_eq!(recording.metric(PaintMetric::DpiY, &wide), 72);
}

#[test]
fn begin_code_constant_matches_header() {
    let rec = Recorder::new(V9).finish().unwrap();
    assert_eq!(rec.data()[10], CommandCode::Begin as u8);
    assert_eq!(rec.data()[11], 4);
}
