use super::*;
use crate::encode::sink::InMemorySink;
use crate::field::particles::ParticleFieldConfig;
use crate::field::starfield::StarfieldConfig;
use crate::field::wave::WaveSurfaceConfig;
use crate::foundation::core::Canvas;

fn small_config() -> BackdropConfig {
    BackdropConfig {
        canvas: Canvas {
            width: 32,
            height: 24,
        },
        wave: WaveSurfaceConfig {
            segments: [8, 8],
            ..WaveSurfaceConfig::default()
        },
        galaxy: ParticleFieldConfig {
            count: 120,
            ..ParticleFieldConfig::galaxy()
        },
        shell: None,
        starfield: StarfieldConfig {
            count: 150,
            ..StarfieldConfig::default()
        },
        ..BackdropConfig::default()
    }
}

fn range(start: u64, end: u64) -> FrameRange {
    FrameRange::new(FrameIndex(start), FrameIndex(end)).unwrap()
}

#[test]
fn range_frames_arrive_in_order_with_stream_geometry() {
    let cfg = small_config();
    let mut sink = InMemorySink::new();
    let stats = render_range(&cfg, range(0, 4), PipelineOpts::default(), &mut sink).unwrap();

    assert_eq!(stats.frames_total, 4);
    assert_eq!(stats.frames_rendered, 4);
    assert_eq!(stats.frames_reused, 0);
    assert!(sink.is_finished());
    let sink_cfg = sink.config().unwrap();
    assert_eq!((sink_cfg.width, sink_cfg.height), (32, 24));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2, 3]);
}

#[test]
fn single_frame_matches_the_same_frame_from_a_range() {
    let cfg = small_config();
    let mut sink = InMemorySink::new();
    render_range(&cfg, range(0, 3), PipelineOpts::default(), &mut sink).unwrap();
    let single = render_frame(&cfg, FrameIndex(2), PipelineOpts::default()).unwrap();
    assert_eq!(sink.frames()[2].1, single);
}

#[test]
fn offset_range_replays_earlier_frames() {
    let cfg = small_config();
    let mut full = InMemorySink::new();
    render_range(&cfg, range(0, 3), PipelineOpts::default(), &mut full).unwrap();
    let mut tail = InMemorySink::new();
    render_range(&cfg, range(2, 3), PipelineOpts::default(), &mut tail).unwrap();
    assert_eq!(tail.frames()[0].0, FrameIndex(2));
    assert_eq!(tail.frames()[0].1, full.frames()[2].1);
}

#[test]
fn placeholder_frames_are_reused() {
    let cfg = small_config();
    let opts = PipelineOpts {
        force_placeholder: true,
        ..PipelineOpts::default()
    };
    let mut sink = InMemorySink::new();
    let stats = render_range(&cfg, range(0, 5), opts, &mut sink).unwrap();
    assert_eq!(stats.frames_total, 5);
    assert_eq!(stats.frames_rendered, 1);
    assert_eq!(stats.frames_reused, 4);
    let first = &sink.frames()[0].1;
    assert!(sink.frames().iter().all(|(_, f)| f == first));
}

#[test]
fn empty_range_is_rejected() {
    let cfg = small_config();
    let mut sink = InMemorySink::new();
    let empty = FrameRange {
        start: FrameIndex(3),
        end: FrameIndex(3),
    };
    let err = render_range(&cfg, empty, PipelineOpts::default(), &mut sink).unwrap_err();
    assert!(matches!(err, NebulaError::Validation(_)));
}

#[test]
fn invalid_config_is_an_error_not_a_fallback() {
    let mut cfg = small_config();
    cfg.galaxy.count = 0;
    let err = render_frame(&cfg, FrameIndex(0), PipelineOpts::default()).unwrap_err();
    assert!(matches!(err, NebulaError::Validation(_)));
}

struct FailingSink;

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> NebulaResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, _frame: &FrameRGBA) -> NebulaResult<()> {
        Err(NebulaError::render("disk full"))
    }

    fn end(&mut self) -> NebulaResult<()> {
        Ok(())
    }
}

#[test]
fn sink_errors_surface() {
    let cfg = small_config();
    let err = render_range(&cfg, range(0, 6), PipelineOpts::default(), &mut FailingSink)
        .unwrap_err();
    assert!(err.to_string().contains("disk full"), "{err}");
}
