//! Offline driver: mount a backdrop, step it through frames on the fixed-rate clock and hand the
//! pixels to a sink.

use std::sync::{Arc, mpsc};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::eval::tick::{AnimationClock, TickSource};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::render::backend::{FrameRGBA, RenderBackend, RenderSettings};
use crate::render::cpu::CpuBackend;
use crate::scene::backdrop::{Backdrop, TickOutcome};
use crate::scene::config::BackdropConfig;
use crate::scene::stage::Stage;

/// Options for [`render_frame`] and [`render_range`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineOpts {
    /// Backend settings.
    pub settings: RenderSettings,
    /// Mount on a stage without a drawable surface, which shows the static starfield.
    pub force_placeholder: bool,
    /// Bounded channel capacity between the render loop and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for PipelineOpts {
    fn default() -> Self {
        Self {
            settings: RenderSettings::default(),
            force_placeholder: false,
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames that were rasterized.
    pub frames_rendered: u64,
    /// Frames reused from the previous one because the backdrop was static.
    pub frames_reused: u64,
}

fn mount(config: &BackdropConfig, opts: &PipelineOpts) -> NebulaResult<(Backdrop, Stage)> {
    let mut stage = if opts.force_placeholder {
        Stage::unavailable(config.canvas)
    } else {
        Stage::new(config.canvas)
    };
    let backdrop = Backdrop::mount(config.clone(), &mut stage)?;
    Ok((backdrop, stage))
}

fn tick_source(config: &BackdropConfig) -> TickSource {
    TickSource::new(AnimationClock::frames(config.fps), config.pointer.clone())
}

/// Render a single frame.
///
/// Drifting particles accumulate their motion, so every frame from 0 up to `frame` is ticked
/// before the one render.
#[tracing::instrument(skip_all, fields(frame = frame.0))]
pub fn render_frame(
    config: &BackdropConfig,
    frame: FrameIndex,
    opts: PipelineOpts,
) -> NebulaResult<FrameRGBA> {
    let (mut backdrop, mut stage) = mount(config, &opts)?;
    let ticks = tick_source(config);
    let result = (|| -> NebulaResult<FrameRGBA> {
        for f in 0..=frame.0 {
            backdrop.tick(&stage, &ticks.tick(FrameIndex(f)))?;
        }
        let mut backend = CpuBackend::new(opts.settings);
        backend.render(&backdrop, &stage, &ticks.tick(frame))
    })();
    backdrop.unmount(&mut stage);
    result
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: Arc<FrameRGBA>,
}

/// Render `range` and stream the frames into `sink` in index order.
///
/// Rendering runs on the calling thread while a scoped encoder thread drains a bounded channel
/// into the sink. Frames before `range.start` are ticked but not drawn. A backdrop that fell
/// back to its placeholder is rasterized once and the frame reused for the rest of the range.
#[tracing::instrument(skip_all, fields(start = range.start.0, end = range.end.0))]
pub fn render_range(
    config: &BackdropConfig,
    range: FrameRange,
    opts: PipelineOpts,
    sink: &mut dyn FrameSink,
) -> NebulaResult<RenderStats> {
    if range.is_empty() {
        return Err(NebulaError::validation("render_range range must be non-empty"));
    }
    let (mut backdrop, mut stage) = mount(config, &opts)?;
    let ticks = tick_source(config);
    let cfg = SinkConfig {
        width: config.canvas.width,
        height: config.canvas.height,
        fps: config.fps,
    };

    for f in 0..range.start.0 {
        if let Err(e) = backdrop.tick(&stage, &ticks.tick(FrameIndex(f))) {
            backdrop.unmount(&mut stage);
            return Err(e);
        }
    }

    let result = std::thread::scope(|scope| -> NebulaResult<RenderStats> {
        let (tx, rx) = mpsc::sync_channel::<FrameMsg>(opts.channel_capacity.max(1));
        let sink_ref: &mut dyn FrameSink = sink;

        let enc = scope.spawn(move || -> NebulaResult<()> {
            sink_ref.begin(cfg)?;
            for msg in rx {
                sink_ref.push_frame(msg.idx, &msg.frame)?;
            }
            sink_ref.end()
        });

        let mut produce = || -> NebulaResult<RenderStats> {
            let mut backend = CpuBackend::new(opts.settings);
            let mut stats = RenderStats::default();
            let mut last_static: Option<Arc<FrameRGBA>> = None;

            for f in range.start.0..range.end.0 {
                let idx = FrameIndex(f);
                let tick = ticks.tick(idx);
                let outcome = backdrop.tick(&stage, &tick)?;
                let frame = match (&last_static, outcome) {
                    (Some(frame), TickOutcome::Static) => {
                        stats.frames_reused += 1;
                        frame.clone()
                    }
                    _ => {
                        let frame = Arc::new(backend.render(&backdrop, &stage, &tick)?);
                        stats.frames_rendered += 1;
                        if outcome == TickOutcome::Static {
                            last_static = Some(frame.clone());
                        }
                        frame
                    }
                };
                stats.frames_total += 1;
                tx.send(FrameMsg { idx, frame })
                    .map_err(|_| NebulaError::render("encoder thread is not accepting frames"))?;
            }
            Ok(stats)
        };
        let produced = produce();

        drop(tx);
        let encoded = enc
            .join()
            .map_err(|_| NebulaError::render("encoder thread panicked"))?;
        // A failed sink closes the channel, so its error explains the failed send.
        match (produced, encoded) {
            (_, Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Ok(stats), Ok(())) => Ok(stats),
        }
    });

    backdrop.unmount(&mut stage);
    if let Ok(stats) = &result {
        tracing::debug!(
            rendered = stats.frames_rendered,
            reused = stats.frames_reused,
            "range rendered"
        );
    }
    result
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
