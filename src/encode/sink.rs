use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::render::backend::FrameRGBA;

/// Stream parameters handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

impl SinkConfig {
    /// Byte length of one RGBA8 frame.
    pub fn frame_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Reject frames whose geometry disagrees with the stream.
    pub fn check_frame(&self, frame: &FrameRGBA) -> NebulaResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(NebulaError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.frame_len() {
            return Err(NebulaError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }
        Ok(())
    }
}

/// Consumer of rendered frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing [`FrameIndex`] order between
/// one `begin` and the matching `end`. Sinks reject anything else.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> NebulaResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NebulaResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> NebulaResult<()>;
}

/// Tracks the last accepted index so sinks can enforce strict ordering.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameOrder {
    last: Option<FrameIndex>,
}

impl FrameOrder {
    /// Accept `idx` if it is strictly after the previous one.
    pub fn advance(&mut self, idx: FrameIndex) -> NebulaResult<()> {
        if let Some(last) = self.last
            && idx.0 <= last.0
        {
            return Err(NebulaError::validation(format!(
                "out-of-order frame index {} after {}",
                idx.0, last.0
            )));
        }
        self.last = Some(idx);
        Ok(())
    }

    /// Forget the previous index.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Sink that keeps frames in memory, for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    order: FrameOrder,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Return `true` once `end` has been called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Take ownership of the captured frames.
    pub fn into_frames(self) -> Vec<(FrameIndex, FrameRGBA)> {
        self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> NebulaResult<()> {
        self.cfg = Some(cfg);
        self.order.reset();
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NebulaResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| NebulaError::render("in-memory sink not started"))?;
        cfg.check_frame(frame)?;
        self.order.advance(idx)?;
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> NebulaResult<()> {
        if self.cfg.is_none() {
            return Err(NebulaError::render("in-memory sink not started"));
        }
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
