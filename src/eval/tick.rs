use crate::foundation::core::{Fps, FrameIndex, Vec2};
use crate::foundation::error::{NebulaError, NebulaResult};

/// One invocation of the per-frame update: elapsed host time plus pointer position.
///
/// The pointer is in normalized device coordinates, `-1..=1` on both axes with `+y` up.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tick {
    /// Seconds since the host clock started.
    pub elapsed: f32,
    /// Pointer position in normalized device coordinates.
    pub pointer: Vec2,
}

impl Tick {
    /// Build a tick.
    pub fn new(elapsed: f32, pointer: Vec2) -> Self {
        Self { elapsed, pointer }
    }

    /// Tick at `elapsed` seconds with the pointer centered.
    pub fn at(elapsed: f32) -> Self {
        Self::new(elapsed, Vec2::ZERO)
    }
}

/// Host-owned monotonic clock. The subsystem only ever reads it.
#[derive(Clone, Copy, Debug)]
pub enum AnimationClock {
    /// Offline clock: time is derived from a frame index at a fixed rate.
    Frames {
        /// Host frame rate.
        fps: Fps,
    },
    /// Interactive clock anchored at a wall-clock instant.
    Wall {
        /// Instant the clock started.
        started: std::time::Instant,
    },
}

impl AnimationClock {
    /// Offline clock at `fps`.
    pub fn frames(fps: Fps) -> Self {
        Self::Frames { fps }
    }

    /// Interactive clock starting now.
    pub fn start_wall() -> Self {
        Self::Wall {
            started: std::time::Instant::now(),
        }
    }

    /// Elapsed seconds at `frame`. Wall clocks ignore the frame and read the current instant.
    pub fn elapsed_at(&self, frame: FrameIndex) -> f32 {
        match *self {
            Self::Frames { fps } => fps.frames_to_secs(frame.0) as f32,
            Self::Wall { started } => started.elapsed().as_secs_f32(),
        }
    }
}

/// Scripted pointer motion for hosts without a live pointer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerPath {
    /// Pointer parked at a fixed position.
    Fixed {
        /// Horizontal position.
        x: f32,
        /// Vertical position.
        y: f32,
    },
    /// Pointer circling the canvas center.
    Orbit {
        /// Orbit radius in normalized device units.
        radius: f32,
        /// Seconds per revolution.
        period_secs: f32,
    },
}

impl Default for PointerPath {
    fn default() -> Self {
        Self::Fixed { x: 0.0, y: 0.0 }
    }
}

impl PointerPath {
    /// Pointer position at `elapsed` seconds.
    pub fn sample(&self, elapsed: f32) -> Vec2 {
        match *self {
            Self::Fixed { x, y } => Vec2::new(x, y),
            Self::Orbit {
                radius,
                period_secs,
            } => {
                let angle = std::f32::consts::TAU * elapsed / period_secs;
                Vec2::new(angle.cos(), angle.sin()) * radius
            }
        }
    }

    /// Reject paths that would produce non-finite pointers.
    pub fn validate(&self) -> NebulaResult<()> {
        match *self {
            Self::Fixed { x, y } => {
                if !x.is_finite() || !y.is_finite() {
                    return Err(NebulaError::validation("pointer position must be finite"));
                }
            }
            Self::Orbit {
                radius,
                period_secs,
            } => {
                if !radius.is_finite() {
                    return Err(NebulaError::validation("pointer orbit radius must be finite"));
                }
                if !period_secs.is_finite() || period_secs <= 0.0 {
                    return Err(NebulaError::validation(
                        "pointer orbit period_secs must be > 0",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Produces the tick for each host frame from a clock and a pointer path.
#[derive(Clone, Debug)]
pub struct TickSource {
    clock: AnimationClock,
    pointer: PointerPath,
}

impl TickSource {
    /// Combine a clock with a pointer path.
    pub fn new(clock: AnimationClock, pointer: PointerPath) -> Self {
        Self { clock, pointer }
    }

    /// Tick for `frame`.
    pub fn tick(&self, frame: FrameIndex) -> Tick {
        let elapsed = self.clock.elapsed_at(frame);
        Tick::new(elapsed, self.pointer.sample(elapsed))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/tick.rs"]
mod tests;
