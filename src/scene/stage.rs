use crate::foundation::core::{Canvas, Rgb};

/// Tone mapping operator applied when the HDR raster is resolved to 8-bit output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    /// Clamp only.
    #[default]
    None,
    /// Multiply by exposure, then clamp.
    Linear,
    /// ACES filmic fit (RRT + ODT) after exposure.
    AcesFilmic,
}

/// Exponential-squared distance fog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogExp2 {
    /// Fog color (linear).
    pub color: Rgb,
    /// Density; fog factor is `1 - exp(-(density * depth)^2)`.
    pub density: f32,
}

impl FogExp2 {
    /// Fraction of fog color mixed in at view-space `depth`.
    pub fn factor(&self, depth: f32) -> f32 {
        let d = self.density * depth;
        (1.0 - (-d * d).exp()).clamp(0.0, 1.0)
    }
}

/// Rendering context handle shared by the host and the mounted components.
///
/// Components only touch the global parameters at mount and unmount. The host flips
/// availability when its surface is suspended (backgrounded tab, lost device).
#[derive(Clone, Debug)]
pub struct Stage {
    canvas: Canvas,
    available: bool,
    /// Tone mapping operator.
    pub tone_mapping: ToneMapping,
    /// Exposure multiplier applied before tone mapping.
    pub exposure: f32,
    /// Scene fog, if any.
    pub fog: Option<FogExp2>,
    /// Scene background; `None` leaves the canvas transparent.
    pub background: Option<Rgb>,
}

impl Stage {
    /// Available stage with renderer defaults (no tone mapping, exposure 1, no fog or background).
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            available: true,
            tone_mapping: ToneMapping::None,
            exposure: 1.0,
            fog: None,
            background: None,
        }
    }

    /// Stage whose surface cannot be drawn to.
    pub fn unavailable(canvas: Canvas) -> Self {
        Self {
            available: false,
            ..Self::new(canvas)
        }
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Whether the surface can currently accept work.
    pub fn is_available(&self) -> bool {
        self.available && self.canvas.width > 0 && self.canvas.height > 0
    }

    /// Host suspended the surface; ticks are skipped until [`Stage::resume`].
    pub fn suspend(&mut self) {
        if self.available {
            tracing::debug!("stage suspended");
        }
        self.available = false;
    }

    /// Host resumed the surface.
    pub fn resume(&mut self) {
        if !self.available {
            tracing::debug!("stage resumed");
        }
        self.available = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stage.rs"]
mod tests;
