use crate::eval::tick::Tick;
use crate::foundation::error::NebulaResult;
use crate::scene::backdrop::Backdrop;
use crate::scene::stage::Stage;
use crate::settings::Settings;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The `premultiplied` flag keeps that explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Draws a [`Backdrop`] into a frame.
pub trait RenderBackend {
    /// Render the backdrop's current state. `tick` supplies object transforms and must be the
    /// tick the backdrop was last advanced with.
    fn render(
        &mut self,
        backdrop: &Backdrop,
        stage: &Stage,
        tick: &Tick,
    ) -> NebulaResult<FrameRGBA>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Software rasterizer; the placeholder path goes through `vello_cpu`.
    #[default]
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderSettings {
    /// Clear to the scene background (dark theme). When `false` the canvas clears to
    /// transparent so the page shows through (light theme).
    pub opaque_clear: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { opaque_clear: true }
    }
}

impl From<&Settings> for RenderSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            opaque_clear: settings.dark_mode,
        }
    }
}

/// Create a rendering backend implementation.
pub fn create_backend(kind: BackendKind, settings: RenderSettings) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Cpu => Box::new(crate::render::cpu::CpuBackend::new(settings)),
    }
}
