use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::eval::tick::PointerPath;
use crate::field::particles::ParticleFieldConfig;
use crate::field::starfield::StarfieldConfig;
use crate::field::wave::WaveSurfaceConfig;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::render::camera::CameraConfig;
use crate::scene::environment::EnvironmentConfig;

/// Complete backdrop definition, as stored in JSON.
///
/// Every field has a default, so `{}` describes the stock scene: a purple/cyan wave surface,
/// a five-armed galaxy, a floating star shell and the night environment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Output surface size.
    pub canvas: Canvas,
    /// Seed for every procedural distribution.
    pub seed: u64,
    /// Host frame rate for offline rendering.
    pub fps: Fps,
    /// Scripted pointer for offline rendering.
    pub pointer: PointerPath,
    /// Camera placement.
    pub camera: CameraConfig,
    /// Stage look.
    pub environment: EnvironmentConfig,
    /// Wave surface.
    pub wave: WaveSurfaceConfig,
    /// Galaxy particle field.
    pub galaxy: ParticleFieldConfig,
    /// Optional outer star shell.
    pub shell: Option<ParticleFieldConfig>,
    /// Fallback drawn when mounting fails.
    pub starfield: StarfieldConfig,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            seed: 0x6e65_6275_6c61,
            fps: Fps::default(),
            pointer: PointerPath::default(),
            camera: CameraConfig::default(),
            environment: EnvironmentConfig::default(),
            wave: WaveSurfaceConfig::default(),
            galaxy: ParticleFieldConfig::galaxy(),
            shell: Some(ParticleFieldConfig::shell()),
            starfield: StarfieldConfig::default(),
        }
    }
}

impl BackdropConfig {
    /// Parse a backdrop definition from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> NebulaResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| NebulaError::serde(format!("parse backdrop config JSON: {e}")))
    }

    /// Parse a backdrop definition from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> NebulaResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            NebulaError::validation(format!("open backdrop config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty JSON rendition.
    pub fn to_json_pretty(&self) -> NebulaResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NebulaError::serde(format!("serialize backdrop config: {e}")))
    }

    /// Validate every section.
    pub fn validate(&self) -> NebulaResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(NebulaError::validation("canvas width/height must be > 0"));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(NebulaError::validation("canvas width/height must fit in u16"));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        self.pointer.validate()?;
        self.camera.validate()?;
        self.environment.validate()?;
        self.wave.validate()?;
        self.galaxy.validate()?;
        if let Some(shell) = &self.shell {
            shell.validate()?;
        }
        self.starfield.validate()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/config.rs"]
mod tests;
