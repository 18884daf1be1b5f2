use crate::eval::tick::Tick;
use crate::foundation::core::SrgbHex;
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::scene::component::Component;
use crate::scene::stage::{FogExp2, Stage, ToneMapping};

/// Global look applied to the stage for as long as the backdrop is mounted.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Tone mapping operator.
    pub tone_mapping: ToneMapping,
    /// Exposure multiplier.
    pub exposure: f32,
    /// Fog color.
    pub fog_color: SrgbHex,
    /// Exponential-squared fog density.
    pub fog_density: f32,
    /// Clear color.
    pub background: SrgbHex,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.8,
            fog_color: SrgbHex(0x000020),
            fog_density: 0.01,
            background: SrgbHex(0x000020),
        }
    }
}

impl EnvironmentConfig {
    /// Check the definition.
    pub fn validate(&self) -> NebulaResult<()> {
        if !(self.exposure.is_finite() && self.exposure > 0.0) {
            return Err(NebulaError::validation("exposure must be > 0"));
        }
        if !(self.fog_density.is_finite() && self.fog_density >= 0.0) {
            return Err(NebulaError::validation("fog density must be >= 0"));
        }
        Ok(())
    }
}

/// Stage parameters found at mount, put back at unmount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SavedStage {
    /// Tone mapping before mount.
    pub tone_mapping: ToneMapping,
    /// Exposure before mount.
    pub exposure: f32,
}

/// Sets tone mapping, exposure, fog and background on mount and undoes them on unmount.
#[derive(Clone, Debug, Default)]
pub struct SceneEnvironment {
    config: EnvironmentConfig,
}

impl SceneEnvironment {
    /// Build from a definition.
    pub fn new(config: EnvironmentConfig) -> Self {
        Self { config }
    }

    /// Environment definition.
    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }
}

impl Component for SceneEnvironment {
    type Buffers = SavedStage;

    fn name(&self) -> &'static str {
        "environment"
    }

    fn initialize(&self, stage: &mut Stage) -> NebulaResult<SavedStage> {
        if !stage.is_available() {
            return Err(NebulaError::context_unavailable(
                "environment: stage is not drawable",
            ));
        }
        self.config.validate()?;
        let saved = SavedStage {
            tone_mapping: stage.tone_mapping,
            exposure: stage.exposure,
        };
        stage.tone_mapping = self.config.tone_mapping;
        stage.exposure = self.config.exposure;
        stage.fog = Some(FogExp2 {
            color: self.config.fog_color.linear(),
            density: self.config.fog_density,
        });
        stage.background = Some(self.config.background.linear());
        Ok(saved)
    }

    fn advance(&self, _saved: &mut SavedStage, _tick: &Tick) {}

    fn dispose(&self, stage: &mut Stage, saved: SavedStage) {
        stage.fog = None;
        stage.background = None;
        stage.tone_mapping = saved.tone_mapping;
        stage.exposure = saved.exposure;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/environment.rs"]
mod tests;
