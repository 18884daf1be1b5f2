//! Static starfield drawn in place of the live backdrop when mounting fails.

use crate::foundation::core::Vec3;
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::foundation::math::Rng64;

/// Largest accepted star count.
pub const MAX_STARS: usize = 200_000;

/// Placeholder star cloud definition.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Number of stars.
    pub count: usize,
    /// Edge length of the cube the stars are scattered in.
    pub extent: f32,
    /// Shift applied along z after scattering.
    pub z_offset: f32,
    /// Smallest star size.
    pub min_size: f32,
    /// Largest star size (exclusive).
    pub max_size: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 2000,
            extent: 50.0,
            z_offset: -10.0,
            min_size: 0.05,
            max_size: 0.2,
        }
    }
}

impl StarfieldConfig {
    /// Check the definition.
    pub fn validate(&self) -> NebulaResult<()> {
        if self.count > MAX_STARS {
            return Err(NebulaError::validation(format!(
                "starfield count must be <= {MAX_STARS}"
            )));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(NebulaError::validation("starfield extent must be > 0"));
        }
        if !(self.min_size > 0.0 && self.min_size <= self.max_size && self.max_size.is_finite()) {
            return Err(NebulaError::validation(
                "starfield sizes must satisfy 0 < min_size <= max_size",
            ));
        }
        Ok(())
    }
}

/// One placeholder star.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    /// World position.
    pub position: Vec3,
    /// World-space diameter.
    pub size: f32,
}

/// Generated star cloud. Never updated after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    /// Scatter `config.count` stars using `seed`.
    pub fn generate(config: &StarfieldConfig, seed: u64) -> NebulaResult<Self> {
        config.validate()?;
        let mut stars = Vec::new();
        stars.try_reserve_exact(config.count).map_err(|e| {
            NebulaError::allocation(format!("starfield of {} stars: {e}", config.count))
        })?;

        let mut rng = Rng64::new(seed);
        let size_span = config.max_size - config.min_size;
        for _ in 0..config.count {
            let x = (rng.next_f32_01() - 0.5) * config.extent;
            let y = (rng.next_f32_01() - 0.5) * config.extent;
            let z = (rng.next_f32_01() - 0.5) * config.extent + config.z_offset;
            stars.push(Star {
                position: Vec3::new(x, y, z),
                size: config.min_size + rng.next_f32_01() * size_span,
            });
        }
        Ok(Self { stars })
    }

    /// A starfield with no stars.
    pub fn empty() -> Self {
        Self { stars: Vec::new() }
    }

    /// Stars in generation order.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Number of stars.
    pub fn len(&self) -> usize {
        self.stars.len()
    }

    /// Return `true` when there are no stars.
    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/starfield.rs"]
mod tests;
