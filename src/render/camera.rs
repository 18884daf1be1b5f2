use crate::foundation::core::{Canvas, Mat4, Vec2, Vec3};
use crate::foundation::error::{NebulaError, NebulaResult};

/// Fixed perspective camera placement.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position.
    pub position: [f32; 3],
    /// Point looked at.
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 3.0, 15.0],
            target: [0.0, 0.0, 0.0],
            fov_y_deg: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    /// Check the placement.
    pub fn validate(&self) -> NebulaResult<()> {
        if !(self.fov_y_deg > 0.0 && self.fov_y_deg < 180.0) {
            return Err(NebulaError::validation("camera fov_y_deg must be within (0, 180)"));
        }
        if !(self.near > 0.0 && self.near < self.far && self.far.is_finite()) {
            return Err(NebulaError::validation("camera clip range must satisfy 0 < near < far"));
        }
        if Vec3::from(self.position) == Vec3::from(self.target) {
            return Err(NebulaError::validation("camera position and target must differ"));
        }
        Ok(())
    }
}

/// A world point mapped onto the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    /// Pixel position, origin top-left, `+y` down.
    pub pixel: Vec2,
    /// Distance in front of the eye along the view axis.
    pub depth: f32,
}

/// Perspective camera bound to a canvas.
#[derive(Clone, Debug)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
    width: f32,
    height: f32,
    near: f32,
    far: f32,
}

impl Camera {
    /// Camera for `canvas` placed per `config`.
    pub fn new(config: &CameraConfig, canvas: Canvas) -> Self {
        let view = Mat4::look_at_rh(config.position.into(), config.target.into(), Vec3::Y);
        let projection = Mat4::perspective_rh(
            config.fov_y_deg.to_radians(),
            canvas.aspect(),
            config.near,
            config.far,
        );
        Self {
            view,
            projection,
            view_projection: projection * view,
            width: canvas.width as f32,
            height: canvas.height as f32,
            near: config.near,
            far: config.far,
        }
    }

    /// World to view transform.
    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// View to clip transform.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// World to clip transform.
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    /// Pixels per world unit at unit depth, used for point size attenuation.
    pub fn point_scale(&self) -> f32 {
        self.height * 0.5
    }

    /// Project a world-space point. `None` when it falls outside the clip range.
    pub fn project(&self, world: Vec3) -> Option<Projected> {
        let depth = -self.view.transform_point3(world).z;
        if !(self.near..=self.far).contains(&depth) {
            return None;
        }
        let ndc = self.view_projection.project_point3(world);
        Some(Projected {
            pixel: Vec2::new(
                (ndc.x + 1.0) * 0.5 * self.width,
                (1.0 - ndc.y) * 0.5 * self.height,
            ),
            depth,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/camera.rs"]
mod tests;
