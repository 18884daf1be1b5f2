use super::*;

fn camera() -> Camera {
    Camera::new(
        &CameraConfig::default(),
        Canvas {
            width: 200,
            height: 100,
        },
    )
}

#[test]
fn target_projects_to_canvas_center() {
    let p = camera().project(Vec3::ZERO).unwrap();
    assert!(p.pixel.abs_diff_eq(Vec2::new(100.0, 50.0), 1e-3));
    let expected = Vec3::new(0.0, 3.0, 15.0).length();
    assert!((p.depth - expected).abs() < 1e-4);
}

#[test]
fn points_behind_the_eye_are_culled() {
    assert!(camera().project(Vec3::new(0.0, 3.0, 20.0)).is_none());
}

#[test]
fn screen_axes_follow_world_axes() {
    let cam = camera();
    let right = cam.project(Vec3::new(1.0, 0.0, 0.0)).unwrap();
    let up = cam.project(Vec3::new(0.0, 1.0, 0.0)).unwrap();
    assert!(right.pixel.x > 100.0);
    assert!(up.pixel.y < 50.0);
}

#[test]
fn point_scale_is_half_height() {
    assert_eq!(camera().point_scale(), 50.0);
}

#[test]
fn invalid_placements_are_rejected() {
    let cfg = CameraConfig {
        near: 0.0,
        ..CameraConfig::default()
    };
    assert!(cfg.validate().is_err());
    let cfg = CameraConfig {
        target: [0.0, 3.0, 15.0],
        ..CameraConfig::default()
    };
    assert!(cfg.validate().is_err());
    assert!(CameraConfig::default().validate().is_ok());
}
