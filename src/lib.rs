//! Nebula is an animated 3D backdrop: a noise-driven wave surface, a spiral galaxy of drifting
//! particles and a floating star shell, lit by a night environment with fog and filmic tone
//! mapping.
//!
//! The public API follows the host-driven lifecycle:
//!
//! - Describe the scene with a [`BackdropConfig`]
//! - [`Backdrop::mount`] it on a [`Stage`]; a stage that cannot take the live scene gets a static
//!   [`Starfield`] instead
//! - Call [`Backdrop::tick`] once per host frame and draw with a [`RenderBackend`]
//! - [`Backdrop::unmount`] to restore the stage
//!
//! For offline output, [`render_frame`] and [`render_range`] drive the same lifecycle on a
//! fixed-rate clock and stream frames into a [`FrameSink`].
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod encode;
pub(crate) mod eval;
pub(crate) mod field;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod settings;

pub use crate::foundation::core::{
    Canvas, Fps, FrameIndex, FrameRange, Mat3, Mat4, Point, Rgb, SrgbHex, Vec2, Vec3,
    linear_to_srgb, srgb_to_linear,
};
pub use crate::foundation::error::{NebulaError, NebulaResult};
pub use crate::foundation::math::Rng64;

pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, unpremultiply_rgba8, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::eval::tick::{AnimationClock, PointerPath, Tick, TickSource};
pub use crate::field::noise::perlin3;
pub use crate::field::particles::{
    Distribution, DriftParams, FloatParams, GalaxyParams, Motion, ParticleField,
    ParticleFieldConfig, PointBuffer, PointStyle, ShellParams,
};
pub use crate::field::starfield::{MAX_STARS, Star, Starfield, StarfieldConfig};
pub use crate::field::tumble::Tumble;
pub use crate::field::wave::{Octave, Ripple, SurfaceMesh, WaveSurface, WaveSurfaceConfig};
pub use crate::render::backend::{
    BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
pub use crate::render::camera::{Camera, CameraConfig, Projected};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::pipeline::{PipelineOpts, RenderStats, render_frame, render_range};
pub use crate::render::tonemap::aces_filmic;
pub use crate::scene::backdrop::{Backdrop, BackdropView, FieldView, LiveView, TickOutcome};
pub use crate::scene::component::{Component, Mount};
pub use crate::scene::config::BackdropConfig;
pub use crate::scene::environment::{EnvironmentConfig, SceneEnvironment};
pub use crate::scene::stage::{FogExp2, Stage, ToneMapping};
pub use crate::settings::{Settings, SettingsStore};
