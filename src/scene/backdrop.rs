//! The mounted backdrop: environment, wave surface and particle fields driven together, with a
//! static starfield standing in when the live scene cannot be mounted.

use crate::eval::tick::Tick;
use crate::field::particles::{ParticleField, PointBuffer};
use crate::field::starfield::Starfield;
use crate::field::wave::{SurfaceMesh, WaveSurface};
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::scene::component::Mount;
use crate::scene::config::BackdropConfig;
use crate::scene::environment::SceneEnvironment;
use crate::scene::stage::Stage;

const SHELL_SEED_SALT: u64 = 0x5348_454c_4c;

/// What a call to [`Backdrop::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Every live component advanced.
    Advanced,
    /// The stage was unavailable; nothing changed.
    Skipped,
    /// The placeholder is shown; it has no per-frame update.
    Static,
}

struct LiveScene {
    environment: Mount<SceneEnvironment>,
    wave: Mount<WaveSurface>,
    galaxy: Mount<ParticleField>,
    shell: Option<Mount<ParticleField>>,
}

impl LiveScene {
    fn mount(config: &BackdropConfig, stage: &mut Stage) -> NebulaResult<Self> {
        let mut environment = Mount::new(SceneEnvironment::new(config.environment), stage)?;

        let mut wave = match Mount::new(WaveSurface::new(config.wave.clone()), stage) {
            Ok(m) => m,
            Err(e) => {
                environment.dispose(stage);
                return Err(e);
            }
        };

        let galaxy = ParticleField::new("galaxy", config.galaxy.clone(), config.seed);
        let mut galaxy = match Mount::new(galaxy, stage) {
            Ok(m) => m,
            Err(e) => {
                wave.dispose(stage);
                environment.dispose(stage);
                return Err(e);
            }
        };

        let shell = config
            .shell
            .as_ref()
            .map(|shell| {
                let seed = config.seed ^ SHELL_SEED_SALT;
                Mount::new(ParticleField::new("shell", shell.clone(), seed), stage)
            })
            .transpose();
        let shell = match shell {
            Ok(m) => m,
            Err(e) => {
                galaxy.dispose(stage);
                wave.dispose(stage);
                environment.dispose(stage);
                return Err(e);
            }
        };

        Ok(Self {
            environment,
            wave,
            galaxy,
            shell,
        })
    }

    fn advance(&mut self, tick: &Tick) -> NebulaResult<()> {
        self.environment.advance(tick)?;
        self.wave.advance(tick)?;
        self.galaxy.advance(tick)?;
        if let Some(shell) = &mut self.shell {
            shell.advance(tick)?;
        }
        Ok(())
    }

    fn dispose(&mut self, stage: &mut Stage) {
        if let Some(shell) = &mut self.shell {
            shell.dispose(stage);
        }
        self.galaxy.dispose(stage);
        self.wave.dispose(stage);
        self.environment.dispose(stage);
    }
}

enum State {
    Live(Box<LiveScene>),
    Placeholder(Starfield),
    Unmounted,
}

/// A particle field together with its current buffer.
#[derive(Clone, Copy, Debug)]
pub struct FieldView<'a> {
    /// Field definition.
    pub field: &'a ParticleField,
    /// Current positions and colors.
    pub points: &'a PointBuffer,
}

/// Borrowed state of a live backdrop, in draw order.
#[derive(Clone, Debug)]
pub struct LiveView<'a> {
    /// Surface definition.
    pub wave: &'a WaveSurface,
    /// Current surface mesh.
    pub mesh: &'a SurfaceMesh,
    /// Particle fields, galaxy first.
    pub fields: Vec<FieldView<'a>>,
}

/// What a renderer should draw for the current frame.
#[derive(Clone, Debug)]
pub enum BackdropView<'a> {
    /// The animated scene.
    Live(LiveView<'a>),
    /// The static fallback.
    Placeholder(&'a Starfield),
    /// Nothing; the backdrop has been torn down.
    Unmounted,
}

/// Animated portfolio backdrop bound to a host stage.
pub struct Backdrop {
    config: BackdropConfig,
    state: State,
}

impl std::fmt::Debug for Backdrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            State::Live(_) => "live",
            State::Placeholder(_) => "placeholder",
            State::Unmounted => "unmounted",
        };
        f.debug_struct("Backdrop").field("state", &state).finish()
    }
}

impl Backdrop {
    /// Mount the backdrop on `stage`.
    ///
    /// An invalid `config` is an error. A stage that cannot take the live scene (unavailable
    /// context, failed buffer allocation) is not: the backdrop degrades to the static starfield
    /// and logs a warning. Partially mounted components are disposed before falling back, so the
    /// stage is left as it was found.
    #[tracing::instrument(skip_all, fields(canvas = ?config.canvas))]
    pub fn mount(config: BackdropConfig, stage: &mut Stage) -> NebulaResult<Self> {
        config.validate()?;
        let state = match LiveScene::mount(&config, stage) {
            Ok(live) => {
                tracing::debug!("live backdrop mounted");
                State::Live(Box::new(live))
            }
            Err(e) if e.is_mount_failure() => {
                tracing::warn!(error = %e, "backdrop mount failed; showing static starfield");
                State::Placeholder(placeholder_stars(&config))
            }
            Err(e) => return Err(e),
        };
        Ok(Self { config, state })
    }

    /// Definition the backdrop was mounted with.
    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    /// Return `true` when the animated scene is mounted.
    pub fn is_live(&self) -> bool {
        matches!(self.state, State::Live(_))
    }

    /// Return `true` when the static placeholder is shown.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.state, State::Placeholder(_))
    }

    /// Return `true` after [`Backdrop::unmount`].
    pub fn is_unmounted(&self) -> bool {
        matches!(self.state, State::Unmounted)
    }

    /// Per-frame update.
    ///
    /// An unavailable stage skips the tick without touching any buffer. Ticking after unmount
    /// returns [`NebulaError::Disposed`].
    pub fn tick(&mut self, stage: &Stage, tick: &Tick) -> NebulaResult<TickOutcome> {
        match &mut self.state {
            State::Unmounted => Err(NebulaError::disposed("backdrop ticked after unmount")),
            State::Placeholder(_) => Ok(TickOutcome::Static),
            State::Live(live) => {
                if !stage.is_available() {
                    tracing::debug!(elapsed = tick.elapsed, "stage unavailable; tick skipped");
                    return Ok(TickOutcome::Skipped);
                }
                live.advance(tick)?;
                Ok(TickOutcome::Advanced)
            }
        }
    }

    /// Tear down in reverse mount order, restoring the stage. Idempotent.
    #[tracing::instrument(skip_all)]
    pub fn unmount(&mut self, stage: &mut Stage) {
        match std::mem::replace(&mut self.state, State::Unmounted) {
            State::Live(mut live) => {
                live.dispose(stage);
                tracing::debug!("live backdrop unmounted");
            }
            State::Placeholder(_) => tracing::debug!("placeholder unmounted"),
            State::Unmounted => {}
        }
    }

    /// Borrow the drawable state.
    pub fn view(&self) -> BackdropView<'_> {
        match &self.state {
            State::Unmounted => BackdropView::Unmounted,
            State::Placeholder(stars) => BackdropView::Placeholder(stars),
            State::Live(live) => {
                live_view(live).map_or(BackdropView::Unmounted, BackdropView::Live)
            }
        }
    }
}

fn field_view(mount: &Mount<ParticleField>) -> Option<FieldView<'_>> {
    Some(FieldView {
        field: mount.component(),
        points: mount.buffers()?,
    })
}

fn live_view(live: &LiveScene) -> Option<LiveView<'_>> {
    let mut fields = vec![field_view(&live.galaxy)?];
    if let Some(shell) = &live.shell {
        fields.push(field_view(shell)?);
    }
    Some(LiveView {
        wave: live.wave.component(),
        mesh: live.wave.buffers()?,
        fields,
    })
}

/// The fallback never fails: a starfield that cannot be generated leaves an empty sky.
fn placeholder_stars(config: &BackdropConfig) -> Starfield {
    Starfield::generate(&config.starfield, config.seed).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "starfield unavailable; placeholder is empty");
        Starfield::empty()
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/backdrop.rs"]
mod tests;
