use crate::eval::tick::Tick;
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::scene::stage::Stage;

/// Mount / advance / unmount contract shared by every backdrop component.
///
/// `advance` must be a pure recomputation from the tick and the component's own buffers so a
/// skipped tick never leaves state half-updated.
pub trait Component {
    /// Buffers allocated at mount and owned exclusively by the component.
    type Buffers;

    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Allocate buffers and apply any one-time stage side effects.
    fn initialize(&self, stage: &mut Stage) -> NebulaResult<Self::Buffers>;

    /// Recompute buffers in place for `tick`.
    fn advance(&self, buffers: &mut Self::Buffers, tick: &Tick);

    /// Undo stage side effects and release buffers.
    fn dispose(&self, stage: &mut Stage, buffers: Self::Buffers) {
        let _ = stage;
        drop(buffers);
    }
}

/// A component together with its mounted buffers.
///
/// After [`Mount::dispose`] the buffers are gone; further [`Mount::advance`] calls return
/// [`NebulaError::Disposed`] instead of touching freed state.
pub struct Mount<C: Component> {
    component: C,
    buffers: Option<C::Buffers>,
}

impl<C: Component> Mount<C> {
    /// Initialize `component` against `stage`.
    pub fn new(component: C, stage: &mut Stage) -> NebulaResult<Self> {
        let buffers = component.initialize(stage)?;
        tracing::debug!(component = component.name(), "mounted");
        Ok(Self {
            component,
            buffers: Some(buffers),
        })
    }

    /// Advance the mounted buffers to `tick`.
    pub fn advance(&mut self, tick: &Tick) -> NebulaResult<()> {
        let Some(buffers) = self.buffers.as_mut() else {
            return Err(NebulaError::disposed(format!(
                "{} advanced after dispose",
                self.component.name()
            )));
        };
        self.component.advance(buffers, tick);
        Ok(())
    }

    /// Dispose the buffers. Calling this twice is a no-op.
    pub fn dispose(&mut self, stage: &mut Stage) {
        if let Some(buffers) = self.buffers.take() {
            self.component.dispose(stage, buffers);
            tracing::debug!(component = self.component.name(), "disposed");
        }
    }

    /// Whether buffers are still mounted.
    pub fn is_mounted(&self) -> bool {
        self.buffers.is_some()
    }

    /// The component definition.
    pub fn component(&self) -> &C {
        &self.component
    }

    /// Mounted buffers, if any.
    pub fn buffers(&self) -> Option<&C::Buffers> {
        self.buffers.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/component.rs"]
mod tests;
