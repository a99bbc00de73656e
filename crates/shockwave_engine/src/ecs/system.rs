//! System trait and scheduling contract

use thiserror::Error;

use super::world::{World, WorldError};

/// Errors a system may raise from its hooks
#[derive(Error, Debug)]
pub enum SystemError {
    /// A world write failed
    #[error(transparent)]
    World(#[from] WorldError),

    /// A wrapped backend refused or failed an operation
    #[error("backend failure: {0}")]
    Backend(String),
}

/// A scheduled unit of per-frame logic
///
/// Systems are the only actors that read or mutate entity state, and they
/// do so exclusively through the [`World`] accessor API and its event
/// bus. `init` runs exactly once before the frame loop starts; `update`
/// runs once per frame, strictly one system after another in ascending
/// `priority` order, so a system may rely on components written by a
/// lower-priority system earlier in the same frame.
///
/// Locally recoverable problems (an entity whose backend object is
/// missing) should be skipped for the frame, not raised; an error returned
/// from either hook is fatal to the frame loop under the default policy.
pub trait System {
    /// Name used in logs and failure context
    fn name(&self) -> &str;

    /// Scheduling priority; lower runs earlier in the frame
    fn priority(&self) -> i32;

    /// One-time setup against the world, before any update
    fn init(&mut self, world: &mut World) -> Result<(), SystemError> {
        let _ = world;
        Ok(())
    }

    /// Per-frame work; `dt` is the elapsed time since the previous frame
    /// in seconds
    fn update(&mut self, world: &mut World, dt: f32) -> Result<(), SystemError>;
}
