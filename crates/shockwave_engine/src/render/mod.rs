//! Render integration
//!
//! Drawing happens behind the narrow [`RenderBackend`] trait; the
//! [`RenderSystem`] owns the entity-to-object shadow map and reconciles
//! it against the world by diffing the renderable query each frame. The
//! [`HeadlessBackend`] records state instead of drawing and is the
//! default for tests and windowless runtimes.

pub mod backend;
pub mod headless;
pub mod system;

pub use backend::{CameraPose, ObjectHandle, RenderBackend, RenderError, RenderResult};
pub use headless::HeadlessBackend;
pub use system::RenderSystem;
