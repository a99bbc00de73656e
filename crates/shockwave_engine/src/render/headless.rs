//! Headless render backend
//!
//! Records object poses and frame submissions without touching a GPU.
//! Objects live in a slotmap pool; handles round-trip through the key's
//! FFI representation, so a destroyed object's handle can never resolve
//! to a newer object.

use slotmap::{DefaultKey, Key, KeyData, SlotMap};

use crate::ecs::components::RenderableComponent;
use crate::foundation::math::{Quat, Vec3};

use super::backend::{CameraPose, ObjectHandle, RenderBackend, RenderError, RenderResult};

/// A visual object tracked by the headless backend
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    /// Model asset path the object was created from
    pub model_path: String,

    /// Latest world position
    pub position: Vec3,

    /// Latest world orientation
    pub rotation: Quat,

    /// Latest world scale
    pub scale: Vec3,
}

/// Render backend that records state instead of drawing
#[derive(Default)]
pub struct HeadlessBackend {
    objects: SlotMap<DefaultKey, ObjectRecord>,
    camera: CameraPose,
    frames_drawn: u64,
}

impl HeadlessBackend {
    /// Create a new empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames submitted so far
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Latest camera pose
    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    /// Record behind `handle`, if live
    pub fn object(&self, handle: ObjectHandle) -> Option<&ObjectRecord> {
        self.objects.get(Self::key(handle))
    }

    fn key(handle: ObjectHandle) -> DefaultKey {
        KeyData::from_ffi(handle.0).into()
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_object(&mut self, renderable: &RenderableComponent) -> RenderResult<ObjectHandle> {
        let key = self.objects.insert(ObjectRecord {
            model_path: renderable.model_path.clone(),
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        });
        Ok(ObjectHandle(key.data().as_ffi()))
    }

    fn destroy_object(&mut self, handle: ObjectHandle) -> RenderResult<()> {
        self.objects
            .remove(Self::key(handle))
            .map(|_| ())
            .ok_or(RenderError::StaleHandle(handle))
    }

    fn set_object_transform(
        &mut self,
        handle: ObjectHandle,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> RenderResult<()> {
        let record = self
            .objects
            .get_mut(Self::key(handle))
            .ok_or(RenderError::StaleHandle(handle))?;
        record.position = position;
        record.rotation = rotation;
        record.scale = scale;
        Ok(())
    }

    fn set_camera(&mut self, camera: &CameraPose) {
        self.camera = camera.clone();
    }

    fn draw_frame(&mut self) -> RenderResult<()> {
        self.frames_drawn += 1;
        Ok(())
    }

    fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_round_trip_and_go_stale() {
        let mut backend = HeadlessBackend::new();
        let handle = backend
            .create_object(&RenderableComponent::new("crate"))
            .unwrap();

        assert_eq!(backend.object(handle).unwrap().model_path, "crate");
        backend.destroy_object(handle).unwrap();
        assert!(backend.object(handle).is_none());
        assert!(matches!(
            backend.destroy_object(handle),
            Err(RenderError::StaleHandle(_))
        ));
    }

    #[test]
    fn transforms_are_recorded() {
        let mut backend = HeadlessBackend::new();
        let handle = backend
            .create_object(&RenderableComponent::new("crate"))
            .unwrap();
        backend
            .set_object_transform(
                handle,
                Vec3::new(1.0, 2.0, 3.0),
                Quat::identity(),
                Vec3::new(2.0, 2.0, 2.0),
            )
            .unwrap();

        let record = backend.object(handle).unwrap();
        assert_eq!(record.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(record.scale, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn draw_frame_counts_submissions() {
        let mut backend = HeadlessBackend::new();
        backend.draw_frame().unwrap();
        backend.draw_frame().unwrap();
        assert_eq!(backend.frames_drawn(), 2);
    }
}
