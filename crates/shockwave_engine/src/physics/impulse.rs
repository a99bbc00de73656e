//! Built-in impulse integrator backend
//!
//! A deliberately small rigid-body stand-in: semi-implicit Euler under
//! gravity on a fixed internal substep, support contact against static
//! boxes, and ray queries against box, sphere, and capsule bodies. The
//! [`PhysicsBackend`] trait is the seam for wrapping a full simulation
//! engine; nothing outside this file depends on how bodies are integrated.
//!
//! Boxes are treated as axis-aligned for contact and ray tests.

use std::collections::HashMap;

use crate::ecs::components::{BodyShape, BodyType};
use crate::ecs::Entity;
use crate::foundation::math::{Quat, Vec3};

use super::backend::{BodyDesc, PhysicsBackend, PhysicsError, PhysicsResult, RayHit};
use super::layers;

/// Rays shorter than this never report a hit
const RAY_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone)]
struct Body {
    body_type: BodyType,
    shape: BodyShape,
    layer: u32,
    mask: u32,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
}

impl Body {
    /// Half extents of the axis-aligned bounds enclosing the shape
    fn half_extents(&self) -> Vec3 {
        match &self.shape {
            BodyShape::Box { half_extents } => *half_extents,
            BodyShape::Sphere { radius } => Vec3::new(*radius, *radius, *radius),
            BodyShape::Capsule { radius, height } => {
                Vec3::new(*radius, radius + height / 2.0, *radius)
            }
            // Mesh bodies are refused at construction time.
            BodyShape::Mesh { .. } => Vec3::zeros(),
        }
    }
}

/// Fixed-substep integrating backend
///
/// The internal accumulator decouples substepping from the outer
/// variable-length frame `dt`: each [`PhysicsBackend::step`] consumes
/// whole substeps of `fixed_timestep` seconds, up to `max_substeps`,
/// and carries the remainder into the next frame.
pub struct ImpulseBackend {
    bodies: HashMap<Entity, Body>,
    gravity: Vec3,
    fixed_timestep: f32,
    max_substeps: u32,
    accumulator: f32,
}

impl ImpulseBackend {
    /// Create a backend stepping at `fixed_timestep` seconds, consuming
    /// at most `max_substeps` substeps per frame
    pub fn new(gravity: Vec3, fixed_timestep: f32, max_substeps: u32) -> Self {
        Self {
            bodies: HashMap::new(),
            gravity,
            fixed_timestep,
            max_substeps,
            accumulator: 0.0,
        }
    }

    fn substep(&mut self, h: f32) {
        // Static boxes are the support surfaces everything can rest on.
        let supports: Vec<(Entity, Vec3, Vec3, u32, u32)> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.body_type == BodyType::Static)
            .filter(|(_, body)| matches!(body.shape, BodyShape::Box { .. }))
            .map(|(&entity, body)| {
                (
                    entity,
                    body.position,
                    body.half_extents(),
                    body.layer,
                    body.mask,
                )
            })
            .collect();
        let gravity = self.gravity;

        for (&entity, body) in self.bodies.iter_mut() {
            match body.body_type {
                BodyType::Static => {}
                BodyType::Kinematic => {
                    body.position += body.velocity * h;
                }
                BodyType::Dynamic => {
                    body.velocity += gravity * h;
                    body.position += body.velocity * h;

                    let body_half = body.half_extents();
                    for &(support, center, half, layer, mask) in &supports {
                        if support == entity
                            || !layers::interacts(body.layer, body.mask, layer, mask)
                        {
                            continue;
                        }
                        let inside_x = (body.position.x - center.x).abs() <= half.x + body_half.x;
                        let inside_z = (body.position.z - center.z).abs() <= half.z + body_half.z;
                        if !inside_x || !inside_z {
                            continue;
                        }
                        let top = center.y + half.y;
                        let penetration = top - (body.position.y - body_half.y);
                        // Support from above only: snap out when the body
                        // overlaps the slab top, not when it passed below it.
                        if penetration > 0.0 && penetration <= body_half.y + half.y {
                            body.position.y = top + body_half.y;
                            if body.velocity.y < 0.0 {
                                body.velocity.y = 0.0;
                            }
                        }
                    }
                }
            }
        }
    }

    fn ray_aabb(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::zeros();

        for axis in 0..3 {
            if dir[axis].abs() < RAY_EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
            } else {
                let inv = 1.0 / dir[axis];
                let mut t0 = (min[axis] - origin[axis]) * inv;
                let mut t1 = (max[axis] - origin[axis]) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                if t0 > t_enter {
                    t_enter = t0;
                    normal = Vec3::zeros();
                    normal[axis] = -dir[axis].signum();
                }
                t_exit = t_exit.min(t1);
                if t_enter > t_exit {
                    return None;
                }
            }
        }

        // A non-positive entry time means the origin is inside or the box
        // is behind the ray; neither counts as a hit.
        if t_enter <= RAY_EPSILON {
            return None;
        }
        Some((t_enter, normal))
    }
}

impl PhysicsBackend for ImpulseBackend {
    fn add_body(&mut self, entity: Entity, desc: &BodyDesc) -> PhysicsResult<()> {
        if matches!(desc.shape, BodyShape::Mesh { .. }) {
            return Err(PhysicsError::UnsupportedShape {
                entity,
                shape: desc.shape.kind(),
            });
        }
        self.bodies.insert(
            entity,
            Body {
                body_type: desc.body_type,
                shape: desc.shape.clone(),
                layer: desc.layer,
                mask: desc.mask,
                position: desc.position,
                rotation: desc.rotation,
                velocity: Vec3::zeros(),
            },
        );
        Ok(())
    }

    fn remove_body(&mut self, entity: Entity) {
        self.bodies.remove(&entity);
    }

    fn has_body(&self, entity: Entity) -> bool {
        self.bodies.contains_key(&entity)
    }

    fn bodies(&self) -> Vec<Entity> {
        self.bodies.keys().copied().collect()
    }

    fn body_pose(&self, entity: Entity) -> Option<(Vec3, Quat)> {
        self.bodies
            .get(&entity)
            .map(|body| (body.position, body.rotation))
    }

    fn body_velocity(&self, entity: Entity) -> Option<Vec3> {
        self.bodies.get(&entity).map(|body| body.velocity)
    }

    fn set_body_velocity(&mut self, entity: Entity, velocity: Vec3) -> PhysicsResult<()> {
        let body = self
            .bodies
            .get_mut(&entity)
            .ok_or(PhysicsError::MissingBody(entity))?;
        body.velocity = velocity;
        Ok(())
    }

    fn set_body_rotation(&mut self, entity: Entity, rotation: Quat) -> PhysicsResult<()> {
        let body = self
            .bodies
            .get_mut(&entity)
            .ok_or(PhysicsError::MissingBody(entity))?;
        body.rotation = rotation;
        Ok(())
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn step(&mut self, dt: f32) {
        self.accumulator += dt.max(0.0);
        let mut substeps = 0;
        while self.accumulator >= self.fixed_timestep && substeps < self.max_substeps {
            self.substep(self.fixed_timestep);
            self.accumulator -= self.fixed_timestep;
            substeps += 1;
        }
        // Drop time the budget cannot absorb instead of spiraling.
        if self.accumulator > self.fixed_timestep {
            self.accumulator = self.fixed_timestep;
        }
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let norm = direction.norm();
        if norm < RAY_EPSILON {
            return None;
        }
        let dir = direction / norm;

        let mut best: Option<RayHit> = None;
        for (&entity, body) in &self.bodies {
            let half = body.half_extents();
            let hit = Self::ray_aabb(origin, dir, body.position - half, body.position + half);
            if let Some((distance, normal)) = hit {
                if distance <= max_distance
                    && best.as_ref().map_or(true, |b| distance < b.distance)
                {
                    best = Some(RayHit {
                        entity,
                        point: origin + dir * distance,
                        normal,
                        distance,
                    });
                }
            }
        }
        best
    }
}
