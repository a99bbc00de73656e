//! Player controller component

use std::f32::consts::FRAC_PI_4;

use serde::{Deserialize, Serialize};

use crate::ecs::Component;

/// Tuning for a player-controlled character
///
/// Pure data; the player movement system consumes it each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerControllerComponent {
    /// Horizontal movement speed in units per second
    pub move_speed: f32,

    /// Vertical velocity applied on jump
    pub jump_force: f32,

    /// Fraction of steering authority retained while airborne (0..=1)
    pub air_control: f32,

    /// Capsule height while crouched
    pub crouch_height: f32,

    /// Capsule height while standing
    pub stand_height: f32,

    /// Steepest walkable slope in radians
    pub slope_limit: f32,
}

impl Component for PlayerControllerComponent {
    fn type_name() -> &'static str {
        "PlayerController"
    }
}

impl Default for PlayerControllerComponent {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 8.0,
            air_control: 0.1,
            crouch_height: 0.5,
            stand_height: 1.8,
            slope_limit: FRAC_PI_4,
        }
    }
}
