//! Physics module
//!
//! Locomotion Integrator, ground probe, headless collision backend.

use bevy::prelude::*;
use crate::SimulationSet;

pub mod collision;
pub mod movement;

// Re-export основных типов
pub use collision::{
    Collider2D, CollisionScene, EnvironmentQueries, RayHit, Shape2D, Tag, LAYER_ACTORS,
    LAYER_GROUND, LAYER_PROPS, MASK_GROUND_PROBE, MASK_SIGHT,
};
pub use movement::{
    integrate, jump_velocity, DoubleJumpWindow, GroundProbe, LocomotionController,
    LocomotionStep, WorldGravity, DOUBLE_JUMP_DELAY,
};

/// Plugin для Locomotion Integrator
///
/// Порядок внутри SimulationSet::Locomotion:
/// 1. ground_detection: circle overlap у ног
/// 2. integrate_locomotion: intent → velocity, facing, cues
/// 3. integrate_velocity_to_transform: headless backend (position += v * dt)
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldGravity>()
            .register_type::<LocomotionController>()
            .register_type::<Collider2D>()
            .register_type::<Tag>()
            .add_systems(
                FixedUpdate,
                (
                    movement::ground_detection,
                    movement::integrate_locomotion,
                    movement::integrate_velocity_to_transform,
                )
                    .chain()
                    .in_set(SimulationSet::Locomotion),
            );
    }
}
