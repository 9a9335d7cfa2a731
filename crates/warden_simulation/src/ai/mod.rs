//! AI decision-making module
//!
//! Simple FSM для автономного агента: Idle → Patrol → Chase → Attack.
//! Вход — Perception этого тика, выход — MoveIntent + presentation cues.

use bevy::prelude::*;
use crate::SimulationSet;

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::{AIConfig, AIState, PatrolRoute, DEFAULT_IDLE_DURATION};
pub use systems::{evaluate, select_waypoint, BehaviorContext, BehaviorDecision};

/// AI Plugin
///
/// Регистрирует FSM в SimulationSet::Behavior (после Perception, до Locomotion).
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<AIState>()
            .register_type::<AIConfig>()
            .register_type::<PatrolRoute>()
            .add_systems(
                FixedUpdate,
                systems::ai_fsm_transitions.in_set(SimulationSet::Behavior),
            );
    }
}
