//! Player-controlled character
//!
//! Тот же Locomotion Integrator что и у агента; отличие только в источнике intent:
//! PlayerInput (заполняет хост) вместо AI FSM.

use bevy::prelude::*;
use crate::combat::{melee_strike, DamageEvent, MeleeAttack};
use crate::components::{Body2D, Facing, Health, MoveIntent};
use crate::physics::{Collider2D, CollisionScene, LocomotionController, Tag, LAYER_ACTORS};
use crate::presentation::{AnimationCue, Cue};
use crate::SimulationSet;

/// Marker component для player-controlled entity
///
/// Акторы С этим компонентом получают intent от input, а не от AI FSM.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Facing, Body2D, MoveIntent, PlayerInput)]
pub struct Player;

/// Сырой input на текущий тик (хост пишет перед каждым тиком)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    /// Horizontal axis [-1, 1]
    pub horizontal: f32,
    /// Jump нажат в этом тике (edge)
    pub jump_pressed: bool,
    /// Jump удерживается
    pub jump_held: bool,
    /// Attack нажат в этом тике (edge)
    pub attack_pressed: bool,
}

/// PlayerInput → MoveIntent (чистая функция)
pub fn intent_from_input(input: &PlayerInput) -> MoveIntent {
    let horizontal = if input.horizontal.is_finite() {
        input.horizontal.clamp(-1.0, 1.0)
    } else {
        0.0
    };

    MoveIntent {
        x: horizontal,
        jump_pressed: input.jump_pressed,
        jump_held: input.jump_held,
    }
}

/// Система: player input → MoveIntent + attack
///
/// Attack только с земли: TriggerAttack cue + melee strike по всем в круге удара.
/// `grounded` берётся с прошлого тика (ground_detection идёт позже в Locomotion).
pub fn player_intent_from_input(
    mut players: Query<
        (
            Entity,
            &Transform,
            &Facing,
            &PlayerInput,
            &mut MoveIntent,
            Option<&LocomotionController>,
            Option<&MeleeAttack>,
        ),
        With<Player>,
    >,
    colliders: Query<(Entity, &Transform, &Collider2D, Option<&Tag>)>,
    mut cues: EventWriter<AnimationCue>,
    mut damage: EventWriter<DamageEvent>,
) {
    for (entity, transform, facing, input, mut intent, controller, melee) in players.iter_mut() {
        let next = intent_from_input(input);
        if *intent != next {
            *intent = next;
        }

        let grounded = controller.is_some_and(|c| c.grounded);
        if !input.attack_pressed || !grounded {
            continue;
        }

        cues.write(AnimationCue::new(entity, Cue::TriggerAttack));

        let Some(melee) = melee else {
            continue;
        };

        let scene = CollisionScene::from_query(colliders.iter());
        for hit in melee_strike(&scene, entity, transform.translation.truncate(), *facing, melee) {
            crate::log(&format!("⚔️ Player {:?} hits {:?}", entity, hit.target));
            damage.write(hit);
        }
    }
}

/// Spawn helper для player-controlled тела (tag "Player", melee по умолчанию)
pub fn spawn_player(commands: &mut Commands, position: Vec2, locomotion: LocomotionController) -> Entity {
    commands
        .spawn((
            Player,
            Transform::from_translation(position.extend(0.0)),
            locomotion,
            MeleeAttack::default(),
            Collider2D::circle(0.4, LAYER_ACTORS),
            Tag::new("Player"),
        ))
        .id()
}

/// Player Plugin
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Player>()
            .register_type::<PlayerInput>()
            .add_systems(
                FixedUpdate,
                player_intent_from_input
                    .in_set(SimulationSet::Behavior)
                    .after(crate::ai::systems::ai_fsm_transitions),
            );
    }
}
