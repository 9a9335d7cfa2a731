//! Headless симуляция WARDEN
//!
//! Уровень: пол, два waypoint, агент и игрок. 600 фиксированных тиков (10 секунд),
//! binary сам играет роль animation layer (читает cues, пишет AnimationFeedback).

use bevy::prelude::*;
use std::collections::HashMap;
use warden_simulation::physics::LAYER_GROUND;
use warden_simulation::{
    advance_fixed_tick, create_headless_app, log_error, log_info, spawn_agent, spawn_player,
    spawn_waypoint, AIState, AgentConfig, AnimationCue, AnimationFeedback, Collider2D, ConfigError,
    Cue, Facing, Health, LocomotionController, PlayerInput,
};

const TICKS: u32 = 600;
const TICK_DELTA: f32 = 1.0 / 60.0;
/// Длина клипа атаки в тиках (вместо реального animator'а)
const ATTACK_CLIP_TICKS: u32 = 30;
/// Игрок бьёт раз в N тиков
const PLAYER_ATTACK_PERIOD: u32 = 120;

struct Level {
    agent: Entity,
    player: Entity,
}

fn setup_level(app: &mut App) -> Result<Level, ConfigError> {
    let world = app.world_mut();
    let mut commands = world.commands();

    // Пол: верхняя грань на y = -0.5 (foot anchor агента)
    commands.spawn((
        Transform::from_xyz(0.0, -1.0, 0.0),
        Collider2D::rect(Vec2::new(50.0, 0.5), LAYER_GROUND),
    ));

    let left = spawn_waypoint(&mut commands, Vec2::new(-4.0, 0.0));
    let right = spawn_waypoint(&mut commands, Vec2::new(4.0, 0.0));

    let player = spawn_player(&mut commands, Vec2::new(5.0, 0.0), LocomotionController::default());
    commands.entity(player).insert(Facing::Left);

    world.flush();

    let agent = spawn_agent(world, &AgentConfig::default(), Vec2::ZERO, vec![left, right])?;

    Ok(Level { agent, player })
}

fn main() {
    let seed = 42;
    println!("Starting WARDEN headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);

    let level = match setup_level(&mut app) {
        Ok(level) => level,
        Err(err) => {
            log_error(&format!("Level setup failed: {}", err));
            std::process::exit(1);
        }
    };

    // Оставшиеся тики клипа атаки по entity
    let mut attack_clips: HashMap<Entity, u32> = HashMap::new();
    let mut cue_count = 0usize;

    for tick in 0..TICKS {
        if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(level.player) {
            input.attack_pressed = tick > 0 && tick % PLAYER_ATTACK_PERIOD == 0;
        }

        advance_fixed_tick(&mut app, TICK_DELTA);

        // Animation layer: потребляет cues, доигрывает атаки
        let cues: Vec<AnimationCue> = app
            .world_mut()
            .resource_mut::<Events<AnimationCue>>()
            .drain()
            .collect();
        cue_count += cues.len();

        for cue in cues {
            if cue.cue == Cue::TriggerAttack {
                attack_clips.insert(cue.entity, ATTACK_CLIP_TICKS);
            }
        }

        for (entity, remaining) in attack_clips.iter_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                if let Some(mut feedback) = app.world_mut().get_mut::<AnimationFeedback>(*entity) {
                    feedback.attack_complete = true;
                }
            }
        }
        attack_clips.retain(|_, remaining| *remaining > 0);

        if tick % 60 == 0 {
            let world = app.world();
            let x = world
                .get::<Transform>(level.agent)
                .map(|t| t.translation.x)
                .unwrap_or_default();
            let state = world.get::<AIState>(level.agent).map(|s| s.name()).unwrap_or("-");
            let health = world.get::<Health>(level.agent).map(|h| h.current).unwrap_or_default();

            log_info(&format!(
                "Tick {}: agent x={:.2} state={} health={:.1}",
                tick, x, state, health
            ));
        }
    }

    log_info(&format!("Simulation complete! {} animation cues emitted", cue_count));
}
