//! Construction-time конфигурация агента
//!
//! Всё фиксируется и валидируется один раз при spawn. Агент с невалидной
//! конфигурацией не создаётся вообще (никаких ошибок посреди тика).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::{AIConfig, PatrolRoute};
use crate::components::{Agent, Health, Waypoint};
use crate::perception::SensorConfig;
use crate::physics::{
    Collider2D, GroundProbe, LocomotionController, Tag, LAYER_ACTORS, MASK_GROUND_PROBE, MASK_SIGHT,
};

/// Ошибки конфигурации (fatal при spawn)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("waypoint set is empty")]
    EmptyWaypointSet,

    #[error("waypoint {0:?} is not a live Waypoint entity")]
    InvalidWaypoint(Entity),

    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidNumber { field: &'static str, value: f32 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be within [1, 5], got {value}")]
    MultiplierOutOfRange { field: &'static str, value: f32 },

    #[error("{0} collision mask is empty")]
    EmptyMask(&'static str),

    #[error("target tag is empty")]
    EmptyTargetTag,

    #[error("failed to parse agent config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Конфигурация агента (serde: JSON/level data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    // Locomotion
    pub speed: f32,
    pub jump_height: f32,
    pub double_jump_height: f32,
    pub fall_rate_multiplier: f32,
    pub low_jump_rate_multiplier: f32,
    pub falling_threshold: f32,

    // Ground probe
    pub ground_offset: [f32; 2],
    pub ground_radius: f32,
    pub ground_mask: u32,

    // Sensing
    pub ray_distance: f32,
    pub target_tag: String,
    pub raycast_mask: u32,

    // Behavior
    pub idle_duration: f32,
    pub arrival_threshold: f32,
    pub attack_range: f32,

    // Body
    pub health: f32,
    pub body_radius: f32,
    /// Собственный tag агента
    pub tag: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let locomotion = LocomotionController::default();
        let behavior = AIConfig::default();
        let sensor = SensorConfig::default();

        Self {
            speed: locomotion.move_speed,
            jump_height: locomotion.jump_height,
            double_jump_height: locomotion.double_jump_height,
            fall_rate_multiplier: locomotion.fall_rate_multiplier,
            low_jump_rate_multiplier: locomotion.low_jump_rate_multiplier,
            falling_threshold: locomotion.falling_threshold,
            ground_offset: locomotion.ground_probe.offset.to_array(),
            ground_radius: locomotion.ground_probe.radius,
            ground_mask: MASK_GROUND_PROBE,
            ray_distance: sensor.ray_distance,
            target_tag: sensor.target_tag,
            raycast_mask: MASK_SIGHT,
            idle_duration: behavior.idle_duration,
            arrival_threshold: behavior.arrival_threshold,
            attack_range: behavior.attack_range,
            health: 100.0,
            body_radius: 0.4,
            tag: "Enemy".to_string(),
        }
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidNumber { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn multiplier(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (1.0..=5.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::MultiplierOutOfRange { field, value })
    }
}

impl AgentConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Проверка всех числовых/строковых полей (waypoints проверяет `spawn_agent`)
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("speed", self.speed)?;
        non_negative("jump_height", self.jump_height)?;
        non_negative("double_jump_height", self.double_jump_height)?;
        multiplier("fall_rate_multiplier", self.fall_rate_multiplier)?;
        multiplier("low_jump_rate_multiplier", self.low_jump_rate_multiplier)?;
        positive("ground_radius", self.ground_radius)?;
        positive("ray_distance", self.ray_distance)?;
        non_negative("idle_duration", self.idle_duration)?;
        non_negative("arrival_threshold", self.arrival_threshold)?;
        non_negative("attack_range", self.attack_range)?;
        positive("body_radius", self.body_radius)?;

        if !self.falling_threshold.is_finite() {
            return Err(ConfigError::InvalidNumber {
                field: "falling_threshold",
                value: self.falling_threshold,
            });
        }
        if !self.health.is_finite() {
            return Err(ConfigError::InvalidNumber {
                field: "health",
                value: self.health,
            });
        }
        if self.ground_offset.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidNumber {
                field: "ground_offset",
                value: self.ground_offset[0] + self.ground_offset[1],
            });
        }

        if self.ground_mask == 0 {
            return Err(ConfigError::EmptyMask("ground"));
        }
        if self.raycast_mask == 0 {
            return Err(ConfigError::EmptyMask("raycast"));
        }
        if self.target_tag.trim().is_empty() {
            return Err(ConfigError::EmptyTargetTag);
        }

        Ok(())
    }

    pub fn locomotion(&self) -> LocomotionController {
        LocomotionController {
            move_speed: self.speed,
            jump_height: self.jump_height,
            double_jump_height: self.double_jump_height,
            fall_rate_multiplier: self.fall_rate_multiplier,
            low_jump_rate_multiplier: self.low_jump_rate_multiplier,
            ground_probe: GroundProbe {
                offset: Vec2::from_array(self.ground_offset),
                radius: self.ground_radius,
                mask: self.ground_mask,
            },
            falling_threshold: self.falling_threshold,
            ..default()
        }
    }

    pub fn sensor(&self) -> SensorConfig {
        SensorConfig {
            ray_distance: self.ray_distance,
            target_tag: self.target_tag.clone(),
            mask: self.raycast_mask,
        }
    }

    pub fn behavior(&self) -> AIConfig {
        AIConfig {
            idle_duration: self.idle_duration,
            arrival_threshold: self.arrival_threshold,
            attack_range: self.attack_range,
        }
    }
}

/// Spawn автономного агента
///
/// Отказывается создавать агента с невалидной конфигурацией, пустым маршрутом
/// или маршрутом со ссылкой на entity без `Waypoint` (despawned или чужой).
/// Waypoints должны быть уже в мире (commands применены).
/// Старт: AIState::Idle { timer: idle_duration }, Facing::Right.
pub fn spawn_agent(
    world: &mut World,
    config: &AgentConfig,
    position: Vec2,
    waypoints: Vec<Entity>,
) -> Result<Entity, ConfigError> {
    if let Err(err) = validate_route(world, config, &waypoints) {
        crate::log_error(&format!("spawn_agent rejected config: {}", err));
        return Err(err);
    }

    let entity = world
        .spawn((
            Agent,
            Transform::from_translation(position.extend(0.0)),
            Health::new(config.health),
            crate::ai::AIState::idle(config.idle_duration),
            config.behavior(),
            PatrolRoute::new(waypoints),
            config.sensor(),
            config.locomotion(),
            Collider2D::circle(config.body_radius, LAYER_ACTORS),
            Tag::new(config.tag.clone()),
        ))
        .id();

    crate::log_info(&format!("Spawned agent {:?} at {:?}", entity, position));

    Ok(entity)
}

fn validate_route(world: &World, config: &AgentConfig, waypoints: &[Entity]) -> Result<(), ConfigError> {
    config.validate()?;

    if waypoints.is_empty() {
        return Err(ConfigError::EmptyWaypointSet);
    }

    match waypoints.iter().find(|&&waypoint| world.get::<Waypoint>(waypoint).is_none()) {
        Some(&missing) => Err(ConfigError::InvalidWaypoint(missing)),
        None => Ok(()),
    }
}
