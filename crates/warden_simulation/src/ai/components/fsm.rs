//! FSM AI components (state machine, config, patrol route).

use bevy::prelude::*;

/// Длительность Idle перед планированием нового patrol leg (секунды)
pub const DEFAULT_IDLE_DURATION: f32 = 1.0;

/// AI FSM состояния
///
/// Ровно одно активно в любой момент; переходы атомарны внутри тика.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Idle: стоим, debounce перед следующим patrol leg
    Idle {
        /// Countdown до Patrol (секунды)
        timer: f32,
    },

    /// Patrol: идём к `PatrolRoute::current`
    Patrol,

    /// Chase: бежим к цели которую видит Perception в этом тике
    Chase,

    /// Attack: стоим, ждём пока animation layer доиграет атаку
    Attack,
}

impl Default for AIState {
    fn default() -> Self {
        Self::Idle {
            timer: DEFAULT_IDLE_DURATION,
        }
    }
}

impl AIState {
    pub fn idle(duration: f32) -> Self {
        Self::Idle { timer: duration }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AIState::Idle { .. } => "Idle",
            AIState::Patrol => "Patrol",
            AIState::Chase => "Chase",
            AIState::Attack => "Attack",
        }
    }
}

/// Параметры AI
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AIConfig {
    /// Сколько стоим в Idle (секунды)
    pub idle_duration: f32,
    /// Patrol: горизонтальная дистанция "дошли до waypoint"
    pub arrival_threshold: f32,
    /// Chase: горизонтальная дистанция для перехода в Attack
    pub attack_range: f32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            idle_duration: DEFAULT_IDLE_DURATION,
            arrival_threshold: 0.25,
            attack_range: 1.0,
        }
    }
}

/// Маршрут патруля: handles на waypoint entities (агент ими не владеет)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub waypoints: Vec<Entity>,
    /// Текущая цель патруля (None до первого выбора)
    pub current: Option<Entity>,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Entity>) -> Self {
        Self {
            waypoints,
            current: None,
        }
    }
}
