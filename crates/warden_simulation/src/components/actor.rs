//! Базовые компоненты акторов: Agent, Health, Facing

use bevy::prelude::*;

/// Автономный агент (враг с AI FSM)
///
/// Автоматически добавляет всё состояние контроллера через Required Components.
/// Конфигурация (скорость, сенсор, маршрут) добавляется через `spawn_agent`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(
    Health,
    Facing,
    crate::components::Body2D,
    crate::components::MoveIntent,
    crate::perception::Perception,
    crate::ai::AIState,
    crate::presentation::AnimationFeedback
)]
pub struct Agent;

/// Здоровье актора
///
/// Инвариант: НЕТ clamping — current может уйти в минус.
/// Смерть/despawn решает внешний владелец, наблюдая за `current`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0) // Default 100 HP
    }
}

impl Health {
    pub fn new(current: f32) -> Self {
        Self { current }
    }

    /// Подсказка для внешнего владельца; сам controller это не использует
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Направление взгляда (и луча восприятия)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// Единичный вектор направления (для ray probe)
    pub fn direction(&self) -> Vec2 {
        match self {
            Facing::Right => Vec2::X,
            Facing::Left => Vec2::NEG_X,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }

    /// Sprite отражён по X когда смотрим влево
    pub fn flip_x(&self) -> bool {
        matches!(self, Facing::Left)
    }
}
