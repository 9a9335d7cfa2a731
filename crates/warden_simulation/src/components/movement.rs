//! Movement компоненты: скорость тела и намерение движения

use bevy::prelude::*;

/// Физическое тело (velocity интегрируем сами)
///
/// Единственный writer — Locomotion Integrator (одна запись за тик).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Body2D {
    pub velocity: Vec2,
}

/// Намерение движения на текущий тик
///
/// Пишут: AI FSM (агент) или player input system (игрок).
/// Читает: Locomotion Integrator.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MoveIntent {
    /// Горизонтальное направление: -1, 0, 1 для агента; [-1, 1] для игрока
    pub x: f32,
    /// Jump нажат в этот тик
    pub jump_pressed: bool,
    /// Jump удерживается (короткий прыжок если отпущен на подъёме)
    pub jump_held: bool,
}

impl MoveIntent {
    pub fn horizontal(x: f32) -> Self {
        Self { x, ..default() }
    }
}
