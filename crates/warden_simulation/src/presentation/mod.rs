//! Presentation cues: односторонние сигналы animation collaborator'у
//!
//! Controller шлёт `AnimationCue` (fire-and-forget, без ack и back-pressure).
//! Единственный обратный канал — `AnimationFeedback`, который пишет animation layer
//! и читает Attack state.

use bevy::prelude::*;
use crate::components::Facing;

/// Дискретный сигнал анимации
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    /// Запустить анимацию атаки (один раз при входе в Attack)
    TriggerAttack,
    /// Запустить анимацию прыжка (только player-controlled тела)
    TriggerJump,
    /// Модуль горизонтальной скорости (blend idle/run)
    SetSpeed(f32),
    /// В воздухе и падаем быстрее порога
    SetFalling(bool),
    /// Sprite отразился (меняется только визуал)
    FacingChanged(Facing),
}

/// Event: cue для конкретного entity
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AnimationCue {
    pub entity: Entity,
    pub cue: Cue,
}

impl AnimationCue {
    pub fn new(entity: Entity, cue: Cue) -> Self {
        Self { entity, cue }
    }
}

/// Обратная связь от animation layer (state info слоя 0)
///
/// Пишет внешний animator. Attack state ждёт `is_attack_finished()`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AnimationFeedback {
    /// Клип атаки доигран (normalized time > 1)
    pub attack_complete: bool,
    /// Animator сейчас в transition между состояниями
    pub in_transition: bool,
}

impl AnimationFeedback {
    pub fn is_attack_finished(&self) -> bool {
        self.attack_complete && !self.in_transition
    }

    /// Новая атака стартовала — предыдущий "complete" больше не валиден
    pub fn begin_attack(&mut self) {
        self.attack_complete = false;
    }
}

/// Presentation Plugin
///
/// Регистрирует только event; потребитель: внешний animation layer.
pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AnimationCue>()
            .register_type::<AnimationFeedback>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_gate_requires_no_transition() {
        let mut feedback = AnimationFeedback {
            attack_complete: true,
            in_transition: true,
        };
        assert!(!feedback.is_attack_finished());

        feedback.in_transition = false;
        assert!(feedback.is_attack_finished());

        feedback.begin_attack();
        assert!(!feedback.is_attack_finished());
    }
}
