//! Melee strike: круг перед атакующим, урон всем кто внутри (кроме себя)

use bevy::prelude::*;
use crate::components::Facing;
use crate::combat::DamageEvent;
use crate::physics::CollisionScene;

/// Параметры melee удара
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MeleeAttack {
    /// Центр круга удара относительно позиции (x отражается по Facing)
    pub offset: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// По каким слоям бьём
    pub mask: u32,
}

impl Default for MeleeAttack {
    fn default() -> Self {
        Self {
            offset: Vec2::new(0.6, 0.0),
            radius: 0.5,
            damage: 10.0,
            mask: u32::MAX,
        }
    }
}

impl MeleeAttack {
    /// Мировой центр круга удара с учётом Facing
    pub fn strike_center(&self, origin: Vec2, facing: Facing) -> Vec2 {
        let offset = match facing {
            Facing::Right => self.offset,
            Facing::Left => Vec2::new(-self.offset.x, self.offset.y),
        };
        origin + offset
    }
}

/// DamageEvent для всех коллайдеров в круге удара
///
/// Кто из них реально damageable — решает `apply_damage::<T>`.
pub fn melee_strike(
    scene: &CollisionScene,
    attacker: Entity,
    origin: Vec2,
    facing: Facing,
    melee: &MeleeAttack,
) -> Vec<DamageEvent> {
    scene
        .overlap_circle(melee.strike_center(origin, facing), melee.radius, melee.mask, Some(attacker))
        .into_iter()
        .map(|target| DamageEvent {
            target,
            amount: melee.damage,
            source: Some(attacker),
        })
        .collect()
}
