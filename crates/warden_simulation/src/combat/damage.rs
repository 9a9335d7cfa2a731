//! Damage capability
//!
//! "Может получать урон" — это capability (trait), а не иерархия:
//! - Health (агент, игрок): без clamping, может уйти в минус
//! - Durability (props): не ниже нуля, `is_broken`
//!
//! DamageEvent адресован entity; `apply_damage::<T>` зарегистрирован для каждого
//! damageable компонента. Entity без такого компонента событие просто игнорирует.
//! Despawn здесь не делается никогда — это решает внешний владелец.

use bevy::ecs::component::Mutable;
use bevy::prelude::*;
use crate::components::Health;

/// Capability: компонент принимает урон
pub trait Damageable {
    fn apply_damage(&mut self, amount: f32);

    /// Текущее значение для логов (health, durability)
    fn remaining(&self) -> f32;
}

impl Damageable for Health {
    fn apply_damage(&mut self, amount: f32) {
        // Без clamping: смерть решает внешний владелец
        self.current -= amount;
    }

    fn remaining(&self) -> f32 {
        self.current
    }
}

/// Прочность разрушаемого prop'а
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Durability {
    pub current: f32,
}

impl Default for Durability {
    fn default() -> Self {
        Self { current: 30.0 }
    }
}

impl Durability {
    pub fn new(current: f32) -> Self {
        Self { current }
    }

    pub fn is_broken(&self) -> bool {
        self.current <= 0.0
    }
}

impl Damageable for Durability {
    fn apply_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    fn remaining(&self) -> f32 {
        self.current
    }
}

/// Событие: урон по entity (OnDamage)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target: Entity,
    pub amount: f32,
    pub source: Option<Entity>,
}

impl DamageEvent {
    pub fn new(target: Entity, amount: f32) -> Self {
        Self {
            target,
            amount,
            source: None,
        }
    }
}

/// Система: apply damage для одного damageable типа
///
/// Dispatch по capability: query::<T> находит только тех, у кого T есть.
pub fn apply_damage<T: Component<Mutability = Mutable> + Damageable>(
    mut events: EventReader<DamageEvent>,
    mut targets: Query<&mut T>,
) {
    for event in events.read() {
        let Ok(mut damageable) = targets.get_mut(event.target) else {
            continue;
        };

        damageable.apply_damage(event.amount);

        crate::log(&format!(
            "💥 Damage: {:?} took {} ({} remaining, source {:?})",
            event.target,
            event.amount,
            damageable.remaining(),
            event.source
        ));
    }
}
