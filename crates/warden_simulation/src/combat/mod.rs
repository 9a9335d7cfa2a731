//! Combat module
//!
//! - Damage capability: `Damageable` trait (Health, Durability)
//! - DamageEvent → apply_damage::<T> (по одной системе на damageable тип)
//! - Melee strike игрока (circle overlap → DamageEvent)

use bevy::prelude::*;
use crate::components::Health;
use crate::SimulationSet;

pub mod damage;
pub mod melee;


// Re-export основных типов
pub use damage::{apply_damage, DamageEvent, Damageable, Durability};
pub use melee::{melee_strike, MeleeAttack};

/// Combat Plugin
///
/// Урон применяется в конце тика (SimulationSet::Damage), после того как
/// melee strikes этого тика уже отправлены.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageEvent>()
            .register_type::<Durability>()
            .register_type::<MeleeAttack>()
            .add_systems(
                FixedUpdate,
                (apply_damage::<Health>, apply_damage::<Durability>)
                    .in_set(SimulationSet::Damage),
            );
    }
}
