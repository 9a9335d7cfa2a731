//! Perception: направленный ray probe
//!
//! Каждый тик: луч из позиции агента вдоль Facing, фиксированная дальность,
//! ограничен collision mask. Ближайший hit с нужным tag = target, иначе None.
//! Памяти нет: промах в этом тике просто даёт None, следующий тик проверит заново.

use bevy::prelude::*;
use crate::components::Facing;
use crate::physics::{Collider2D, CollisionScene, EnvironmentQueries, Tag, MASK_SIGHT};
use crate::SimulationSet;

/// Результат восприятия на текущий тик (weak reference, пересчитывается каждый тик)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Perception {
    pub target: Option<Entity>,
}

/// Параметры сенсора (фиксируются при spawn)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SensorConfig {
    /// Максимальная дальность луча
    pub ray_distance: f32,
    /// Tag цели (например "Player")
    pub target_tag: String,
    /// С какими слоями луч сталкивается
    pub mask: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ray_distance: 1.0,
            target_tag: "Player".to_string(),
            mask: MASK_SIGHT,
        }
    }
}

/// Один probe: ближайший коллайдер вдоль луча, если его tag совпадает
///
/// Коллайдер без нужного tag перекрывает обзор (стена между агентом и игроком).
pub fn probe(
    queries: &impl EnvironmentQueries,
    observer: Entity,
    origin: Vec2,
    facing: Facing,
    sensor: &SensorConfig,
) -> Option<Entity> {
    let hit = queries.cast_ray(
        origin,
        facing.direction(),
        sensor.ray_distance,
        sensor.mask,
        Some(observer),
    )?;

    (hit.tag == Some(sensor.target_tag.as_str())).then_some(hit.entity)
}

/// Система: обновление Perception через ray probe
///
/// Первая в тике: FSM читает уже свежий Perception.
pub fn sense_targets(
    mut observers: Query<(Entity, &Transform, &Facing, &SensorConfig, &mut Perception)>,
    colliders: Query<(Entity, &Transform, &Collider2D, Option<&Tag>)>,
) {
    let scene = CollisionScene::from_query(colliders.iter());

    for (entity, transform, facing, sensor, mut perception) in observers.iter_mut() {
        let target = probe(&scene, entity, transform.translation.truncate(), *facing, sensor);

        if target != perception.target {
            match target {
                Some(seen) => crate::log(&format!("👁️ {:?} sees {:?} ({:?})", entity, seen, facing)),
                None => crate::log(&format!("👻 {:?} lost sight of target", entity)),
            }
            perception.target = target;
        }
    }
}

/// Perception Plugin
pub struct PerceptionPlugin;

impl Plugin for PerceptionPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Perception>()
            .register_type::<SensorConfig>()
            .add_systems(FixedUpdate, sense_targets.in_set(SimulationSet::Perception));
    }
}
