//! World компоненты: waypoints (принадлежат окружению, агент только читает)

use bevy::prelude::*;

/// Точка патрулирования; позиция — `Transform` entity
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Waypoint;

/// Spawn helper для waypoint
pub fn spawn_waypoint(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((Waypoint, Transform::from_translation(position.extend(0.0))))
        .id()
}
