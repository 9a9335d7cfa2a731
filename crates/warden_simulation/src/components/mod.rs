//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: агент, здоровье, направление взгляда (Agent, Health, Facing)
//! - movement: тело и намерение движения (Body2D, MoveIntent)
//! - world: точки патрулирования (Waypoint)
//!
//! AI, perception, locomotion и presentation компоненты живут в своих модулях.

pub mod actor;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
pub use world::*;
