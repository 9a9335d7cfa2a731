//! WARDEN Simulation Core
//!
//! ECS-симуляция на Bevy 0.16: автономный 2D агент (patrol / chase / attack)
//! и player-controlled тело на общем Locomotion Integrator.
//!
//! Тик (FixedUpdate) строго упорядочен:
//! Perception → Behavior → Locomotion → Damage
//!
//! Физика, анимация и рендер — внешние collaborators:
//! - физика видна только через `EnvironmentQueries` (headless: `CollisionScene`)
//! - анимация получает `AnimationCue` events и пишет `AnimationFeedback`

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod perception;
pub mod physics;
pub mod player;
pub mod presentation;

// Re-export базовых компонентов для удобства
pub use ai::{AIConfig, AIPlugin, AIState, PatrolRoute};
pub use combat::{CombatPlugin, DamageEvent, Damageable, Durability, MeleeAttack};
pub use components::*;
pub use config::{spawn_agent, AgentConfig, ConfigError};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use perception::{Perception, PerceptionPlugin, SensorConfig};
pub use physics::{Collider2D, LocomotionController, LocomotionPlugin, Tag, WorldGravity};
pub use player::{spawn_player, Player, PlayerInput, PlayerPlugin};
pub use presentation::{AnimationCue, AnimationFeedback, Cue, PresentationPlugin};

/// Фазы тика симуляции (выполняются строго по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Ray probe → Perception
    Perception,
    /// AI FSM / player input → MoveIntent
    Behavior,
    /// Ground check, velocity, facing
    Locomotion,
    /// DamageEvent → Damageable
    Damage,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Детерминистичный RNG (seed по умолчанию, если хост не задал свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Perception,
                    SimulationSet::Behavior,
                    SimulationSet::Locomotion,
                    SimulationSet::Damage,
                )
                    .chain(),
            )
            .register_type::<Agent>()
            .register_type::<Health>()
            .register_type::<Facing>()
            .register_type::<Body2D>()
            .register_type::<MoveIntent>()
            .register_type::<Waypoint>()
            // Подсистемы
            .add_plugins((
                PresentationPlugin,
                PerceptionPlugin,
                AIPlugin,
                PlayerPlugin,
                LocomotionPlugin,
                CombatPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Один fixed тик с заданным Δt (без wall clock)
///
/// Хост (и тесты) сами решают сколько длится тик; `app.update()` зависит от
/// реального времени и для детерминизма не годится.
/// После тика event буферы ротируются (иначе `First` их никогда не чистит):
/// события тика N читаемы до конца тика N + 1.
pub fn advance_fixed_tick(app: &mut App, delta: f32) {
    let world = app.world_mut();
    world
        .resource_mut::<Time<Fixed>>()
        .advance_by(Duration::try_from_secs_f32(delta).unwrap_or(Duration::ZERO));
    world.run_schedule(FixedUpdate);
    update_simulation_events(world);
}

/// Double-buffer swap для событий симуляции
pub fn update_simulation_events(world: &mut World) {
    if let Some(mut cues) = world.get_resource_mut::<Events<AnimationCue>>() {
        cues.update();
    }
    if let Some(mut damage) = world.get_resource_mut::<Events<DamageEvent>>() {
        damage.update();
    }
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
