//! Integration тесты автономного агента
//!
//! Полный тик через SimulationPlugin: Perception → Behavior → Locomotion → Damage.
//! Тики двигаем вручную (`advance_fixed_tick`), без wall clock.

use bevy::prelude::*;
use warden_simulation::physics::LAYER_GROUND;
use warden_simulation::{
    advance_fixed_tick, create_headless_app, spawn_agent, spawn_player, spawn_waypoint, AIState,
    Agent, AgentConfig, AnimationCue, AnimationFeedback, Body2D, Collider2D, ConfigError, Cue,
    DamageEvent, Facing, Health, LocomotionController, MoveIntent, PatrolRoute, Perception,
    PlayerInput,
};

const SEED: u64 = 42;

struct Level {
    app: App,
    agent: Entity,
    waypoints: Vec<Entity>,
}

/// Пол (верх на y = -0.5), waypoints и агент в `agent_x`
fn setup_level(agent_x: f32, waypoint_xs: &[f32], with_ground: bool) -> Level {
    let mut app = create_headless_app(SEED);

    let world = app.world_mut();
    let mut commands = world.commands();

    if with_ground {
        commands.spawn((
            Transform::from_xyz(0.0, -1.0, 0.0),
            Collider2D::rect(Vec2::new(50.0, 0.5), LAYER_GROUND),
        ));
    }

    let waypoints: Vec<Entity> = waypoint_xs
        .iter()
        .map(|&x| spawn_waypoint(&mut commands, Vec2::new(x, 0.0)))
        .collect();

    world.flush();

    let agent = spawn_agent(
        world,
        &AgentConfig::default(),
        Vec2::new(agent_x, 0.0),
        waypoints.clone(),
    )
    .expect("valid agent config");

    Level { app, agent, waypoints }
}

fn add_player(level: &mut Level, x: f32, facing: Facing) -> Entity {
    let world = level.app.world_mut();
    let mut commands = world.commands();
    let player = spawn_player(&mut commands, Vec2::new(x, 0.0), LocomotionController::default());
    commands.entity(player).insert(facing);
    world.flush();
    player
}

fn drain_cues(app: &mut App) -> Vec<AnimationCue> {
    app.world_mut()
        .resource_mut::<Events<AnimationCue>>()
        .drain()
        .collect()
}

fn state(app: &App, entity: Entity) -> AIState {
    *app.world().get::<AIState>(entity).expect("agent has AIState")
}

fn position(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).expect("entity has Transform").translation
}

#[test]
fn test_idle_then_patrol_to_different_waypoint() {
    let mut level = setup_level(0.0, &[-3.0, 3.0], true);
    let agent = level.agent;

    // Tick 1: Idle, таймер 1.0 → 0.5
    advance_fixed_tick(&mut level.app, 0.5);
    assert_eq!(state(&level.app, agent), AIState::Idle { timer: 0.5 });

    // Tick 2: таймер истёк → Patrol, waypoint выбран, движения ещё нет
    advance_fixed_tick(&mut level.app, 0.5);
    assert_eq!(state(&level.app, agent), AIState::Patrol);
    let first_leg = level
        .app
        .world()
        .get::<PatrolRoute>(agent)
        .and_then(|route| route.current)
        .expect("waypoint selected");
    assert!(level.waypoints.contains(&first_leg));
    assert_eq!(level.app.world().get::<MoveIntent>(agent).map(|i| i.x), Some(0.0));
    assert_eq!(position(&level.app, agent).x, 0.0);

    // Tick 3-4: идём 3 units/s к waypoint
    advance_fixed_tick(&mut level.app, 0.5);
    advance_fixed_tick(&mut level.app, 0.5);
    let target_x = position(&level.app, first_leg).x;
    assert_eq!(position(&level.app, agent).x, target_x);

    // Tick 5: прибыли → Idle с полным таймером
    advance_fixed_tick(&mut level.app, 0.5);
    assert_eq!(state(&level.app, agent), AIState::Idle { timer: 1.0 });

    // Tick 6-7: следующий leg: другой waypoint
    advance_fixed_tick(&mut level.app, 0.5);
    advance_fixed_tick(&mut level.app, 0.5);
    assert_eq!(state(&level.app, agent), AIState::Patrol);
    let second_leg = level.app.world().get::<PatrolRoute>(agent).and_then(|route| route.current);
    assert!(second_leg.is_some());
    assert_ne!(second_leg, Some(first_leg));

    // Гравитация на земле не копится
    assert_eq!(position(&level.app, agent).y, 0.0);
}

#[test]
fn test_chase_preempts_idle_then_attack_waits_for_animation() {
    let mut level = setup_level(0.0, &[-3.0, 3.0], true);
    let agent = level.agent;
    // Поверхность игрока на 0.8 — в пределах луча (1.0)
    let player = add_player(&mut level, 1.2, Facing::Left);

    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(
        level.app.world().get::<Perception>(agent).and_then(|p| p.target),
        Some(player)
    );
    assert_eq!(state(&level.app, agent), AIState::Chase);
    // Тик вытеснения: без движения
    assert_eq!(level.app.world().get::<MoveIntent>(agent).map(|i| i.x), Some(0.0));
    drain_cues(&mut level.app);

    // Сближаемся до attack_range
    let mut attack_cues = 0;
    for _ in 0..30 {
        advance_fixed_tick(&mut level.app, 1.0 / 60.0);
        attack_cues += drain_cues(&mut level.app)
            .iter()
            .filter(|c| c.entity == agent && c.cue == Cue::TriggerAttack)
            .count();
        if state(&level.app, agent) == AIState::Attack {
            break;
        }
    }
    assert_eq!(state(&level.app, agent), AIState::Attack);
    assert_eq!(attack_cues, 1);
    let attack_x = position(&level.app, agent).x;
    assert!(attack_x > 0.0);

    // Анимация не доиграна — держим Attack, стоим на месте, cue не повторяется
    for _ in 0..60 {
        advance_fixed_tick(&mut level.app, 1.0 / 60.0);
        assert_eq!(state(&level.app, agent), AIState::Attack);
        assert!(drain_cues(&mut level.app)
            .iter()
            .all(|c| c.cue != Cue::TriggerAttack));
    }
    assert_eq!(position(&level.app, agent).x, attack_x);

    // Complete, но animator ещё в transition — всё ещё Attack
    if let Some(mut feedback) = level.app.world_mut().get_mut::<AnimationFeedback>(agent) {
        feedback.attack_complete = true;
        feedback.in_transition = true;
    }
    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(state(&level.app, agent), AIState::Attack);

    if let Some(mut feedback) = level.app.world_mut().get_mut::<AnimationFeedback>(agent) {
        feedback.in_transition = false;
    }
    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(state(&level.app, agent), AIState::Chase);
}

#[test]
fn test_facing_flip_redirects_sight_next_tick() {
    // Единственный waypoint слева, игрок тоже слева (за спиной)
    let mut level = setup_level(0.0, &[-3.0], true);
    let agent = level.agent;
    let player = add_player(&mut level, -1.2, Facing::Right);

    advance_fixed_tick(&mut level.app, 0.5);
    advance_fixed_tick(&mut level.app, 0.5);
    assert_eq!(state(&level.app, agent), AIState::Patrol);
    assert_eq!(level.app.world().get::<Perception>(agent).and_then(|p| p.target), None);
    drain_cues(&mut level.app);

    // Первый шаг влево: луч этого тика ещё смотрел вправо
    advance_fixed_tick(&mut level.app, 0.01);
    assert_eq!(level.app.world().get::<Facing>(agent).copied(), Some(Facing::Left));
    assert_eq!(level.app.world().get::<Perception>(agent).and_then(|p| p.target), None);
    assert!(drain_cues(&mut level.app)
        .iter()
        .any(|c| c.entity == agent && c.cue == Cue::FacingChanged(Facing::Left)));

    // Следующий тик: луч уже влево → видим игрока → Chase
    advance_fixed_tick(&mut level.app, 0.01);
    assert_eq!(
        level.app.world().get::<Perception>(agent).and_then(|p| p.target),
        Some(player)
    );
    assert_eq!(state(&level.app, agent), AIState::Chase);
    // Тик вытеснения Patrol всё ещё ведёт к waypoint
    assert_eq!(level.app.world().get::<MoveIntent>(agent).map(|i| i.x), Some(-1.0));
}

#[test]
fn test_ground_clamps_residual_fall() {
    let mut level = setup_level(0.0, &[3.0], true);
    let agent = level.agent;

    if let Some(mut body) = level.app.world_mut().get_mut::<Body2D>(agent) {
        body.velocity = Vec2::new(0.0, -5.0);
    }

    advance_fixed_tick(&mut level.app, 1.0 / 60.0);

    assert_eq!(level.app.world().get::<Body2D>(agent).map(|b| b.velocity.y), Some(0.0));
    assert_eq!(position(&level.app, agent).y, 0.0);
    assert!(level
        .app
        .world()
        .get::<LocomotionController>(agent)
        .is_some_and(|c| c.grounded));
}

#[test]
fn test_airborne_agent_falls_and_reports_falling() {
    let mut level = setup_level(0.0, &[3.0], false);
    let agent = level.agent;

    let mut falling_reported = false;
    for _ in 0..10 {
        advance_fixed_tick(&mut level.app, 1.0 / 60.0);
        falling_reported |= drain_cues(&mut level.app)
            .iter()
            .any(|c| c.entity == agent && c.cue == Cue::SetFalling(true));
    }

    assert!(level.app.world().get::<Body2D>(agent).is_some_and(|b| b.velocity.y < 0.0));
    assert!(position(&level.app, agent).y < 0.0);
    assert!(falling_reported);
}

#[test]
fn test_damage_events_reduce_health_without_clamping() {
    let mut level = setup_level(0.0, &[3.0], true);
    let agent = level.agent;

    level.app.world_mut().send_event(DamageEvent::new(agent, 60.0));
    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(level.app.world().get::<Health>(agent).map(|h| h.current), Some(40.0));

    level.app.world_mut().send_event(DamageEvent::new(agent, 100.0));
    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(level.app.world().get::<Health>(agent).map(|h| h.current), Some(-60.0));

    // Despawn: забота внешнего владельца
    assert!(level.app.world().get::<Agent>(agent).is_some());
}

#[test]
fn test_player_melee_hits_agent() {
    let mut level = setup_level(0.0, &[3.0], true);
    let agent = level.agent;
    let player = add_player(&mut level, 0.8, Facing::Left);

    // Первый тик: ground probe ещё не отработал — атака с воздуха игнорируется
    if let Some(mut input) = level.app.world_mut().get_mut::<PlayerInput>(player) {
        input.attack_pressed = true;
    }
    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(level.app.world().get::<Health>(agent).map(|h| h.current), Some(100.0));

    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(level.app.world().get::<Health>(agent).map(|h| h.current), Some(90.0));
    assert!(drain_cues(&mut level.app)
        .iter()
        .any(|c| c.entity == player && c.cue == Cue::TriggerAttack));
}

#[test]
fn test_despawned_waypoint_degrades_to_idle() {
    let mut level = setup_level(0.0, &[-3.0], true);
    let agent = level.agent;

    advance_fixed_tick(&mut level.app, 0.5);
    advance_fixed_tick(&mut level.app, 0.5);
    assert_eq!(state(&level.app, agent), AIState::Patrol);

    let waypoint = level.waypoints[0];
    level.app.world_mut().despawn(waypoint);

    advance_fixed_tick(&mut level.app, 0.5);
    assert_eq!(state(&level.app, agent), AIState::Idle { timer: 1.0 });

    // Валидных waypoint не осталось — Idle перезапускается, агент стоит
    for _ in 0..4 {
        advance_fixed_tick(&mut level.app, 0.5);
        assert!(matches!(state(&level.app, agent), AIState::Idle { .. }));
    }
    assert_eq!(level.app.world().get::<MoveIntent>(agent).map(|i| i.x), Some(0.0));
}

#[test]
fn test_despawned_target_degrades_to_idle() {
    let mut level = setup_level(0.0, &[3.0], true);
    let agent = level.agent;
    let player = add_player(&mut level, 1.2, Facing::Left);

    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(state(&level.app, agent), AIState::Chase);

    level.app.world_mut().despawn(player);

    advance_fixed_tick(&mut level.app, 1.0 / 60.0);
    assert_eq!(level.app.world().get::<Perception>(agent).and_then(|p| p.target), None);
    assert_eq!(state(&level.app, agent), AIState::Idle { timer: 1.0 });
}

#[test]
fn test_spawn_rejects_empty_waypoint_set() {
    let mut app = create_headless_app(SEED);
    let world = app.world_mut();

    let result = spawn_agent(world, &AgentConfig::default(), Vec2::ZERO, Vec::new());
    assert!(matches!(result, Err(ConfigError::EmptyWaypointSet)));

    let bad_config = AgentConfig {
        ground_mask: 0,
        ..Default::default()
    };
    let result = spawn_agent(world, &bad_config, Vec2::ZERO, vec![Entity::from_raw(7)]);
    assert!(matches!(result, Err(ConfigError::EmptyMask("ground"))));

    let mut agents = world.query_filtered::<Entity, With<Agent>>();
    assert_eq!(agents.iter(world).count(), 0);
}

#[test]
fn test_spawn_rejects_unknown_waypoints() {
    let mut level = setup_level(0.0, &[3.0], true);
    let world = level.app.world_mut();

    let result = spawn_agent(
        world,
        &AgentConfig::default(),
        Vec2::ZERO,
        vec![Entity::from_raw(999), Entity::from_raw(998)],
    );
    assert!(matches!(result, Err(ConfigError::InvalidWaypoint(_))));

    // Despawned waypoint тоже отклоняется
    let stale = level.waypoints[0];
    world.despawn(stale);
    let result = spawn_agent(world, &AgentConfig::default(), Vec2::ZERO, vec![stale]);
    assert!(matches!(result, Err(ConfigError::InvalidWaypoint(e)) if e == stale));

    // Только агент из setup_level
    let mut agents = world.query_filtered::<Entity, With<Agent>>();
    assert_eq!(agents.iter(world).count(), 1);
}

#[test]
fn test_event_queues_stay_bounded() {
    let mut level = setup_level(0.0, &[-3.0, 3.0], true);
    let agent = level.agent;
    let player = add_player(&mut level, 1.2, Facing::Left);

    for tick in 0..500 {
        level.app.world_mut().send_event(DamageEvent::new(agent, 0.01));

        // Attack → Chase → Attack: cue на каждом входе в Attack
        if tick % 10 == 0 {
            if let Some(mut feedback) = level.app.world_mut().get_mut::<AnimationFeedback>(agent) {
                feedback.attack_complete = true;
            }
        }

        advance_fixed_tick(&mut level.app, 1.0 / 60.0);

        let world = level.app.world();
        assert!(world.resource::<Events<DamageEvent>>().len() <= 2, "tick {}", tick);
        // Два буфера по несколько cue на body (агент + игрок)
        assert!(world.resource::<Events<AnimationCue>>().len() <= 16, "tick {}", tick);
    }

    // Урон продолжал применяться: события не терялись
    let health = level.app.world().get::<Health>(agent).map(|h| h.current);
    assert!(health.is_some_and(|h| h < 100.0));
}
