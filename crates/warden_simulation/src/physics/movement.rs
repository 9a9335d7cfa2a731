//! Locomotion Integrator: общий для агента и игрока
//!
//! Архитектура:
//! - Velocity интегрируем сами (физический backend получает одну запись за тик)
//! - Ground check: circle overlap у ног против ground mask
//! - Gravity shaping: fast fall / low jump множители в воздухе
//! - Facing flip по знаку горизонтальной скорости
//!
//! Ядро — чистая функция `integrate(state, intent, gravity, Δt)`; системы только
//! достают компоненты и раздают cues.

use bevy::prelude::*;
use crate::components::{Body2D, Facing, MoveIntent};
use crate::physics::{Collider2D, CollisionScene, EnvironmentQueries, Tag, MASK_GROUND_PROBE};
use crate::presentation::{AnimationCue, Cue};

/// Пауза после прыжка, после которой открывается окно double jump (секунды)
pub const DOUBLE_JUMP_DELAY: f32 = 0.01;

/// Гравитация мира (передаётся явно, вместо глобального singleton)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldGravity(pub Vec2);

impl Default for WorldGravity {
    fn default() -> Self {
        Self(Vec2::new(0.0, -9.81)) // Earth gravity
    }
}

/// Ground probe: круг у ног
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct GroundProbe {
    /// Смещение foot anchor от позиции entity
    pub offset: Vec2,
    pub radius: f32,
    pub mask: u32,
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self {
            offset: Vec2::new(0.0, -0.5),
            radius: 0.1,
            mask: MASK_GROUND_PROBE,
        }
    }
}

/// Окно double jump (явный таймер вместо отложенной корутины)
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub enum DoubleJumpWindow {
    #[default]
    Closed,
    /// Ждём `delay` секунд после первого прыжка
    Pending { delay: f32 },
    /// Пока летим вверх, один jump press добавит скорость
    Open,
}

/// Locomotion контроллер компонент
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct LocomotionController {
    /// Горизонтальная скорость (units/s)
    pub move_speed: f32,
    pub jump_height: f32,
    pub double_jump_height: f32,
    /// Множитель гравитации при падении (1..5)
    pub fall_rate_multiplier: f32,
    /// Множитель гравитации на подъёме без удержания jump (1..5)
    pub low_jump_rate_multiplier: f32,
    pub ground_probe: GroundProbe,
    /// Порог vy для cue "falling" (развязывает blend от точной скорости)
    pub falling_threshold: f32,
    /// На земле ли тело (пишет ground_detection)
    pub grounded: bool,
    pub double_jump: DoubleJumpWindow,
}

impl Default for LocomotionController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            jump_height: 2.0,
            double_jump_height: 1.0,
            fall_rate_multiplier: 2.5,
            low_jump_rate_multiplier: 2.0,
            ground_probe: GroundProbe::default(),
            falling_threshold: -0.1,
            grounded: false,
            double_jump: DoubleJumpWindow::Closed,
        }
    }
}

impl LocomotionController {
    /// Множитель гравитации для текущего vy
    pub fn gravity_multiplier(&self, velocity_y: f32, jump_held: bool) -> f32 {
        if self.grounded {
            1.0
        } else if velocity_y < 0.0 {
            self.fall_rate_multiplier
        } else if velocity_y > 0.0 && !jump_held {
            self.low_jump_rate_multiplier
        } else {
            1.0
        }
    }
}

/// Результат одного шага интеграции
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionStep {
    pub velocity: Vec2,
    pub facing: Facing,
    /// Facing сменился в этом тике
    pub flipped: bool,
    /// Прыжок с земли в этом тике
    pub jumped: bool,
    /// Double jump в этом тике
    pub double_jumped: bool,
    /// Cue: |vx|
    pub speed: f32,
    /// Cue: в воздухе и падаем
    pub falling: bool,
}

/// Скорость отрыва для прыжка высотой `height`: sqrt(h * -2 * g)
pub fn jump_velocity(height: f32, gravity_y: f32) -> f32 {
    (height * -2.0 * gravity_y).max(0.0).sqrt()
}

/// Шаг интеграции (чистая функция от state, intent, gravity, Δt)
///
/// Мутирует только собственное состояние контроллера (окно double jump).
/// `controller.grounded` должен быть уже обновлён ground probe'ом этого тика.
pub fn integrate(
    controller: &mut LocomotionController,
    intent: &MoveIntent,
    velocity: Vec2,
    facing: Facing,
    gravity: Vec2,
    delta: f32,
) -> LocomotionStep {
    let mut velocity = velocity;
    let mut jumped = false;
    let mut double_jumped = false;

    // 1. Горизонталь напрямую из intent
    velocity.x = intent.x * controller.move_speed;

    // Окно double jump тикает ДО прыжка с земли (тот же press не считается дважды)
    controller.double_jump = match controller.double_jump {
        DoubleJumpWindow::Closed => DoubleJumpWindow::Closed,
        DoubleJumpWindow::Pending { delay } => {
            let remaining = delay - delta;
            if remaining <= 0.0 {
                DoubleJumpWindow::Open
            } else {
                DoubleJumpWindow::Pending { delay: remaining }
            }
        }
        DoubleJumpWindow::Open => {
            if velocity.y <= 0.0 {
                DoubleJumpWindow::Closed
            } else if intent.jump_pressed {
                velocity.y += jump_velocity(controller.double_jump_height, gravity.y);
                double_jumped = true;
                DoubleJumpWindow::Closed
            } else {
                DoubleJumpWindow::Open
            }
        }
    };

    // 2. На земле: гасим остаточное падение; прыжок
    if controller.grounded {
        if velocity.y < 0.0 {
            velocity.y = 0.0;
        }

        if intent.jump_pressed {
            velocity.y += jump_velocity(controller.jump_height, gravity.y);
            controller.double_jump = DoubleJumpWindow::Pending {
                delay: DOUBLE_JUMP_DELAY,
            };
            jumped = true;
        }
    }

    // 3-4. Gravity shaping, только в воздухе
    if !controller.grounded {
        let multiplier = controller.gravity_multiplier(velocity.y, intent.jump_held);
        velocity.y += gravity.y * multiplier * delta;
    }

    // 6. Facing по знаку vx
    let mut new_facing = facing;
    if velocity.x > 0.0 && facing != Facing::Right {
        new_facing = Facing::Right;
    }
    if velocity.x < 0.0 && facing != Facing::Left {
        new_facing = Facing::Left;
    }

    LocomotionStep {
        velocity,
        facing: new_facing,
        flipped: new_facing != facing,
        jumped,
        double_jumped,
        speed: velocity.x.abs(),
        falling: !controller.grounded && velocity.y < controller.falling_threshold,
    }
}

/// Система ground detection через circle overlap у ног
pub fn ground_detection(
    mut bodies: Query<(Entity, &Transform, &mut LocomotionController)>,
    colliders: Query<(Entity, &Transform, &Collider2D, Option<&Tag>)>,
) {
    let scene = CollisionScene::from_query(colliders.iter());

    for (entity, transform, mut controller) in bodies.iter_mut() {
        let probe = controller.ground_probe;
        let anchor = transform.translation.truncate() + probe.offset;
        let grounded = scene.ground_contact(anchor, probe.radius, probe.mask, Some(entity));

        if grounded != controller.grounded {
            controller.grounded = grounded;
        }
    }
}

/// Система: Locomotion Integrator
///
/// MoveIntent → Body2D.velocity (одна запись), Facing, cues для animation layer.
pub fn integrate_locomotion(
    mut bodies: Query<(Entity, &mut LocomotionController, &MoveIntent, &mut Body2D, &mut Facing)>,
    gravity: Res<WorldGravity>,
    time: Res<Time<Fixed>>,
    mut cues: EventWriter<AnimationCue>,
) {
    let delta = time.delta_secs();

    for (entity, mut controller, intent, mut body, mut facing) in bodies.iter_mut() {
        let step = integrate(&mut controller, intent, body.velocity, *facing, gravity.0, delta);

        // 5. Единственная запись velocity за тик
        body.velocity = step.velocity;

        if step.flipped {
            *facing = step.facing;
            cues.write(AnimationCue::new(entity, Cue::FacingChanged(step.facing)));
        }

        if step.jumped || step.double_jumped {
            cues.write(AnimationCue::new(entity, Cue::TriggerJump));
        }

        // 7. Параметры animator'а
        cues.write(AnimationCue::new(entity, Cue::SetSpeed(step.speed)));
        cues.write(AnimationCue::new(entity, Cue::SetFalling(step.falling)));
    }
}

/// Система интеграции velocity → Transform (headless backend)
///
/// Реальный физический backend читает Body2D сам; headless режим двигает Transform напрямую.
pub fn integrate_velocity_to_transform(
    mut query: Query<(&Body2D, &mut Transform), With<LocomotionController>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (body, mut transform) in query.iter_mut() {
        // position += velocity * dt
        transform.translation += (body.velocity * delta).extend(0.0);
    }
}
