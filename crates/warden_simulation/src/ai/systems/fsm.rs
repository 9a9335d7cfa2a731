//! FSM AI systems (Idle → Patrol → Chase → Attack transitions).

use bevy::prelude::*;
use crate::ai::{AIConfig, AIState, PatrolRoute};
use crate::components::{Agent, MoveIntent, Waypoint};
use crate::perception::Perception;
use crate::presentation::{AnimationCue, AnimationFeedback, Cue};
use crate::DeterministicRng;

/// Входные данные FSM на текущий тик (всё уже разрешено в позиции)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BehaviorContext {
    pub delta: f32,
    pub agent_x: f32,
    /// X цели, которую Perception видит в этом тике (None = не видим или despawned)
    pub target_x: Option<f32>,
    /// X текущего waypoint (None = не выбран или despawned)
    pub waypoint_x: Option<f32>,
    /// Animation layer доиграл атаку и не в transition
    pub attack_finished: bool,
}

/// Решение FSM на тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorDecision {
    pub state: AIState,
    /// sign желаемого движения: -1, 0, 1
    pub intent_x: f32,
    /// Вход в Attack в этом тике
    pub trigger_attack: bool,
    /// Idle истёк — нужно выбрать новый waypoint
    pub plan_patrol: bool,
}

impl BehaviorDecision {
    fn hold(state: AIState) -> Self {
        Self {
            state,
            intent_x: 0.0,
            trigger_attack: false,
            plan_patrol: false,
        }
    }
}

/// sign с нулём (f32::signum(0.0) == 1.0, нам нужно 0)
pub fn direction_sign(delta: f32) -> f32 {
    if delta > 0.0 {
        1.0
    } else if delta < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Один шаг FSM (чистая функция)
///
/// Порядок приоритетов:
/// 1. Chase вытесняет Idle/Patrol безусловно (видим цель)
/// 2. Таймер Idle / прибытие на waypoint
/// 3. Chase → Attack по дистанции, Attack → Chase по animation gate
pub fn evaluate(state: &AIState, config: &AIConfig, ctx: &BehaviorContext) -> BehaviorDecision {
    match *state {
        AIState::Idle { timer } => {
            if ctx.target_x.is_some() {
                return BehaviorDecision::hold(AIState::Chase);
            }

            let remaining = timer - ctx.delta;
            if remaining <= 0.0 {
                BehaviorDecision {
                    plan_patrol: true,
                    ..BehaviorDecision::hold(AIState::Patrol)
                }
            } else {
                BehaviorDecision::hold(AIState::Idle { timer: remaining })
            }
        }

        AIState::Patrol => {
            // Waypoint пропал: деградируем в Idle, следующий leg выберется заново
            let Some(waypoint_x) = ctx.waypoint_x else {
                let state = if ctx.target_x.is_some() {
                    AIState::Chase
                } else {
                    AIState::idle(config.idle_duration)
                };
                return BehaviorDecision::hold(state);
            };

            // Intent считается ДО любых выходов из Patrol (в этом тике ещё двигаемся)
            let intent_x = direction_sign(waypoint_x - ctx.agent_x);

            if ctx.target_x.is_some() {
                return BehaviorDecision {
                    intent_x,
                    ..BehaviorDecision::hold(AIState::Chase)
                };
            }

            let state = if (ctx.agent_x - waypoint_x).abs() <= config.arrival_threshold {
                AIState::idle(config.idle_duration)
            } else {
                AIState::Patrol
            };

            BehaviorDecision {
                intent_x,
                ..BehaviorDecision::hold(state)
            }
        }

        AIState::Chase => {
            let Some(target_x) = ctx.target_x else {
                return BehaviorDecision::hold(AIState::idle(config.idle_duration));
            };

            if (target_x - ctx.agent_x).abs() <= config.attack_range {
                BehaviorDecision {
                    trigger_attack: true,
                    ..BehaviorDecision::hold(AIState::Attack)
                }
            } else {
                BehaviorDecision {
                    intent_x: direction_sign(target_x - ctx.agent_x),
                    ..BehaviorDecision::hold(AIState::Chase)
                }
            }
        }

        AIState::Attack => {
            if ctx.attack_finished {
                BehaviorDecision::hold(AIState::Chase)
            } else {
                BehaviorDecision::hold(AIState::Attack)
            }
        }
    }
}

/// Система: AI FSM transitions
///
/// Читает Perception (обновлён в этом тике), PatrolRoute, AnimationFeedback.
/// Пишет AIState, MoveIntent, TriggerAttack cue.
/// Выбор waypoint идёт через DeterministicRng (воспроизводимо по seed).
pub fn ai_fsm_transitions(
    mut agents: Query<
        (
            Entity,
            &Transform,
            &Perception,
            &AIConfig,
            &mut AIState,
            &mut MoveIntent,
            &mut PatrolRoute,
            &mut AnimationFeedback,
        ),
        With<Agent>,
    >,
    positions: Query<&Transform>,
    waypoints: Query<&Transform, With<Waypoint>>,
    mut rng: ResMut<DeterministicRng>,
    mut cues: EventWriter<AnimationCue>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, transform, perception, config, mut state, mut intent, mut route, mut feedback) in
        agents.iter_mut()
    {
        // Weak references: despawned entity → None
        let target_x = perception
            .target
            .and_then(|target| positions.get(target).ok())
            .map(|t| t.translation.x);
        let waypoint_x = route
            .current
            .and_then(|waypoint| waypoints.get(waypoint).ok())
            .map(|t| t.translation.x);

        let ctx = BehaviorContext {
            delta,
            agent_x: transform.translation.x,
            target_x,
            waypoint_x,
            attack_finished: feedback.is_attack_finished(),
        };

        let mut decision = evaluate(&state, config, &ctx);

        if decision.plan_patrol {
            match route.plan_next_leg(&mut rng.rng, |w| waypoints.contains(w)) {
                Some(waypoint) => {
                    crate::log(&format!("🚶 AI: {:?} next patrol waypoint {:?}", entity, waypoint));
                }
                None => {
                    crate::log_warning(&format!(
                        "AI: {:?} has no valid waypoints left, staying Idle",
                        entity
                    ));
                    decision.state = AIState::idle(config.idle_duration);
                }
            }
        }

        if decision.trigger_attack {
            feedback.begin_attack();
            cues.write(AnimationCue::new(entity, Cue::TriggerAttack));
        }

        if std::mem::discriminant(&*state) != std::mem::discriminant(&decision.state) {
            crate::log(&format!(
                "AI: {:?} {} → {}",
                entity,
                state.name(),
                decision.state.name()
            ));
        }

        if *state != decision.state {
            *state = decision.state;
        }

        // Только горизонталь: jump flags агент не трогает
        if intent.x != decision.intent_x {
            intent.x = decision.intent_x;
        }
    }
}
