//! Patrol Planner: выбор следующего waypoint без повторов подряд.

use bevy::prelude::*;
use rand::Rng;
use crate::ai::PatrolRoute;

/// Выбирает waypoint равномерно среди валидных, исключая текущий
///
/// Эквивалентно re-roll "пока кандидат == current или невалиден", но без цикла:
/// кандидаты фильтруются заранее, поэтому завершается всегда.
/// Если кроме текущего выбрать некого (маршрут из одной точки) — возвращает текущий.
/// `None` — ни одного валидного waypoint (все despawned).
pub fn select_waypoint<R: Rng + ?Sized>(
    rng: &mut R,
    waypoints: &[Entity],
    current: Option<Entity>,
    is_valid: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    let candidates: Vec<Entity> = waypoints
        .iter()
        .copied()
        .filter(|&waypoint| Some(waypoint) != current && is_valid(waypoint))
        .collect();

    if candidates.is_empty() {
        return current.filter(|&waypoint| is_valid(waypoint));
    }

    Some(candidates[rng.gen_range(0..candidates.len())])
}

impl PatrolRoute {
    /// Планирует следующий leg и запоминает его в `current`
    pub fn plan_next_leg<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        is_valid: impl Fn(Entity) -> bool,
    ) -> Option<Entity> {
        let next = select_waypoint(rng, &self.waypoints, self.current, is_valid);
        self.current = next;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn waypoints(count: u32) -> Vec<Entity> {
        (1..=count).map(Entity::from_raw).collect()
    }

    #[test]
    fn test_no_repeat_over_1000_trials() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut route = PatrolRoute::new(waypoints(3));

        let mut previous = route.plan_next_leg(&mut rng, |_| true);
        assert!(previous.is_some());

        for _ in 0..1000 {
            let next = route.plan_next_leg(&mut rng, |_| true);
            assert!(next.is_some());
            assert_ne!(next, previous, "waypoint selected twice in a row");
            previous = next;
        }
    }

    #[test]
    fn test_two_waypoints_alternate() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let set = waypoints(2);
        let mut route = PatrolRoute::new(set.clone());

        let first = route.plan_next_leg(&mut rng, |_| true).unwrap();
        let second = route.plan_next_leg(&mut rng, |_| true).unwrap();
        let third = route.plan_next_leg(&mut rng, |_| true).unwrap();

        assert_ne!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_every_waypoint_gets_selected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let set = waypoints(4);
        let mut route = PatrolRoute::new(set.clone());

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            if let Some(waypoint) = route.plan_next_leg(&mut rng, |_| true) {
                seen.insert(waypoint);
            }
        }

        assert_eq!(seen.len(), set.len());
    }

    #[test]
    fn test_singleton_route_repeats_without_looping() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let only = Entity::from_raw(9);
        let mut route = PatrolRoute::new(vec![only]);

        assert_eq!(route.plan_next_leg(&mut rng, |_| true), Some(only));
        assert_eq!(route.plan_next_leg(&mut rng, |_| true), Some(only));
    }

    #[test]
    fn test_invalid_waypoints_are_skipped() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let set = waypoints(3);
        let despawned = set[1];

        for _ in 0..100 {
            let picked = select_waypoint(&mut rng, &set, Some(set[0]), |w| w != despawned);
            assert_eq!(picked, Some(set[2]));
        }
    }

    #[test]
    fn test_all_waypoints_gone() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let set = waypoints(2);

        assert_eq!(select_waypoint(&mut rng, &set, Some(set[0]), |_| false), None);
        assert_eq!(select_waypoint(&mut rng, &[], None, |_| true), None);
    }
}
