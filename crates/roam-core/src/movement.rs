//! Single-step movement and the random walk.

use rand::Rng;
use roam_agents::{AgentState, Effect};
use roam_types::Point;

/// The tile one step from `from` toward `to`.
///
/// Moves along the axis with the larger remaining delta (vertical on a
/// tie), at most `speed` tiles and never past the target. A non-positive
/// speed still moves one tile.
pub fn step_toward(from: Point, to: Point, speed: i64) -> Point {
    let reach = speed.max(1);
    let dx = to.x.saturating_sub(from.x);
    let dy = to.y.saturating_sub(from.y);
    if dx.saturating_abs() > dy.saturating_abs() {
        let step = dx.signum().saturating_mul(dx.saturating_abs().min(reach));
        Point::new(from.x.saturating_add(step), from.y)
    } else {
        let step = dy.signum().saturating_mul(dy.saturating_abs().min(reach));
        Point::new(from.x, from.y.saturating_add(step))
    }
}

/// The next random-walk step and the memory it needs.
///
/// Reuses the remembered destination until it is reached; otherwise draws
/// a uniformly random in-bounds tile distinct from the current one. `None`
/// when the map is a single tile.
pub fn wander<R: Rng + ?Sized>(state: &AgentState, rng: &mut R) -> Option<(Point, Vec<Effect>)> {
    let here = state.pos.point();
    if let Some(target) = state.memory.wander_target
        && target != here
        && state.pos.contains(target)
    {
        return Some((step_toward(here, target, state.player.speed), Vec::new()));
    }

    let max_x = state.pos.size_x.max(0);
    let max_y = state.pos.size_y.max(0);
    if max_x == 0 && max_y == 0 {
        return None;
    }
    let target = loop {
        let candidate = Point::new(rng.random_range(0..=max_x), rng.random_range(0..=max_y));
        if candidate != here {
            break candidate;
        }
    };
    Some((
        step_toward(here, target, state.player.speed),
        vec![Effect::SetWanderTarget(target)],
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use roam_types::Position;

    use super::*;

    #[test]
    fn larger_axis_moves_first() {
        assert_eq!(step_toward(Point::new(0, 0), Point::new(5, 2), 2), Point::new(2, 0));
        assert_eq!(step_toward(Point::new(0, 0), Point::new(-1, 7), 3), Point::new(0, 3));
    }

    #[test]
    fn ties_go_vertical() {
        assert_eq!(step_toward(Point::new(4, 4), Point::new(6, 6), 5), Point::new(4, 6));
    }

    #[test]
    fn never_overshoots() {
        assert_eq!(step_toward(Point::new(0, 0), Point::new(0, -2), 10), Point::new(0, -2));
    }

    #[test]
    fn zero_speed_still_moves() {
        assert_eq!(step_toward(Point::new(0, 0), Point::new(3, 0), 0), Point::new(1, 0));
    }

    fn state_at(x: i64, y: i64, size: i64) -> AgentState {
        let mut state = AgentState::new("ann", Utc::now());
        state.player.speed = 1;
        state.set_position(Position {
            name: "Town".to_owned(),
            size_x: size,
            size_y: size,
            x,
            y,
        });
        state
    }

    #[test]
    fn wander_draws_distinct_in_bounds_target() {
        let state = state_at(2, 2, 4);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let (_, effects) = wander(&state, &mut rng).unwrap();
            let [Effect::SetWanderTarget(target)] = effects.as_slice() else {
                panic!("expected a new wander target, got {effects:?}");
            };
            assert_ne!(*target, state.pos.point());
            assert!(state.pos.contains(*target));
        }
    }

    #[test]
    fn wander_keeps_remembered_target() {
        let mut state = state_at(0, 0, 10);
        state.apply(Effect::SetWanderTarget(Point::new(0, 5)));
        let mut rng = SmallRng::seed_from_u64(1);
        let (step, effects) = wander(&state, &mut rng).unwrap();
        assert_eq!(step, Point::new(0, 1));
        assert!(effects.is_empty());
    }

    #[test]
    fn single_tile_map_has_nowhere_to_go() {
        let state = state_at(0, 0, 0);
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(wander(&state, &mut rng).is_none());
    }
}
