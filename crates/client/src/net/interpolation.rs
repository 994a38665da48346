use skirmish_core::net::WorldSnapshot;
use skirmish_core::world::World;

/// Builds the world handed to the `Presenter` for one frame: a copy of
/// `base` (the predicted local world) with every *remote* player's position
/// and yaw replaced by a linear blend between `from` and `to`, at
/// `render_time`.
///
/// The local player (`my_id`) is left untouched — it is never interpolated,
/// it is the predicted value. A player present in only one of the two
/// snapshots is rendered at that snapshot's value rather than extrapolated.
pub fn interpolated_world(base: &World, from: &WorldSnapshot, to: &WorldSnapshot, render_time: u64, my_id: u8) -> World {
    let mut out = base.clone();

    let span = to.client_time_ms.saturating_sub(from.client_time_ms);
    let elapsed = render_time.saturating_sub(from.client_time_ms);
    let f = if span == 0 { 0.0 } else { (elapsed as f64 / span as f64).clamp(0.0, 1.0) };

    for to_p in to.world.players() {
        if to_p.id == my_id {
            continue;
        }
        let rendered = match from.world.player(to_p.id) {
            Some(from_p) => {
                let mut p = *to_p;
                p.position = from_p.position + (to_p.position - from_p.position) * f;
                p.yaw = from_p.yaw + (to_p.yaw - from_p.yaw) * f;
                p
            }
            None => *to_p,
        };

        match out.player_mut(rendered.id) {
            Some(slot) => *slot = rendered,
            None => out.add_or_replace(rendered),
        }
    }

    // A remote present in `from` but gone from `to` (e.g. disconnected
    // within this interpolation window) has no `to` endpoint to blend
    // toward; render it at its `from` value rather than letting it vanish
    // early.
    for from_p in from.world.players() {
        if from_p.id == my_id || to.world.player(from_p.id).is_some() {
            continue;
        }
        match out.player_mut(from_p.id) {
            Some(slot) => *slot = *from_p,
            None => out.add_or_replace(*from_p),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use skirmish_core::player::Player;

    use super::*;

    fn snapshot_with(server_time_ms: u64, client_time_ms: u64, players: &[Player]) -> WorldSnapshot {
        let mut world = World::new();
        for p in players {
            world.add_or_replace(*p);
        }
        let mut snapshot = WorldSnapshot::new(world, server_time_ms);
        snapshot.client_time_ms = client_time_ms;
        snapshot
    }

    fn player_at(id: u8, x: f64) -> Player {
        let mut p = Player::new(id, 0);
        p.position.x = x;
        p
    }

    #[test]
    fn remote_player_is_blended_between_snapshots() {
        let from = snapshot_with(100, 100, &[player_at(2, 0.0)]);
        let to = snapshot_with(200, 200, &[player_at(2, 4.0)]);

        let rendered = interpolated_world(&World::new(), &from, &to, 150, 1);

        assert!((rendered.player(2).unwrap().position.x - 2.0).abs() < 1e-9);
    }

    #[test]
    fn local_player_is_never_interpolated() {
        let mut base = World::new();
        base.add_or_replace(player_at(1, 999.0));
        let from = snapshot_with(100, 100, &[player_at(1, 0.0)]);
        let to = snapshot_with(200, 200, &[player_at(1, 4.0)]);

        let rendered = interpolated_world(&base, &from, &to, 150, 1);

        assert_eq!(rendered.player(1).unwrap().position.x, 999.0);
    }

    #[test]
    fn player_missing_from_one_snapshot_is_not_extrapolated() {
        let from = snapshot_with(100, 100, &[]);
        let to = snapshot_with(200, 200, &[player_at(3, 4.0)]);

        let rendered = interpolated_world(&World::new(), &from, &to, 150, 1);

        assert_eq!(rendered.player(3).unwrap().position.x, 4.0);
    }

    #[test]
    fn player_gone_from_the_to_snapshot_lingers_at_its_from_value() {
        let from = snapshot_with(100, 100, &[player_at(3, 4.0)]);
        let to = snapshot_with(200, 200, &[]);

        let rendered = interpolated_world(&World::new(), &from, &to, 150, 1);

        assert_eq!(rendered.player(3).unwrap().position.x, 4.0);
    }

    #[test]
    fn zero_width_bracket_does_not_divide_by_zero() {
        let from = snapshot_with(100, 100, &[player_at(2, 1.0)]);
        let to = snapshot_with(100, 100, &[player_at(2, 5.0)]);

        let rendered = interpolated_world(&World::new(), &from, &to, 100, 1);

        assert_eq!(rendered.player(2).unwrap().position.x, 1.0);
    }
}
