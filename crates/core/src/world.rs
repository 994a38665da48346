use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::config::{MAX_PLAYERS, WORLD_HALF_DEPTH, WORLD_HALF_WIDTH};
use crate::player::Player;

/// A set of players, capped at 255 (the `u8` id space minus zero).
///
/// Cheap to clone: players live in a contiguous `Vec`, the same shape the
/// snapshot path relies on to copy a whole world once per tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    players: Vec<Player>,
}

impl World {
    pub const CLASS_ID: u8 = 2;

    pub fn new() -> Self {
        World::default()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn player(&self, id: u8) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: u8) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_exists(&self, id: u8) -> bool {
        self.player(id).is_some()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Picks the lowest free id in `[1, 255]`, places the player at a
    /// uniformly random `(x, z)` with `y = 0`, and returns the assigned id.
    /// Returns `None` if all 255 ids are taken.
    pub fn add_player(&mut self, color: u32) -> Option<u8> {
        let id = self.lowest_free_id()?;

        let mut rng = rand::rng();
        let x = rng.random_range(-WORLD_HALF_WIDTH..=WORLD_HALF_WIDTH);
        let z = rng.random_range(-WORLD_HALF_DEPTH..=WORLD_HALF_DEPTH);

        let mut player = Player::new(id, color);
        player.position.x = x;
        player.position.z = z;
        self.players.push(player);

        Some(id)
    }

    pub fn remove_player(&mut self, id: u8) {
        self.players.retain(|p| p.id != id);
    }

    /// Inserts `player`, overwriting any existing entry with the same id.
    /// Used when rebuilding a world from a snapshot or blended state rather
    /// than through the id-assigning `add_player` path.
    pub fn add_or_replace(&mut self, player: Player) {
        match self.player_mut(player.id) {
            Some(slot) => *slot = player,
            None => self.players.push(player),
        }
    }

    /// No-op if `player_id` is absent — commands may arrive for freshly
    /// disconnected players.
    pub fn apply(&mut self, cmd: &Command, player_id: u8) {
        if let Some(p) = self.player_mut(player_id) {
            p.apply(cmd);
        }
    }

    fn lowest_free_id(&self) -> Option<u8> {
        (1..=MAX_PLAYERS).find(|id| !self.player_exists(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Buttons;

    #[test]
    fn add_player_assigns_lowest_free_id() {
        let mut w = World::new();
        assert_eq!(w.add_player(0), Some(1));
        assert_eq!(w.add_player(0), Some(2));
        w.remove_player(1);
        assert_eq!(w.add_player(0), Some(1));
    }

    #[test]
    fn world_fills_up_at_255_players() {
        let mut w = World::new();
        for _ in 0..255 {
            assert!(w.add_player(0).is_some());
        }
        assert_eq!(w.add_player(0), None);
        assert_eq!(w.player_count(), 255);
    }

    #[test]
    fn spawned_players_land_inside_world_extent() {
        let mut w = World::new();
        let id = w.add_player(0).unwrap();
        let p = w.player(id).unwrap();
        assert!(p.position.x.abs() <= WORLD_HALF_WIDTH);
        assert!(p.position.z.abs() <= WORLD_HALF_DEPTH);
        assert_eq!(p.position.y, 0.0);
    }

    #[test]
    fn apply_to_missing_player_is_a_silent_no_op() {
        let mut w = World::new();
        w.apply(&Command::new(1, Buttons::FORWARD, 0.0, 0.0, 20), 99);
        assert_eq!(w.player_count(), 0);
    }

    #[test]
    fn add_or_replace_overwrites_an_existing_id_and_inserts_a_new_one() {
        let mut w = World::new();
        let id = w.add_player(0).unwrap();
        let mut replacement = *w.player(id).unwrap();
        replacement.position.x = 42.0;
        w.add_or_replace(replacement);
        assert_eq!(w.player(id).unwrap().position.x, 42.0);
        assert_eq!(w.player_count(), 1);

        w.add_or_replace(crate::player::Player::new(id + 1, 0));
        assert_eq!(w.player_count(), 2);
    }

    #[test]
    fn apply_routes_to_the_right_player() {
        let mut w = World::new();
        let a = w.add_player(0).unwrap();
        let b = w.add_player(0).unwrap();
        w.apply(&Command::new(1, Buttons::FORWARD, 0.0, 0.0, 20), a);
        assert_eq!(w.player(a).unwrap().last_command_id, 1);
        assert_eq!(w.player(b).unwrap().last_command_id, 0);
    }
}
