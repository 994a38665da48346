use std::collections::VecDeque;

use skirmish_core::command::Command;
use skirmish_core::world::World;

/// Commands generated locally and sent to the server, kept until the server
/// acknowledges them (reports a `last_command_id` at or past their `id`).
///
/// Invariant: strictly increasing `id`s, and at any moment the log holds
/// exactly the commands with `id > last acknowledged id`.
#[derive(Debug, Default)]
pub struct CommandLog {
    commands: VecDeque<Command>,
}

impl CommandLog {
    pub fn new() -> Self {
        CommandLog::default()
    }

    pub fn push(&mut self, cmd: Command) {
        debug_assert!(self.commands.back().is_none_or(|last| cmd.id > last.id));
        self.commands.push_back(cmd);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops every command with `id <= acked`, then replays what remains
    /// against `world` in order. This is reconciliation's core step: the
    /// world is assumed to already be the server's authoritative state.
    pub fn reconcile(&mut self, world: &mut World, player_id: u8, acked: u32) {
        while self.commands.front().is_some_and(|c| c.id <= acked) {
            self.commands.pop_front();
        }
        for cmd in &self.commands {
            world.apply(cmd, player_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use skirmish_core::command::Buttons;

    use super::*;

    #[test]
    fn reconcile_drops_acked_commands_and_replays_the_rest() {
        let mut log = CommandLog::new();
        log.push(Command::new(1, Buttons::FORWARD, 0.0, 0.0, 20));
        log.push(Command::new(2, Buttons::FORWARD, 0.0, 0.0, 20));
        log.push(Command::new(3, Buttons::FORWARD, 0.0, 0.0, 20));

        let mut world = World::new();
        let id = world.add_player(0).unwrap();
        world.player_mut(id).unwrap().position = Default::default();

        log.reconcile(&mut world, id, 1);

        assert_eq!(log.len(), 2);
        assert_eq!(world.player(id).unwrap().last_command_id, 3);
    }

    #[test]
    fn reconcile_with_nothing_acked_replays_everything() {
        let mut log = CommandLog::new();
        log.push(Command::new(1, Buttons::FORWARD, 0.0, 0.0, 20));
        let mut world = World::new();
        let id = world.add_player(0).unwrap();

        log.reconcile(&mut world, id, 0);

        assert_eq!(log.len(), 1);
        assert_eq!(world.player(id).unwrap().last_command_id, 1);
    }
}
