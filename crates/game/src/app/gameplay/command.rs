use engine::Rect;

use super::direction::Direction;
use super::player::Player;
use super::prototype::{EntityId, PrototypeTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CommandCategory {
    Move,
    StopMove,
    Face,
    Sprint,
    Fire,
}

/// A single intent bound to a key. Holds no entity reference; the invoker
/// pairs it with a target when the key is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Command {
    Move(Direction),
    StopMove(Direction),
    Face(Direction),
    SprintStart,
    SprintStop,
    Fire,
}

/// A deferred request to clone a prototype at a world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SpawnRequest {
    pub(crate) tag: PrototypeTag,
    pub(crate) origin: (f32, f32),
    pub(crate) facing: Direction,
    pub(crate) owner: EntityId,
}

/// What a command may observe or produce besides its target.
pub(crate) struct CommandContext<'a> {
    pub(crate) viewport: Rect,
    pub(crate) spawn_requests: &'a mut Vec<SpawnRequest>,
}

impl Command {
    pub(crate) fn category(self) -> CommandCategory {
        match self {
            Self::Move(_) => CommandCategory::Move,
            Self::StopMove(_) => CommandCategory::StopMove,
            Self::Face(_) => CommandCategory::Face,
            Self::SprintStart | Self::SprintStop => CommandCategory::Sprint,
            Self::Fire => CommandCategory::Fire,
        }
    }

    pub(crate) fn apply(self, player: &mut Player, ctx: &mut CommandContext<'_>) {
        match self {
            Self::Move(direction) => player.set_move_flag(direction, true),
            Self::StopMove(direction) => player.set_move_flag(direction, false),
            Self::Face(direction) => player.set_facing(direction),
            Self::SprintStart => player.set_sprinting(true),
            Self::SprintStop => player.set_sprinting(false),
            Self::Fire => ctx.spawn_requests.push(SpawnRequest {
                tag: PrototypeTag::Bullet,
                origin: player.world_center(ctx.viewport),
                facing: player.facing(),
                owner: player.id(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::test_support::{test_player, test_tuning};

    fn apply_all(player: &mut Player, commands: &[Command]) -> Vec<SpawnRequest> {
        let mut requests = Vec::new();
        let mut ctx = CommandContext {
            viewport: Rect::new(100, 50, 1280, 720),
            spawn_requests: &mut requests,
        };
        for command in commands {
            command.apply(player, &mut ctx);
        }
        requests
    }

    #[test]
    fn categories_group_variants() {
        assert_eq!(Command::Move(Direction::Up).category(), CommandCategory::Move);
        assert_eq!(
            Command::StopMove(Direction::Up).category(),
            CommandCategory::StopMove
        );
        assert_eq!(Command::SprintStop.category(), CommandCategory::Sprint);
        assert_eq!(Command::Fire.category(), CommandCategory::Fire);
    }

    #[test]
    fn face_is_last_write_wins() {
        let mut player = test_player(&test_tuning());
        apply_all(
            &mut player,
            &[
                Command::Face(Direction::Left),
                Command::Face(Direction::UpRight),
            ],
        );
        assert_eq!(player.facing(), Direction::UpRight);
    }

    #[test]
    fn sprint_start_and_stop_toggle() {
        let mut player = test_player(&test_tuning());
        apply_all(&mut player, &[Command::SprintStart]);
        assert!(player.is_sprinting());
        apply_all(&mut player, &[Command::SprintStop]);
        assert!(!player.is_sprinting());
    }

    #[test]
    fn move_then_stop_clears_only_that_flag() {
        let mut player = test_player(&test_tuning());
        apply_all(
            &mut player,
            &[
                Command::Move(Direction::Up),
                Command::Move(Direction::Left),
                Command::StopMove(Direction::Up),
            ],
        );
        assert!(!player.move_flag(Direction::Up));
        assert!(player.move_flag(Direction::Left));
    }

    #[test]
    fn fire_requests_bullet_at_world_center() {
        let mut player = test_player(&test_tuning());
        let requests = apply_all(&mut player, &[Command::Fire]);

        assert_eq!(requests.len(), 1);
        let request = requests[0];
        assert_eq!(request.tag, PrototypeTag::Bullet);
        assert_eq!(request.owner, player.id());
        assert_eq!(request.facing, player.facing());
        assert_eq!(request.origin, player.world_center(Rect::new(100, 50, 1280, 720)));
    }
}
