// Command protocol codec for the line-based game wire format.
// Stateless: wire text in, typed commands out; state in, frames out.

use crate::use_cases::{GameState, SessionError};
use std::fmt::Write;

/// Literal first line that marks a frame as a broadcast; its absence
/// means "direct reply to the sender".
pub const BROADCAST_PREFIX: &str = "broadcast";

/// A parsed inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    CreateGame,
    JoinGame,
    Session(SessionCommand),
}

/// Commands that require session membership.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    GenerateMap { length: usize, chunk_scale: f64 },
    UpdateMap { length: usize, chunk_scale: f64 },
    AddTroop { x: i32, y: i32 },
    MoveTroop { troop_index: usize, x: i32, y: i32 },
    ModifyTile { x: i32, y: i32 },
}

/// Malformed arguments for a recognized command keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    WrongArgumentCount {
        command: &'static str,
        expected: usize,
    },
    InvalidInteger {
        argument: String,
    },
    InvalidNumber {
        argument: String,
    },
}

impl ParseError {
    /// One-line explanation sent to the offending connection.
    pub fn message(&self) -> String {
        match self {
            ParseError::WrongArgumentCount { command, expected } => {
                format!("{command} expects {expected} arguments")
            }
            ParseError::InvalidInteger { argument } => {
                format!("'{argument}' is not an integer")
            }
            ParseError::InvalidNumber { argument } => {
                format!("'{argument}' is not a number")
            }
        }
    }
}

/// Parse one inbound message into a typed command.
///
/// `Ok(None)` means the first token is not a known command keyword;
/// callers echo the input back verbatim (compatibility path).
pub fn parse(message: &str) -> Result<Option<ClientCommand>, ParseError> {
    let mut parts = message.split(' ');
    let keyword = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    let command = match keyword {
        "create-game" => ClientCommand::CreateGame,
        "join-game" => ClientCommand::JoinGame,
        "generate-map" => {
            expect_args("generate-map", &args, 2)?;
            ClientCommand::Session(SessionCommand::GenerateMap {
                length: parse_usize(args[0])?,
                chunk_scale: parse_f64(args[1])?,
            })
        }
        "update-map" => {
            expect_args("update-map", &args, 2)?;
            ClientCommand::Session(SessionCommand::UpdateMap {
                length: parse_usize(args[0])?,
                chunk_scale: parse_f64(args[1])?,
            })
        }
        "add-troop" => {
            expect_args("add-troop", &args, 2)?;
            ClientCommand::Session(SessionCommand::AddTroop {
                x: parse_i32(args[0])?,
                y: parse_i32(args[1])?,
            })
        }
        "move-troop" => {
            expect_args("move-troop", &args, 3)?;
            ClientCommand::Session(SessionCommand::MoveTroop {
                troop_index: parse_usize(args[0])?,
                x: parse_i32(args[1])?,
                y: parse_i32(args[2])?,
            })
        }
        "modify-tile" => {
            expect_args("modify-tile", &args, 2)?;
            ClientCommand::Session(SessionCommand::ModifyTile {
                x: parse_i32(args[0])?,
                y: parse_i32(args[1])?,
            })
        }
        _ => return Ok(None),
    };
    Ok(Some(command))
}

fn expect_args(
    command: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::WrongArgumentCount { command, expected });
    }
    Ok(())
}

fn parse_usize(argument: &str) -> Result<usize, ParseError> {
    argument.parse().map_err(|_| ParseError::InvalidInteger {
        argument: argument.to_string(),
    })
}

fn parse_i32(argument: &str) -> Result<i32, ParseError> {
    argument.parse().map_err(|_| ParseError::InvalidInteger {
        argument: argument.to_string(),
    })
}

fn parse_f64(argument: &str) -> Result<f64, ParseError> {
    argument.parse().map_err(|_| ParseError::InvalidNumber {
        argument: argument.to_string(),
    })
}

pub fn render_ack() -> String {
    "ack".to_string()
}

pub fn render_error(message: &str) -> String {
    format!("Error: {message}")
}

pub fn render_session_error(error: SessionError) -> String {
    render_error(error.message())
}

/// Map metadata; clients regenerate the terrain locally from these
/// three values.
pub fn render_map(length: usize, chunk_scale: f64, seed: f64) -> String {
    format!("map {length} {chunk_scale} {seed}")
}

pub fn render_new_player(seat: usize) -> String {
    format!("new-player {seat}")
}

pub fn render_add_troop(seat: usize, x: i32, y: i32) -> String {
    format!("add-troop {seat} {x} {y}")
}

pub fn render_move_troop(seat: usize, troop_index: usize, x: i32, y: i32) -> String {
    format!("move-troop {seat} {troop_index} {x} {y}")
}

pub fn render_modify_tile(x: i32, y: i32) -> String {
    format!("modify-tile {x} {y}")
}

/// Wrap a frame body as a broadcast.
pub fn render_broadcast(body: &str) -> String {
    format!("{BROADCAST_PREFIX}\n{body}")
}

/// Full-state catch-up snapshot sent to a joining player: seat index,
/// map metadata, per-player troop listing (count, then `x y` pairs
/// comma-separated on one line per player, in seat order), and the
/// modified-tile bitmap, one row per line, `m` modified / `.` not.
pub fn render_game_state(state: &GameState, seat: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "game-state {seat}");
    let _ = writeln!(
        out,
        "map {} {} {}",
        state.board.size(),
        state.chunk_scale,
        state.seed
    );
    let _ = writeln!(out, "troops {}", state.players.len());
    for player in &state.players {
        let _ = writeln!(out, "{}", player.troops.len());
        let run = player
            .troops
            .iter()
            .map(|troop| format!("{} {}", troop.x, troop.y))
            .collect::<Vec<_>>()
            .join(",");
        let _ = writeln!(out, "{run}");
    }
    out.push_str("tiles\n");
    for row in state.board.rows() {
        for tile in row {
            out.push(if tile.modified { 'm' } else { '.' });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::SessionLimits;
    use tokio::sync::mpsc;

    #[test]
    fn parses_membership_free_commands() {
        assert_eq!(parse("create-game"), Ok(Some(ClientCommand::CreateGame)));
        assert_eq!(parse("join-game"), Ok(Some(ClientCommand::JoinGame)));
    }

    #[test]
    fn parses_session_commands() {
        assert_eq!(
            parse("generate-map 19 5.23"),
            Ok(Some(ClientCommand::Session(SessionCommand::GenerateMap {
                length: 19,
                chunk_scale: 5.23,
            })))
        );
        assert_eq!(
            parse("update-map 12 4.5"),
            Ok(Some(ClientCommand::Session(SessionCommand::UpdateMap {
                length: 12,
                chunk_scale: 4.5,
            })))
        );
        assert_eq!(
            parse("add-troop 5 7"),
            Ok(Some(ClientCommand::Session(SessionCommand::AddTroop {
                x: 5,
                y: 7,
            })))
        );
        assert_eq!(
            parse("move-troop 0 6 8"),
            Ok(Some(ClientCommand::Session(SessionCommand::MoveTroop {
                troop_index: 0,
                x: 6,
                y: 8,
            })))
        );
        assert_eq!(
            parse("modify-tile 2 3"),
            Ok(Some(ClientCommand::Session(SessionCommand::ModifyTile {
                x: 2,
                y: 3,
            })))
        );
    }

    #[test]
    fn negative_troop_coordinates_parse() {
        assert_eq!(
            parse("add-troop -3 100"),
            Ok(Some(ClientCommand::Session(SessionCommand::AddTroop {
                x: -3,
                y: 100,
            })))
        );
    }

    #[test]
    fn unknown_keyword_is_not_an_error() {
        assert_eq!(parse("hello world"), Ok(None));
        assert_eq!(parse(""), Ok(None));
    }

    #[test]
    fn malformed_arguments_are_typed_errors() {
        assert_eq!(
            parse("add-troop 5"),
            Err(ParseError::WrongArgumentCount {
                command: "add-troop",
                expected: 2,
            })
        );
        assert_eq!(
            parse("move-troop -1 0 0"),
            Err(ParseError::InvalidInteger {
                argument: "-1".to_string(),
            })
        );
        assert_eq!(
            parse("generate-map -5 2.0"),
            Err(ParseError::InvalidInteger {
                argument: "-5".to_string(),
            })
        );
        assert_eq!(
            parse("generate-map 10 huge"),
            Err(ParseError::InvalidNumber {
                argument: "huge".to_string(),
            })
        );
        assert_eq!(
            parse("add-troop 5").unwrap_err().message(),
            "add-troop expects 2 arguments"
        );
    }

    #[test]
    fn renders_simple_frames() {
        assert_eq!(render_ack(), "ack");
        assert_eq!(
            render_error("you are not in a game"),
            "Error: you are not in a game"
        );
        assert_eq!(render_map(19, 5.23, 7.0), "map 19 5.23 7");
        assert_eq!(render_new_player(3), "new-player 3");
        assert_eq!(render_add_troop(0, 5, 7), "add-troop 0 5 7");
        assert_eq!(render_move_troop(1, 0, 6, 8), "move-troop 1 0 6 8");
        assert_eq!(render_modify_tile(2, 3), "modify-tile 2 3");
        assert_eq!(
            render_broadcast("new-player 1"),
            "broadcast\nnew-player 1"
        );
    }

    #[test]
    fn renders_the_full_snapshot() {
        let mut game = GameState::new(2, 5.23, 7.0, SessionLimits::default());
        let sender = || mpsc::channel(8).0;
        game.join(sender()).unwrap();
        game.join(sender()).unwrap();
        game.add_troop(0, 5, 7).unwrap();
        game.add_troop(0, 6, 8).unwrap();
        game.toggle_tile(0, 0).unwrap();

        let snapshot = render_game_state(&game, 1);
        assert_eq!(
            snapshot,
            "game-state 1\n\
             map 2 5.23 7\n\
             troops 2\n\
             2\n\
             5 7,6 8\n\
             0\n\
             \n\
             tiles\n\
             m.\n\
             ..\n"
        );
    }
}
