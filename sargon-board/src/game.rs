//! Game loop: start a game, enter moves, wait for the computer.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use vice_monitor::Monitor;

use crate::board::{Board, BoardReader};
use crate::coord::BoardCoordinate;
use crate::layout::ScreenLayout;
use crate::square::Color;
use crate::{BoardError, GameError};

/// Key escapes understood by the keyboard buffer
pub const KEY_F1: &str = "\\x85";
pub const KEY_RETURN: &str = "\\x0d";
pub const CURSOR_RIGHT: &str = "\\x1d";
pub const CURSOR_DOWN: &str = "\\x11";

pub const MAX_LEVEL: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    NotStarted,
    AwaitingHumanMove,
    AwaitingComputerMove,
    GameOver,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameState::NotStarted => "not started",
            GameState::AwaitingHumanMove => "awaiting human move",
            GameState::AwaitingComputerMove => "awaiting computer move",
            GameState::GameOver => "game over",
        };
        f.write_str(s)
    }
}

/// A from-to move such as `d2-d4`. Only the syntax is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: BoardCoordinate,
    pub to: BoardCoordinate,
}

static MOVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-hA-H][1-8]-[a-hA-H][1-8]$").expect("move pattern"));

impl std::str::FromStr for Move {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !MOVE_PATTERN.is_match(s) {
            return Err(GameError::InvalidMoveSyntax(s.to_string()));
        }
        let invalid = |_: BoardError| GameError::InvalidMoveSyntax(s.to_string());
        Ok(Move {
            from: s[0..2].parse().map_err(invalid)?,
            to: s[3..5].parse().map_err(invalid)?,
        })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

pub struct Game<M: Monitor> {
    monitor: M,
    reader: BoardReader,
    state: GameState,
    human: Option<Color>,
    settle: Duration,
}

impl<M: Monitor> Game<M> {
    pub fn new(monitor: M, layout: ScreenLayout) -> Self {
        Game {
            monitor,
            reader: BoardReader::new(layout),
            state: GameState::NotStarted,
            human: None,
            settle: Duration::ZERO,
        }
    }

    /// Pause after each key injection so the keyboard buffer drains
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn human(&self) -> Option<Color> {
        self.human
    }

    pub fn monitor(&mut self) -> &mut M {
        &mut self.monitor
    }

    pub fn into_monitor(self) -> M {
        self.monitor
    }

    /// Open the start menu and begin a game with the human playing `color`
    pub fn start(&mut self, color: Color, level: u32) -> Result<(), GameError> {
        if level > MAX_LEVEL {
            return Err(GameError::InvalidLevel(level));
        }
        if self.state == GameState::GameOver {
            return Err(GameError::Finished);
        }
        log::info!("starting game as {} on level {}", color, level);
        self.monitor.send_keys(KEY_F1)?;
        let side = match color {
            Color::White => 'w',
            Color::Black => 'b',
        };
        self.monitor.send_keys(&format!("g{}{}", side, level))?;
        self.settle();

        self.human = Some(color);
        self.state = match color {
            Color::White => GameState::AwaitingHumanMove,
            Color::Black => GameState::AwaitingComputerMove,
        };
        Ok(())
    }

    /// Type `mv` followed by return. Syntax only, legality is up to the game.
    pub fn submit_move(&mut self, mv: &str) -> Result<Move, GameError> {
        let parsed: Move = mv.parse()?;
        match self.state {
            GameState::AwaitingHumanMove => {}
            GameState::NotStarted => return Err(GameError::NotStarted),
            GameState::GameOver => return Err(GameError::Finished),
            state => return Err(GameError::OutOfTurn(state)),
        }
        log::info!("entering move {}", parsed);
        self.monitor
            .send_keys(&format!("{}{}", mv.to_ascii_lowercase(), KEY_RETURN))?;
        self.settle();
        self.state = GameState::AwaitingComputerMove;
        Ok(parsed)
    }

    /// One read of the turn window
    pub fn is_human_turn(&mut self) -> Result<bool, GameError> {
        let layout = self.reader.layout();
        let range = layout.turn_range()?;
        let signal = layout.turn_signal;
        let bytes = self.monitor.read_memory(range)?;
        match bytes.as_slice() {
            [human, to_move, ..] => {
                log::trace!("turn bytes {:02x} {:02x}", human, to_move);
                Ok(signal.is_human_turn(*human, *to_move))
            }
            _ => Err(GameError::Monitor(vice_monitor::MonitorError::ShortBody {
                got: bytes.len(),
                need: 2,
            })),
        }
    }

    pub fn is_computer_turn(&mut self) -> Result<bool, GameError> {
        Ok(!self.is_human_turn()?)
    }

    /// Poll the turn window until it is the human's move.
    ///
    /// Reads at most `max_attempts` times, which must be at least 1,
    /// sleeping `interval` between reads. Returns the number of reads made.
    /// Any monitor error ends the wait.
    pub fn poll_until_human_turn(
        &mut self,
        max_attempts: u32,
        interval: Duration,
    ) -> Result<u32, GameError> {
        if max_attempts == 0 {
            return Err(GameError::NoPollAttempts);
        }
        match self.state {
            GameState::NotStarted => return Err(GameError::NotStarted),
            GameState::GameOver => return Err(GameError::Finished),
            _ => {}
        }
        let attempts = max_attempts;
        for attempt in 1..=attempts {
            if self.is_human_turn()? {
                log::info!("human to move after {} poll(s)", attempt);
                self.state = GameState::AwaitingHumanMove;
                return Ok(attempt);
            }
            log::debug!("computer thinking ({}/{})", attempt, attempts);
            if attempt < attempts && !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }
        Err(GameError::Timeout { attempts })
    }

    pub fn board(&mut self) -> Result<Board, GameError> {
        Ok(self.reader.dump_board(&mut self.monitor)?)
    }

    pub fn move_number(&mut self) -> Result<u8, GameError> {
        let addr = self.reader.layout().move_number_addr;
        let bytes = self
            .monitor
            .read_memory(vice_monitor::MemoryRange::single(addr))?;
        bytes
            .first()
            .copied()
            .ok_or(GameError::Monitor(vice_monitor::MonitorError::ShortBody {
                got: 0,
                need: 1,
            }))
    }

    /// Move the screen origin with cursor keys
    pub fn shift_screen(&mut self, right: usize, down: usize) -> Result<(), GameError> {
        if right == 0 && down == 0 {
            return Ok(());
        }
        log::debug!("shifting screen {} right, {} down", right, down);
        let keys = format!("{}{}", CURSOR_RIGHT.repeat(right), CURSOR_DOWN.repeat(down));
        self.monitor.send_keys(&keys)?;
        Ok(())
    }

    pub fn quit(&mut self) {
        self.state = GameState::GameOver;
    }

    fn settle(&self) {
        if !self.settle.is_zero() {
            std::thread::sleep(self.settle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeMonitor;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn white_game(monitor: FakeMonitor) -> Game<FakeMonitor> {
        let mut game = Game::new(monitor, ScreenLayout::default());
        game.start(Color::White, 2).unwrap();
        game
    }

    #[test_case("d2-d4" ; "lowercase")]
    #[test_case("D2-D4" ; "uppercase")]
    #[test_case("a1-h8" ; "corners")]
    #[test_case("g1-F3" ; "mixed case")]
    fn test_move_syntax_accepted(text: &str) {
        let mv: Move = text.parse().unwrap();
        assert_eq!(mv.to_string(), text.to_ascii_lowercase());
    }

    #[test_case("d2d4" ; "missing hyphen")]
    #[test_case("i2-d4" ; "file out of range")]
    #[test_case("d2-d9" ; "rank out of range")]
    #[test_case("d0-d4" ; "rank zero")]
    #[test_case(" d2-d4" ; "leading space")]
    #[test_case("d2-d4-d5" ; "trailing text")]
    #[test_case("" ; "empty")]
    fn test_move_syntax_rejected(text: &str) {
        assert!(matches!(
            text.parse::<Move>(),
            Err(GameError::InvalidMoveSyntax(_))
        ));
    }

    #[test]
    fn test_start_sends_menu_keys() {
        let game = white_game(FakeMonitor::new());
        assert_eq!(game.state(), GameState::AwaitingHumanMove);
        assert_eq!(game.human(), Some(Color::White));
        assert_eq!(game.into_monitor().keys, vec!["\\x85", "gw2"]);
    }

    #[test]
    fn test_start_as_black_waits_for_computer() {
        let mut game = Game::new(FakeMonitor::new(), ScreenLayout::default());
        game.start(Color::Black, 0).unwrap();
        assert_eq!(game.state(), GameState::AwaitingComputerMove);
        assert_eq!(game.into_monitor().keys[1], "gb0");
    }

    #[test]
    fn test_invalid_level_rejected_before_io() {
        let mut game = Game::new(FakeMonitor::new(), ScreenLayout::default());
        assert!(matches!(game.start(Color::White, 7), Err(GameError::InvalidLevel(7))));
        assert_eq!(game.state(), GameState::NotStarted);
        let monitor = game.into_monitor();
        assert!(monitor.keys.is_empty());
        assert_eq!(monitor.reads, 0);
    }

    #[test]
    fn test_submit_move_sends_lowercase_and_return() {
        let mut game = white_game(FakeMonitor::new());
        let mv = game.submit_move("D2-D4").unwrap();
        assert_eq!(mv.to_string(), "d2-d4");
        assert_eq!(game.state(), GameState::AwaitingComputerMove);
        assert_eq!(game.into_monitor().keys.last().unwrap(), "d2-d4\\x0d");
    }

    #[test]
    fn test_submit_move_checks_syntax_first() {
        let mut game = Game::new(FakeMonitor::new(), ScreenLayout::default());
        assert!(matches!(
            game.submit_move("e2e4"),
            Err(GameError::InvalidMoveSyntax(_))
        ));
        assert!(matches!(game.submit_move("e2-e4"), Err(GameError::NotStarted)));
        assert!(game.into_monitor().keys.is_empty());
    }

    #[test]
    fn test_submit_move_out_of_turn() {
        let mut game = white_game(FakeMonitor::new());
        game.submit_move("d2-d4").unwrap();
        assert!(matches!(
            game.submit_move("e2-e4"),
            Err(GameError::OutOfTurn(GameState::AwaitingComputerMove))
        ));
    }

    #[test]
    fn test_poll_before_start() {
        let mut game = Game::new(FakeMonitor::new(), ScreenLayout::default());
        assert!(matches!(
            game.poll_until_human_turn(3, Duration::ZERO),
            Err(GameError::NotStarted)
        ));
        assert_eq!(game.into_monitor().reads, 0);
    }

    #[test]
    fn test_end_to_end_white_level_two() {
        // computer thinks for three polls, then the turn bytes match
        let monitor = FakeMonitor::new().with_turns(&[(1, 0), (1, 0), (1, 0), (1, 1)]);
        let mut game = white_game(monitor);
        game.submit_move("d2-d4").unwrap();

        let polls = game.poll_until_human_turn(10, Duration::ZERO).unwrap();
        assert_eq!(polls, 4);
        assert_eq!(game.state(), GameState::AwaitingHumanMove);
        let monitor = game.into_monitor();
        assert_eq!(monitor.reads, 4);
        assert_eq!(monitor.keys, vec!["\\x85", "gw2", "d2-d4\\x0d"]);
    }

    #[test]
    fn test_poll_reads_at_least_once() {
        let monitor = FakeMonitor::new().with_turns(&[(0, 0)]);
        let mut game = white_game(monitor);
        assert_eq!(game.poll_until_human_turn(1, Duration::ZERO).unwrap(), 1);
        assert_eq!(game.into_monitor().reads, 1);
    }

    #[test]
    fn test_poll_needs_an_attempt() {
        let monitor = FakeMonitor::new().with_turns(&[(1, 0)]);
        let mut game = white_game(monitor);
        game.submit_move("d2-d4").unwrap();
        assert!(matches!(
            game.poll_until_human_turn(0, Duration::ZERO),
            Err(GameError::NoPollAttempts)
        ));
        assert_eq!(game.state(), GameState::AwaitingComputerMove);
        assert_eq!(game.into_monitor().reads, 0);
    }

    #[test]
    fn test_single_attempt_timeout_reports_bound() {
        let monitor = FakeMonitor::new().with_turns(&[(1, 0)]);
        let mut game = white_game(monitor);
        game.submit_move("d2-d4").unwrap();
        assert!(matches!(
            game.poll_until_human_turn(1, Duration::ZERO),
            Err(GameError::Timeout { attempts: 1 })
        ));
        assert_eq!(game.into_monitor().reads, 1);
    }

    #[test]
    fn test_poll_is_bounded() {
        let monitor = FakeMonitor::new().with_turns(&[(1, 0)]);
        let mut game = white_game(monitor);
        game.submit_move("d2-d4").unwrap();
        match game.poll_until_human_turn(5, Duration::from_millis(1)) {
            Err(GameError::Timeout { attempts }) => assert_eq!(attempts, 5),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(game.state(), GameState::AwaitingComputerMove);
        assert_eq!(game.into_monitor().reads, 5);
    }

    #[test]
    fn test_poll_aborts_on_monitor_error() {
        let monitor = FakeMonitor::new().with_turns(&[(1, 0)]).failing_after(2);
        let mut game = white_game(monitor);
        game.submit_move("d2-d4").unwrap();
        assert!(matches!(
            game.poll_until_human_turn(10, Duration::ZERO),
            Err(GameError::Monitor(_))
        ));
        assert_eq!(game.into_monitor().reads, 3);
    }

    #[test]
    fn test_different_turn_signal() {
        let layout = ScreenLayout {
            turn_signal: crate::TurnSignal::Different,
            ..ScreenLayout::default()
        };
        let mut game = Game::new(FakeMonitor::new().with_turns(&[(1, 1), (1, 0)]), layout);
        game.start(Color::White, 1).unwrap();
        assert_eq!(game.poll_until_human_turn(4, Duration::ZERO).unwrap(), 2);
    }

    #[test]
    fn test_move_number_and_shift_screen() {
        let mut monitor = FakeMonitor::new();
        monitor.poke(0x18, 12);
        let mut game = Game::new(monitor, ScreenLayout::default());
        assert_eq!(game.move_number().unwrap(), 12);
        game.shift_screen(2, 1).unwrap();
        game.shift_screen(0, 0).unwrap();
        assert_eq!(game.into_monitor().keys, vec!["\\x1d\\x1d\\x11"]);
    }

    #[test]
    fn test_quit_ends_game() {
        let mut game = white_game(FakeMonitor::new());
        game.quit();
        assert_eq!(game.state(), GameState::GameOver);
        assert!(matches!(game.submit_move("d2-d4"), Err(GameError::Finished)));
        assert!(matches!(
            game.poll_until_human_turn(1, Duration::ZERO),
            Err(GameError::Finished)
        ));
    }
}
