//! In-memory monitor for unit tests.

use vice_monitor::{MemoryRange, Monitor, MonitorError};

use crate::board::BoardReader;
use crate::square::{screen_code_of, Square};
use crate::BoardCoordinate;

const TURN_ADDR: u16 = 0x15;

pub struct FakeMonitor {
    memory: Vec<u8>,
    /// Turn window contents served on successive turn reads, last one repeats
    turns: Vec<(u8, u8)>,
    turn_reads: usize,
    fail_after: Option<usize>,
    pub keys: Vec<String>,
    pub reads: usize,
    pub last_range: Option<MemoryRange>,
}

impl FakeMonitor {
    pub fn new() -> Self {
        FakeMonitor {
            memory: vec![0; 0x10000],
            turns: Vec::new(),
            turn_reads: 0,
            fail_after: None,
            keys: Vec::new(),
            reads: 0,
            last_range: None,
        }
    }

    pub fn with_turns(mut self, turns: &[(u8, u8)]) -> Self {
        self.turns = turns.to_vec();
        self
    }

    /// Reads after the first `reads` fail with `ConnectionClosed`
    pub fn failing_after(mut self, reads: usize) -> Self {
        self.fail_after = Some(reads);
        self
    }

    pub fn poke(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    /// Empty board with `pieces` placed on it
    pub fn set_up_board(&mut self, reader: &BoardReader, pieces: &[(&str, Square)]) {
        for coord in BoardCoordinate::all() {
            let code = screen_code_of(Square::Empty(coord.square_color()));
            self.poke(reader.address_of(coord), code);
        }
        for (at, square) in pieces {
            let coord: BoardCoordinate = at.parse().unwrap();
            self.poke(reader.address_of(coord), screen_code_of(*square));
        }
    }
}

impl Monitor for FakeMonitor {
    fn read_memory(&mut self, range: MemoryRange) -> Result<Vec<u8>, MonitorError> {
        self.reads += 1;
        self.last_range = Some(range);
        if self.fail_after.is_some_and(|n| self.reads > n) {
            return Err(MonitorError::ConnectionClosed);
        }
        if range.start() == TURN_ADDR && !self.turns.is_empty() {
            let i = self.turn_reads.min(self.turns.len() - 1);
            let (human, to_move) = self.turns[i];
            self.turn_reads += 1;
            self.poke(TURN_ADDR, human);
            self.poke(TURN_ADDR + 1, to_move);
        }
        Ok(self.memory[range.start() as usize..=range.end() as usize].to_vec())
    }

    fn send_keys(&mut self, keys: &str) -> Result<(), MonitorError> {
        self.keys.push(keys.to_string());
        Ok(())
    }
}
