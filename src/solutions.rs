//! Best-solution book
//!
//! Keeps the best solution per (world, puzzle) and rates it in stars against
//! the puzzle's target. Persisted as one length-delimited frame per entry.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::persistence::{SolutionRecord, read_delimited, write_delimited};

/// Stars for a solution that meets the target
pub const MAX_STARS: u32 = 5;

/// One star lost per turn over the target, never below zero
pub fn score_to_stars(score: u32, target: u32) -> u32 {
    MAX_STARS.saturating_sub(score.saturating_sub(target))
}

/// Best solution stored for one puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionEntry {
    pub world: String,
    pub puzzle: String,
    pub solution: SolutionRecord,
}

/// Best solutions keyed by world and puzzle name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionBook {
    entries: Vec<SolutionEntry>,
}

impl SolutionBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `solution` if it scores no worse than the stored one.
    /// Returns true if it was stored.
    pub fn record(&mut self, world: &str, puzzle: &str, solution: SolutionRecord) -> bool {
        match self.position(world, puzzle) {
            Some(i) if solution.score > self.entries[i].solution.score => {
                log::debug!(
                    "Kept best for {world}/{puzzle} ({} < {})",
                    self.entries[i].solution.score,
                    solution.score
                );
                false
            }
            Some(i) => {
                log::info!("New best for {world}/{puzzle}: {}", solution.score);
                self.entries[i].solution = solution;
                true
            }
            None => {
                log::info!("First solution for {world}/{puzzle}: {}", solution.score);
                self.entries.push(SolutionEntry {
                    world: world.to_string(),
                    puzzle: puzzle.to_string(),
                    solution,
                });
                true
            }
        }
    }

    pub fn best(&self, world: &str, puzzle: &str) -> Option<&SolutionRecord> {
        self.position(world, puzzle).map(|i| &self.entries[i].solution)
    }

    /// Stars earned by the stored solution, 0 if unsolved
    pub fn stars(&self, world: &str, puzzle: &str, target: u32) -> u32 {
        self.best(world, puzzle)
            .map(|s| score_to_stars(s.score, target))
            .unwrap_or(0)
    }

    pub fn entries(&self) -> &[SolutionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write every entry as its own frame
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), RecordError> {
        for entry in &self.entries {
            write_delimited(writer, entry)?;
        }
        log::info!("Solutions saved ({} entries)", self.entries.len());
        Ok(())
    }

    /// Read frames until the end of the stream
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, RecordError> {
        let mut book = Self::new();
        while let Some(entry) = read_delimited::<_, SolutionEntry>(reader)? {
            book.record(&entry.world, &entry.puzzle, entry.solution);
        }
        log::info!("Loaded {} solutions", book.len());
        Ok(book)
    }

    fn position(&self, world: &str, puzzle: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.world == world && e.puzzle == puzzle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{Location, MoveRecord};

    fn solution(score: u32) -> SolutionRecord {
        SolutionRecord {
            moves: vec![MoveRecord {
                sphere: "s0".to_string(),
                location: Location::new(0, -3, 0),
            }],
            score,
        }
    }

    #[test]
    fn test_score_to_stars() {
        assert_eq!(score_to_stars(2, 3), 5);
        assert_eq!(score_to_stars(3, 3), 5);
        assert_eq!(score_to_stars(5, 3), 3);
        assert_eq!(score_to_stars(8, 3), 0);
        assert_eq!(score_to_stars(40, 3), 0);
    }

    #[test]
    fn test_record_keeps_best() {
        let mut book = SolutionBook::new();
        assert!(book.record("w1", "p1", solution(6)));
        assert!(!book.record("w1", "p1", solution(7)));
        assert_eq!(book.best("w1", "p1").map(|s| s.score), Some(6));

        assert!(book.record("w1", "p1", solution(4)));
        assert_eq!(book.best("w1", "p1").map(|s| s.score), Some(4));
        // equal scores replace the stored one
        assert!(book.record("w1", "p1", solution(4)));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn test_entries_are_keyed_by_world_and_puzzle() {
        let mut book = SolutionBook::new();
        book.record("w1", "p1", solution(3));
        book.record("w2", "p1", solution(9));
        assert_eq!(book.len(), 2);
        assert_eq!(book.stars("w1", "p1", 3), 5);
        assert_eq!(book.stars("w2", "p1", 3), 0);
        assert_eq!(book.stars("w3", "p1", 3), 0);
        assert!(book.best("w1", "p2").is_none());
    }

    #[test]
    fn test_write_then_read() {
        let mut book = SolutionBook::new();
        book.record("tutorial", "first", solution(1));
        book.record("w1", "p2", solution(5));

        let mut bytes = Vec::new();
        book.write_to(&mut bytes).unwrap();
        let loaded = SolutionBook::read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded.entries(), book.entries());
    }

    #[test]
    fn test_read_empty_stream() {
        let book = SolutionBook::read_from(&mut std::io::empty()).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut book = SolutionBook::new();
        book.record("w1", "p1", solution(1));
        book.clear();
        assert!(book.is_empty());
    }
}
