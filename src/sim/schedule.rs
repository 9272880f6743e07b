//! Deadline-ordered action queue on the virtual match clock
//!
//! Delayed transitions, AI thinking time, cluster bomblets and airstrike
//! missiles are all entries here. The clock only advances while the match
//! is unpaused, so pausing freezes every pending action.

use crate::sim::{AiPlan, Projectile};

#[derive(Debug, Clone, PartialEq)]
pub enum Scheduled {
    BeginTurn,
    EnterPlayerInput,
    /// Only honored while `turn` is still the current turn
    AiFire { turn: u32, plan: AiPlan },
    SpawnProjectile(Box<Projectile>),
}

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    due: f64,
    seq: u64,
    action: Scheduled,
}

/// Entries pop in deadline order; equal deadlines pop in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due: f64, action: Scheduled) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let at = self.entries.partition_point(|e| (e.due, e.seq) <= (due, seq));
        self.entries.insert(at, Entry { due, seq, action });
    }

    /// Remove and return the earliest action due at or before `now`
    pub fn pop_due(&mut self, now: f64) -> Option<Scheduled> {
        match self.entries.first() {
            Some(e) if e.due <= now => Some(self.entries.remove(0).action),
            _ => None,
        }
    }

    pub fn has_pending_spawn(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.action, Scheduled::SpawnProjectile(_)))
    }

    pub fn next_due(&self) -> Option<f64> {
        self.entries.first().map(|e| e.due)
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_order() {
        let mut s = Schedule::new();
        s.push(30.0, Scheduled::EnterPlayerInput);
        s.push(10.0, Scheduled::BeginTurn);
        assert_eq!(s.next_due(), Some(10.0));
        assert_eq!(s.pop_due(5.0), None);
        assert_eq!(s.pop_due(10.0), Some(Scheduled::BeginTurn));
        assert_eq!(s.pop_due(29.0), None);
        assert_eq!(s.pop_due(100.0), Some(Scheduled::EnterPlayerInput));
        assert!(s.is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut s = Schedule::new();
        s.push(5.0, Scheduled::EnterPlayerInput);
        s.push(5.0, Scheduled::BeginTurn);
        assert_eq!(s.pop_due(5.0), Some(Scheduled::EnterPlayerInput));
        assert_eq!(s.pop_due(5.0), Some(Scheduled::BeginTurn));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut s = Schedule::new();
        s.push(1.0, Scheduled::BeginTurn);
        s.push(2.0, Scheduled::BeginTurn);
        assert_eq!(s.len(), 2);
        assert!(!s.has_pending_spawn());
        s.clear();
        assert_eq!(s.pop_due(f64::MAX), None);
    }
}
