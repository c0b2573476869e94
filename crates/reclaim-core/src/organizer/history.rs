/// Undo history for the organizer.
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// One completed relocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOperation {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub timestamp: DateTime<Local>,
}

impl MoveOperation {
    pub fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
            timestamp: Local::now(),
        }
    }
}

/// Append-only stack of moves; only the top can be removed.
#[derive(Debug, Default)]
pub struct HistoryStack {
    ops: Vec<MoveOperation>,
}

impl HistoryStack {
    pub fn push(&mut self, op: MoveOperation) {
        self.ops.push(op);
    }

    pub fn pop(&mut self) -> Option<MoveOperation> {
        self.ops.pop()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Owned copy in chronological order.
    pub fn snapshot(&self) -> Vec<MoveOperation> {
        self.ops.clone()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(src: &str, dst: &str) -> MoveOperation {
        MoveOperation::new(PathBuf::from(src), PathBuf::from(dst))
    }

    #[test]
    fn pop_is_lifo() {
        let mut h = HistoryStack::default();
        h.push(op("a", "A"));
        h.push(op("b", "B"));
        assert_eq!(h.pop().unwrap().source, PathBuf::from("b"));
        assert_eq!(h.pop().unwrap().source, PathBuf::from("a"));
        assert!(h.pop().is_none());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut h = HistoryStack::default();
        h.push(op("a", "A"));
        let mut snap = h.snapshot();
        snap.clear();
        assert_eq!(h.len(), 1);
        assert_eq!(h.snapshot(), h.snapshot());
    }

    #[test]
    fn clear_empties() {
        let mut h = HistoryStack::default();
        h.push(op("a", "A"));
        h.clear();
        assert!(h.is_empty());
    }
}
