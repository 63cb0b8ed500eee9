//! Per-run sync outcome.

use crategraph_core::{EntityKind, NaturalKey};

/// A row whose write failed after all retries and was skipped.
#[derive(Debug, Clone)]
pub struct FailedRow {
    pub key: NaturalKey,
    pub error: String,
}

/// Result of one property-sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub kind: EntityKind,
    pub rows_read: u64,
    pub writes: u64,
    /// Sum of match counts over all writes.
    pub nodes_updated: u64,
    /// Rows whose key matched no node.
    pub missing: u64,
    /// Rows whose key matched more than one node.
    pub duplicates: u64,
    pub failed: Vec<FailedRow>,
}

impl SyncReport {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            rows_read: 0,
            writes: 0,
            nodes_updated: 0,
            missing: 0,
            duplicates: 0,
            failed: Vec::new(),
        }
    }

    pub(crate) fn record_write(&mut self, matched: i64) {
        self.writes += 1;
        self.nodes_updated += matched.max(0) as u64;
        match matched {
            0 => self.missing += 1,
            1 => {}
            _ => self.duplicates += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_write_classifies_counts() {
        let mut report = SyncReport::new(EntityKind::Crate);
        report.record_write(1);
        report.record_write(0);
        report.record_write(3);
        assert_eq!(report.writes, 3);
        assert_eq!(report.nodes_updated, 4);
        assert_eq!(report.missing, 1);
        assert_eq!(report.duplicates, 1);
        assert!(!report.has_failures());
    }
}
