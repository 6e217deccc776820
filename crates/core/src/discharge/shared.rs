use std::{collections::BTreeSet, sync::Arc};

use parking_lot::RwLock;

use super::lookup::{DischargeLog, IngestSummary, ReconciliationReport};

/// Cloneable handle to one discharge lookup.
///
/// Writes take an exclusive lock, so pastes from several callers are applied
/// one after another; readers get consistent snapshots.
#[derive(Debug, Clone, Default)]
pub struct SharedDischargeLog {
    inner: Arc<RwLock<DischargeLog>>,
}

impl SharedDischargeLog {
    /// Wrap an existing lookup.
    pub fn new(log: DischargeLog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(log)),
        }
    }

    /// Parse a pasted block into the shared lookup.
    pub fn ingest(&self, text: &str) -> IngestSummary {
        self.inner.write().ingest(text)
    }

    /// Drop every record.
    pub fn reset(&self) {
        self.inner.write().reset();
    }

    /// Copy of the current lookup.
    pub fn snapshot(&self) -> DischargeLog {
        self.inner.read().clone()
    }

    /// Number of distinct containers reported so far.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` when nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Reconcile the current lookup against the expected ids.
    pub fn reconcile(&self, manifest_ids: &BTreeSet<String>) -> ReconciliationReport {
        self.inner.read().reconcile(manifest_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clones_share_state() {
        let shared = SharedDischargeLog::default();
        let writer = shared.clone();
        writer.ingest("TCNU1234567 01/03/2024");
        assert_eq!(shared.len(), 1);

        let snapshot = shared.snapshot();
        shared.reset();
        assert!(shared.is_empty());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn serialised_writers_lose_nothing() {
        let shared = SharedDischargeLog::default();
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let text: String = (0..25)
                        .map(|n| format!("ABCU{:07}\n", worker * 100 + n))
                        .collect();
                    shared.ingest(&text);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.len(), 100);
    }
}
