//! In-process buffer of audit entries whose append failed.
//!
//! A ledger mutation that succeeded but could not be logged leaves its entry
//! here; the service drains the buffer in FIFO order before every new append,
//! so the audit log keeps action order once the store recovers.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use equiptrack_ledger::NewHistoryEntry;

/// An audit entry waiting to be written, with the time its action happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAudit {
    pub entry: NewHistoryEntry,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PendingAuditBuffer {
    queue: Mutex<VecDeque<PendingAudit>>,
}

impl PendingAuditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, pending: PendingAudit) {
        match self.queue.lock() {
            Ok(mut q) => q.push_back(pending),
            Err(poisoned) => poisoned.into_inner().push_back(pending),
        }
    }

    pub fn len(&self) -> usize {
        match self.queue.lock() {
            Ok(q) => q.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write queued entries oldest-first with `write`, stopping at the first
    /// failure. The failed entry and everything after it stay queued.
    ///
    /// Returns what was written, or the error together with what was written
    /// before it.
    pub fn drain_with<T, E>(
        &self,
        mut write: impl FnMut(&PendingAudit) -> Result<T, E>,
    ) -> Result<Vec<T>, (E, Vec<T>)> {
        let mut q = match self.queue.lock() {
            Ok(q) => q,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut written = Vec::new();
        while let Some(front) = q.front() {
            match write(front) {
                Ok(out) => {
                    written.push(out);
                    q.pop_front();
                }
                Err(e) => return Err((e, written)),
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use equiptrack_core::ItemId;
    use equiptrack_ledger::{AuditAction, Location};

    fn pending(item: u64) -> PendingAudit {
        PendingAudit {
            entry: NewHistoryEntry {
                action: AuditAction::Register,
                item_id: ItemId::new(item),
                item_name: "Mouse".to_string(),
                from_location: None,
                to_location: Location::from_cell("Office"),
                comment: String::new(),
            },
            occurred_at: Utc.with_ymd_and_hms(2024, 2, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn drains_in_fifo_order() {
        let buf = PendingAuditBuffer::new();
        buf.push(pending(0));
        buf.push(pending(1));

        let written: Vec<u64> = buf
            .drain_with(|p| Ok::<_, ()>(p.entry.item_id.value()))
            .unwrap();
        assert_eq!(written, vec![0, 1]);
        assert!(buf.is_empty());
    }

    #[test]
    fn failure_keeps_the_rest_queued() {
        let buf = PendingAuditBuffer::new();
        for i in 0..3 {
            buf.push(pending(i));
        }

        let err = buf
            .drain_with(|p| {
                if p.entry.item_id.value() == 1 {
                    Err("store down")
                } else {
                    Ok(p.entry.item_id.value())
                }
            })
            .unwrap_err();
        assert_eq!(err, ("store down", vec![0]));
        assert_eq!(buf.len(), 2);
    }
}
