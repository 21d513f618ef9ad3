use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Parcelas with an export currently running.
///
/// At most one export per parcela may be in flight. A slot is held by an
/// [`ExportSlot`] and released when the slot is dropped, whichever way the
/// export ends (success, error, panic unwinding or a cancelled future).
#[derive(Debug, Clone, Default)]
pub struct ExportTracker {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ExportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the export slot for `parcela_id`, or `None` if one is running.
    pub fn try_acquire(&self, parcela_id: &str) -> Option<ExportSlot> {
        if !lock(&self.in_flight).insert(parcela_id.to_string()) {
            tracing::debug!(parcela = %parcela_id, "Export already in flight");
            return None;
        }
        Some(ExportSlot {
            in_flight: Arc::clone(&self.in_flight),
            parcela_id: parcela_id.to_string(),
        })
    }

    pub fn is_exporting(&self, parcela_id: &str) -> bool {
        lock(&self.in_flight).contains(parcela_id)
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

/// Held for the duration of one export.
#[derive(Debug)]
pub struct ExportSlot {
    in_flight: Arc<Mutex<HashSet<String>>>,
    parcela_id: String,
}

impl ExportSlot {
    pub fn parcela_id(&self) -> &str {
        &self.parcela_id
    }
}

impl Drop for ExportSlot {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.parcela_id);
    }
}

// A panic while holding the lock cannot leave the set half-updated, so a
// poisoned lock is still safe to use.
fn lock(set: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
