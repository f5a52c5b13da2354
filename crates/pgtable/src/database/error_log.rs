use crate::error::{OpKind, TableError};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One recorded failure.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub op: OpKind,
    pub error: TableError,
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.op, self.error)
    }
}

/// Append-only diagnostic log of failed operations.
///
/// Failures are always returned to the caller as well; the log only keeps a copy.
#[derive(Debug, Default)]
pub struct ErrorLog {
    records: Mutex<Vec<ErrorRecord>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    // Poison is ignored: each critical section is a single Vec call.
    fn lock(&self) -> MutexGuard<'_, Vec<ErrorRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, op: OpKind, error: TableError) {
        self.lock().push(ErrorRecord { op, error });
    }

    /// Snapshot of every record, oldest first.
    pub fn all(&self) -> Vec<ErrorRecord> {
        self.lock().clone()
    }

    /// One `"<Kind>: <message>"` line per record.
    pub fn messages(&self) -> String {
        self.lock()
            .iter()
            .map(|r| format!("{r}\n"))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
