use parking_lot::RwLock;

/// Append-only sequence that can be shared between threads.
///
/// Entries are never modified or removed once pushed.
#[derive(Debug)]
pub struct AppendLog<T> {
    entries: RwLock<Vec<T>>,
}

impl<T> Default for AppendLog<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Clone> AppendLog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: T) {
        self.entries.write().push(entry);
    }

    /// Append several entries atomically, keeping their order.
    pub fn extend(&self, entries: impl IntoIterator<Item = T>) {
        self.entries.write().extend(entries);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of the entries in insertion order.
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.read().clone()
    }

    /// Copy of the entries, most recent first.
    pub fn recent_first(&self) -> Vec<T> {
        self.entries.read().iter().rev().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_order() {
        let log = AppendLog::new();
        log.push(1);
        log.extend([2, 3]);
        assert_eq!(log.snapshot(), vec![1, 2, 3]);
        assert_eq!(log.recent_first(), vec![3, 2, 1]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_concurrent_appends() {
        let log = Arc::new(AppendLog::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..100 {
                        log.push(t * 100 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut entries = log.snapshot();
        assert_eq!(entries.len(), 400);
        entries.sort_unstable();
        entries.dedup();
        assert_eq!(entries.len(), 400);
    }
}
