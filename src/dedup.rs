//! Deduplication of a fetch batch against the historical corpus.
//!
//! An article is new only when its key is absent from history and from every
//! key already seen earlier in the same batch. A batch admits at most `cap`
//! articles; qualifying articles beyond the cap are deferred, not remembered.

use std::collections::HashSet;

use crate::article::ArticleKey;

/// Default number of newly accepted articles per ingestion cycle.
pub const DEFAULT_BATCH_CAP: usize = 5;

/// Stateless acceptance check.
pub fn is_new(
    key: &ArticleKey,
    history: &HashSet<ArticleKey>,
    batch_seen: &HashSet<ArticleKey>,
) -> bool {
    !history.contains(key) && !batch_seen.contains(key)
}

/// Outcome of offering one key to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Key is new and a batch slot is available.
    New,
    /// Key already exists in history or earlier in this batch.
    Duplicate,
    /// Key is new but the batch is full; the feed may resurface it later.
    Deferred,
}

/// Per-cycle index over history plus keys seen in the current batch.
#[derive(Debug)]
pub struct DedupIndex {
    history: HashSet<ArticleKey>,
    batch_seen: HashSet<ArticleKey>,
    accepted: usize,
    cap: usize,
}

impl DedupIndex {
    pub fn new(history: HashSet<ArticleKey>, cap: usize) -> Self {
        Self {
            history,
            batch_seen: HashSet::new(),
            accepted: 0,
            cap,
        }
    }

    /// Classify a key without recording it.
    pub fn check(&self, key: &ArticleKey) -> Admission {
        if !is_new(key, &self.history, &self.batch_seen) {
            Admission::Duplicate
        } else if self.is_full() {
            Admission::Deferred
        } else {
            Admission::New
        }
    }

    /// Remember a key for the rest of the batch without consuming a slot.
    /// Used for articles that were rejected after the dedup check.
    pub fn mark_seen(&mut self, key: ArticleKey) {
        self.batch_seen.insert(key);
    }

    /// Record an accepted key; consumes one batch slot.
    pub fn accept(&mut self, key: ArticleKey) {
        if self.batch_seen.insert(key) {
            self.accepted += 1;
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn is_full(&self) -> bool {
        self.accepted >= self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn k(t: &str, u: &str) -> ArticleKey {
        ArticleKey::new(t, u)
    }

    #[test]
    fn history_and_batch_repeats_are_rejected() {
        let history: HashSet<_> = [k("a", "u1")].into_iter().collect();
        let mut idx = DedupIndex::new(history, DEFAULT_BATCH_CAP);

        let mut accepted = Vec::new();
        for key in [k("a", "u1"), k("b", "u2"), k("b", "u2")] {
            if idx.check(&key) == Admission::New {
                idx.accept(key.clone());
                accepted.push(key);
            }
        }
        assert_eq!(accepted, vec![k("b", "u2")]);
    }

    #[test]
    fn cap_defers_without_remembering() {
        let mut idx = DedupIndex::new(HashSet::new(), 1);
        idx.accept(k("a", "u1"));
        assert_eq!(idx.check(&k("b", "u2")), Admission::Deferred);
        assert_eq!(idx.check(&k("a", "u1")), Admission::Duplicate);
        assert_eq!(idx.accepted(), 1);
    }

    #[test]
    fn mark_seen_does_not_consume_slot() {
        let mut idx = DedupIndex::new(HashSet::new(), 1);
        idx.mark_seen(k("x", "u"));
        assert_eq!(idx.check(&k("x", "u")), Admission::Duplicate);
        assert_eq!(idx.check(&k("y", "u")), Admission::New);
    }
}
