//! Thread-scoped conversation store with atomic turn appends.
//!
//! Each conversation is an ordered message log keyed by an opaque thread id,
//! created lazily on first reference and kept for the process lifetime. A
//! turn (user message plus assistant reply) is appended as a unit: readers
//! never observe a half-written turn, and appends on distinct threads never
//! block each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use shoptalk_core::error::ShoptalkError;
use shoptalk_core::types::Message;

/// Storage contract for conversation histories.
///
/// The in-memory implementation never fails, but the contract allows a
/// KV-backed store whose appends can, so the orchestrator's
/// persistence-failure path stays honest.
pub trait ConversationStore: Send + Sync {
    /// Ensure a conversation exists for the thread id. Never fails for a
    /// well-formed id; an unseen id simply starts an empty conversation.
    fn get_or_create(&self, thread_id: &str);

    /// Atomically append a user message and its assistant reply.
    ///
    /// Concurrent appends to the same thread are serialized; each turn is
    /// either fully visible to a subsequent reader or fully absent.
    fn append_turn(
        &self,
        thread_id: &str,
        user: Message,
        assistant: Message,
    ) -> Result<(), ShoptalkError>;

    /// Return a copy of the current messages, read-consistent with the
    /// latest completed append.
    fn snapshot(&self, thread_id: &str) -> Vec<Message>;
}

/// In-memory conversation store.
///
/// The outer mutex guards only the bookkeeping map and is held just long
/// enough to clone a per-thread handle; the per-thread mutex serializes
/// appends on that thread alone, so threads proceed fully in parallel.
#[derive(Debug, Default)]
pub struct MemoryConversationStore {
    threads: Mutex<HashMap<String, Arc<Mutex<Vec<Message>>>>>,
}

impl MemoryConversationStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            threads: Mutex::new(HashMap::new()),
        }
    }

    /// Number of threads seen so far.
    pub fn thread_count(&self) -> usize {
        self.threads.lock().map(|t| t.len()).unwrap_or(0)
    }

    /// Fetch (or create) the handle for one thread's message log.
    fn handle(&self, thread_id: &str) -> Arc<Mutex<Vec<Message>>> {
        let mut threads = self
            .threads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            threads
                .entry(thread_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Vec::new()))),
        )
    }
}

impl ConversationStore for MemoryConversationStore {
    fn get_or_create(&self, thread_id: &str) {
        let _ = self.handle(thread_id);
    }

    fn append_turn(
        &self,
        thread_id: &str,
        user: Message,
        assistant: Message,
    ) -> Result<(), ShoptalkError> {
        let handle = self.handle(thread_id);
        let mut messages = handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Both pushes happen under one guard, so the turn is atomic.
        messages.push(user);
        messages.push(assistant);
        debug!(thread_id, total = messages.len(), "Turn appended");
        Ok(())
    }

    fn snapshot(&self, thread_id: &str) -> Vec<Message> {
        let handle = self.handle(thread_id);
        let messages = handle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        messages.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoptalk_core::types::Role;

    fn turn(n: usize) -> (Message, Message) {
        (
            Message::user(format!("question {}", n)),
            Message::assistant(format!("answer {}", n)),
        )
    }

    #[test]
    fn test_unseen_thread_is_empty_conversation() {
        let store = MemoryConversationStore::new();
        assert!(store.snapshot("never-seen").is_empty());
    }

    #[test]
    fn test_get_or_create_registers_thread() {
        let store = MemoryConversationStore::new();
        store.get_or_create("t1");
        store.get_or_create("t1");
        store.get_or_create("t2");
        assert_eq!(store.thread_count(), 2);
    }

    #[test]
    fn test_sequential_turns_preserve_order() {
        let store = MemoryConversationStore::new();
        for n in 0..5 {
            let (user, assistant) = turn(n);
            store.append_turn("t1", user, assistant).unwrap();
        }

        let history = store.snapshot("t1");
        assert_eq!(history.len(), 10);
        for (n, pair) in history.chunks(2).enumerate() {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[0].content, format!("question {}", n));
            assert_eq!(pair[1].role, Role::Assistant);
            assert_eq!(pair[1].content, format!("answer {}", n));
        }
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = MemoryConversationStore::new();
        let (user, assistant) = turn(0);
        store.append_turn("t1", user, assistant).unwrap();

        let before = store.snapshot("t1");
        let (user, assistant) = turn(1);
        store.append_turn("t1", user, assistant).unwrap();

        assert_eq!(before.len(), 2);
        assert_eq!(store.snapshot("t1").len(), 4);
    }

    #[test]
    fn test_threads_are_isolated() {
        let store = MemoryConversationStore::new();
        let (user, assistant) = turn(0);
        store.append_turn("a", user, assistant).unwrap();

        assert_eq!(store.snapshot("a").len(), 2);
        assert!(store.snapshot("b").is_empty());
    }

    #[test]
    fn test_concurrent_appends_same_thread_never_interleave() {
        use std::thread;

        let store = Arc::new(MemoryConversationStore::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                store
                    .append_turn(
                        "shared",
                        Message::user(format!("q{}", i)),
                        Message::assistant(format!("a{}", i)),
                    )
                    .unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let history = store.snapshot("shared");
        assert_eq!(history.len(), 32);
        // Every user message is immediately followed by its own reply.
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
            let q = pair[0].content.trim_start_matches('q');
            let a = pair[1].content.trim_start_matches('a');
            assert_eq!(q, a);
        }
    }

    #[test]
    fn test_concurrent_appends_distinct_threads() {
        use std::thread;

        let store = Arc::new(MemoryConversationStore::new());
        let mut handles = Vec::new();

        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                let thread_id = format!("thread-{}", i);
                for n in 0..10 {
                    let (user, assistant) = turn(n);
                    store.append_turn(&thread_id, user, assistant).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.thread_count(), 8);
        for i in 0..8 {
            assert_eq!(store.snapshot(&format!("thread-{}", i)).len(), 20);
        }
    }

    #[test]
    fn test_even_message_count_invariant() {
        let store = MemoryConversationStore::new();
        assert_eq!(store.snapshot("t").len() % 2, 0);
        let (user, assistant) = turn(0);
        store.append_turn("t", user, assistant).unwrap();
        assert_eq!(store.snapshot("t").len() % 2, 0);
    }
}
