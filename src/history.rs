//! Module `history`
//!
//! Bounded, ordered log of the most recent chat messages, replayed to newly
//! joined clients. Append-and-evict is the only write path; individual
//! entries are never mutated or deleted.

use std::collections::VecDeque;

use crate::protocol::ChatMessage;

/// FIFO buffer of recent chat messages, oldest first.
pub struct HistoryBuffer {
    messages: VecDeque<ChatMessage>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends to the tail, evicting from the head while over capacity.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }

    /// All currently buffered messages, oldest first, as an owned copy.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(n: usize) -> ChatMessage {
        ChatMessage {
            sender: "tester".to_string(),
            content: format!("message {}", n),
            timestamp: "12:00:00".to_string(),
        }
    }

    #[test]
    fn starts_empty() {
        let buffer = HistoryBuffer::new(50);
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
    }

    #[test]
    fn appends_in_order_below_capacity() {
        let mut buffer = HistoryBuffer::new(50);
        for n in 0..10 {
            buffer.append(message(n));
        }

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 10);
        assert_eq!(snapshot[0].content, "message 0");
        assert_eq!(snapshot[9].content, "message 9");
    }

    #[test]
    fn evicts_oldest_and_never_exceeds_capacity() {
        let mut buffer = HistoryBuffer::new(50);
        for n in 0..120 {
            buffer.append(message(n));
            assert!(buffer.len() <= 50);
        }

        // Exactly the last 50, in original relative order
        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.len(), 50);
        assert_eq!(snapshot[0].content, "message 70");
        assert_eq!(snapshot[49].content, "message 119");
    }

    #[test]
    fn snapshot_is_decoupled_from_the_buffer() {
        let mut buffer = HistoryBuffer::new(50);
        buffer.append(message(0));

        let mut snapshot = buffer.snapshot();
        snapshot.clear();

        assert_eq!(buffer.len(), 1);
    }
}
