//! Bounded conversation context.
//!
//! The context is the rolling window of prior turns replayed to the model. It
//! is a bounded deque with a single invariant:
//!
//! > After any append, `len() <= capacity()`. When an append overflows the
//! > capacity, messages are dropped from the front (oldest first) and the
//! > relative order of the survivors is unchanged.
//!
//! Appending is copy-on-write: [`ConversationContext::append`] leaves `self`
//! untouched and returns the new context, so a caller still holding the
//! pre-turn value (e.g. the orchestrator replaying it during finalization)
//! never observes a half-updated history.

use super::entities::Message;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of messages kept in a conversation context.
pub const DEFAULT_CONTEXT_CAPACITY: usize = 10;

/// Ordered, capacity-bounded history of role-tagged messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    capacity: usize,
    messages: VecDeque<Message>,
}

impl ConversationContext {
    /// Create an empty context with the default capacity.
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CONTEXT_CAPACITY,
            messages: VecDeque::new(),
        }
    }

    /// Create an empty context with a custom capacity.
    ///
    /// A capacity below 2 could not hold a single user/assistant pair.
    pub fn with_capacity(capacity: usize) -> Result<Self, DomainError> {
        if capacity < 2 {
            return Err(DomainError::InvalidContextCapacity(capacity));
        }
        Ok(Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        })
    }

    /// Build a context from caller-supplied history, keeping only the most
    /// recent `capacity` messages.
    pub fn from_messages(
        messages: impl IntoIterator<Item = Message>,
        capacity: usize,
    ) -> Result<Self, DomainError> {
        let mut context = Self::with_capacity(capacity)?;
        context.messages.extend(messages);
        context.evict_overflow();
        Ok(context)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The oldest message still in the window.
    pub fn first(&self) -> Option<&Message> {
        self.messages.front()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Return a new context with `user` and `assistant` appended, evicting
    /// the oldest messages if the capacity is exceeded.
    pub fn append(&self, user: Message, assistant: Message) -> Self {
        let mut next = self.clone();
        next.messages.push_back(user);
        next.messages.push_back(assistant);
        next.evict_overflow();
        next
    }

    /// Record a finished turn: the user's query followed by the final answer.
    pub fn record_turn(&self, query: impl Into<String>, response: impl Into<String>) -> Self {
        self.append(Message::user(query), Message::assistant(response))
    }

    /// An empty context with the same capacity.
    pub fn cleared(&self) -> Self {
        Self {
            capacity: self.capacity,
            messages: VecDeque::with_capacity(self.capacity),
        }
    }

    fn evict_overflow(&mut self) {
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
        }
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::entities::Role;

    fn context_with_turns(turns: usize) -> ConversationContext {
        (0..turns).fold(ConversationContext::new(), |ctx, i| {
            ctx.record_turn(format!("q{}", i), format!("a{}", i))
        })
    }

    #[test]
    fn test_append_adds_user_then_assistant() {
        let ctx = ConversationContext::new().record_turn("hello", "hi there");
        let messages = ctx.to_vec();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::user("hello"));
        assert_eq!(messages[1], Message::assistant("hi there"));
    }

    #[test]
    fn test_append_is_copy_on_write() {
        let before = context_with_turns(2);
        let after = before.record_turn("q2", "a2");
        assert_eq!(before.len(), 4);
        assert_eq!(after.len(), 6);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut ctx = ConversationContext::with_capacity(4).unwrap();
        for i in 0..20 {
            ctx = ctx.record_turn(format!("q{}", i), format!("a{}", i));
            assert!(ctx.len() <= ctx.capacity());
        }
        assert_eq!(ctx.len(), 4);
    }

    #[test]
    fn test_eleventh_append_drops_exactly_the_oldest_two() {
        // Five turns fill a cap-10 context exactly.
        let full = context_with_turns(5);
        assert_eq!(full.len(), 10);
        let third = full.to_vec()[2].clone();

        let next = full.record_turn("q5", "a5");
        assert_eq!(next.len(), 10);
        assert_eq!(next.first(), Some(&third));
        assert_eq!(next.last(), Some(&Message::assistant("a5")));

        // Survivors keep their relative order.
        let expected: Vec<Message> = full.to_vec()[2..]
            .iter()
            .cloned()
            .chain([Message::user("q5"), Message::assistant("a5")])
            .collect();
        assert_eq!(next.to_vec(), expected);
    }

    #[test]
    fn test_odd_overflow_evicts_single_message() {
        let ctx = ConversationContext::from_messages(
            vec![
                Message::user("a"),
                Message::assistant("b"),
                Message::user("c"),
            ],
            4,
        )
        .unwrap();
        let next = ctx.record_turn("d", "e");
        assert_eq!(next.len(), 4);
        assert_eq!(next.first().map(|m| m.content.as_str()), Some("b"));
        assert_eq!(next.first().map(|m| m.role), Some(Role::Assistant));
    }

    #[test]
    fn test_from_messages_keeps_most_recent() {
        let history: Vec<Message> = (0..15).map(|i| Message::user(format!("m{}", i))).collect();
        let ctx = ConversationContext::from_messages(history, 10).unwrap();
        assert_eq!(ctx.len(), 10);
        assert_eq!(ctx.first().unwrap().content, "m5");
    }

    #[test]
    fn test_capacity_below_two_is_rejected() {
        assert_eq!(
            ConversationContext::with_capacity(1),
            Err(DomainError::InvalidContextCapacity(1))
        );
        assert!(ConversationContext::with_capacity(2).is_ok());
    }

    #[test]
    fn test_cleared_keeps_capacity() {
        let ctx = ConversationContext::with_capacity(6)
            .unwrap()
            .record_turn("q", "a");
        let cleared = ctx.cleared();
        assert!(cleared.is_empty());
        assert_eq!(cleared.capacity(), 6);
    }
}
