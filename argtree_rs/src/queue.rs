//! Front-consumable token queue fed to the dispatcher.

use std::collections::VecDeque;

/// Ordered sequence of argument tokens consumed strictly left to right.
///
/// Only the front of the queue is ever visible: handlers `peek` to decide
/// and `remove` to consume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenQueue {
    tokens: VecDeque<String>,
}

impl TokenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize one line of shell input on runs of whitespace.
    pub fn from_line(line: &str) -> Self {
        line.split_whitespace().collect()
    }

    pub fn peek(&self) -> Option<&str> {
        self.tokens.front().map(String::as_str)
    }

    pub fn remove(&mut self) -> Option<String> {
        self.tokens.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Consume everything that is left, in order.
    pub fn drain_all(&mut self) -> Vec<String> {
        self.tokens.drain(..).collect()
    }
}

impl<T: Into<String>> FromIterator<T> for TokenQueue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}
