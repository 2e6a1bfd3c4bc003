//! Advisory error messages pushed by callers.

/// Last-in-first-out stack of free-text error messages.
///
/// Nothing in this crate pushes messages on its own; callers record them with
/// [`ErrorMessages::push`] and read them back most-recent-first.
#[derive(Debug, Clone, Default)]
pub struct ErrorMessages {
    messages: Vec<String>,
}

impl ErrorMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a message. Blank messages are ignored.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !message.trim().is_empty() {
            self.messages.push(message);
        }
    }

    /// Pop the most recently pushed message.
    pub fn pop(&mut self) -> Option<String> {
        self.messages.pop()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
