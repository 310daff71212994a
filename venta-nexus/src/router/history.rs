//! Browser-style navigation history.

/// Ordered list of visited paths with a cursor.
///
/// `push` drops every entry after the cursor, like a browser does when you
/// follow a link after going back.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
        }
    }

    /// The path at the cursor.
    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    pub fn push(&mut self, path: impl Into<String>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(path.into());
        self.cursor = self.entries.len() - 1;
    }

    /// Move back one entry. Returns true if the cursor moved.
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move forward one entry. Returns true if the cursor moved.
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_navigation() {
        let mut history = History::new("/");
        assert_eq!(history.current(), "/");
        assert!(!history.can_go_back());

        history.push("/users");
        history.push("/404");
        assert_eq!(history.current(), "/404");
        assert_eq!(history.len(), 3);

        assert!(history.back());
        assert_eq!(history.current(), "/users");
        assert!(history.can_go_forward());

        assert!(history.forward());
        assert_eq!(history.current(), "/404");
        assert!(!history.forward());

        assert!(history.back());
        assert!(history.back());
        assert!(!history.back());
        assert_eq!(history.current(), "/");
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let mut history = History::new("/");
        history.push("/users");
        history.push("/404");
        history.back();
        history.back();

        history.push("/users");
        assert_eq!(history.len(), 2);
        assert!(!history.can_go_forward());
        assert_eq!(history.current(), "/users");
    }
}
