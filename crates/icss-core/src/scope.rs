use std::collections::HashMap;

/// Stack of lexical frames mapping variable names to `V`.
///
/// The checker binds expression types and the evaluator binds literal
/// values; both push one frame per stylesheet, rule, if or else body.
#[derive(Debug, Clone)]
pub struct ScopeStack<V> {
    frames: Vec<HashMap<String, V>>,
}

impl<V> Default for ScopeStack<V> {
    fn default() -> Self {
        Self { frames: Vec::new() }
    }
}

impl<V> ScopeStack<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
        tracing::trace!(depth = self.frames.len(), "push scope");
    }

    pub fn pop(&mut self) {
        let popped = self.frames.pop();
        debug_assert!(popped.is_some(), "scope stack underflow");
        tracing::trace!(depth = self.frames.len(), "pop scope");
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost frame, replacing any earlier binding
    /// in that same frame. Outer frames are never touched.
    pub fn declare(&mut self, name: impl Into<String>, value: V) {
        if self.frames.is_empty() {
            self.push();
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), value);
        }
    }

    /// Innermost binding of `name`, if any frame has one.
    pub fn lookup(&self, name: &str) -> Option<&V> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }
}
