use crate::error::{ListError, Result};

/// Sizing and reuse knobs for display lists.
///
/// The initial capacities only affect the first recording pass; after that a
/// reused list keeps whatever capacity its busiest frame needed, up to
/// `max_retained_bytes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    /// Operations preallocated in the command buffer
    pub initial_command_capacity: usize,
    /// Drawable slots preallocated in the arena
    pub initial_arena_capacity: usize,
    /// Slots preallocated in each child reference collection
    pub initial_child_capacity: usize,
    /// Lists holding more than this are discarded instead of reused
    pub max_retained_bytes: usize,
    /// Master switch for the reuse path
    pub reuse_enabled: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            initial_command_capacity: 32,
            initial_arena_capacity: 8,
            initial_child_capacity: 4,
            max_retained_bytes: 256 * 1024,
            reuse_enabled: true,
        }
    }
}

impl ListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initial_command_capacity(mut self, capacity: usize) -> Self {
        self.initial_command_capacity = capacity;
        self
    }

    pub fn initial_arena_capacity(mut self, capacity: usize) -> Self {
        self.initial_arena_capacity = capacity;
        self
    }

    pub fn initial_child_capacity(mut self, capacity: usize) -> Self {
        self.initial_child_capacity = capacity;
        self
    }

    pub fn max_retained_bytes(mut self, bytes: usize) -> Self {
        self.max_retained_bytes = bytes;
        self
    }

    pub fn reuse_enabled(mut self, enabled: bool) -> Self {
        self.reuse_enabled = enabled;
        self
    }

    /// Reject configurations that could never keep a list alive.
    pub fn validate(&self) -> Result<()> {
        if self.reuse_enabled && self.max_retained_bytes == 0 {
            return Err(ListError::InvalidConfig(
                "max_retained_bytes must be non-zero when reuse is enabled".to_string(),
            ));
        }
        Ok(())
    }
}
