//! Per-traversal state threaded through the prepare pass.
//!
//! A `TreeInfo` is created by whoever drives the prepare pass, handed down
//! through every list and child node, and read back afterwards. Lists report
//! into it through [`TreeFlags`] and the [`DamageAccumulator`].

use bitflags::bitflags;

use crate::geometry::Rect;
use crate::transform::Transform;

bitflags! {
    /// Signals raised by lists while a tree is being prepared
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TreeFlags: u8 {
        /// Some list in the traversal contains a functor
        const HAS_FUNCTORS = 0b0001;
        /// Some vector content changed and will be redrawn
        const VECTOR_CONTENT_DIRTY = 0b0010;
        /// A node below the current list projects into an ancestor
        const HAS_BACKWARD_PROJECTED_NODES = 0b0100;
    }
}

/// Who triggered the traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// Producer is blocked while the consumer prepares; all state may sync.
    #[default]
    Full,
    /// Consumer-only traversal (e.g. a render-thread animation tick).
    RenderOnly,
}

/// Transform stack plus the damage accumulated under it.
#[derive(Debug, Clone)]
pub struct DamageAccumulator {
    stack: Vec<Transform>,
    damage: Rect,
}

impl Default for DamageAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DamageAccumulator {
    pub fn new() -> Self {
        Self {
            stack: vec![Transform::IDENTITY],
            damage: Rect::ZERO,
        }
    }

    /// Enter a child drawn under `transform` (relative to the current level).
    pub fn push_transform(&mut self, transform: &Transform) {
        let combined = self.current_transform().then(transform);
        self.stack.push(combined);
    }

    /// Leave the level entered by the matching `push_transform`.
    ///
    /// # Panics
    ///
    /// Panics when called more often than `push_transform`.
    pub fn pop_transform(&mut self) {
        assert!(self.stack.len() > 1, "unbalanced pop_transform");
        self.stack.pop();
    }

    pub fn current_transform(&self) -> Transform {
        self.stack.last().copied().unwrap_or(Transform::IDENTITY)
    }

    /// Number of pushed levels above the root.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Mark `rect` (in the current level's coordinates) as damaged.
    pub fn dirty(&mut self, rect: Rect) {
        let mapped = self.current_transform().map_rect(&rect);
        self.damage = self.damage.union(&mapped);
    }

    /// Union of everything marked dirty, in root coordinates.
    pub fn damage_bounds(&self) -> Rect {
        self.damage
    }
}

/// State for one prepare traversal.
#[derive(Debug, Clone)]
pub struct TreeInfo {
    pub mode: TraversalMode,
    /// Whether mutable images may be uploaded during this traversal
    pub prepare_textures: bool,
    pub frame_number: u64,
    pub damage: DamageAccumulator,
    pub flags: TreeFlags,
}

impl TreeInfo {
    pub fn new(mode: TraversalMode, frame_number: u64) -> Self {
        Self {
            mode,
            prepare_textures: mode == TraversalMode::Full,
            frame_number,
            damage: DamageAccumulator::new(),
            flags: TreeFlags::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_composes() {
        let mut damage = DamageAccumulator::new();
        damage.push_transform(&Transform::translate(10.0, 0.0));
        damage.push_transform(&Transform::translate(0.0, 5.0));
        assert_eq!(damage.depth(), 2);
        assert_eq!(
            damage.current_transform().transform_point(0.0, 0.0),
            (10.0, 5.0)
        );

        damage.pop_transform();
        damage.pop_transform();
        assert_eq!(damage.depth(), 0);
        assert!(damage.current_transform().is_identity());
    }

    #[test]
    #[should_panic(expected = "unbalanced pop_transform")]
    fn test_unbalanced_pop_panics() {
        DamageAccumulator::new().pop_transform();
    }

    #[test]
    fn test_dirty_maps_into_root_space() {
        let mut damage = DamageAccumulator::new();
        damage.push_transform(&Transform::translate(100.0, 100.0));
        damage.dirty(Rect::new(0.0, 0.0, 10.0, 10.0));
        damage.pop_transform();
        damage.dirty(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(damage.damage_bounds(), Rect::new(0.0, 0.0, 110.0, 110.0));
    }

    #[test]
    fn test_render_only_mode_skips_textures() {
        assert!(TreeInfo::new(TraversalMode::Full, 1).prepare_textures);
        assert!(!TreeInfo::new(TraversalMode::RenderOnly, 1).prepare_textures);
    }
}
