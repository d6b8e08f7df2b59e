//! Keep-or-discard policy for retired display lists.
//!
//! When a node records a new list, the one it replaces is retired. Keeping
//! it (reset, ready to record the next frame) saves reallocating the command
//! buffer, arena and collections. Discarding it is the safe default whenever
//! the node or rendering context it belonged to has moved on.

use crate::config::ListConfig;
use crate::geometry::Rect;
use crate::list_stats;

use super::DisplayList;

/// What to do with a retired list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReuseDecision {
    /// Reset the list and hand it back for the next recording pass
    Keep,
    /// Drop the list; the next recording pass allocates a fresh one
    Discard,
}

/// The rendering context a list is being retired under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// Changes whenever the context's surface or pipeline is recreated
    pub session: u64,
    /// Set while the system asks for memory to be trimmed
    pub memory_pressure: bool,
}

impl RenderContext {
    pub fn new(session: u64) -> Self {
        Self {
            session,
            memory_pressure: false,
        }
    }
}

/// The scene node that owned a retired list.
pub trait ListOwner {
    /// Whether the node is still part of a live tree.
    fn is_attached(&self) -> bool;

    /// Session of the context the node last synced its properties under.
    fn session(&self) -> u64;
}

/// Decides whether retired lists are reset and kept or discarded.
///
/// Holds only configuration; every decision is independent of the previous
/// ones.
#[derive(Debug, Clone)]
pub struct ReuseController {
    reuse_enabled: bool,
    max_retained_bytes: usize,
}

impl Default for ReuseController {
    fn default() -> Self {
        Self::new(&ListConfig::default())
    }
}

impl ReuseController {
    pub fn new(config: &ListConfig) -> Self {
        Self {
            reuse_enabled: config.reuse_enabled,
            max_retained_bytes: config.max_retained_bytes,
        }
    }

    /// Decide the fate of `list`, retired by `owner` under `context`.
    pub fn decide(
        &self,
        owner: &dyn ListOwner,
        list: &DisplayList,
        context: &RenderContext,
    ) -> ReuseDecision {
        let keep = self.reuse_enabled
            && !context.memory_pressure
            && owner.is_attached()
            && owner.session() == context.session
            && list.retained_bytes() <= self.max_retained_bytes;

        if keep {
            ReuseDecision::Keep
        } else {
            ReuseDecision::Discard
        }
    }

    /// Retire `list`: decide once, then reset and return it, or drop it.
    pub fn retire(
        &self,
        mut list: DisplayList,
        owner: &dyn ListOwner,
        context: &RenderContext,
    ) -> Option<DisplayList> {
        match self.decide(owner, &list, context) {
            ReuseDecision::Keep => {
                log::debug!("keeping retired list ({} bytes)", list.retained_bytes());
                list_stats::record_list_kept();
                list.reset(Rect::ZERO);
                Some(list)
            }
            ReuseDecision::Discard => {
                log::debug!(
                    "discarding retired list ({} bytes, session {} vs {})",
                    list.retained_bytes(),
                    owner.session(),
                    context.session
                );
                list_stats::record_list_discarded();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::content::RenderNode;
    use crate::testing::{TestNode, TestOwner};

    fn recorded_list() -> (DisplayList, Arc<TestNode>) {
        let node = TestNode::new("child");
        let dyn_node: Arc<dyn RenderNode> = node.clone();
        let mut list = DisplayList::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut rec = list.record();
        rec.draw_node(&dyn_node);
        rec.finish();
        (list, node)
    }

    #[test]
    fn test_keep_resets_list() {
        let (list, _node) = recorded_list();
        let controller = ReuseController::default();
        let owner = TestOwner::new(true, 1);

        let kept = controller
            .retire(list, &owner, &RenderContext::new(1))
            .expect("list should be kept");
        assert!(kept.is_empty());
        assert_eq!(kept.child_count(), 0);
        assert_eq!(kept.bounds(), Rect::ZERO);
    }

    #[test]
    fn test_discard_conditions() {
        let (list, _node) = recorded_list();
        let controller = ReuseController::default();
        let attached = TestOwner::new(true, 1);

        assert_eq!(
            controller.decide(&attached, &list, &RenderContext::new(1)),
            ReuseDecision::Keep
        );
        assert_eq!(
            controller.decide(&attached, &list, &RenderContext::new(2)),
            ReuseDecision::Discard
        );
        assert_eq!(
            controller.decide(&TestOwner::new(false, 1), &list, &RenderContext::new(1)),
            ReuseDecision::Discard
        );

        let trimming = RenderContext {
            memory_pressure: true,
            ..RenderContext::new(1)
        };
        assert_eq!(
            controller.decide(&attached, &list, &trimming),
            ReuseDecision::Discard
        );
    }

    #[test]
    fn test_oversized_list_is_discarded() {
        let (list, _node) = recorded_list();
        let config = ListConfig::new().max_retained_bytes(1);
        let controller = ReuseController::new(&config);
        let owner = TestOwner::new(true, 1);
        assert!(controller
            .retire(list, &owner, &RenderContext::new(1))
            .is_none());
    }

    #[test]
    fn test_disabled_reuse_always_discards() {
        let (list, _node) = recorded_list();
        let controller = ReuseController::new(&ListConfig::new().reuse_enabled(false));
        let owner = TestOwner::new(true, 1);
        assert_eq!(
            controller.decide(&owner, &list, &RenderContext::new(1)),
            ReuseDecision::Discard
        );
    }

    #[test]
    fn test_decisions_are_independent() {
        let controller = ReuseController::default();
        let owner = TestOwner::new(true, 5);
        let (first, _a) = recorded_list();
        let (second, _b) = recorded_list();

        assert!(controller
            .retire(first, &owner, &RenderContext::new(4))
            .is_none());
        assert!(controller
            .retire(second, &owner, &RenderContext::new(5))
            .is_some());
    }
}
