//! Search tree node: UCT statistics, untried-action bookkeeping, and the
//! parent back-walk.
//!
//! Children are owned by their parent; the parent edge is a `Weak` so the
//! tree frees bottom-up when the root is released.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use bl_core::{Action, ActionKind, ProblemState};

/// Shared handle to a tree node.
pub type NodeRef = Rc<RefCell<SearchNode>>;

pub struct SearchNode {
    pub state: ProblemState,
    pub parent: Weak<RefCell<SearchNode>>,
    pub children: Vec<NodeRef>,
    /// Action that produced this node from its parent; `None` for a root.
    pub action: Option<Action>,
    /// Root-only hook: restrict expansion to parameterizations of one kind.
    pub pinned: Option<ActionKind>,
    /// Edges from the root.
    pub depth: u32,
    pub visits: u32,
    pub total_reward: f32,
}

impl SearchNode {
    pub fn new_root(state: ProblemState) -> NodeRef {
        Rc::new(RefCell::new(SearchNode {
            state,
            parent: Weak::new(),
            children: Vec::new(),
            action: None,
            pinned: None,
            depth: 0,
            visits: 0,
            total_reward: 0.0,
        }))
    }

    /// Root whose untried set is all valid parameterizations of `kind`.
    pub fn new_pinned_root(state: ProblemState, kind: ActionKind) -> NodeRef {
        let root = Self::new_root(state);
        root.borrow_mut().pinned = Some(kind);
        root
    }

    pub fn is_root(&self) -> bool {
        self.parent.upgrade().is_none() && self.action.is_none()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried_actions().is_empty()
    }

    /// Mean backpropagated reward; 0 before the first visit.
    pub fn mean_reward(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / self.visits as f32
        }
    }

    fn action_tried(&self, action: Action) -> bool {
        self.children
            .iter()
            .any(|c| c.borrow().action == Some(action))
    }

    /// Legal actions not yet expanded as children.
    ///
    /// A pinned root enumerates only its pinned kind; every other node uses
    /// the full legal set.
    pub fn untried_actions(&self) -> Vec<Action> {
        let candidates = match self.pinned {
            Some(kind) => self.state.enumerate_valid_params(kind),
            None => self.state.possible_actions(),
        };
        candidates
            .into_iter()
            .filter(|&a| !self.action_tried(a))
            .collect()
    }

    /// Child maximizing the UCT score at exploration weight `c`.
    ///
    /// Unvisited children score +inf under exploration; with `c == 0`
    /// (final choice, training extraction) only visited statistics count.
    /// Ties keep the earliest child.
    pub fn best_child(&self, c: f32) -> Option<NodeRef> {
        let mut best: Option<(&NodeRef, f32)> = None;
        for child_ref in &self.children {
            let child = child_ref.borrow();
            let score = if child.visits == 0 {
                if c > 0.0 {
                    f32::INFINITY
                } else {
                    f32::NEG_INFINITY
                }
            } else {
                let mut s = child.total_reward / child.visits as f32;
                if c > 0.0 {
                    s += c * ((self.visits as f32).ln() / child.visits as f32).sqrt();
                }
                s
            };
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_ref, score)),
            }
        }
        best.map(|(r, _)| Rc::clone(r))
    }
}

/// Apply `action` to a copy of the node's snapshot and attach the result as
/// a new child. The action must be legal.
pub fn expand(parent: &NodeRef, action: Action) -> NodeRef {
    let (state, depth) = {
        let p = parent.borrow();
        let mut state = p.state.clone();
        let applied = state.apply_action(action);
        debug_assert!(applied, "expand called with illegal action {action}");
        (state, p.depth + 1)
    };
    let child = Rc::new(RefCell::new(SearchNode {
        state,
        parent: Rc::downgrade(parent),
        children: Vec::new(),
        action: Some(action),
        pinned: None,
        depth,
        visits: 0,
        total_reward: 0.0,
    }));
    parent.borrow_mut().children.push(Rc::clone(&child));
    child
}

/// Add one visit and `reward` to every node from `node` up to the root.
pub fn backpropagate(node: &NodeRef, reward: f32) {
    let mut current = Some(Rc::clone(node));
    while let Some(n) = current {
        {
            let mut b = n.borrow_mut();
            b.visits += 1;
            b.total_reward += reward;
        }
        current = n.borrow().parent.upgrade();
    }
}
