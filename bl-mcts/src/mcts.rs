//! MCTS driver: sequential loop, single-iteration mode, and the
//! root-parallel ensemble with per-action statistics merging.

use std::collections::VecDeque;
use std::rc::Rc;
use std::thread;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use rustc_hash::FxHashMap;
use thiserror::Error;

use bl_core::{Action, ActionKind, ProblemState, SearchParams};
use bl_features::Observation;

use crate::node::{backpropagate, expand, NodeRef, SearchNode};

/// UCT exploration weight used during selection.
const SELECTION_C: f32 = 1.0;

/// Hard cap on rollout steps regardless of remaining depth budget.
const MAX_ROLLOUT_STEPS: u32 = 50;

/// Simulations below which root parallelization is not worth the merge.
const MIN_PARALLEL_SIMULATIONS: u32 = 100;

/// Guard limit for node-count walks.
const NODE_COUNT_GUARD: usize = 1_000_000;

/// Guard limit for the depth walk's queue.
const DEPTH_QUEUE_GUARD: usize = 100_000;

/// Seed-stream mixing constant (splitmix64 increment).
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Error)]
pub enum MctsError {
    #[error("invalid config: {msg}")]
    InvalidConfig { msg: &'static str },
}

/// Driver configuration. `num_threads == 0` auto-detects hardware
/// parallelism.
#[derive(Debug, Clone, Copy)]
pub struct MctsConfig {
    pub depth: u32,
    pub simulations: u32,
    pub mu: f32,
    pub num_threads: usize,
    pub seed: u64,
    pub debug: bool,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            depth: 5,
            simulations: 300,
            mu: bl_core::DEFAULT_MU,
            num_threads: 0,
            seed: 0,
            debug: false,
        }
    }
}

impl MctsConfig {
    pub fn from_params(params: &SearchParams, seed: u64) -> Self {
        Self {
            depth: params.depth,
            simulations: params.simulations,
            mu: params.mu,
            num_threads: params.num_threads,
            seed,
            debug: params.debug,
        }
    }
}

/// One training pair: observation of a node's snapshot and its mean reward.
#[derive(Debug, Clone)]
pub struct TrainingPair {
    pub observation: Observation,
    pub value: f32,
}

/// Per-action statistics extracted from a worker's root.
type RootStats = Vec<(Action, f32, u32)>;

pub struct Mcts {
    cfg: MctsConfig,
    root: NodeRef,
    rng: ChaCha8Rng,
    num_threads: usize,
}

impl Mcts {
    pub fn new(root_state: ProblemState, cfg: MctsConfig) -> Result<Self, MctsError> {
        Self::with_root(SearchNode::new_root(root_state), cfg)
    }

    /// Driver over a root restricted to one action kind (the pinned hook).
    pub fn new_pinned(
        root_state: ProblemState,
        kind: ActionKind,
        cfg: MctsConfig,
    ) -> Result<Self, MctsError> {
        Self::with_root(SearchNode::new_pinned_root(root_state, kind), cfg)
    }

    fn with_root(root: NodeRef, cfg: MctsConfig) -> Result<Self, MctsError> {
        if cfg.simulations == 0 {
            return Err(MctsError::InvalidConfig {
                msg: "simulations must be > 0",
            });
        }
        if cfg.depth == 0 {
            return Err(MctsError::InvalidConfig {
                msg: "depth must be > 0",
            });
        }
        if !(cfg.mu.is_finite() && cfg.mu >= 0.0) {
            return Err(MctsError::InvalidConfig {
                msg: "mu must be finite and >= 0",
            });
        }
        let num_threads = if cfg.num_threads == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            cfg.num_threads
        };
        Ok(Self {
            cfg,
            root,
            rng: ChaCha8Rng::seed_from_u64(cfg.seed),
            num_threads,
        })
    }

    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Run the full search budget and return the exploitation-best root
    /// child (`None` if the root has no legal children).
    pub fn search(&mut self) -> Option<NodeRef> {
        if self.num_threads > 1 && self.cfg.simulations >= MIN_PARALLEL_SIMULATIONS {
            return self.search_root_parallel();
        }
        self.run_sequential();
        self.root.borrow().best_child(0.0)
    }

    fn run_sequential(&mut self) {
        for sim in 0..self.cfg.simulations {
            if self.cfg.debug {
                eprintln!("iteration {}/{}", sim + 1, self.cfg.simulations);
            }
            self.search_single_iteration();
        }
    }

    /// One selection/expansion/rollout/backpropagation cycle.
    ///
    /// Returns true when the simulated node is terminal; the reward is then
    /// computed directly from the snapshot and the caller may stop early.
    pub fn search_single_iteration(&mut self) -> bool {
        let mut node = self.select();

        let terminal = node.borrow().is_terminal();
        if !terminal {
            let untried = node.borrow().untried_actions();
            if !untried.is_empty() {
                let action = untried[self.rng.gen_range(0..untried.len())];
                if self.cfg.debug {
                    eprintln!("expanding with {action}");
                }
                node = expand(&node, action);
            }
        }

        if node.borrow().is_terminal() {
            let reward = {
                let n = node.borrow();
                n.state.evaluate_with_mu(n.depth, self.cfg.mu)
            };
            if self.cfg.debug {
                eprintln!("terminal state reached, reward {reward}");
            }
            backpropagate(&node, reward);
            return true;
        }

        let reward = self.rollout(&node);
        if self.cfg.debug {
            eprintln!("rollout reward {reward}");
        }
        backpropagate(&node, reward);
        false
    }

    /// Walk by UCT from the root until a node is terminal, not fully
    /// expanded, or the per-descent depth budget is spent.
    fn select(&self) -> NodeRef {
        let mut node = Rc::clone(&self.root);
        let mut traversed = 0u32;
        loop {
            if traversed >= self.cfg.depth {
                break;
            }
            let next = {
                let n = node.borrow();
                if n.is_terminal() || !n.is_fully_expanded() {
                    break;
                }
                n.best_child(SELECTION_C)
            };
            match next {
                Some(child) => {
                    node = child;
                    traversed += 1;
                }
                None => break,
            }
        }
        node
    }

    /// Bounded uniform-random playout from `node`'s snapshot.
    fn rollout(&mut self, node: &NodeRef) -> f32 {
        let (mut state, mut current_depth) = {
            let n = node.borrow();
            (n.state.clone(), n.depth)
        };
        let max_steps = MAX_ROLLOUT_STEPS.min(self.cfg.depth.saturating_sub(current_depth));
        let mut taken = 0u32;

        while !state.is_terminal() && current_depth < self.cfg.depth && taken < max_steps {
            let actions = state.possible_actions();
            if actions.is_empty() {
                break;
            }
            let action = actions[self.rng.gen_range(0..actions.len())];
            state.apply_action(action);
            current_depth += 1;
            taken += 1;
        }

        state.evaluate_with_mu(current_depth, self.cfg.mu)
    }

    /// Root parallelization: independent sequential searches over copies of
    /// the root snapshot, merged at the root level only.
    fn search_root_parallel(&mut self) -> Option<NodeRef> {
        let threads = self.num_threads;
        let sims_per_thread = (self.cfg.simulations / threads as u32).max(1);
        if self.cfg.debug {
            eprintln!("root parallelization: {threads} workers x {sims_per_thread} simulations");
        }

        let (root_state, pinned) = {
            let r = self.root.borrow();
            (r.state.clone(), r.pinned)
        };
        let worker_cfg = MctsConfig {
            simulations: sims_per_thread,
            num_threads: 1,
            debug: false,
            ..self.cfg
        };

        let worker_stats: Vec<RootStats> = thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let state = root_state.clone();
                    let cfg = MctsConfig {
                        // Disjoint per-worker seed streams.
                        seed: self.cfg.seed ^ (t as u64 + 1).wrapping_mul(SEED_MIX),
                        ..worker_cfg
                    };
                    scope.spawn(move || {
                        let root = match pinned {
                            Some(kind) => SearchNode::new_pinned_root(state, kind),
                            None => SearchNode::new_root(state),
                        };
                        let mut worker =
                            Mcts::with_root(root, cfg).expect("worker config is valid");
                        worker.run_sequential();
                        extract_root_stats(&worker.root)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("search worker panicked"))
                .collect()
        });

        self.merge_worker_stats(worker_stats);
        self.root.borrow().best_child(0.0)
    }

    /// Fold per-worker root statistics into the shared root's child set.
    ///
    /// Aggregation is per `(action, params)`: rewards and visits sum across
    /// workers, first-seen order fixes where fresh children are inserted.
    /// Deep worker subtrees are discarded.
    pub(crate) fn merge_worker_stats(&mut self, worker_stats: Vec<RootStats>) {
        let mut index: FxHashMap<Action, usize> = FxHashMap::default();
        let mut merged: RootStats = Vec::new();
        for stats in worker_stats {
            for (action, reward, visits) in stats {
                match index.get(&action) {
                    Some(&i) => {
                        merged[i].1 += reward;
                        merged[i].2 += visits;
                    }
                    None => {
                        index.insert(action, merged.len());
                        merged.push((action, reward, visits));
                    }
                }
            }
        }
        if self.cfg.debug {
            eprintln!("merged {} distinct root actions", merged.len());
        }

        for (action, reward, visits) in merged {
            let existing = {
                let r = self.root.borrow();
                r.children
                    .iter()
                    .find(|c| c.borrow().action == Some(action))
                    .map(Rc::clone)
            };
            let child = match existing {
                Some(child) => child,
                None => expand(&self.root, action),
            };
            let mut c = child.borrow_mut();
            c.total_reward = reward;
            c.visits = visits;
        }

        // Root totals are defined by the merged children.
        let (visits, reward) = {
            let r = self.root.borrow();
            r.children.iter().fold((0u32, 0.0f32), |(v, w), c| {
                let c = c.borrow();
                (v + c.visits, w + c.total_reward)
            })
        };
        let mut r = self.root.borrow_mut();
        r.visits = visits;
        r.total_reward = reward;
    }

    /// Greedy action sequence following `best_child(0)` from the root.
    pub fn best_path(&self) -> Vec<Action> {
        let mut path = Vec::new();
        let mut node = Rc::clone(&self.root);
        loop {
            let next = node.borrow().best_child(0.0);
            match next {
                Some(child) => {
                    if let Some(action) = child.borrow().action {
                        path.push(action);
                    }
                    node = child;
                }
                None => break,
            }
        }
        path
    }

    /// Breadth-first `(observation, mean reward)` extraction over nodes
    /// with at least `min_visits` visits.
    ///
    /// Retries once with `min_visits = 1` when fewer than 10 samples come
    /// back, mirroring the value-net data collection path.
    pub fn collect_training_data(&self, max_samples: usize, min_visits: u32) -> Vec<TrainingPair> {
        let mut out = Vec::new();
        let mut queue: VecDeque<NodeRef> = VecDeque::new();
        queue.push_back(Rc::clone(&self.root));

        while let Some(node) = queue.pop_front() {
            if out.len() >= max_samples {
                break;
            }
            let n = node.borrow();
            if n.visits >= min_visits {
                out.push(TrainingPair {
                    observation: bl_features::encode_high_level(&n.state),
                    value: n.mean_reward(),
                });
            }
            for child in &n.children {
                queue.push_back(Rc::clone(child));
            }
        }

        if out.len() < 10 && min_visits > 1 {
            return self.collect_training_data(max_samples, 1);
        }
        out
    }

    /// Total node count, bounded by a guard limit on pathological trees.
    pub fn count_total_nodes(&self) -> usize {
        let mut count = 0usize;
        let mut queue: VecDeque<NodeRef> = VecDeque::new();
        queue.push_back(Rc::clone(&self.root));
        while let Some(node) = queue.pop_front() {
            count += 1;
            if count > NODE_COUNT_GUARD {
                eprintln!("warning: node count exceeded {NODE_COUNT_GUARD}, stopping count");
                break;
            }
            for child in &node.borrow().children {
                queue.push_back(Rc::clone(child));
            }
        }
        count
    }

    /// Maximum node depth, bounded by a guard limit on the walk queue.
    pub fn tree_depth(&self) -> u32 {
        let mut max_depth = 0u32;
        let mut queue: VecDeque<NodeRef> = VecDeque::new();
        queue.push_back(Rc::clone(&self.root));
        while let Some(node) = queue.pop_front() {
            let n = node.borrow();
            max_depth = max_depth.max(n.depth);
            for child in &n.children {
                queue.push_back(Rc::clone(child));
            }
            if queue.len() > DEPTH_QUEUE_GUARD {
                eprintln!(
                    "warning: depth walk queue exceeded {DEPTH_QUEUE_GUARD}, stopping walk"
                );
                break;
            }
        }
        max_depth
    }
}

/// Per-action `(reward, visits)` snapshot of a root's children.
pub(crate) fn extract_root_stats(root: &NodeRef) -> RootStats {
    root.borrow()
        .children
        .iter()
        .filter_map(|c| {
            let c = c.borrow();
            c.action.map(|a| (a, c.total_reward, c.visits))
        })
        .collect()
}
