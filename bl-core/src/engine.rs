//! Transition engine: the single place that mutates `ProblemState` via
//! actions.
//!
//! Every predicate is total over malformed input (out-of-range indices,
//! dangling jig ids): it returns `false` instead of failing. `apply_action`
//! either applies the full effect or leaves the snapshot untouched.

use crate::action::{Action, ActionKind, PARAM_ACTION_ORDER};
use crate::state::{JigId, ProblemState};

impl ProblemState {
    /// Pure legality predicate. Equal to "would `apply_action` on a copy
    /// return true" for every action.
    pub fn check_action_valid(&self, action: Action) -> bool {
        match action {
            Action::UnloadBeluga => self.can_unload_beluga(),
            Action::LoadBeluga { trailer_beluga } => self.can_load_beluga(trailer_beluga),
            Action::GetFromHangar {
                hangar,
                trailer_factory,
            } => self.can_get_from_hangar(hangar, trailer_factory),
            Action::DeliverToHangar {
                hangar,
                trailer_factory,
            } => self.can_deliver_to_hangar(hangar, trailer_factory),
            Action::LeftStackRack {
                rack,
                trailer_beluga,
            } => self.can_stack(rack, &self.trailers_beluga, trailer_beluga),
            Action::RightStackRack {
                rack,
                trailer_factory,
            } => self.can_stack(rack, &self.trailers_factory, trailer_factory),
            Action::LeftUnstackRack {
                rack,
                trailer_beluga,
            } => self.can_unstack(rack, &self.trailers_beluga, trailer_beluga),
            Action::RightUnstackRack {
                rack,
                trailer_factory,
            } => self.can_unstack(rack, &self.trailers_factory, trailer_factory),
        }
    }

    /// Apply `action` to this snapshot. Returns whether the action was
    /// legal; on `false` the snapshot is unchanged.
    pub fn apply_action(&mut self, action: Action) -> bool {
        if !self.check_action_valid(action) {
            return false;
        }
        match action {
            Action::UnloadBeluga => self.do_unload_beluga(),
            Action::LoadBeluga { trailer_beluga } => self.do_load_beluga(trailer_beluga),
            Action::GetFromHangar {
                hangar,
                trailer_factory,
            } => {
                self.trailers_factory[trailer_factory] = self.hangars[hangar].take();
            }
            Action::DeliverToHangar {
                hangar,
                trailer_factory,
            } => self.do_deliver_to_hangar(hangar, trailer_factory),
            Action::LeftStackRack {
                rack,
                trailer_beluga,
            } => {
                let jig = self.trailers_beluga[trailer_beluga].take().unwrap();
                self.racks[rack].jigs.insert(0, jig);
            }
            Action::RightStackRack {
                rack,
                trailer_factory,
            } => {
                let jig = self.trailers_factory[trailer_factory].take().unwrap();
                self.racks[rack].jigs.push(jig);
            }
            Action::LeftUnstackRack {
                rack,
                trailer_beluga,
            } => {
                let jig = self.racks[rack].jigs.remove(0);
                self.trailers_beluga[trailer_beluga] = Some(jig);
            }
            Action::RightUnstackRack {
                rack,
                trailer_factory,
            } => {
                let jig = self.racks[rack].jigs.pop().unwrap();
                self.trailers_factory[trailer_factory] = Some(jig);
            }
        }
        true
    }

    /// All legal parameterizations of `kind`, scanning indices in
    /// increasing order with the first parameter in the outer loop.
    ///
    /// The order is stable: it is observable through untried-action
    /// bookkeeping in the search tree.
    pub fn enumerate_valid_params(&self, kind: ActionKind) -> Vec<Action> {
        let mut out = Vec::new();
        match kind {
            ActionKind::UnloadBeluga => {
                if self.can_unload_beluga() {
                    out.push(Action::UnloadBeluga);
                }
            }
            ActionKind::LoadBeluga => {
                for trailer_beluga in 0..self.trailers_beluga.len() {
                    let a = Action::LoadBeluga { trailer_beluga };
                    if self.check_action_valid(a) {
                        out.push(a);
                    }
                }
            }
            ActionKind::GetFromHangar | ActionKind::DeliverToHangar => {
                for hangar in 0..self.hangars.len() {
                    for trailer_factory in 0..self.trailers_factory.len() {
                        let a = match kind {
                            ActionKind::GetFromHangar => Action::GetFromHangar {
                                hangar,
                                trailer_factory,
                            },
                            _ => Action::DeliverToHangar {
                                hangar,
                                trailer_factory,
                            },
                        };
                        if self.check_action_valid(a) {
                            out.push(a);
                        }
                    }
                }
            }
            ActionKind::LeftStackRack | ActionKind::LeftUnstackRack => {
                for rack in 0..self.racks.len() {
                    for trailer_beluga in 0..self.trailers_beluga.len() {
                        let a = match kind {
                            ActionKind::LeftStackRack => Action::LeftStackRack {
                                rack,
                                trailer_beluga,
                            },
                            _ => Action::LeftUnstackRack {
                                rack,
                                trailer_beluga,
                            },
                        };
                        if self.check_action_valid(a) {
                            out.push(a);
                        }
                    }
                }
            }
            ActionKind::RightStackRack | ActionKind::RightUnstackRack => {
                for rack in 0..self.racks.len() {
                    for trailer_factory in 0..self.trailers_factory.len() {
                        let a = match kind {
                            ActionKind::RightStackRack => Action::RightStackRack {
                                rack,
                                trailer_factory,
                            },
                            _ => Action::RightUnstackRack {
                                rack,
                                trailer_factory,
                            },
                        };
                        if self.check_action_valid(a) {
                            out.push(a);
                        }
                    }
                }
            }
        }
        out
    }

    /// Every legal action in the fixed concatenation order:
    /// `unload_beluga` first, then the parameterized kinds.
    pub fn possible_actions(&self) -> Vec<Action> {
        let mut out = Vec::with_capacity(16);
        if self.can_unload_beluga() {
            out.push(Action::UnloadBeluga);
        }
        for kind in PARAM_ACTION_ORDER {
            out.extend(self.enumerate_valid_params(kind));
        }
        out
    }

    fn jig_at(&self, id: JigId) -> Option<&crate::state::Jig> {
        self.jigs.get(id)
    }

    fn can_unload_beluga(&self) -> bool {
        let Some(b) = self.belugas.first() else {
            return false;
        };
        !b.incoming.is_empty() && self.trailers_beluga.iter().any(|s| s.is_none())
    }

    fn can_load_beluga(&self, trailer_beluga: usize) -> bool {
        let Some(&Some(jig_id)) = self.trailers_beluga.get(trailer_beluga) else {
            return false;
        };
        let Some(jig) = self.jig_at(jig_id) else {
            return false;
        };
        let Some(b) = self.belugas.first() else {
            return false;
        };
        jig.empty
            && b.incoming.is_empty()
            && b.outgoing.first() == Some(&jig.type_id)
    }

    fn can_get_from_hangar(&self, hangar: usize, trailer_factory: usize) -> bool {
        let Some(&Some(jig_id)) = self.hangars.get(hangar) else {
            return false;
        };
        let Some(&None) = self.trailers_factory.get(trailer_factory) else {
            return false;
        };
        self.jig_at(jig_id).is_some_and(|j| j.empty)
    }

    fn can_deliver_to_hangar(&self, hangar: usize, trailer_factory: usize) -> bool {
        let Some(&None) = self.hangars.get(hangar) else {
            return false;
        };
        let Some(&Some(jig_id)) = self.trailers_factory.get(trailer_factory) else {
            return false;
        };
        if self.jig_at(jig_id).map_or(true, |j| j.empty) {
            return false;
        }
        self.production_lines
            .iter()
            .any(|pl| pl.head() == Some(jig_id))
    }

    fn can_stack(&self, rack: usize, trailers: &[Option<JigId>], trailer: usize) -> bool {
        let Some(&Some(jig_id)) = trailers.get(trailer) else {
            return false;
        };
        let Some(jig) = self.jig_at(jig_id) else {
            return false;
        };
        self.racks
            .get(rack)
            .is_some_and(|r| r.free_space(&self.jigs) >= jig.size() as i64)
    }

    fn can_unstack(&self, rack: usize, trailers: &[Option<JigId>], trailer: usize) -> bool {
        let Some(&None) = trailers.get(trailer) else {
            return false;
        };
        self.racks.get(rack).is_some_and(|r| !r.jigs.is_empty())
    }

    fn do_unload_beluga(&mut self) {
        // Preconditions guarantee a cargo jig and an empty trailer slot.
        let slot = self
            .trailers_beluga
            .iter()
            .position(|s| s.is_none())
            .unwrap();
        let jig = self.belugas[0].incoming.pop().unwrap();
        self.trailers_beluga[slot] = Some(jig);
        if self.belugas[0].incoming.is_empty() {
            self.belugas_unloaded += 1;
            self.retire_active_beluga();
        }
    }

    fn do_load_beluga(&mut self, trailer_beluga: usize) {
        self.belugas[0].outgoing.remove(0);
        self.trailers_beluga[trailer_beluga] = None;
        self.retire_active_beluga();
    }

    fn do_deliver_to_hangar(&mut self, hangar: usize, trailer_factory: usize) {
        let jig_id = self.trailers_factory[trailer_factory].take().unwrap();
        let line = self
            .production_lines
            .iter()
            .position(|pl| pl.head() == Some(jig_id))
            .unwrap();
        self.production_lines[line].schedule.remove(0);
        self.hangars[hangar] = Some(jig_id);
        self.jigs[jig_id].empty = true;
        if self.production_lines[line].schedule.is_empty() {
            self.production_lines_finished += 1;
            self.production_lines.remove(line);
        }
    }

    /// Remove the active beluga if it has no cargo and no demand left.
    fn retire_active_beluga(&mut self) {
        if self.belugas.first().is_some_and(|b| b.is_complete()) {
            self.belugas_finished += 1;
            self.belugas.remove(0);
        }
    }
}
