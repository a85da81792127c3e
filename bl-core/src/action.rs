//! Action set: eight atomic transitions over the snapshot.
//!
//! Actions are a tagged enum with embedded parameters; string names exist
//! only at the serialization boundary (scenario logs, NDJSON events).

use std::fmt;

/// One of the eight transitions, with its integer parameters.
///
/// Parameter names follow the surface they index: `rack`, `hangar`,
/// `trailer_beluga` and `trailer_factory` are positions in the
/// corresponding snapshot sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    UnloadBeluga,
    LoadBeluga { trailer_beluga: usize },
    GetFromHangar { hangar: usize, trailer_factory: usize },
    DeliverToHangar { hangar: usize, trailer_factory: usize },
    LeftStackRack { rack: usize, trailer_beluga: usize },
    RightStackRack { rack: usize, trailer_factory: usize },
    LeftUnstackRack { rack: usize, trailer_beluga: usize },
    RightUnstackRack { rack: usize, trailer_factory: usize },
}

/// Parameterless discriminant of [`Action`].
///
/// Used for enumeration ("all valid parameterizations of this kind") and
/// for pinning a root node to one action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    UnloadBeluga,
    LoadBeluga,
    GetFromHangar,
    DeliverToHangar,
    LeftStackRack,
    RightStackRack,
    LeftUnstackRack,
    RightUnstackRack,
}

/// Fixed order in which parameterized kinds are enumerated by
/// `possible_actions` (after `UnloadBeluga`).
pub const PARAM_ACTION_ORDER: [ActionKind; 7] = [
    ActionKind::LeftStackRack,
    ActionKind::RightStackRack,
    ActionKind::LeftUnstackRack,
    ActionKind::RightUnstackRack,
    ActionKind::LoadBeluga,
    ActionKind::GetFromHangar,
    ActionKind::DeliverToHangar,
];

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::UnloadBeluga => "unload_beluga",
            ActionKind::LoadBeluga => "load_beluga",
            ActionKind::GetFromHangar => "get_from_hangar",
            ActionKind::DeliverToHangar => "deliver_to_hangar",
            ActionKind::LeftStackRack => "left_stack_rack",
            ActionKind::RightStackRack => "right_stack_rack",
            ActionKind::LeftUnstackRack => "left_unstack_rack",
            ActionKind::RightUnstackRack => "right_unstack_rack",
        }
    }

    pub fn parse(name: &str) -> Option<ActionKind> {
        match name {
            "unload_beluga" => Some(ActionKind::UnloadBeluga),
            "load_beluga" => Some(ActionKind::LoadBeluga),
            "get_from_hangar" => Some(ActionKind::GetFromHangar),
            "deliver_to_hangar" => Some(ActionKind::DeliverToHangar),
            "left_stack_rack" => Some(ActionKind::LeftStackRack),
            "right_stack_rack" => Some(ActionKind::RightStackRack),
            "left_unstack_rack" => Some(ActionKind::LeftUnstackRack),
            "right_unstack_rack" => Some(ActionKind::RightUnstackRack),
            _ => None,
        }
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::UnloadBeluga => ActionKind::UnloadBeluga,
            Action::LoadBeluga { .. } => ActionKind::LoadBeluga,
            Action::GetFromHangar { .. } => ActionKind::GetFromHangar,
            Action::DeliverToHangar { .. } => ActionKind::DeliverToHangar,
            Action::LeftStackRack { .. } => ActionKind::LeftStackRack,
            Action::RightStackRack { .. } => ActionKind::RightStackRack,
            Action::LeftUnstackRack { .. } => ActionKind::LeftUnstackRack,
            Action::RightUnstackRack { .. } => ActionKind::RightUnstackRack,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Integer parameters in declaration order (empty for `UnloadBeluga`).
    pub fn params(&self) -> Vec<usize> {
        match *self {
            Action::UnloadBeluga => vec![],
            Action::LoadBeluga { trailer_beluga } => vec![trailer_beluga],
            Action::GetFromHangar {
                hangar,
                trailer_factory,
            } => vec![hangar, trailer_factory],
            Action::DeliverToHangar {
                hangar,
                trailer_factory,
            } => vec![hangar, trailer_factory],
            Action::LeftStackRack {
                rack,
                trailer_beluga,
            } => vec![rack, trailer_beluga],
            Action::RightStackRack {
                rack,
                trailer_factory,
            } => vec![rack, trailer_factory],
            Action::LeftUnstackRack {
                rack,
                trailer_beluga,
            } => vec![rack, trailer_beluga],
            Action::RightUnstackRack {
                rack,
                trailer_factory,
            } => vec![rack, trailer_factory],
        }
    }

    /// Rebuild an action from its serialized `(name, params)` form.
    ///
    /// Returns `None` for unknown names or a parameter count that does not
    /// match the kind.
    pub fn from_parts(name: &str, params: &[usize]) -> Option<Action> {
        let kind = ActionKind::parse(name)?;
        match (kind, params) {
            (ActionKind::UnloadBeluga, []) => Some(Action::UnloadBeluga),
            (ActionKind::LoadBeluga, &[trailer_beluga]) => {
                Some(Action::LoadBeluga { trailer_beluga })
            }
            (ActionKind::GetFromHangar, &[hangar, trailer_factory]) => Some(Action::GetFromHangar {
                hangar,
                trailer_factory,
            }),
            (ActionKind::DeliverToHangar, &[hangar, trailer_factory]) => {
                Some(Action::DeliverToHangar {
                    hangar,
                    trailer_factory,
                })
            }
            (ActionKind::LeftStackRack, &[rack, trailer_beluga]) => Some(Action::LeftStackRack {
                rack,
                trailer_beluga,
            }),
            (ActionKind::RightStackRack, &[rack, trailer_factory]) => Some(Action::RightStackRack {
                rack,
                trailer_factory,
            }),
            (ActionKind::LeftUnstackRack, &[rack, trailer_beluga]) => {
                Some(Action::LeftUnstackRack {
                    rack,
                    trailer_beluga,
                })
            }
            (ActionKind::RightUnstackRack, &[rack, trailer_factory]) => {
                Some(Action::RightUnstackRack {
                    rack,
                    trailer_factory,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        if params.is_empty() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}(", self.name())?;
            for (i, p) in params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{p}")?;
            }
            write!(f, ")")
        }
    }
}
