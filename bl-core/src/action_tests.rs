use crate::action::{Action, ActionKind, PARAM_ACTION_ORDER};

#[test]
fn names_round_trip_through_from_parts() {
    let actions = [
        Action::UnloadBeluga,
        Action::LoadBeluga { trailer_beluga: 2 },
        Action::GetFromHangar {
            hangar: 1,
            trailer_factory: 0,
        },
        Action::DeliverToHangar {
            hangar: 0,
            trailer_factory: 1,
        },
        Action::LeftStackRack {
            rack: 3,
            trailer_beluga: 1,
        },
        Action::RightStackRack {
            rack: 0,
            trailer_factory: 2,
        },
        Action::LeftUnstackRack {
            rack: 1,
            trailer_beluga: 0,
        },
        Action::RightUnstackRack {
            rack: 2,
            trailer_factory: 0,
        },
    ];
    for a in actions {
        let rebuilt = Action::from_parts(a.name(), &a.params());
        assert_eq!(rebuilt, Some(a));
        assert_eq!(ActionKind::parse(a.name()), Some(a.kind()));
    }
}

#[test]
fn from_parts_rejects_unknown_names_and_bad_arity() {
    assert_eq!(Action::from_parts("teleport_jig", &[]), None);
    assert_eq!(Action::from_parts("unload_beluga", &[0]), None);
    assert_eq!(Action::from_parts("load_beluga", &[]), None);
    assert_eq!(Action::from_parts("load_beluga", &[0, 1]), None);
    assert_eq!(Action::from_parts("left_stack_rack", &[0]), None);
}

#[test]
fn param_action_order_is_stable() {
    // Observable through untried-action bookkeeping; do not reorder.
    let names: Vec<&str> = PARAM_ACTION_ORDER.iter().map(|k| k.name()).collect();
    assert_eq!(
        names,
        vec![
            "left_stack_rack",
            "right_stack_rack",
            "left_unstack_rack",
            "right_unstack_rack",
            "load_beluga",
            "get_from_hangar",
            "deliver_to_hangar",
        ]
    );
}

#[test]
fn display_includes_params() {
    assert_eq!(Action::UnloadBeluga.to_string(), "unload_beluga");
    assert_eq!(
        Action::LeftStackRack {
            rack: 2,
            trailer_beluga: 0
        }
        .to_string(),
        "left_stack_rack(2, 0)"
    );
}
