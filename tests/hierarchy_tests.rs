//! Integration tests driving complete machines through the public API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use strata::builder::{
    BuildError, StateBuilder, StateMachineBuilder, TopologyError, TransitionBuilder,
};
use strata::core::{TransitionEffect, TransitionKind, DAMAGE_RECEIVED, NEVER};
use strata::runtime::{EngineError, TransitionRequests};
use strata::{FrameTime, Snapshot, StateMachine};

type CallLog = Arc<Mutex<Vec<String>>>;

fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn drain(log: &CallLog) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn count(log: &CallLog, entry: &str) -> usize {
    log.lock().unwrap().iter().filter(|e| *e == entry).count()
}

fn logged(name: &str, log: &CallLog) -> StateBuilder {
    let (enter_log, exit_log) = (Arc::clone(log), Arc::clone(log));
    let (enter_entry, exit_entry) = (format!("enter {name}"), format!("exit {name}"));
    StateBuilder::new(name)
        .on_enter(move || enter_log.lock().unwrap().push(enter_entry.clone()))
        .on_exit(move || exit_log.lock().unwrap().push(exit_entry.clone()))
}

fn flag() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

fn reads(flag: &Arc<AtomicBool>) -> impl Fn() -> bool + Send + Sync + 'static {
    let flag = Arc::clone(flag);
    move || flag.load(Ordering::Relaxed)
}

/// Combat{Melee{Jab, Hook}, Ranged{Aim, Fire}}, Rest
struct Arena {
    machine: StateMachine,
    log: CallLog,
    switch_to_ranged: Arc<AtomicBool>,
    disengage: Arc<AtomicBool>,
}

fn arena() -> Arena {
    let log = call_log();
    let switch_to_ranged = flag();
    let disengage = flag();

    let machine = StateMachineBuilder::new()
        .state(logged("Combat", &log).initial())
        .state(logged("Melee", &log).parent("Combat").initial())
        .state(logged("Jab", &log).parent("Melee").initial())
        .state(logged("Hook", &log).parent("Melee"))
        .state(logged("Ranged", &log).parent("Combat"))
        .state(logged("Aim", &log).parent("Ranged").initial())
        .state(logged("Fire", &log).parent("Ranged"))
        .state(logged("Rest", &log))
        .transition(
            TransitionBuilder::new()
                .from("Combat")
                .to("Rest")
                .when(reads(&disengage)),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("Rest")
                .to("Combat")
                .after(1.0),
        )
        .unwrap()
        .transition(TransitionBuilder::new().from("Jab").to("Hook").after(1.0))
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("Hook")
                .to("Aim")
                .when(reads(&switch_to_ranged)),
        )
        .unwrap()
        .build()
        .unwrap();

    Arena {
        machine,
        log,
        switch_to_ranged,
        disengage,
    }
}

#[test]
fn first_tick_enters_default_chain_outside_in() {
    let mut arena = arena();

    let report = arena.machine.tick(FrameTime::at(0.0));

    assert!(report.started);
    assert_eq!(arena.machine.active_path(), vec!["Combat", "Melee", "Jab"]);
    assert_eq!(
        drain(&arena.log),
        vec!["enter Combat", "enter Melee", "enter Jab"]
    );
}

#[test]
fn sibling_leaves_keep_shared_ancestors_entered() {
    let mut arena = arena();
    arena.machine.tick(FrameTime::at(0.0));
    drain(&arena.log);

    arena.machine.tick(FrameTime::at(1.0));
    assert_eq!(drain(&arena.log), vec!["exit Jab", "enter Hook"]);

    arena.switch_to_ranged.store(true, Ordering::Relaxed);
    arena.machine.tick(FrameTime::at(1.5));

    assert_eq!(
        drain(&arena.log),
        vec!["exit Hook", "exit Melee", "enter Ranged", "enter Aim"]
    );
    assert_eq!(arena.machine.active_path(), vec!["Combat", "Ranged", "Aim"]);
}

#[test]
fn shared_ancestor_callback_counts() {
    let mut arena = arena();
    arena.machine.tick(FrameTime::at(0.0));
    arena.machine.tick(FrameTime::at(1.0));
    arena.switch_to_ranged.store(true, Ordering::Relaxed);
    arena.machine.tick(FrameTime::at(2.0));

    assert_eq!(count(&arena.log, "enter Combat"), 1);
    assert_eq!(count(&arena.log, "exit Combat"), 0);
    assert_eq!(count(&arena.log, "enter Melee"), 1);
    assert_eq!(count(&arena.log, "exit Melee"), 1);
    assert_eq!(count(&arena.log, "enter Hook"), 1);
    assert_eq!(count(&arena.log, "exit Hook"), 1);
}

#[test]
fn exit_runs_inside_out() {
    let mut arena = arena();
    arena.machine.tick(FrameTime::at(0.0));
    drain(&arena.log);

    arena.disengage.store(true, Ordering::Relaxed);
    arena.machine.tick(FrameTime::at(0.5));

    assert_eq!(
        drain(&arena.log),
        vec!["exit Jab", "exit Melee", "exit Combat", "enter Rest"]
    );
}

#[test]
fn composite_resumes_remembered_member() {
    let mut arena = arena();
    arena.machine.tick(FrameTime::at(0.0));
    arena.machine.tick(FrameTime::at(1.0));
    assert_eq!(arena.machine.current_state_name(), Some("Hook"));

    arena.disengage.store(true, Ordering::Relaxed);
    arena.machine.tick(FrameTime::at(1.5));
    arena.disengage.store(false, Ordering::Relaxed);
    assert_eq!(arena.machine.current_state_name(), Some("Rest"));
    assert!(arena.machine.is_state_remembered("Hook"));
    assert!(!arena.machine.is_state_remembered("Jab"));

    arena.machine.tick(FrameTime::at(2.5));

    assert_eq!(arena.machine.active_path(), vec!["Combat", "Melee", "Hook"]);
}

#[test]
fn ancestor_transition_wins_over_descendant() {
    let mut arena = arena();
    arena.machine.tick(FrameTime::at(0.0));
    drain(&arena.log);

    arena.disengage.store(true, Ordering::Relaxed);
    let report = arena.machine.tick(FrameTime::at(1.0));

    let taken = report.taken.unwrap();
    assert_eq!(taken.to, "Rest");
    assert_eq!(count(&arena.log, "enter Hook"), 0);
    assert_eq!(arena.machine.transition_last_time("Jab", "Hook"), NEVER);
}

#[test]
fn time_guard_boundary() {
    let mut arena = arena();
    arena.machine.tick(FrameTime::at(0.0));

    arena.machine.tick(FrameTime::at(0.999));
    assert_eq!(arena.machine.current_state_name(), Some("Jab"));

    arena.machine.tick(FrameTime::at(1.0));
    assert_eq!(arena.machine.current_state_name(), Some("Hook"));
}

#[test]
fn cooldown_blocks_continuously_true_guard() {
    let always = flag();
    always.store(true, Ordering::Relaxed);
    let mut machine = StateMachineBuilder::new()
        .state(StateBuilder::new("Ping").initial())
        .state("Pong")
        .transition(
            TransitionBuilder::new()
                .from("Ping")
                .to("Pong")
                .when(reads(&always))
                .cooldown(2.0),
        )
        .unwrap()
        .transition(TransitionBuilder::new().from("Pong").to("Ping").after(0.0))
        .unwrap()
        .build()
        .unwrap();

    machine.tick(FrameTime::at(0.0));
    assert_eq!(machine.current_state_name(), Some("Pong"));
    machine.tick(FrameTime::at(0.1));
    assert_eq!(machine.current_state_name(), Some("Ping"));

    for step in 1..20 {
        machine.tick(FrameTime::at(0.1 + f64::from(step) * 0.09));
        assert_eq!(machine.current_state_name(), Some("Ping"));
    }

    machine.tick(FrameTime::at(2.0));
    assert_eq!(machine.current_state_name(), Some("Pong"));
    assert_eq!(machine.transition_last_time("Ping", "Pong"), 2.0);
}

#[test]
fn damage_signal_is_consumed_once() {
    let mut machine = StateMachineBuilder::new()
        .state(StateBuilder::new("Idle").initial())
        .state("Flinch")
        .transition(
            TransitionBuilder::new()
                .from("Idle")
                .to("Flinch")
                .on_signal(DAMAGE_RECEIVED),
        )
        .unwrap()
        .transition(
            TransitionBuilder::new()
                .from("Flinch")
                .to("Idle")
                .after(0.0),
        )
        .unwrap()
        .build()
        .unwrap();
    machine.tick(FrameTime::at(0.0));

    machine.request_signal(DAMAGE_RECEIVED);
    machine.request_signal(DAMAGE_RECEIVED);
    machine.tick(FrameTime::at(0.1));
    assert_eq!(machine.current_state_name(), Some("Flinch"));

    machine.tick(FrameTime::at(0.2));
    machine.tick(FrameTime::at(0.3));
    assert_eq!(machine.current_state_name(), Some("Idle"));
    assert_eq!(machine.history().len(), 2);
}

#[test]
fn unknown_lookups_return_sentinels() {
    let mut arena = arena();
    arena.machine.tick(FrameTime::at(0.0));

    assert!(!arena.machine.is_state_active("Unknown"));
    assert!(!arena.machine.is_state_remembered("Unknown"));
    assert_eq!(arena.machine.transition_last_time("Jab", "Hook"), NEVER);
    assert_eq!(arena.machine.transition_last_time("Jab", "Unknown"), NEVER);
    assert_eq!(arena.machine.transition_last_time("Unknown", "Hook"), NEVER);
    assert!(!arena.machine.request_signal("unknown"));
}

#[test]
fn notification_fires_before_exit() {
    let log = call_log();
    let notify = Arc::clone(&log);
    let mut machine = StateMachineBuilder::new()
        .state(logged("Windup", &log).initial())
        .state(logged("Strike", &log))
        .transition(
            TransitionBuilder::new()
                .from("Windup")
                .to("Strike")
                .after(0.5)
                .on_taken(move || notify.lock().unwrap().push("taken".into())),
        )
        .unwrap()
        .build()
        .unwrap();

    machine.tick(FrameTime::at(0.0));
    drain(&log);
    machine.tick(FrameTime::at(0.5));

    assert_eq!(drain(&log), vec!["taken", "exit Windup", "enter Strike"]);
}

#[test]
fn callbacks_queue_transitions_for_the_same_tick() {
    let requests = TransitionRequests::new();
    let from_callback = requests.clone();
    let mut machine = StateMachineBuilder::new()
        .state(StateBuilder::new("Patrol").initial())
        .state(StateBuilder::new("Alarm").on_enter(move || from_callback.request("Hide")))
        .state("Hide")
        .requests(requests)
        .transition(
            TransitionBuilder::new()
                .from("Patrol")
                .to("Alarm")
                .after(1.0),
        )
        .unwrap()
        .build()
        .unwrap();

    machine.tick(FrameTime::at(0.0));
    let report = machine.tick(FrameTime::at(1.0));

    assert_eq!(report.taken.unwrap().to, "Alarm");
    assert_eq!(report.directed.len(), 1);
    assert_eq!(report.directed[0].kind, TransitionKind::Directed);
    assert_eq!(machine.current_state_name(), Some("Hide"));
    assert_eq!(machine.history().path(), vec!["Patrol", "Alarm", "Hide"]);
}

#[test]
fn directed_transition_into_active_chain_is_a_no_op() {
    let mut arena = arena();
    assert_eq!(
        arena.machine.transition_to("Melee"),
        Err(EngineError::NotStarted)
    );
    arena.machine.tick(FrameTime::at(0.0));
    drain(&arena.log);

    assert_eq!(
        arena.machine.transition_to("Melee"),
        Ok(TransitionEffect::AlreadyActive)
    );
    assert_eq!(
        arena.machine.transition_to("Fire"),
        Ok(TransitionEffect::Applied)
    );
    assert_eq!(
        drain(&arena.log),
        vec!["exit Jab", "exit Melee", "enter Ranged", "enter Fire"]
    );
    assert_eq!(
        arena.machine.transition_to("Nowhere"),
        Err(EngineError::UnknownState("Nowhere".into()))
    );
}

#[test]
fn hierarchical_transition_is_rejected_at_build_time() {
    let result = StateMachineBuilder::new()
        .state(StateBuilder::new("Combat").initial())
        .state(StateBuilder::new("Melee").parent("Combat").initial())
        .transition(
            TransitionBuilder::new()
                .from("Melee")
                .to("Combat")
                .after(1.0),
        )
        .unwrap()
        .build();

    let Err(error) = result else {
        panic!("expected a topology error");
    };
    assert!(matches!(
        error.topology_errors(),
        [TopologyError::HierarchicalTransition { .. }]
    ));
}

#[test]
fn missing_default_is_rejected_at_build_time() {
    let result = StateMachineBuilder::new()
        .state(StateBuilder::new("Combat").initial())
        .state(StateBuilder::new("Melee").parent("Combat"))
        .build();

    assert!(matches!(result, Err(BuildError::InvalidTopology(_))));
}

#[test]
fn restored_machine_continues_where_the_snapshot_left_off() {
    let mut original = arena();
    original.machine.tick(FrameTime::at(0.0));
    original.machine.tick(FrameTime::at(1.0));
    let json = original.machine.snapshot().to_json().unwrap();

    let mut copy = arena();
    copy.machine
        .restore(&Snapshot::from_json(&json).unwrap())
        .unwrap();

    assert!(drain(&copy.log).is_empty());
    assert_eq!(copy.machine.active_path(), vec!["Combat", "Melee", "Hook"]);
    assert_eq!(copy.machine.transition_last_time("Jab", "Hook"), 1.0);

    copy.switch_to_ranged.store(true, Ordering::Relaxed);
    copy.machine.tick(FrameTime::at(1.5));
    assert_eq!(
        drain(&copy.log),
        vec!["exit Hook", "exit Melee", "enter Ranged", "enter Aim"]
    );
}
