//! Lifecycle properties observed through the public dispatcher API.

mod common;

use common::Harness;
use rslua_script::{SessionState, STATUS_LOADED};
use rslua_station::{Severity, SignalKind, SimulationState};

#[test]
fn at_most_one_interpreter_per_device() {
    let mut h = Harness::new();
    let a = h.device_with_script("A", "x = 1");
    h.device_with_script("B", "x = 2");

    for _ in 0..3 {
        h.dispatcher.on_script_path_changed(&a);
    }

    assert_eq!(h.dispatcher.live_interpreters(), 2);
}

#[test]
fn unreadable_path_never_creates_interpreter() {
    let mut h = Harness::new();
    let device = h.station.add_device("A");
    device.set_script_path(h.dir.path().join("missing.lua").to_string_lossy());

    h.dispatcher.on_script_path_changed(&device);

    assert_eq!(h.dispatcher.live_interpreters(), 0);
    assert!(device.script_path().is_empty());
    assert!(h.log.contains(Severity::Error, "can't open file"));
}

#[test]
fn runtime_error_clears_path_and_reports() {
    let mut h = Harness::new();
    let device = h.device_with_script("A", r#"error("top level failure")"#);

    assert!(device.script_path().is_empty());
    assert_eq!(
        h.dispatcher.session_state(device.id()),
        Some(SessionState::Error)
    );
    assert!(h.log.contains(Severity::Error, "error when running main"));
}

#[test]
fn step_only_script_ignores_io_changes() {
    let mut h = Harness::new();
    let device = h.device_with_script(
        "A",
        r#"
        add_signal("Start", "digitalinput")
        function on_simulation_step() end
        "#,
    );
    let errors_before = h.log.messages().len();

    device.with_signals(|s| s.set_value("Start", 1.0));
    h.dispatcher.on_io_signal_changed(&device, "Start");

    assert!(h.log.messages_since(errors_before).is_empty());
}

#[test]
fn duplicate_add_signal_yields_one_signal() {
    let mut h = Harness::new();
    let device = h.device_with_script(
        "A",
        r#"
        add_signal("X", "digitalinput")
        add_signal("X", "digitalinput")
        "#,
    );

    let signals = device.signals();
    assert_eq!(signals.iter().filter(|s| s.name == "X").count(), 1);
    assert_eq!(signals.get("X").map(|s| s.kind), Some(SignalKind::DigitalInput));
}

#[test]
fn simulation_time_before_and_after_first_step() {
    let mut h = Harness::new();
    h.clock.advance_to(500.0);
    h.clock.set_state(SimulationState::Running);
    let device = h.device_with_script(
        "A",
        r#"
        local t_local, t_global, state = get_last_simulation_time()
        set_status(string.format("%d/%d/%d", t_local, t_global, state))
        function on_simulation_step()
            local t_local = get_last_simulation_time()
            add_log(string.format("local=%d", t_local))
        end
        "#,
    );
    assert!(h.log.contains(Severity::Information, "set status of A to -1/500/1"));
    assert_eq!(device.status(), STATUS_LOADED);

    h.step(524.0);

    assert!(h.log.contains(Severity::Information, "A:local=524"));
}

#[test]
fn set_signal_coercion() {
    let mut h = Harness::new();
    let device = h.device_with_script(
        "A",
        r#"
        add_signal("DO", "DigitalOutput")
        add_signal("GI", "DigitalGroupInput")
        function on_simulation_step()
            set_signal("DO", 5)
            set_signal("GI", 3.7)
        end
        "#,
    );

    h.step(12.0);
    assert_eq!(device.signal_value("DO"), Some(1.0));
    assert_eq!(device.signal_value("GI"), Some(3.0));
}

#[test]
fn fixing_the_script_recovers_after_error() {
    let mut h = Harness::new();
    let device = h.device_with_script("A", "function (");
    assert_eq!(
        h.dispatcher.session_state(device.id()),
        Some(SessionState::Error)
    );

    device.set_script_path(h.script("fixed.lua", "x = 1"));
    h.dispatcher.on_script_path_changed(&device);

    assert_eq!(
        h.dispatcher.session_state(device.id()),
        Some(SessionState::Ready)
    );
    assert_eq!(device.status(), STATUS_LOADED);
}
