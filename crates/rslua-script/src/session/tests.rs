use super::*;
use crate::test_support::fixture;

#[test]
fn new_session_is_unloaded() {
    let session = InterpreterSession::new(DeviceId::from_raw("dev"));
    assert_eq!(session.state(), SessionState::Unloaded);
    assert!(!session.is_live());
}

#[test]
fn load_source_runs_top_level() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());

    session
        .load_source(r#"set_status("booted")"#, &fx.env)
        .expect("script should load");

    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.is_live());
    assert_eq!(fx.device.status(), "booted");
}

#[test]
fn empty_path_leaves_session_unloaded() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session.load_source("x = 1", &fx.env).expect("load");

    session.load("", &fx.env).expect("empty path is not an error");

    assert_eq!(session.state(), SessionState::Unloaded);
    assert!(!session.is_live());
}

#[test]
fn missing_file_is_a_file_access_error() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());

    let err = session
        .load("/definitely/not/here.lua", &fx.env)
        .expect_err("missing file");

    assert!(matches!(err, ScriptError::FileAccess { .. }));
    assert!(err.clears_path());
    assert_eq!(session.state(), SessionState::Error);
    assert!(!session.is_live());
}

#[test]
fn blank_path_is_not_treated_as_empty() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());

    let err = session.load("   ", &fx.env).expect_err("blank path");

    assert!(matches!(err, ScriptError::FileAccess { .. }));
    assert_eq!(session.state(), SessionState::Error);
    assert!(!session.is_live());
}

#[test]
fn load_reads_script_from_disk() {
    let fx = fixture();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gripper.lua");
    std::fs::write(&path, r#"set_status("from disk")"#).expect("write script");

    let mut session = InterpreterSession::new(fx.device.id().clone());
    session
        .load(&path.to_string_lossy(), &fx.env)
        .expect("load from disk");

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(fx.device.status(), "from disk");
}

#[test]
fn compile_error_enters_error_state() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());

    let err = session
        .load_source("function broken(", &fx.env)
        .expect_err("syntax error");

    assert!(matches!(err, ScriptError::Compile(_)));
    assert!(err.to_string().starts_with("error when loading file:"));
    assert_eq!(session.state(), SessionState::Error);
    assert!(!session.is_live());
}

#[test]
fn runtime_error_enters_error_state() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());

    let err = session
        .load_source(r#"error("boom")"#, &fx.env)
        .expect_err("runtime error");

    assert!(matches!(err, ScriptError::Runtime(_)));
    assert!(err.to_string().contains("boom"));
    assert_eq!(session.state(), SessionState::Error);
}

#[test]
fn failed_reload_drops_previous_interpreter() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session
        .load_source("function on_simulation_step() end", &fx.env)
        .expect("first load");

    let _ = session.load_source("this is not lua", &fx.env);

    assert!(!session.is_live());
    assert_eq!(
        session.call_entry_point("on_simulation_step", ()),
        EntryOutcome::NotReady
    );
}

#[test]
fn entry_point_is_called_with_arguments() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session
        .load_source(
            r#"
            function on_io_signal_value_changed(name)
                set_status("changed " .. name)
            end
            "#,
            &fx.env,
        )
        .expect("load");

    let outcome = session.call_entry_point("on_io_signal_value_changed", "Close".to_string());

    assert_eq!(outcome, EntryOutcome::Completed);
    assert_eq!(fx.device.status(), "changed Close");
}

#[test]
fn missing_entry_point_is_reported() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session.load_source("x = 1", &fx.env).expect("load");

    assert_eq!(
        session.call_entry_point("on_simulation_step", ()),
        EntryOutcome::Missing
    );
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn failing_entry_point_keeps_session_ready() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session
        .load_source(r#"function on_simulation_step() error("bad step") end"#, &fx.env)
        .expect("load");

    let outcome = session.call_entry_point("on_simulation_step", ());

    assert!(matches!(outcome, EntryOutcome::Failed(ref m) if m.contains("bad step")));
    assert_eq!(session.state(), SessionState::Ready);
    assert!(session.is_live());
}

#[test]
fn non_nil_return_counts_as_failure() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session
        .load_source(r#"function on_simulation_step() return "oops" end"#, &fx.env)
        .expect("load");

    assert_eq!(
        session.call_entry_point("on_simulation_step", ()),
        EntryOutcome::Failed("oops".to_string())
    );
}

#[test]
fn entry_points_defined_later_are_found() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session
        .load_source(
            r#"
            function on_io_signal_value_changed(name)
                function on_simulation_step() set_status("late") end
            end
            "#,
            &fx.env,
        )
        .expect("load");

    assert_eq!(
        session.call_entry_point("on_simulation_step", ()),
        EntryOutcome::Missing
    );
    session.call_entry_point("on_io_signal_value_changed", "LoadFile".to_string());
    assert_eq!(
        session.call_entry_point("on_simulation_step", ()),
        EntryOutcome::Completed
    );
    assert_eq!(fx.device.status(), "late");
}

#[test]
fn reload_starts_from_fresh_globals() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session
        .load_source("function on_simulation_step() end", &fx.env)
        .expect("first load");
    session.load_source("x = 1", &fx.env).expect("second load");

    assert_eq!(
        session.call_entry_point("on_simulation_step", ()),
        EntryOutcome::Missing
    );
}

#[test]
fn removed_device_closes_session_on_next_bridge_call() {
    let fx = fixture();
    let mut session = InterpreterSession::new(fx.device.id().clone());
    session
        .load_source(r#"function on_simulation_step() set_status("tick") end"#, &fx.env)
        .expect("load");

    fx.station.remove_object("Gripper");
    let outcome = session.call_entry_point("on_simulation_step", ());

    assert_eq!(outcome, EntryOutcome::Closed);
    assert_eq!(session.state(), SessionState::Closed);
    assert!(!session.is_live());
    assert_eq!(
        session.call_entry_point("on_simulation_step", ()),
        EntryOutcome::NotReady
    );
}

#[test]
fn unresolvable_device_during_load_closes_session() {
    let fx = fixture();
    let mut session = InterpreterSession::new(DeviceId::from_raw("never-registered"));

    let err = session
        .load_source(r#"add_log("hello")"#, &fx.env)
        .expect_err("device cannot resolve");

    assert!(matches!(err, ScriptError::UnknownDevice(_)));
    assert!(!err.is_recoverable());
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn close_request_wins_over_failing_top_level() {
    let fx = fixture();
    let mut session = InterpreterSession::new(DeviceId::from_raw("never-registered"));

    let err = session
        .load_source(r#"add_log("hi"); error("boom")"#, &fx.env)
        .expect_err("device cannot resolve");

    assert!(matches!(err, ScriptError::UnknownDevice(_)));
    assert!(!err.clears_path());
    assert_eq!(session.state(), SessionState::Closed);
    assert!(!session.is_live());
}
