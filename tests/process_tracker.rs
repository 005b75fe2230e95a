// tests/process_tracker.rs

use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use filterchain::engine::{ChildExit, ChildState, ProcessTracker};
use filterchain::types::FilterSpec;

fn exit_code(id: u32, code: i32) -> ChildExit {
    ChildExit {
        id,
        status: Ok(ExitStatus::from_raw(code << 8)),
    }
}

fn killed(id: u32, signal: i32) -> ChildExit {
    ChildExit {
        id,
        status: Ok(ExitStatus::from_raw(signal)),
    }
}

fn tracker_with(stages: &[(u32, &str)]) -> ProcessTracker {
    let mut tracker = ProcessTracker::new();
    for (id, program) in stages {
        tracker.register(*id, FilterSpec::new(*program));
    }
    tracker
}

#[test]
fn all_zero_exits_succeed() {
    let mut tracker = tracker_with(&[(10, "a"), (11, "b")]);
    assert_eq!(tracker.len(), 2);
    assert_eq!(tracker.get(10).map(|c| c.state), Some(ChildState::Running));

    let first = tracker.complete(exit_code(11, 0)).unwrap();
    assert_eq!(first.filter.program, "b");
    assert_eq!(first.to_string(), "b (PID 11) exited with no errors.");

    tracker.complete(exit_code(10, 0)).unwrap();

    assert!(tracker.is_empty());
    assert!(!tracker.failed());
    assert_eq!(tracker.reaped(), 2);
}

#[test]
fn nonzero_exit_fails_the_run() {
    let mut tracker = tracker_with(&[(10, "pdftops")]);

    let report = tracker.complete(exit_code(10, 3)).unwrap();
    assert_eq!(report.state, ChildState::Exited(3));
    assert!(!report.is_success());
    assert_eq!(report.to_string(), "pdftops (PID 10) stopped with status 3!");
    assert!(tracker.failed());
}

#[test]
fn signal_is_classified_as_crash() {
    let mut tracker = tracker_with(&[(7, "pstoraster")]);

    let report = tracker.complete(killed(7, 9)).unwrap();
    assert_eq!(report.state, ChildState::Signaled(9));
    assert_eq!(report.to_string(), "pstoraster (PID 7) crashed on signal 9!");
    assert!(tracker.failed());
}

#[test]
fn wait_error_is_lost_and_fails() {
    let mut tracker = tracker_with(&[(5, "texttops")]);

    let report = tracker
        .complete(ChildExit {
            id: 5,
            status: Err(io::Error::other("no child processes")),
        })
        .unwrap();

    assert_eq!(report.state, ChildState::Lost);
    assert_eq!(report.detail.as_deref(), Some("no child processes"));
    assert!(report.to_string().contains("could not be waited for"));
    assert!(tracker.failed());
}

#[test]
fn unknown_pid_is_ignored() {
    let mut tracker = tracker_with(&[(1, "a")]);

    assert!(tracker.complete(exit_code(99, 1)).is_none());
    assert!(tracker.get(1).is_some());
    assert!(!tracker.failed());
    assert_eq!(tracker.reaped(), 0);
}

#[test]
fn failure_flag_is_sticky() {
    let mut tracker = tracker_with(&[(1, "a"), (2, "b")]);

    tracker.complete(exit_code(1, 1)).unwrap();
    tracker.complete(exit_code(2, 0)).unwrap();
    assert!(tracker.failed());

    let mut tracker = tracker_with(&[(3, "c")]);
    tracker.mark_failed();
    tracker.complete(exit_code(3, 0)).unwrap();
    assert!(tracker.failed());
}

#[test]
fn completion_order_does_not_matter() {
    let ids = [21, 22, 23];
    for order in [[21, 22, 23], [23, 22, 21], [22, 21, 23]] {
        let mut tracker = tracker_with(&[(ids[0], "a"), (ids[1], "b"), (ids[2], "c")]);
        for id in order {
            assert!(tracker.complete(exit_code(id, 0)).is_some());
        }
        assert!(tracker.is_empty());
        assert!(!tracker.failed());
    }
}
