// src/engine/reaper.rs

//! Async side of reaping: one watcher task per child feeding a single
//! drain loop.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::tracker::ProcessTracker;
use crate::engine::{ChildExit, RunReport};
use crate::exec::LaunchedChild;

/// Await `child` on its own task and report its exit on `tx`.
pub fn watch_child(child: LaunchedChild, tx: mpsc::Sender<ChildExit>) -> JoinHandle<()> {
    let LaunchedChild { id, exit } = child;

    tokio::spawn(async move {
        let status = exit.await;
        if tx.send(ChildExit { id, status }).await.is_err() {
            debug!(pid = id, "reaper gone before child exit was delivered");
        }
    })
}

/// Receive exits until every tracked child has been reaped.
///
/// There is no timeout: a filter that never exits blocks here. If every
/// sender is dropped while children are still tracked, the run is marked
/// failed and the loop ends.
pub async fn drain(
    tracker: &mut ProcessTracker,
    rx: &mut mpsc::Receiver<ChildExit>,
    report: &mut RunReport,
) {
    while !tracker.is_empty() {
        let Some(exit) = rx.recv().await else {
            warn!(
                remaining = tracker.len(),
                "child watchers went away before every filter was reaped"
            );
            tracker.mark_failed();
            report.push_diagnostic(format!(
                "{} filter(s) were never reaped",
                tracker.len()
            ));
            break;
        };

        let pid = exit.id;
        let Some(stage) = tracker.complete(exit) else {
            debug!(pid, "ignoring exit of untracked child");
            continue;
        };

        let line = stage.to_string();
        if stage.is_success() {
            info!(filter = %stage.filter, pid, "{line}");
        } else {
            error!(filter = %stage.filter, pid, state = ?stage.state, "{line}");
        }

        report.push_stage(stage);
    }
}
