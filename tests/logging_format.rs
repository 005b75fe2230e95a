// tests/logging_format.rs

use std::io;
use std::sync::{Arc, Mutex};

use filterchain::logging::DiagnosticFormat;
use tracing::{error, info, warn};

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuf {
    fn lines(&self) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn capture(f: impl FnOnce()) -> Vec<String> {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .event_format(DiagnosticFormat)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    buf.lines()
}

#[test]
fn events_are_prefixed_with_their_level() {
    let lines = capture(|| {
        info!("pdftops (PID 5) started.");
        warn!("no PPD given");
        error!("pstops (PID 6) stopped with status 1!");
    });

    assert_eq!(
        lines,
        vec![
            "INFO: pdftops (PID 5) started.",
            "WARNING: no PPD given",
            "ERROR: pstops (PID 6) stopped with status 1!",
        ]
    );
}

#[test]
fn structured_fields_follow_the_message() {
    let lines = capture(|| info!(pid = 42, "texttops (PID 42) started."));

    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("INFO: texttops (PID 42) started."), "{}", lines[0]);
    assert!(lines[0].ends_with("pid=42"), "{}", lines[0]);
}
