pub mod builders;
pub mod fake_launcher;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use tempfile::TempDir;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Write an executable `/bin/sh` script named `name` into `dir`.
pub fn write_script(dir: &Path, name: &str, body: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Shell filters shared by every real-process test in a test binary.
///
/// Scripts are written exactly once, before any test in the binary gets to
/// spawn anything: writing an executable while another thread forks can make
/// the later exec fail with "text file busy".
///
/// Filter argv is `$1=job $2=user $3=title $4=copies
/// $5=options [$6=file]`.
pub struct FilterFixture {
    dir: TempDir,
}

impl FilterFixture {
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn filter_fixture() -> &'static FilterFixture {
    static FIXTURE: OnceLock<FilterFixture> = OnceLock::new();

    FIXTURE.get_or_init(|| {
        let dir = tempfile::tempdir().expect("create fixture dir");
        let scripts: &[(&str, &str)] = &[
            // Copy input (file for stage 0, stdin otherwise) to stdout.
            ("passthru", r#"if [ $# -ge 6 ]; then exec cat "$6"; else exec cat; fi"#),
            // Upper-case the input.
            ("upper", r#"if [ $# -ge 6 ]; then tr a-z A-Z < "$6"; else tr a-z A-Z; fi"#),
            // Prefix every line with '> '.
            ("quote", r#"if [ $# -ge 6 ]; then sed 's/^/> /' "$6"; else sed 's/^/> /'; fi"#),
            // Print argc and each argument on its own line. argv[0] is not
            // visible: the kernel replaces it when running the shebang.
            ("args", r#"echo "$#"; for a in "$@"; do echo "$a"; done"#),
            // Print the environment, sorted.
            ("env", "env | sort"),
            // Describe descriptors 3 and 4 (Linux /proc).
            (
                "fds",
                r#"for fd in 3 4; do echo "$fd $(readlink /proc/$$/fd/$fd) $(grep '^flags' /proc/$$/fdinfo/$fd | awk '{print $2}')"; done"#,
            ),
            ("fail3", "exit 3"),
            ("selfkill", "kill -9 $$"),
            // Swallow input then fail.
            ("drain_fail", "cat > /dev/null; exit 7"),
            // Exit with the number of stdin bytes, or 100 if stdout is not
            // /dev/null (Linux /proc).
            (
                "count",
                r#"[ "$(readlink /proc/$$/fd/1)" = /dev/null ] || exit 100; exit "$(wc -c | tr -d ' ')""#,
            ),
        ];

        for (name, body) in scripts {
            write_script(dir.path(), name, body).expect("write fixture script");
        }

        // Present but not executable.
        let noexec = dir.path().join("noexec");
        fs::write(&noexec, "#!/bin/sh\nexit 0\n").expect("write noexec");
        fs::set_permissions(&noexec, fs::Permissions::from_mode(0o644)).expect("chmod noexec");

        FilterFixture { dir }
    })
}
