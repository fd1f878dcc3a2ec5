//! Process-exit cleanup for the shared embedded PostgreSQL cluster.
//!
//! `shared_cluster_handle()` in `pg-embed-setup-unpriv` leaks its guard so the
//! cluster lives for the whole test binary. Under `nextest` every binary is
//! its own process and a postmaster left running blocks the next binary from
//! starting on the same data directory, so an `atexit` hook stops it.

#[cfg(unix)]
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::sync::OnceLock;
#[cfg(unix)]
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use pg_embedded_setup_unpriv::{BootstrapResult, ClusterHandle};

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);
const STABLE_PASSWORD: &str = "orders_embedded_test";

#[cfg(unix)]
static PG_POSTMASTER_PID: AtomicI32 = AtomicI32::new(0);
#[cfg(unix)]
static PG_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Shared cluster handle with retries and exit-time shutdown registered.
///
/// ```rust,ignore
/// let cluster = shared_cluster_handle().expect("embedded cluster");
/// let database = provision_template_database(cluster).expect("database");
/// ```
pub fn shared_cluster_handle() -> BootstrapResult<&'static ClusterHandle> {
    ensure_stable_password();
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => {
                #[cfg(unix)]
                register_process_exit_cleanup(handle);
                return Ok(handle);
            }
            Err(error) => {
                if attempt >= SHARED_CLUSTER_RETRIES {
                    return Err(error);
                }
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Pin `PG_PASSWORD` so a reused data directory keeps accepting logins; the
/// library otherwise generates a fresh password per process.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns threads and the
        // shared handle serialises callers.
        unsafe {
            std::env::set_var("PG_PASSWORD", STABLE_PASSWORD);
        }
    }
}

#[cfg(unix)]
fn read_postmaster_pid(data_dir: &Path) -> Option<i32> {
    let content = std::fs::read_to_string(data_dir.join("postmaster.pid")).ok()?;
    content.lines().next()?.trim().parse().ok()
}

#[cfg(unix)]
extern "C" fn stop_postgres_on_exit() {
    let stored_pid = PG_POSTMASTER_PID.load(Ordering::Relaxed);
    if stored_pid <= 0 {
        return;
    }

    // Guard against PID reuse.
    let pid = match PG_DATA_DIR.get().and_then(|dir| read_postmaster_pid(dir)) {
        Some(current) if current == stored_pid => current,
        _ => return,
    };

    // SAFETY: `pid` matches the on-disk postmaster.pid; SIGTERM requests a
    // smart shutdown.
    if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
        return;
    }

    for _ in 0..50 {
        std::thread::sleep(Duration::from_millis(100));
        // SAFETY: signal 0 only probes liveness.
        if unsafe { libc::kill(pid, 0) } != 0 {
            return;
        }
    }

    // SAFETY: same validated pid; graceful shutdown budget exhausted.
    unsafe {
        libc::kill(pid, libc::SIGKILL);
    }
}

#[cfg(unix)]
fn register_process_exit_cleanup(handle: &ClusterHandle) {
    let data_dir = &handle.settings().data_dir;
    let Some(pid) = read_postmaster_pid(data_dir) else {
        return;
    };

    if PG_POSTMASTER_PID
        .compare_exchange(0, pid, Ordering::Relaxed, Ordering::Relaxed)
        .is_err()
    {
        return;
    }
    let _ = PG_DATA_DIR.set(data_dir.clone());

    // SAFETY: `stop_postgres_on_exit` is a plain `extern "C"` function.
    let rc = unsafe { libc::atexit(stop_postgres_on_exit) };
    if rc != 0 {
        eprintln!("pg-embed: atexit registration failed (rc={rc}); postmaster {pid} may outlive the tests");
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for exit cleanup helpers.

    #[cfg(unix)]
    #[test]
    fn read_postmaster_pid_parses_first_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("postmaster.pid"), "12345\n/data\n5432\n")
            .expect("write pid file");
        assert_eq!(super::read_postmaster_pid(dir.path()), Some(12345));
    }

    #[cfg(unix)]
    #[test]
    fn read_postmaster_pid_rejects_missing_or_garbled_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(super::read_postmaster_pid(dir.path()), None);

        std::fs::write(dir.path().join("postmaster.pid"), "not-a-pid\n").expect("write pid file");
        assert_eq!(super::read_postmaster_pid(dir.path()), None);
    }

    #[test]
    fn ensure_stable_password_keeps_existing_value() {
        let _guard = env_lock::lock_env([("PG_PASSWORD", Some("custom_value"))]);
        super::ensure_stable_password();
        assert_eq!(
            std::env::var("PG_PASSWORD").expect("PG_PASSWORD should be set"),
            "custom_value"
        );
    }
}
