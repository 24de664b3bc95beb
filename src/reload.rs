//! Development-mode auto-reload.
//!
//! Rust has no source to re-import at runtime, so "reload on change" means
//! watching the server executable: once it is rebuilt, the running server
//! shuts down gracefully and `main` starts the new binary in its place.
//!
//! The executable path is captured once at startup. After a rebuild has
//! replaced the file, `/proc/self/exe` names the deleted inode, so asking
//! for the current executable again would no longer find it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::error::AppError;

/// How often watched files are polled.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Modification time and length of a file; `None` when it doesn't exist.
type Fingerprint = Option<(SystemTime, u64)>;

fn fingerprint(path: &Path) -> Fingerprint {
    let meta = std::fs::metadata(path).ok()?;
    Some((meta.modified().ok()?, meta.len()))
}

/// Polls a set of files and reports the first change.
#[derive(Debug, Clone)]
pub struct ReloadWatcher {
    paths: Vec<PathBuf>,
    baseline: Vec<Fingerprint>,
    interval: Duration,
}

impl ReloadWatcher {
    /// Watch `paths`, comparing against their state right now.
    pub fn new(paths: Vec<PathBuf>, interval: Duration) -> Self {
        let baseline = paths.iter().map(|p| fingerprint(p)).collect();
        Self {
            paths,
            baseline,
            interval,
        }
    }

    /// Watch the currently running executable.
    pub fn for_current_exe() -> Result<Self, AppError> {
        let exe = std::env::current_exe().map_err(AppError::Reload)?;
        Ok(Self::new(vec![exe], DEFAULT_POLL_INTERVAL))
    }

    /// Files being watched.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Whether any watched file differs from the baseline.
    pub fn has_changed(&self) -> bool {
        self.paths
            .iter()
            .zip(&self.baseline)
            .any(|(path, before)| fingerprint(path) != *before)
    }

    /// Resolves once a watched file changes.
    pub async fn changed(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if self.has_changed() {
                info!(paths = ?self.paths, "watched files changed");
                return;
            }
        }
    }
}

/// How to start the server again: the executable path and arguments it was
/// launched with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restart {
    exe: PathBuf,
    args: Vec<OsString>,
}

impl Restart {
    /// Restart `exe` with `args`.
    pub fn new(exe: PathBuf, args: Vec<OsString>) -> Self {
        Self { exe, args }
    }

    /// Capture the running executable and its arguments.
    ///
    /// Call this before serving, while the path still names the live binary.
    pub fn capture() -> Result<Self, AppError> {
        let exe = std::env::current_exe().map_err(AppError::Reload)?;
        Ok(Self::new(exe, std::env::args_os().skip(1).collect()))
    }

    /// Path of the executable to start.
    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Arguments passed to the new process.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// A watcher for rebuilds of this executable.
    pub fn watcher(&self) -> ReloadWatcher {
        ReloadWatcher::new(vec![self.exe.clone()], DEFAULT_POLL_INTERVAL)
    }

    /// Command that starts the executable with the captured arguments.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.exe);
        command.args(&self.args);
        command
    }

    /// Replace this process with the rebuilt executable.
    ///
    /// Only returns if the new image could not be started.
    #[cfg(unix)]
    pub async fn run(self) -> Result<i32, AppError> {
        use std::os::unix::process::CommandExt;

        debug!(exe = %self.exe.display(), "exec");
        Err(AppError::Reload(self.command().exec()))
    }

    /// Run the rebuilt executable as a child and wait for it.
    ///
    /// Ctrl-C is forwarded by killing the child. Returns its exit code.
    #[cfg(not(unix))]
    pub async fn run(self) -> Result<i32, AppError> {
        debug!(exe = %self.exe.display(), "spawning");
        let mut child = tokio::process::Command::from(self.command())
            .kill_on_drop(true)
            .spawn()
            .map_err(AppError::Reload)?;

        tokio::select! {
            status = child.wait() => Ok(status.map_err(AppError::Reload)?.code().unwrap_or(1)),
            _ = crate::utils::shutdown_signal() => {
                child.kill().await.map_err(AppError::Reload)?;
                Ok(1)
            }
        }
    }
}
