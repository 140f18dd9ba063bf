//! Resource limits applied to the evaluated process

use serde::{Deserialize, Serialize};
use tokio::process::Command;

/// Per-process rlimits set in the child before it execs the interpreter.
/// `None` leaves the inherited limit in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Address space limit in bytes (RLIMIT_AS)
    #[serde(default)]
    pub max_memory_bytes: Option<u64>,

    /// CPU time limit in seconds (RLIMIT_CPU)
    #[serde(default)]
    pub max_cpu_seconds: Option<u64>,

    /// Open file descriptor limit (RLIMIT_NOFILE)
    #[serde(default)]
    pub max_open_files: Option<u64>,

    /// Largest file the process may write, in bytes (RLIMIT_FSIZE)
    #[serde(default)]
    pub max_file_size_bytes: Option<u64>,
}

impl ResourceLimits {
    /// Limits suited to small exercise solutions
    pub fn hardened() -> Self {
        Self {
            max_memory_bytes: Some(512 * 1024 * 1024),
            max_cpu_seconds: Some(30),
            max_open_files: Some(64),
            max_file_size_bytes: Some(16 * 1024 * 1024),
        }
    }

    /// Check whether any limit is set
    pub fn is_unlimited(&self) -> bool {
        *self == Self::default()
    }
}

/// Put the child in its own process group and apply `limits`
#[cfg(unix)]
pub(super) fn apply_unix_limits(cmd: &mut Command, limits: &ResourceLimits) {
    let limits = *limits;

    // SAFETY: pre_exec runs between fork() and exec() in the child process.
    // The closure only calls async-signal-safe libc functions (setpgid,
    // setrlimit) on Copy values moved into it. The parent is not affected.
    unsafe {
        cmd.pre_exec(move || {
            if libc::setpgid(0, 0) != 0 {
                return Err(std::io::Error::last_os_error());
            }

            let pairs = [
                (libc::RLIMIT_AS, limits.max_memory_bytes),
                (libc::RLIMIT_CPU, limits.max_cpu_seconds),
                (libc::RLIMIT_NOFILE, limits.max_open_files),
                (libc::RLIMIT_FSIZE, limits.max_file_size_bytes),
            ];
            for (resource, value) in pairs {
                if let Some(value) = value {
                    // Raising the hard limit needs privileges; never ask for more than it
                    let mut current = libc::rlimit {
                        rlim_cur: 0,
                        rlim_max: 0,
                    };
                    let mut value = value as libc::rlim_t;
                    if libc::getrlimit(resource, &mut current) == 0 {
                        value = value.min(current.rlim_max);
                    }
                    let limit = libc::rlimit {
                        rlim_cur: value,
                        rlim_max: value,
                    };
                    if libc::setrlimit(resource, &limit) != 0 {
                        return Err(std::io::Error::last_os_error());
                    }
                }
            }

            Ok(())
        });
    }
}

/// No-op for non-Unix platforms
#[cfg(not(unix))]
pub(super) fn apply_unix_limits(_cmd: &mut Command, _limits: &ResourceLimits) {}
