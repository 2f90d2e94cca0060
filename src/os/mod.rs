pub mod interrupt;
pub mod launcher;
pub mod timer;

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::core::{ChildExit, Platform, SchedError};
pub use interrupt::SignalInterrupts;
pub use launcher::Launcher;
pub use timer::QuantumTimer;

// Shared by the scheduler and the workload program
pub const DEFAULT_TIME_UNIT_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub workload: PathBuf,
    // One quantum, and the unit workloads are measured in
    pub time_unit: Duration,
}

impl PlatformConfig {
    /// `workload` binary installed next to the running executable.
    pub fn default_workload() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join("workload")))
            .unwrap_or_else(|| PathBuf::from("workload"))
    }
}

/// Real processes and a POSIX timer.
pub struct UnixPlatform {
    launcher: Launcher,
    timer: QuantumTimer,
}

impl UnixPlatform {
    pub fn new(config: &PlatformConfig) -> Result<Self, SchedError> {
        Ok(Self {
            launcher: Launcher::new(&config.workload, config.time_unit)?,
            timer: QuantumTimer::new(config.time_unit)?,
        })
    }

    fn signal(&self, pid: Pid, sig: Signal) -> Result<(), SchedError> {
        signal::kill(pid, sig).map_err(|source| SchedError::InvalidSignalTarget {
            pid,
            signal: sig,
            source,
        })
    }
}

impl Platform for UnixPlatform {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn spawn_suspended(&mut self, name: &str, workload: u64) -> Result<Pid, SchedError> {
        self.launcher.spawn_suspended(name, workload)
    }

    fn resume(&mut self, pid: Pid) -> Result<(), SchedError> {
        self.signal(pid, Signal::SIGCONT)
    }

    fn suspend(&mut self, pid: Pid) -> Result<(), SchedError> {
        self.signal(pid, Signal::SIGSTOP)
    }

    fn kill(&mut self, pid: Pid) -> Result<(), SchedError> {
        self.signal(pid, Signal::SIGKILL)?;
        waitpid(pid, None).map_err(SchedError::Reap)?;
        Ok(())
    }

    fn reap(&mut self) -> Result<Option<ChildExit>, SchedError> {
        loop {
            match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(pid, code)) => {
                    return Ok(Some(ChildExit {
                        pid,
                        code: Some(code),
                    }))
                }
                Ok(WaitStatus::Signaled(pid, _, _)) => {
                    return Ok(Some(ChildExit { pid, code: None }))
                }
                Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => return Ok(None),
                Ok(_) | Err(Errno::EINTR) => continue,
                Err(source) => return Err(SchedError::Reap(source)),
            }
        }
    }

    fn arm_timer(&mut self) -> Result<(), SchedError> {
        self.timer.arm()
    }

    fn disarm_timer(&mut self) -> Result<(), SchedError> {
        self.timer.disarm()
    }
}
