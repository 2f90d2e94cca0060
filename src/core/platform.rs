use nix::unistd::Pid;
use std::time::Instant;

use crate::core::{PendingInterrupts, SchedError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    pub pid: Pid,
    // None when killed by a signal
    pub code: Option<i32>,
}

/// OS-facing operations the scheduler engine needs. The engine never
/// touches processes or timers except through this trait.
pub trait Platform {
    fn now(&self) -> Instant;

    /// Creates the job's process stopped before it runs any workload code.
    fn spawn_suspended(&mut self, name: &str, workload: u64) -> Result<Pid, SchedError>;

    fn resume(&mut self, pid: Pid) -> Result<(), SchedError>;

    fn suspend(&mut self, pid: Pid) -> Result<(), SchedError>;

    /// Forcefully ends a process and collects it. Only used when tearing
    /// down after a fatal error.
    fn kill(&mut self, pid: Pid) -> Result<(), SchedError>;

    /// Collects one exited child without blocking.
    fn reap(&mut self) -> Result<Option<ChildExit>, SchedError>;

    /// Fires a timer interrupt after one time unit.
    fn arm_timer(&mut self) -> Result<(), SchedError>;

    fn disarm_timer(&mut self) -> Result<(), SchedError>;
}

/// Blocks the control thread until at least one interrupt is pending.
pub trait InterruptSource {
    fn wait(&mut self) -> PendingInterrupts;
}
