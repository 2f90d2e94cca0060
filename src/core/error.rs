use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use thiserror::Error;

use crate::core::PcbState;

/// Every variant is fatal to the simulation.
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("failed to create a process for job '{name}'")]
    Spawn {
        name: String,
        #[source]
        source: Errno,
    },

    #[error("process {pid} for job '{name}' did not stop before exec ({status})")]
    NotSuspended {
        name: String,
        pid: Pid,
        status: String,
    },

    #[error("tried to send {signal:?} to invalid process {pid}")]
    InvalidSignalTarget {
        pid: Pid,
        signal: Signal,
        #[source]
        source: Errno,
    },

    #[error("failed to program the preemption timer")]
    Timer(#[source] Errno),

    #[error("failed to reap exited children")]
    Reap(#[source] Errno),

    #[error("failed to install interrupt handlers")]
    Interrupts(#[source] Errno),

    #[error("argument for the workload program contains a NUL byte: {0:?}")]
    NulArgument(String),

    #[error("policy selected job '{name}' in state {state:?}, expected Waiting")]
    InvalidSwitch { name: String, state: PcbState },
}
