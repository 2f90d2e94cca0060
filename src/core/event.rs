use nix::unistd::Pid;

use crate::core::{PcbId, PcbState, Quantum};

/// Which interrupts are waiting to be serviced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PendingInterrupts {
    pub child_exit: bool,
    pub timer: bool,
}

impl PendingInterrupts {
    pub const NONE: Self = Self {
        child_exit: false,
        timer: false,
    };

    // The first pass of the driver loop behaves like an expired timer
    pub const STARTUP: Self = Self {
        child_exit: false,
        timer: true,
    };

    pub fn any(&self) -> bool {
        self.child_exit || self.timer
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedEvent {
    TimerExpired {
        quantum: Quantum,
    },
    Arrived {
        pcb: PcbId,
        pid: Pid,
    },
    StateChange {
        pcb: PcbId,
        from: PcbState,
        to: PcbState,
    },
    Dispatched {
        pcb: PcbId,
        quantum: Quantum,
    },
    Exited {
        pcb: PcbId,
        code: Option<i32>,
    },
    // Nothing to run but arrivals are still due
    Idle {
        quantum: Quantum,
    },
}
