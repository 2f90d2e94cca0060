use nix::sys::signal::{SigEvent, SigevNotify, Signal};
use nix::sys::time::TimeSpec;
use nix::sys::timer::{Expiration, Timer, TimerSetTimeFlags};
use nix::time::ClockId;
use std::time::Duration;

use crate::core::SchedError;

/// One-shot POSIX timer that raises SIGALRM one quantum after being armed.
pub struct QuantumTimer {
    timer: Timer,
    quantum: Duration,
}

impl QuantumTimer {
    pub fn new(quantum: Duration) -> Result<Self, SchedError> {
        let event = SigEvent::new(SigevNotify::SigevSignal {
            signal: Signal::SIGALRM,
            si_value: 0,
        });
        let timer = Timer::new(ClockId::CLOCK_MONOTONIC, event).map_err(SchedError::Timer)?;
        Ok(Self { timer, quantum })
    }

    // Re-arming replaces any pending expiry
    pub fn arm(&mut self) -> Result<(), SchedError> {
        self.set(TimeSpec::from(self.quantum))
    }

    pub fn disarm(&mut self) -> Result<(), SchedError> {
        self.set(TimeSpec::new(0, 0))
    }

    fn set(&mut self, value: TimeSpec) -> Result<(), SchedError> {
        self.timer
            .set(Expiration::OneShot(value), TimerSetTimeFlags::empty())
            .map_err(SchedError::Timer)
    }
}
