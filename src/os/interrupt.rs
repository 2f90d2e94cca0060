//! Signal-driven interrupt delivery.
//!
//! The handlers only flip an atomic flag. SIGALRM and SIGCHLD stay blocked
//! while the control thread works, and are let through only inside
//! `sigsuspend`, so a notification can neither interrupt a state update nor
//! slip in between the flag check and going to sleep.

use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::{InterruptSource, PendingInterrupts, SchedError};

static TIMER_FIRED: AtomicBool = AtomicBool::new(false);
static CHILD_CHANGED: AtomicBool = AtomicBool::new(false);

extern "C" fn record_interrupt(signo: libc::c_int) {
    match signo {
        libc::SIGALRM => TIMER_FIRED.store(true, Ordering::SeqCst),
        libc::SIGCHLD => CHILD_CHANGED.store(true, Ordering::SeqCst),
        _ => {}
    }
}

fn interrupt_signals() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGALRM);
    set.add(Signal::SIGCHLD);
    set
}

/// Process-wide: the flags are statics, so install this once.
#[derive(Debug)]
pub struct SignalInterrupts {
    // Mask used while sleeping: the caller's mask minus our two signals
    wait_mask: SigSet,
}

impl SignalInterrupts {
    pub fn install() -> Result<Self, SchedError> {
        let mut previous = SigSet::empty();
        signal::pthread_sigmask(
            SigmaskHow::SIG_BLOCK,
            Some(&interrupt_signals()),
            Some(&mut previous),
        )
        .map_err(SchedError::Interrupts)?;

        // Stopped/continued children do not concern us, only exits
        let action = SigAction::new(
            SigHandler::Handler(record_interrupt),
            SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
            SigSet::empty(),
        );
        for sig in [Signal::SIGALRM, Signal::SIGCHLD] {
            // SAFETY: the handler only touches atomics
            let installed = unsafe { signal::sigaction(sig, &action) };
            installed.map_err(SchedError::Interrupts)?;
        }

        let mut wait_mask = previous;
        wait_mask.remove(Signal::SIGALRM);
        wait_mask.remove(Signal::SIGCHLD);
        Ok(Self { wait_mask })
    }

    fn take(&self) -> PendingInterrupts {
        PendingInterrupts {
            child_exit: CHILD_CHANGED.swap(false, Ordering::SeqCst),
            timer: TIMER_FIRED.swap(false, Ordering::SeqCst),
        }
    }
}

impl InterruptSource for SignalInterrupts {
    fn wait(&mut self) -> PendingInterrupts {
        loop {
            let pending = self.take();
            if pending.any() {
                return pending;
            }
            // SAFETY: plain syscall on a valid mask; always returns -1/EINTR
            // after a handler ran
            unsafe { libc::sigsuspend(self.wait_mask.as_ref()) };
        }
    }
}

impl Drop for SignalInterrupts {
    fn drop(&mut self) {
        let _ = signal::pthread_sigmask(SigmaskHow::SIG_UNBLOCK, Some(&interrupt_signals()), None);
    }
}
