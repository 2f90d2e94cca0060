use nix::errno::Errno;
use nix::sys::signal::{self, SigSet, SigmaskHow, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{execv, fork, ForkResult, Pid};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::Duration;

use crate::core::SchedError;

fn c_arg(arg: &str) -> Result<CString, SchedError> {
    CString::new(arg).map_err(|_| SchedError::NulArgument(arg.to_string()))
}

/// Starts workload processes that are stopped before they exec.
#[derive(Debug)]
pub struct Launcher {
    program: CString,
    unit_ms: CString,
}

impl Launcher {
    pub fn new(program: &Path, time_unit: Duration) -> Result<Self, SchedError> {
        let program = CString::new(program.as_os_str().as_bytes())
            .map_err(|_| SchedError::NulArgument(program.display().to_string()))?;
        let unit_ms = c_arg(&time_unit.as_millis().to_string())?;
        Ok(Self { program, unit_ms })
    }

    pub fn spawn_suspended(&self, name: &str, workload: u64) -> Result<Pid, SchedError> {
        // Everything the child needs is allocated before the fork
        let argv = [
            self.program.clone(),
            c_arg(name)?,
            c_arg(&workload.to_string())?,
            c_arg("--unit-ms")?,
            self.unit_ms.clone(),
        ];

        // SAFETY: the scheduler is single threaded, and the child only calls
        // async-signal-safe functions until exec replaces it.
        let fork = unsafe { fork() }.map_err(|source| SchedError::Spawn {
            name: name.to_string(),
            source,
        })?;

        match fork {
            ForkResult::Child => {
                let _ = signal::pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&SigSet::empty()), None);
                // Stay stopped until the first context switch
                let _ = signal::raise(Signal::SIGSTOP);
                let _ = execv(&self.program, &argv);
                // SAFETY: exec failed; leave without running any parent cleanup
                unsafe { nix::libc::_exit(127) }
            }
            ForkResult::Parent { child } => {
                wait_until_stopped(name, child)?;
                Ok(child)
            }
        }
    }
}

// Resume must never race ahead of the child's own SIGSTOP
fn wait_until_stopped(name: &str, child: Pid) -> Result<(), SchedError> {
    loop {
        return match waitpid(child, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Stopped(_, Signal::SIGSTOP)) => Ok(()),
            Ok(status) => Err(SchedError::NotSuspended {
                name: name.to_string(),
                pid: child,
                status: format!("{status:?}"),
            }),
            Err(Errno::EINTR) => continue,
            Err(source) => Err(SchedError::Spawn {
                name: name.to_string(),
                source,
            }),
        };
    }
}
