//! In-memory stand-ins for the OS, used by unit tests.

use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::{ChildExit, InterruptSource, PendingInterrupts, Platform, SchedError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Spawn { name: String, workload: u64, pid: Pid },
    Resume(Pid),
    Suspend(Pid),
    Kill(Pid),
    ArmTimer,
    DisarmTimer,
}

#[derive(Debug)]
struct Proc {
    // Quanta left before the job exits on its own (auto-exit mode)
    remaining: u64,
    zombie: bool,
}

#[derive(Debug)]
struct MockOs {
    calls: Vec<Call>,
    procs: FxHashMap<Pid, Proc>,
    exited: VecDeque<ChildExit>,
    next_pid: i32,
    timer_armed: bool,
    fail_spawn: bool,
    auto_exit: bool,
    base: Instant,
    clock: u64,
}

impl MockOs {
    fn check_target(&self, pid: Pid, signal: Signal) -> Result<(), SchedError> {
        if self.procs.contains_key(&pid) {
            Ok(())
        } else {
            Err(SchedError::InvalidSignalTarget {
                pid,
                signal,
                source: Errno::ESRCH,
            })
        }
    }

    fn finish(&mut self, pid: Pid, code: Option<i32>) {
        if let Some(proc) = self.procs.get_mut(&pid) {
            if proc.zombie {
                return;
            }
            proc.zombie = true;
        }
        self.exited.push_back(ChildExit { pid, code });
    }
}

/// Records every call and simulates child processes. Clones share state.
#[derive(Debug, Clone)]
pub(crate) struct MockPlatform {
    os: Rc<RefCell<MockOs>>,
}

impl MockPlatform {
    pub(crate) fn new() -> Self {
        Self {
            os: Rc::new(RefCell::new(MockOs {
                calls: Vec::new(),
                procs: FxHashMap::default(),
                exited: VecDeque::new(),
                next_pid: 100,
                timer_armed: false,
                fail_spawn: false,
                auto_exit: false,
                base: Instant::now(),
                clock: 0,
            })),
        }
    }

    /// Jobs exit by themselves once resumed `workload` times.
    pub(crate) fn with_auto_exit() -> Self {
        let platform = Self::new();
        platform.os.borrow_mut().auto_exit = true;
        platform
    }

    pub(crate) fn interrupts(&self) -> ScriptedInterrupts {
        ScriptedInterrupts {
            os: Rc::clone(&self.os),
        }
    }

    pub(crate) fn exit(&self, pid: Pid, code: i32) {
        self.os.borrow_mut().finish(pid, Some(code));
    }

    // Process disappears without the scheduler hearing about it
    pub(crate) fn vanish(&self, pid: Pid) {
        self.os.borrow_mut().procs.remove(&pid);
    }

    pub(crate) fn fail_spawns(&self) {
        self.os.borrow_mut().fail_spawn = true;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.os.borrow().calls.clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.os.borrow_mut().calls.clear();
    }

    pub(crate) fn timer_armed(&self) -> bool {
        self.os.borrow().timer_armed
    }

    // Processes not yet reaped
    pub(crate) fn live(&self) -> usize {
        self.os.borrow().procs.len()
    }
}

impl Platform for MockPlatform {
    fn now(&self) -> Instant {
        let mut os = self.os.borrow_mut();
        os.clock += 1;
        os.base + Duration::from_micros(os.clock)
    }

    fn spawn_suspended(&mut self, name: &str, workload: u64) -> Result<Pid, SchedError> {
        let mut os = self.os.borrow_mut();
        if os.fail_spawn {
            return Err(SchedError::Spawn {
                name: name.to_string(),
                source: Errno::EAGAIN,
            });
        }

        let pid = Pid::from_raw(os.next_pid);
        os.next_pid += 1;
        os.procs.insert(
            pid,
            Proc {
                remaining: workload,
                zombie: false,
            },
        );
        os.calls.push(Call::Spawn {
            name: name.to_string(),
            workload,
            pid,
        });
        Ok(pid)
    }

    fn resume(&mut self, pid: Pid) -> Result<(), SchedError> {
        let mut os = self.os.borrow_mut();
        os.check_target(pid, Signal::SIGCONT)?;
        os.calls.push(Call::Resume(pid));

        if os.auto_exit {
            let done = match os.procs.get_mut(&pid) {
                Some(proc) => {
                    proc.remaining = proc.remaining.saturating_sub(1);
                    proc.remaining == 0
                }
                None => false,
            };
            if done {
                os.finish(pid, Some(0));
            }
        }
        Ok(())
    }

    fn suspend(&mut self, pid: Pid) -> Result<(), SchedError> {
        let mut os = self.os.borrow_mut();
        os.check_target(pid, Signal::SIGSTOP)?;
        os.calls.push(Call::Suspend(pid));
        Ok(())
    }

    fn kill(&mut self, pid: Pid) -> Result<(), SchedError> {
        let mut os = self.os.borrow_mut();
        os.check_target(pid, Signal::SIGKILL)?;
        os.calls.push(Call::Kill(pid));
        os.procs.remove(&pid);
        Ok(())
    }

    fn reap(&mut self) -> Result<Option<ChildExit>, SchedError> {
        let mut os = self.os.borrow_mut();
        let exit = os.exited.pop_front();
        if let Some(exit) = exit {
            os.procs.remove(&exit.pid);
        }
        Ok(exit)
    }

    fn arm_timer(&mut self) -> Result<(), SchedError> {
        let mut os = self.os.borrow_mut();
        os.timer_armed = true;
        os.calls.push(Call::ArmTimer);
        Ok(())
    }

    fn disarm_timer(&mut self) -> Result<(), SchedError> {
        let mut os = self.os.borrow_mut();
        os.timer_armed = false;
        os.calls.push(Call::DisarmTimer);
        Ok(())
    }
}

/// Delivers interrupts the way the kernel would for the mock processes: a
/// pending exit first, otherwise the armed one-shot timer.
#[derive(Debug)]
pub(crate) struct ScriptedInterrupts {
    os: Rc<RefCell<MockOs>>,
}

impl InterruptSource for ScriptedInterrupts {
    fn wait(&mut self) -> PendingInterrupts {
        let mut os = self.os.borrow_mut();
        if !os.exited.is_empty() {
            return PendingInterrupts {
                child_exit: true,
                timer: false,
            };
        }

        assert!(os.timer_armed, "driver loop would block forever");
        os.timer_armed = false;
        PendingInterrupts {
            child_exit: false,
            timer: true,
        }
    }
}
